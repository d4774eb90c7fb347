//! # HTTP Adapter
//!
//! [`HttpApi`] is the production [`ApiClient`]: it resolves request paths against the
//! configured base URL, injects the session's bearer token, unwraps the `{ "data": ... }`
//! envelope and normalizes failures into [`ApiError`].
//!
//! Authorization failures (401/403) are handled here, once, for every slice: the persisted
//! session is invalidated before the error is returned.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::{ApiClient, ApiError, ApiRequest, Method};
use crate::config::ApiConfig;
use crate::session::SessionStore;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Value,
}

/// `reqwest`-backed implementation of [`ApiClient`].
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl HttpApi {
    pub fn new(config: &ApiConfig, session: SessionStore) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ApiClient for HttpApi {
    #[instrument(skip(self, request), fields(method = ?request.method, path = %request.path))]
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut builder = self
            .client
            .request(request.method.into(), self.url(&request.path));
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = self.session.access_token() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::network(e.to_string()))?;
        debug!(status = status.as_u16(), len = bytes.len(), "Response");

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            let envelope: Envelope = serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::decode(format!("invalid envelope: {e}")))?;
            return Ok(envelope.data);
        }

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), "Authorization rejected, clearing session");
            self.session.invalidate();
            return Err(ApiError::Unauthorized {
                status: status.as_u16(),
            });
        }

        let err = ApiError::from_response(status.as_u16(), &bytes);
        warn!(error = %err, "Request failed");
        Err(err)
    }
}
