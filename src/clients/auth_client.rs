use serde_json::json;
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::api::{ApiClient, ApiError, ApiRequest};
use crate::session::{Session, SessionStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("Failed to persist session: {0}")]
    Storage(#[from] StorageError),
    #[error("Login response carried no access token")]
    MissingToken,
}

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Signs users in and out, keeping the persisted session in step.
#[derive(Clone)]
pub struct AuthClient {
    api: Arc<dyn ApiClient>,
    session: SessionStore,
}

impl AuthClient {
    pub fn new(api: Arc<dyn ApiClient>, session: SessionStore) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// `POST auth/login`; the response `data` is `{ accessToken, permissions, user }`.
    #[instrument(skip(self))]
    pub async fn login(&self, credentials: Credentials) -> Result<Session, AuthError> {
        let request = ApiRequest::post("auth/login").with_body(json!({
            "email": credentials.email,
            "password": credentials.password,
        }));
        let data = self.api.execute(request).await?;
        let session: Session = serde_json::from_value(data)
            .map_err(|e| ApiError::decode(format!("login response: {e}")))?;
        if !session.is_authenticated() {
            return Err(AuthError::MissingToken);
        }
        self.session.sign_in(session.clone())?;
        info!(
            user = ?session.user.as_ref().map(|u| u.id),
            permissions = session.permissions.len(),
            "Signed in"
        );
        Ok(session)
    }

    /// `POST auth/logout`, then clears the session even if the server could not be reached.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Err(e) = self.api.execute(ApiRequest::post("auth/logout")).await {
            warn!(error = %e, "Logout request failed, clearing session locally");
        }
        self.session.invalidate();
        info!("Signed out");
    }
}
