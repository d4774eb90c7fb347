//! # API Errors
//!
//! Every failure coming back from the backend is normalized into one tagged [`ApiError`].
//! Consumers branch on the variant instead of probing the shape of a JSON body:
//!
//! | Variant | Source | Retried (reads) | Surfaced as |
//! |---------|--------|-----------------|-------------|
//! | `Network` | no response, timeout, connection reset | yes | generic "try again" |
//! | `Validation` | 4xx with field-keyed `messages` | no | inline field errors |
//! | `Unauthorized` | 401 / 403 | no | session cleared |
//! | `Server` | other 4xx / 5xx | 5xx only | string notification |
//! | `Decode` | body does not match the configured shape | no | string notification |

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Normalized backend failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ApiError {
    #[error("Network error: {message}")]
    Network { message: String },

    #[error("Validation failed for {}", .fields.keys().cloned().collect::<Vec<_>>().join(", "))]
    Validation { fields: BTreeMap<String, String> },

    #[error("Unauthorized ({status})")]
    Unauthorized { status: u16 },

    #[error("Server error{}: {message}", .status.map(|s| format!(" {s}")).unwrap_or_default())]
    Server { status: Option<u16>, message: String },

    #[error("Unexpected response: {message}")]
    Decode { message: String },
}

/// Error body shape: `messages` (string or field map) or `message` (string).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    messages: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl ApiError {
    pub fn network(message: impl Into<String>) -> Self {
        ApiError::Network {
            message: message.into(),
        }
    }

    pub fn server(status: u16, message: impl Into<String>) -> Self {
        ApiError::Server {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        ApiError::Decode {
            message: message.into(),
        }
    }

    pub fn validation<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        ApiError::Validation {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Builds the error for a non-success, non-auth response from its raw body.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed: ErrorBody = serde_json::from_slice(body).unwrap_or_default();

        match parsed.messages {
            Some(Value::Object(map)) if (400..500).contains(&status) => ApiError::Validation {
                fields: map
                    .into_iter()
                    .map(|(field, value)| (field, first_message(&value)))
                    .collect(),
            },
            Some(Value::Object(map)) => ApiError::server(
                status,
                map.values().map(first_message).collect::<Vec<_>>().join("; "),
            ),
            Some(Value::String(message)) => ApiError::server(status, message),
            _ => match parsed.message {
                Some(message) => ApiError::server(status, message),
                None => ApiError::server(status, format!("Request failed with status {status}")),
            },
        }
    }

    /// Transient failures worth another attempt for idempotent reads.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Network { .. } => true,
            ApiError::Server {
                status: Some(status),
                ..
            } => *status >= 500,
            _ => false,
        }
    }

    /// Field-level messages for form display, if this is a validation failure.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ApiError::Validation { fields } => Some(fields),
            _ => None,
        }
    }

    /// Human-readable message for a transient notification.
    ///
    /// Validation maps return `None`: they belong next to the form fields.
    pub fn toast_message(&self) -> Option<String> {
        match self {
            ApiError::Validation { .. } => None,
            ApiError::Network { .. } => Some("Network error, please try again.".to_string()),
            ApiError::Unauthorized { .. } => {
                Some("Your session has expired, please sign in again.".to_string())
            }
            ApiError::Server { message, .. } => Some(message.clone()),
            ApiError::Decode { .. } => Some("Unexpected response from the server.".to_string()),
        }
    }
}

fn first_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(values) => values.first().map(first_message).unwrap_or_default(),
        other => other.to_string(),
    }
}
