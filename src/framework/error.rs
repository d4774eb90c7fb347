use crate::api::ApiError;
use std::collections::BTreeMap;

/// Errors returned to callers of a slice.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SliceError {
    #[error("Slice closed")]
    ActorClosed,
    #[error("Slice dropped response channel")]
    ActorDropped,
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The write was accepted but the list could not be reloaded afterwards.
    #[error("Saved, but reloading the list failed: {0}")]
    RefetchFailed(ApiError),
    #[error("Request abandoned")]
    Abandoned,
    #[error("Failed to encode payload: {0}")]
    Encode(String),
}

impl SliceError {
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            SliceError::Api(e) | SliceError::RefetchFailed(e) => Some(e),
            _ => None,
        }
    }

    /// Field-level messages for the initiating form.
    pub fn field_errors(&self) -> Option<&BTreeMap<String, String>> {
        self.api_error().and_then(ApiError::field_errors)
    }

    pub fn toast_message(&self) -> Option<String> {
        match self {
            SliceError::Api(e) | SliceError::RefetchFailed(e) => e.toast_message(),
            SliceError::Abandoned => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for SliceError {
    fn from(e: serde_json::Error) -> Self {
        SliceError::Encode(e.to_string())
    }
}
