//! Backend API collaborator.
//!
//! The slices never talk HTTP directly. They hand an [`ApiRequest`] to an [`ApiClient`]
//! and receive the unwrapped envelope payload or a tagged [`ApiError`].
//!
//! - [`HttpApi`]: production adapter (`reqwest`).
//! - [`RetryPolicy`]: backoff for idempotent reads.
//! - [`crate::framework::mock`]: scripted and in-memory implementations for tests.

pub mod error;
pub mod http;
pub mod request;
pub mod retry;

pub use error::ApiError;
pub use http::HttpApi;
pub use request::{ApiRequest, Method};
pub use retry::RetryPolicy;

use async_trait::async_trait;
use serde_json::Value;

/// Executes requests against the backend.
///
/// On success the returned value is the content of the `data` envelope field.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError>;
}
