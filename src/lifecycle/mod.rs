//! Store composition and lifecycle management.
//!
//! This module contains the infrastructure for running the store:
//!
//! - **Composition**: creating every resource slice, declaring the dependency edges
//!   between them and starting them with their injected context
//! - **Persistence**: restoring the session subtree before anything else starts
//! - **Shutdown**: closing every slice and waiting for its task
//! - **Observability setup**: initializing tracing and logging
//!
//! # Main Components
//!
//! - [`BackofficeStore`] - The composition root holding every typed client
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod store;
pub mod tracing;

pub use self::store::*;
pub use self::tracing::setup_tracing;
