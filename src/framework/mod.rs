//! Generic slice framework for backend resources.
//!
//! Each back-office resource is managed by the same engine, configured by a descriptor.
//!
//! # Main Components
//!
//! - [`Resource`] - Descriptor trait implemented by every record type
//! - [`SliceActor`] - The task owning one resource's state
//! - [`SliceClient`] - Type-safe handle for reads, writes and observation
//! - [`SliceState`] - The observable state (`status`, `items`, `error`, `lastQuery`, ...)
//! - [`DependencyGraph`] - Declared cross-resource refresh edges
//! - [`SliceError`] - Errors returned to callers
//!
//! # Testing
//!
//! See [`mock`] module for a scripted API and an in-memory backend.

pub mod actor;
pub mod client;
pub mod error;
pub mod message;
pub mod mock;
pub mod notify;
pub mod orchestrator;
pub mod query;
pub mod resource;
pub mod state;

pub use actor::{SliceActor, SliceContext};
pub use client::SliceClient;
pub use error::SliceError;
pub use message::{MutationOp, Response, SliceRequest};
pub use notify::{Notification, NotificationLevel, Notifier};
pub use orchestrator::{
    DependencyEdge, DependencyGraph, MutationEvent, MutationKind, OrchestratorError, Refresh,
    RefreshParams,
};
pub use query::ListQuery;
pub use resource::{ListMode, ListPage, MutationStrategy, Resource};
pub use state::{SliceState, SliceStatus};
