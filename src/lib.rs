//! # Backoffice Store
//!
//! > **Resource slices for an e-commerce back office.**
//!
//! Every back-office screen (brands, products, invoices, media, users, ...) works the same
//! way: it asks for a list, shows a loading state, renders the result or an error, and
//! reloads after a write. This crate implements that shape once, as a generic slice engine
//! configured by a per-resource descriptor, and composes a slice per resource into one
//! store backed by a REST API.
//!
//! ## Core Concepts
//!
//! ### One engine, many resources
//! [`SliceActor<T: Resource>`](framework::SliceActor) owns a resource's state and runs in its
//! own Tokio task. A resource only declares its endpoints, payload keys and how writes are
//! reflected (refetch or local patch); the loop, status tracking and sequencing are shared.
//!
//! ### Ordering guarantees
//! - The most recently dispatched list wins; late responses are dropped.
//! - A write resolves after the list it caused has landed.
//! - Writes declared as dependencies refresh other slices before resolving.
//!
//! ### Tagged errors
//! Backend failures arrive as one [`ApiError`](api::ApiError): network, validation (with
//! per-field messages), unauthorized, server or decode. Validation errors stay inline;
//! others become notifications.
//!
//! ## Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! - **Role**: The generic slice, its state machine and the dependency orchestrator.
//! - **Key items**: [`Resource`](framework::Resource), [`SliceActor`](framework::SliceActor),
//!   [`DependencyGraph`](framework::DependencyGraph).
//!
//! ### 2. The Backend ([`api`], [`session`])
//! - **Role**: HTTP transport with envelope unwrapping, retries for reads, and the persisted
//!   session that carries the bearer token.
//! - **Key items**: [`HttpApi`](api::HttpApi), [`SessionStore`](session::SessionStore).
//!
//! ### 3. The Interface ([`clients`], [`model`])
//! - **Role**: Typed records and per-resource clients with domain helpers.
//! - **Key items**: [`PostClient`](clients::PostClient), [`MediaClient`](clients::MediaClient),
//!   [`AuthClient`](clients::AuthClient).
//!
//! ### 4. The Root ([`lifecycle`], [`config`])
//! - **Role**: Loads configuration, starts every slice, wires the dependency edges and shuts
//!   everything down.
//! - **Key items**: [`BackofficeStore`](lifecycle::BackofficeStore),
//!   [`StoreConfig`](config::StoreConfig).
//!
//! ## Quick Start
//!
//! ```bash
//! # Point the demo at a backend and run it with info logs
//! BACKOFFICE_API_URL=http://localhost:8000/api RUST_LOG=info cargo run
//! ```
//!
//! ### Running Tests
//!
//! ```bash
//! cargo test
//! ```
//!
//! Tests never need a live backend. See [`framework::mock`].

pub mod api;
pub mod clients;
pub mod config;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod session;
