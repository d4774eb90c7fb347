//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG` (default `info`). Module paths are hidden (`with_target(false)`); every
//! slice log line carries a `resource` field instead.
//!
//! ## What Gets Traced
//!
//! - **Slice lifecycle**: start (with strategy and list mode) and shutdown
//! - **Reads**: dispatched lists with their generation, applied results with sizes,
//!   stale responses that were dropped
//! - **Writes**: payloads at `debug`, accepted writes and failures, rollbacks
//! - **Dependencies**: each dependent refresh and its failures
//! - **Session**: restore, sign-in, invalidation on 401/403
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run
//! # Full payloads and generations
//! RUST_LOG=debug cargo run
//! # Only the slice engine
//! RUST_LOG=backoffice_store::framework=debug cargo run
//! ```
//!
//! With `RUST_LOG=info`, creating a brand reads:
//!
//! ```text
//! INFO Slice started resource="brand" strategy=Refetch mode=Replace
//! INFO create: Write accepted resource="brand" kind=Create id=None
//! INFO create: List applied resource="brand" generation=2 items=1 total=Some(1) has_more=false
//! ```

use tracing_subscriber::EnvFilter;

pub fn setup_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (e.g. from several tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
