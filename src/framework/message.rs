//! Messages exchanged with a slice task.

use serde_json::{json, Value};
use tokio::sync::oneshot;

use super::error::SliceError;
use super::orchestrator::{MutationEvent, MutationKind};
use super::query::ListQuery;
use super::resource::{ListPage, Resource};
use crate::api::{ApiError, ApiRequest};

/// One-shot response channel used by slices.
pub type Response<T> = oneshot::Sender<Result<T, SliceError>>;

/// Requests accepted by a slice.
///
/// Reads and writes map onto the backend's resource conventions; `Abandon` drops every
/// in-flight list without applying it.
pub enum SliceRequest<T: Resource> {
    List {
        /// `None` replays the last applied query.
        query: Option<ListQuery>,
        respond_to: Response<Vec<T>>,
    },
    Fetch {
        id: T::Id,
        respond_to: Response<T>,
    },
    Lookup {
        key: String,
        query: ListQuery,
        respond_to: Response<Vec<T>>,
    },
    Mutate {
        op: MutationOp<T>,
        respond_to: Response<()>,
    },
    Abandon {
        respond_to: Response<usize>,
    },
}

/// A write against the backend.
#[derive(Debug)]
pub enum MutationOp<T: Resource> {
    Create(T::Create),
    Update { id: T::Id, payload: T::Update },
    UpdateStatus { id: T::Id, status: T::Status },
    Delete { id: T::Id },
}

impl<T: Resource> MutationOp<T> {
    pub fn kind(&self) -> MutationKind {
        match self {
            MutationOp::Create(_) => MutationKind::Create,
            MutationOp::Update { .. } => MutationKind::Update,
            MutationOp::UpdateStatus { .. } => MutationKind::UpdateStatus,
            MutationOp::Delete { .. } => MutationKind::Delete,
        }
    }

    pub fn target(&self) -> Option<&T::Id> {
        match self {
            MutationOp::Create(_) => None,
            MutationOp::Update { id, .. }
            | MutationOp::UpdateStatus { id, .. }
            | MutationOp::Delete { id } => Some(id),
        }
    }

    /// The HTTP request for this write and the event announced once it succeeds.
    pub fn prepare(&self) -> Result<(ApiRequest, MutationEvent), SliceError> {
        let (request, payload) = match self {
            MutationOp::Create(payload) => {
                let body = serde_json::to_value(payload)?;
                (ApiRequest::post(T::create_path()).with_body(body.clone()), body)
            }
            MutationOp::Update { id, payload } => {
                let body = serde_json::to_value(payload)?;
                (ApiRequest::put(T::update_path(id)).with_body(body.clone()), body)
            }
            MutationOp::UpdateStatus { id, status } => {
                let body = json!({ "status": status });
                (ApiRequest::put(T::status_path(id)).with_body(body.clone()), body)
            }
            MutationOp::Delete { id } => (ApiRequest::delete(T::destroy_path(id)), Value::Null),
        };
        let event = MutationEvent {
            resource: T::NAME,
            kind: self.kind(),
            id: self.target().map(ToString::to_string),
            payload,
        };
        Ok((request, event))
    }
}

/// Local state to restore if an optimistic write fails.
pub(crate) enum Rollback<T> {
    Restore(T),
    Reinsert { index: usize, item: T },
}

/// A write whose request is in flight.
pub(crate) struct PendingWrite<T: Resource> {
    pub op: MutationOp<T>,
    pub event: MutationEvent,
    pub rollback: Option<Rollback<T>>,
    pub respond_to: Response<()>,
}

/// Results of spawned network work, fed back into the slice loop.
pub(crate) enum Completion<T: Resource> {
    List {
        generation: u64,
        query: ListQuery,
        result: Result<ListPage<T>, ApiError>,
    },
    Fetch {
        generation: u64,
        result: Result<T, ApiError>,
        respond_to: Response<T>,
    },
    Lookup {
        key: String,
        generation: u64,
        result: Result<ListPage<T>, ApiError>,
        respond_to: Response<Vec<T>>,
    },
    Write {
        write: PendingWrite<T>,
        result: Result<Value, ApiError>,
    },
}
