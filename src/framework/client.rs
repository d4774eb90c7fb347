use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};

use super::error::SliceError;
use super::message::{MutationOp, Response, SliceRequest};
use super::orchestrator::{Refresh, RefreshParams};
use super::query::ListQuery;
use super::resource::Resource;
use super::state::SliceState;

/// A type-safe handle to a running [`SliceActor`](super::SliceActor).
///
/// Cheap to clone. The slice shuts down once every clone has been dropped.
#[derive(Clone)]
pub struct SliceClient<T: Resource> {
    sender: mpsc::Sender<SliceRequest<T>>,
    state: watch::Receiver<SliceState<T>>,
}

impl<T: Resource> SliceClient<T> {
    pub fn new(
        sender: mpsc::Sender<SliceRequest<T>>,
        state: watch::Receiver<SliceState<T>>,
    ) -> Self {
        Self { sender, state }
    }

    pub fn name(&self) -> &'static str {
        T::NAME
    }

    async fn request<R>(
        &self,
        make: impl FnOnce(Response<R>) -> SliceRequest<T>,
    ) -> Result<R, SliceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| SliceError::ActorClosed)?;
        response.await.map_err(|_| SliceError::ActorDropped)?
    }

    /// Loads a list and makes `query` the slice's last query.
    pub async fn list(&self, query: ListQuery) -> Result<Vec<T>, SliceError> {
        self.request(|respond_to| SliceRequest::List {
            query: Some(query),
            respond_to,
        })
        .await
    }

    /// Reloads the list with the last applied query.
    pub async fn refetch(&self) -> Result<Vec<T>, SliceError> {
        self.request(|respond_to| SliceRequest::List {
            query: None,
            respond_to,
        })
        .await
    }

    /// Loads one record into `selected`.
    pub async fn fetch(&self, id: T::Id) -> Result<T, SliceError> {
        self.request(|respond_to| SliceRequest::Fetch { id, respond_to })
            .await
    }

    /// Loads a secondary list under `key` without touching `items`.
    pub async fn lookup(
        &self,
        key: impl Into<String>,
        query: ListQuery,
    ) -> Result<Vec<T>, SliceError> {
        let key = key.into();
        self.request(|respond_to| SliceRequest::Lookup {
            key,
            query,
            respond_to,
        })
        .await
    }

    pub async fn create(&self, payload: T::Create) -> Result<(), SliceError> {
        self.mutate(MutationOp::Create(payload)).await
    }

    pub async fn update(&self, id: T::Id, payload: T::Update) -> Result<(), SliceError> {
        self.mutate(MutationOp::Update { id, payload }).await
    }

    pub async fn update_status(&self, id: T::Id, status: T::Status) -> Result<(), SliceError> {
        self.mutate(MutationOp::UpdateStatus { id, status }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), SliceError> {
        self.mutate(MutationOp::Delete { id }).await
    }

    async fn mutate(&self, op: MutationOp<T>) -> Result<(), SliceError> {
        self.request(|respond_to| SliceRequest::Mutate { op, respond_to })
            .await
    }

    /// Drops every in-flight list (e.g. when the view that asked for it goes away).
    ///
    /// Returns how many lists were abandoned.
    pub async fn abandon(&self) -> Result<usize, SliceError> {
        self.request(|respond_to| SliceRequest::Abandon { respond_to })
            .await
    }

    /// Current state.
    pub fn state(&self) -> SliceState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SliceState<T>> {
        self.state.clone()
    }

    /// Waits until no request is in flight and returns that state.
    pub async fn settled(&self) -> Result<SliceState<T>, SliceError> {
        let mut observer = self.state.clone();
        let state = observer
            .wait_for(|state| !state.is_loading())
            .await
            .map_err(|_| SliceError::ActorClosed)?;
        Ok(state.clone())
    }
}

#[async_trait]
impl<T: Resource> Refresh for SliceClient<T> {
    fn resource(&self) -> &'static str {
        T::NAME
    }

    async fn refresh(&self, params: RefreshParams) -> Result<(), SliceError> {
        match params {
            RefreshParams::LastQuery => self.refetch().await.map(|_| ()),
            RefreshParams::Query(query) => self.list(query).await.map(|_| ()),
        }
    }
}
