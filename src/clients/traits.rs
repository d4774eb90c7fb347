use async_trait::async_trait;
use tokio::sync::watch;

use crate::framework::{ListQuery, Resource, SliceClient, SliceError, SliceState};

/// Trait for resource-specific clients to inherit the standard slice operations.
///
/// Implementors only provide [`inner`](ResourceClient::inner); every operation is
/// forwarded to the generic [`SliceClient`] inside its own tracing span.
#[async_trait]
pub trait ResourceClient<T: Resource>: Send + Sync {
    /// Access the inner generic SliceClient.
    fn inner(&self) -> &SliceClient<T>;

    #[tracing::instrument(skip(self), fields(resource = T::NAME))]
    async fn list(&self, query: ListQuery) -> Result<Vec<T>, SliceError> {
        tracing::debug!("Sending request");
        self.inner().list(query).await
    }

    #[tracing::instrument(skip(self), fields(resource = T::NAME))]
    async fn refetch(&self) -> Result<Vec<T>, SliceError> {
        tracing::debug!("Sending request");
        self.inner().refetch().await
    }

    #[tracing::instrument(skip(self), fields(resource = T::NAME))]
    async fn fetch(&self, id: T::Id) -> Result<T, SliceError> {
        tracing::debug!("Sending request");
        self.inner().fetch(id).await
    }

    #[tracing::instrument(skip(self), fields(resource = T::NAME))]
    async fn create(&self, payload: T::Create) -> Result<(), SliceError> {
        tracing::debug!("Sending request");
        self.inner().create(payload).await
    }

    #[tracing::instrument(skip(self), fields(resource = T::NAME))]
    async fn update(&self, id: T::Id, payload: T::Update) -> Result<(), SliceError> {
        tracing::debug!("Sending request");
        self.inner().update(id, payload).await
    }

    #[tracing::instrument(skip(self), fields(resource = T::NAME))]
    async fn update_status(&self, id: T::Id, status: T::Status) -> Result<(), SliceError> {
        tracing::debug!("Sending request");
        self.inner().update_status(id, status).await
    }

    #[tracing::instrument(skip(self), fields(resource = T::NAME))]
    async fn delete(&self, id: T::Id) -> Result<(), SliceError> {
        tracing::debug!("Sending request");
        self.inner().delete(id).await
    }

    async fn abandon(&self) -> Result<usize, SliceError> {
        self.inner().abandon().await
    }

    async fn settled(&self) -> Result<SliceState<T>, SliceError> {
        self.inner().settled().await
    }

    fn state(&self) -> SliceState<T> {
        self.inner().state()
    }

    fn subscribe(&self) -> watch::Receiver<SliceState<T>> {
        self.inner().subscribe()
    }
}
