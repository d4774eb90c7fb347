use tracing::instrument;

use super::ResourceClient;
use crate::framework::SliceError;

resource_client!(
    /// Client for the `user` slice.
    User
);

impl UserClient {
    #[instrument(skip(self))]
    pub async fn activate(&self, id: u64) -> Result<(), SliceError> {
        self.update_status(id, true).await
    }

    #[instrument(skip(self))]
    pub async fn deactivate(&self, id: u64) -> Result<(), SliceError> {
        self.update_status(id, false).await
    }
}
