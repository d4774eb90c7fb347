use tracing::instrument;

use super::ResourceClient;
use crate::framework::{ListQuery, SliceError};
use crate::model::{Post, PostStatus};

resource_client!(
    /// Client for the `post` slice. Status changes are applied optimistically.
    Post
);

impl PostClient {
    /// Loads one page of posts. `page` is 0-based.
    #[instrument(skip(self))]
    pub async fn page(&self, page: u32, limit: u32) -> Result<Vec<Post>, SliceError> {
        self.list(ListQuery::new().page(page, limit)).await
    }

    #[instrument(skip(self))]
    pub async fn publish(&self, id: u64) -> Result<(), SliceError> {
        self.update_status(id, PostStatus::Published).await
    }

    #[instrument(skip(self))]
    pub async fn unpublish(&self, id: u64) -> Result<(), SliceError> {
        self.update_status(id, PostStatus::Draft).await
    }
}
