use tracing::{debug, instrument};

use super::ResourceClient;
use crate::framework::{ListQuery, SliceError};
use crate::model::Media;

/// Items requested per media page.
pub const MEDIA_PAGE_SIZE: u32 = 50;

resource_client!(
    /// Client for the infinitely scrolling `media` library.
    Media
);

impl MediaClient {
    /// Starts the library over from page 1, optionally restricted to path prefixes.
    #[instrument(skip(self))]
    pub async fn first_page(&self, prefixes: &[&str]) -> Result<Vec<Media>, SliceError> {
        let query = prefixes
            .iter()
            .fold(ListQuery::new().page(1, MEDIA_PAGE_SIZE), |query, prefix| {
                query.prefix(*prefix)
            });
        self.list(query).await
    }

    /// Appends the next page, keeping the current prefixes and sort.
    ///
    /// Returns an empty page without a request once the library is exhausted.
    #[instrument(skip(self))]
    pub async fn load_more(&self) -> Result<Vec<Media>, SliceError> {
        let state = self.state();
        let Some(last) = state.last_query else {
            return self.first_page(&[]).await;
        };
        if !state.has_more {
            debug!("Media library exhausted");
            return Ok(Vec::new());
        }
        let next = ListQuery {
            page: Some(last.page.unwrap_or(1) + 1),
            limit: last.limit.or(Some(MEDIA_PAGE_SIZE)),
            ..last
        }
        .appending();
        self.list(next).await
    }
}
