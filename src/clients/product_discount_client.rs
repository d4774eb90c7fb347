use tracing::instrument;

use super::ResourceClient;
use crate::framework::{ListQuery, SliceError};
use crate::model::ProductDiscount;

resource_client!(
    /// Client for the `product_discount` slice.
    ProductDiscount
);

impl ProductDiscountClient {
    #[instrument(skip(self))]
    pub async fn for_product(&self, product_id: u64) -> Result<Vec<ProductDiscount>, SliceError> {
        self.list(ListQuery::new().filter("productId", product_id))
            .await
    }

    #[instrument(skip(self))]
    pub async fn for_discount(&self, discount_id: u64) -> Result<Vec<ProductDiscount>, SliceError> {
        self.list(ListQuery::new().filter("discountId", discount_id))
            .await
    }
}
