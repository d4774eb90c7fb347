//! Assignment of a discount to a product. Its identity is derived from both sides, so it
//! goes stale when either a discount or a product changes.

use serde::{Deserialize, Serialize};

use crate::framework::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDiscount {
    pub id: u64,
    pub product_id: u64,
    pub discount_id: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDiscountCreate {
    pub product_id: u64,
    pub discount_id: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDiscountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_id: Option<u64>,
}

impl Resource for ProductDiscount {
    type Id = u64;
    type Create = ProductDiscountCreate;
    type Update = ProductDiscountUpdate;
    type Status = bool;

    const NAME: &'static str = "product_discount";
    const BASE_PATH: &'static str = "product-discounts";
    const LIST_KEY: &'static str = "productDiscounts";
    const RECORD_KEY: Option<&'static str> = Some("productDiscount");

    fn id(&self) -> &u64 {
        &self.id
    }
}
