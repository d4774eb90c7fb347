//! Catalog products. Listings are filtered by brand and category, so writes on either of
//! those refresh this slice.

use serde::{Deserialize, Serialize};

use crate::framework::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub brand_id: Option<u64>,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreate {
    pub name: String,
    pub price: f64,
    pub stock: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u64>,
}

impl Resource for Product {
    type Id = u64;
    type Create = ProductCreate;
    type Update = ProductUpdate;
    type Status = bool;

    const NAME: &'static str = "product";
    const BASE_PATH: &'static str = "products";
    const LIST_KEY: &'static str = "products";
    const RECORD_KEY: Option<&'static str> = Some("product");

    fn id(&self) -> &u64 {
        &self.id
    }
}
