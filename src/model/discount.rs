use serde::{Deserialize, Serialize};

use crate::framework::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: u64,
    pub name: String,
    /// Percentage off, 0 to 100.
    #[serde(default)]
    pub percent: f64,
    #[serde(default)]
    pub starts_at: Option<String>,
    #[serde(default)]
    pub ends_at: Option<String>,
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountCreate {
    pub name: String,
    pub percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starts_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends_at: Option<String>,
}

impl Resource for Discount {
    type Id = u64;
    type Create = DiscountCreate;
    type Update = DiscountUpdate;
    type Status = bool;

    const NAME: &'static str = "discount";
    const BASE_PATH: &'static str = "discounts";
    const LIST_KEY: &'static str = "discounts";
    const RECORD_KEY: Option<&'static str> = Some("discount");

    fn id(&self) -> &u64 {
        &self.id
    }
}
