use serde::{Deserialize, Serialize};

use crate::framework::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<u64>,
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<u64>,
}

impl Resource for Category {
    type Id = u64;
    type Create = CategoryCreate;
    type Update = CategoryUpdate;
    type Status = bool;

    const NAME: &'static str = "category";
    const BASE_PATH: &'static str = "categories";
    const LIST_KEY: &'static str = "categories";
    const RECORD_KEY: Option<&'static str> = Some("category");

    fn id(&self) -> &u64 {
        &self.id
    }
}
