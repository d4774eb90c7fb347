use serde::{Deserialize, Serialize};

use crate::framework::Resource;

/// A static content page (about, terms, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCreate {
    pub title: String,
    pub slug: String,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Resource for Page {
    type Id = u64;
    type Create = PageCreate;
    type Update = PageUpdate;
    type Status = bool;

    const NAME: &'static str = "page";
    const BASE_PATH: &'static str = "pages";
    const LIST_KEY: &'static str = "pages";
    const RECORD_KEY: Option<&'static str> = Some("page");

    fn id(&self) -> &u64 {
        &self.id
    }
}
