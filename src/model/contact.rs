use serde::{Deserialize, Serialize};

use crate::framework::Resource;

/// A message left through the storefront contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub message: String,
    /// Whether staff has handled it.
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCreate {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Resource for Contact {
    type Id = u64;
    type Create = ContactCreate;
    type Update = ContactUpdate;
    type Status = bool;

    const NAME: &'static str = "contact";
    const BASE_PATH: &'static str = "contacts";
    const LIST_KEY: &'static str = "contacts";
    const RECORD_KEY: Option<&'static str> = Some("contact");

    fn id(&self) -> &u64 {
        &self.id
    }
}
