use serde::{Deserialize, Serialize};

use crate::framework::Resource;

/// A named set of permission codes assigned to back-office users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreate {
    pub name: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<String>>,
}

impl Resource for Role {
    type Id = u64;
    type Create = RoleCreate;
    type Update = RoleUpdate;
    type Status = bool;

    const NAME: &'static str = "role";
    const BASE_PATH: &'static str = "roles";
    const LIST_KEY: &'static str = "roles";
    const RECORD_KEY: Option<&'static str> = Some("role");

    fn id(&self) -> &u64 {
        &self.id
    }
}
