use serde::{Deserialize, Serialize};

use crate::framework::Resource;

/// A back-office account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub role_id: Option<u64>,
    /// Active accounts can sign in.
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<u64>,
}

impl Resource for User {
    type Id = u64;
    type Create = UserCreate;
    type Update = UserUpdate;
    type Status = bool;

    const NAME: &'static str = "user";
    const BASE_PATH: &'static str = "users";
    const LIST_KEY: &'static str = "users";
    const RECORD_KEY: Option<&'static str> = Some("user");

    fn id(&self) -> &u64 {
        &self.id
    }
}
