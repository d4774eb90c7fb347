//! Media library entries.
//!
//! The library scrolls infinitely: pages are appended, and a short page means the end.
//! Renames and deletes are patched locally.

use serde::{Deserialize, Serialize};

use crate::framework::{ListMode, MutationStrategy, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: u64,
    pub name: String,
    /// Storage path, e.g. `images/banner.png`. Prefix filters match against it.
    pub path: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub status: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaCreate {
    pub name: String,
    pub path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Resource for Media {
    type Id = u64;
    type Create = MediaCreate;
    type Update = MediaUpdate;
    type Status = bool;

    const NAME: &'static str = "media";
    const BASE_PATH: &'static str = "media";
    const LIST_KEY: &'static str = "media";
    const RECORD_KEY: Option<&'static str> = Some("media");
    const STRATEGY: MutationStrategy = MutationStrategy::LocalPatch;
    const LIST_MODE: ListMode = ListMode::Append;

    fn id(&self) -> &u64 {
        &self.id
    }

    fn apply_update(&mut self, update: &MediaUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
    }

    fn apply_status(&mut self, status: &bool) {
        self.status = *status;
    }
}
