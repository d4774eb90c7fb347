//! Blog posts.
//!
//! Posts are patched locally: publishing or editing a post shows immediately and is
//! rolled back if the server refuses it. Listings are paginated.

use serde::{Deserialize, Serialize};

use crate::framework::{MutationStrategy, Resource};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: PostStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostCreate {
    pub title: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl PostCreate {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            slug: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Resource for Post {
    type Id = u64;
    type Create = PostCreate;
    type Update = PostUpdate;
    type Status = PostStatus;

    const NAME: &'static str = "post";
    const BASE_PATH: &'static str = "posts";
    const LIST_KEY: &'static str = "posts";
    const RECORD_KEY: Option<&'static str> = Some("post");
    const STRATEGY: MutationStrategy = MutationStrategy::LocalPatch;

    fn id(&self) -> &u64 {
        &self.id
    }

    fn apply_update(&mut self, update: &PostUpdate) {
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(slug) = &update.slug {
            self.slug = Some(slug.clone());
        }
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
    }

    fn apply_status(&mut self, status: &PostStatus) {
        self.status = *status;
    }
}
