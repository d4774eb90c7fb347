//! # Resource Descriptors
//!
//! A resource is described once, by implementing [`Resource`] on its record type. The
//! descriptor carries everything that differs between the back-office modules:
//!
//! - where it lives (`BASE_PATH`) and how lists are wrapped (`LIST_KEY`),
//! - the payload types for create, update and status changes,
//! - how successful writes reach `items` ([`MutationStrategy`]),
//! - whether lists replace or append ([`ListMode`]).
//!
//! The slice engine in [`crate::framework::actor`] is written once against this trait.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Debug, Display};

use crate::api::ApiError;

/// How a successful write is reflected in `items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStrategy {
    /// Reload the list with the last query before the write resolves.
    Refetch,
    /// Patch `items` in place. Updates, status changes and deletes are applied before the
    /// request and rolled back if it fails; creates insert the record the server returns.
    LocalPatch,
}

/// How a successful list response is merged into `items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    /// `items` is replaced wholesale. Pages are 0-based on the client.
    Replace,
    /// Infinite scroll: non-reset pages are appended. Pages are sent as given.
    Append,
}

/// One decoded list response.
#[derive(Debug, Clone, PartialEq)]
pub struct ListPage<T> {
    pub items: Vec<T>,
    pub total: Option<u64>,
}

/// Descriptor implemented by every record type managed by a slice.
pub trait Resource:
    Clone + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    type Id: Clone + Debug + Display + PartialEq + Send + Sync + Serialize + 'static;
    type Create: Debug + Serialize + Send + Sync + 'static;
    type Update: Debug + Serialize + Send + Sync + 'static;
    type Status: Debug + Clone + Serialize + Send + Sync + 'static;

    /// Key of the slice in the store tree.
    const NAME: &'static str;
    /// Endpoint prefix, e.g. `brands` for `brands/shows`.
    const BASE_PATH: &'static str;
    /// Field of `data` holding the list array.
    const LIST_KEY: &'static str;
    /// Field of `data` holding a single record, when the backend wraps it.
    const RECORD_KEY: Option<&'static str> = None;
    const STRATEGY: MutationStrategy = MutationStrategy::Refetch;
    const LIST_MODE: ListMode = ListMode::Replace;

    fn id(&self) -> &Self::Id;

    /// Unwraps a list payload. Accepts `{ <LIST_KEY>: [...], totalItems }` or a bare array.
    fn map_list(data: Value) -> Result<ListPage<Self>, ApiError> {
        let (items, total) = match data {
            Value::Array(items) => (Value::Array(items), None),
            Value::Object(mut map) => {
                let total = map.get("totalItems").and_then(Value::as_u64);
                let items = map.remove(Self::LIST_KEY).ok_or_else(|| {
                    ApiError::decode(format!("missing `{}` in list response", Self::LIST_KEY))
                })?;
                (items, total)
            }
            other => {
                return Err(ApiError::decode(format!(
                    "expected {} list, got {other}",
                    Self::NAME
                )))
            }
        };
        let items: Vec<Self> = serde_json::from_value(items)
            .map_err(|e| ApiError::decode(format!("{} list: {e}", Self::NAME)))?;
        Ok(ListPage { items, total })
    }

    /// Unwraps a single-record payload.
    fn map_record(data: Value) -> Result<Self, ApiError> {
        let record = match (Self::RECORD_KEY, data) {
            (Some(key), Value::Object(mut map)) if map.contains_key(key) => {
                map.remove(key).unwrap_or(Value::Null)
            }
            (_, data) => data,
        };
        serde_json::from_value(record)
            .map_err(|e| ApiError::decode(format!("{} record: {e}", Self::NAME)))
    }

    /// Local patch for [`MutationStrategy::LocalPatch`] updates.
    fn apply_update(&mut self, _update: &Self::Update) {}

    /// Local patch for [`MutationStrategy::LocalPatch`] status changes.
    fn apply_status(&mut self, _status: &Self::Status) {}

    fn list_path() -> String {
        format!("{}/shows", Self::BASE_PATH)
    }

    fn show_path(id: &Self::Id) -> String {
        format!("{}/show/{id}", Self::BASE_PATH)
    }

    fn create_path() -> String {
        format!("{}/create", Self::BASE_PATH)
    }

    fn update_path(id: &Self::Id) -> String {
        format!("{}/update/{id}", Self::BASE_PATH)
    }

    fn status_path(id: &Self::Id) -> String {
        format!("{}/update-status/{id}", Self::BASE_PATH)
    }

    fn destroy_path(id: &Self::Id) -> String {
        format!("{}/destroy/{id}", Self::BASE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        id: u64,
        name: String,
    }

    impl Resource for Widget {
        type Id = u64;
        type Create = Value;
        type Update = Value;
        type Status = bool;

        const NAME: &'static str = "widget";
        const BASE_PATH: &'static str = "widgets";
        const LIST_KEY: &'static str = "widgets";
        const RECORD_KEY: Option<&'static str> = Some("widget");

        fn id(&self) -> &u64 {
            &self.id
        }
    }

    #[test]
    fn test_paths_follow_backend_conventions() {
        assert_eq!(Widget::list_path(), "widgets/shows");
        assert_eq!(Widget::create_path(), "widgets/create");
        assert_eq!(Widget::update_path(&4), "widgets/update/4");
        assert_eq!(Widget::status_path(&4), "widgets/update-status/4");
        assert_eq!(Widget::destroy_path(&4), "widgets/destroy/4");
        assert_eq!(Widget::show_path(&4), "widgets/show/4");
    }

    #[test]
    fn test_map_list_reads_configured_key_and_total() {
        let page = Widget::map_list(json!({
            "widgets": [{ "id": 1, "name": "a" }, { "id": 2, "name": "b" }],
            "totalItems": 25
        }))
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, Some(25));

        let bare = Widget::map_list(json!([{ "id": 3, "name": "c" }])).unwrap();
        assert_eq!(bare.items[0].id, 3);
        assert_eq!(bare.total, None);
    }

    #[test]
    fn test_map_list_wrong_key_is_decode_error() {
        let err = Widget::map_list(json!({ "brands": [] })).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn test_map_record_with_and_without_wrapper() {
        let wrapped = Widget::map_record(json!({ "widget": { "id": 1, "name": "a" } })).unwrap();
        let bare = Widget::map_record(json!({ "id": 1, "name": "a" })).unwrap();
        assert_eq!(wrapped, bare);
        assert!(Widget::map_record(Value::Null).is_err());
    }
}
