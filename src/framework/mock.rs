//! # Mock Framework
//!
//! Utilities for testing slices without a real backend.
//!
//! - [`create_mock_api`] returns an [`ApiClient`] and a receiver. Every request the slice
//!   sends arrives on the receiver as an [`ApiCall`]; the test inspects it and answers it,
//!   in any order. This is how out-of-order responses are simulated.
//! - [`InMemoryBackend`] answers requests itself, following the backend's REST conventions
//!   over plain JSON records. Use it when the test cares about end states, not timing.
//! - [`spawn_slice`] starts a slice on a context and hands back its client.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

use super::actor::{SliceActor, SliceContext};
use super::client::SliceClient;
use super::resource::Resource;
use crate::api::{ApiClient, ApiError, ApiRequest, Method};

// =============================================================================
// SCRIPTED API
// =============================================================================

/// A request captured by the mock, waiting for the test to answer it.
#[derive(Debug)]
pub struct ApiCall {
    pub request: ApiRequest,
    pub respond_to: oneshot::Sender<Result<Value, ApiError>>,
}

impl ApiCall {
    /// Answers with the `data` payload of a successful envelope.
    pub fn ok(self, data: Value) {
        let _ = self.respond_to.send(Ok(data));
    }

    pub fn err(self, error: ApiError) {
        let _ = self.respond_to.send(Err(error));
    }
}

/// [`ApiClient`] that forwards every request to the test.
#[derive(Debug, Clone)]
pub struct MockApi {
    sender: mpsc::Sender<ApiCall>,
}

#[async_trait]
impl ApiClient for MockApi {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ApiCall {
                request,
                respond_to,
            })
            .await
            .map_err(|_| ApiError::network("mock api closed"))?;
        response
            .await
            .map_err(|_| ApiError::network("mock api dropped the call"))?
    }
}

/// Creates a mock API and the receiver its requests arrive on.
pub fn create_mock_api(buffer_size: usize) -> (MockApi, mpsc::Receiver<ApiCall>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (MockApi { sender }, receiver)
}

/// Waits for the next request.
pub async fn expect_call(receiver: &mut mpsc::Receiver<ApiCall>) -> Option<ApiCall> {
    receiver.recv().await
}

/// The `data` payload of a list response.
pub fn list_envelope(key: &str, items: Value, total: Option<u64>) -> Value {
    let mut data = Map::new();
    data.insert(key.to_string(), items);
    if let Some(total) = total {
        data.insert("totalItems".to_string(), json!(total));
    }
    Value::Object(data)
}

/// Starts a slice for `T` and returns its client.
pub fn spawn_slice<T: Resource>(ctx: SliceContext) -> SliceClient<T> {
    let (actor, client) = SliceActor::<T>::new(16);
    tokio::spawn(actor.run(ctx));
    client
}

// =============================================================================
// IN-MEMORY BACKEND
// =============================================================================

struct Table {
    list_key: &'static str,
    record_key: Option<&'static str>,
    next_id: u64,
    records: Vec<Map<String, Value>>,
}

impl Table {
    fn wrap(&self, record: &Map<String, Value>) -> Value {
        let record = Value::Object(record.clone());
        match self.record_key {
            Some(key) => json!({ key: record }),
            None => record,
        }
    }

    fn position(&self, id: &str) -> Result<usize, ApiError> {
        self.records
            .iter()
            .position(|record| record.get("id").map(as_text).as_deref() == Some(id))
            .ok_or_else(|| ApiError::server(404, "Not found"))
    }
}

#[derive(Default)]
struct Backend {
    tables: HashMap<&'static str, Table>,
    failures: VecDeque<ApiError>,
    log: Vec<ApiRequest>,
}

/// An [`ApiClient`] that stores records in memory and speaks the backend's conventions:
///
/// | Request | Behavior |
/// |---------|----------|
/// | `GET <base>/shows` | filters by query fields, `prefix[i]` on `path`, 1-based `page`/`limit`, `totalItems` |
/// | `GET <base>/show/:id` | one record |
/// | `POST <base>/create` | assigns the next id; an empty `name` is a validation failure |
/// | `PUT <base>/update/:id` | merges the body into the record |
/// | `PUT <base>/update-status/:id` | sets `status` |
/// | `DELETE <base>/destroy/:id` | removes the record |
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    inner: Arc<Mutex<Backend>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty table for `T`.
    pub fn register<T: Resource>(self) -> Self {
        self.lock().tables.entry(T::BASE_PATH).or_insert(Table {
            list_key: T::LIST_KEY,
            record_key: T::RECORD_KEY,
            next_id: 1,
            records: Vec::new(),
        });
        self
    }

    /// Inserts records for `T`, registering it if needed.
    pub fn seed<T: Resource>(&self, records: impl IntoIterator<Item = T>) {
        let mut backend = self.lock();
        let table = backend.tables.entry(T::BASE_PATH).or_insert(Table {
            list_key: T::LIST_KEY,
            record_key: T::RECORD_KEY,
            next_id: 1,
            records: Vec::new(),
        });
        for record in records {
            if let Ok(Value::Object(map)) = serde_json::to_value(&record) {
                if let Some(id) = map.get("id").and_then(Value::as_u64) {
                    table.next_id = table.next_id.max(id + 1);
                }
                table.records.push(map);
            }
        }
    }

    /// Makes the next request fail with `error`, whatever it is.
    pub fn fail_next(&self, error: ApiError) {
        self.lock().failures.push_back(error);
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().log.clone()
    }

    /// The stored records of `T`, decoded.
    pub fn records<T: Resource>(&self) -> Vec<T> {
        self.lock()
            .tables
            .get(T::BASE_PATH)
            .map(|table| {
                table
                    .records
                    .iter()
                    .filter_map(|r| serde_json::from_value(Value::Object(r.clone())).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Backend> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn handle(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let mut backend = self.lock();
        backend.log.push(request.clone());
        if let Some(error) = backend.failures.pop_front() {
            return Err(error);
        }

        let segments: Vec<&str> = request.path.split('/').collect();
        let (base, action, id) = match segments.as_slice() {
            [base, action] => (*base, *action, None),
            [base, action, id] => (*base, *action, Some(*id)),
            _ => return Err(ApiError::server(404, "Not found")),
        };
        let table = backend
            .tables
            .get_mut(base)
            .ok_or_else(|| ApiError::server(404, "Not found"))?;

        match (request.method, action, id) {
            (Method::Get, "shows", None) => Ok(list(table, &request)),
            (Method::Get, "show", Some(id)) => {
                let index = table.position(id)?;
                Ok(table.wrap(&table.records[index]))
            }
            (Method::Post, "create", None) => {
                let mut record = body_object(&request)?;
                if record.get("name").and_then(Value::as_str) == Some("") {
                    return Err(ApiError::validation([("name", "The name field is required.")]));
                }
                record.insert("id".to_string(), json!(table.next_id));
                table.next_id += 1;
                let response = table.wrap(&record);
                table.records.push(record);
                Ok(response)
            }
            (Method::Put, "update", Some(id)) => {
                let index = table.position(id)?;
                let changes = body_object(&request)?;
                let record = &mut table.records[index];
                for (field, value) in changes {
                    if field != "id" {
                        record.insert(field, value);
                    }
                }
                Ok(table.wrap(&table.records[index]))
            }
            (Method::Put, "update-status", Some(id)) => {
                let index = table.position(id)?;
                let status = body_object(&request)?
                    .remove("status")
                    .unwrap_or(Value::Null);
                table.records[index].insert("status".to_string(), status);
                Ok(table.wrap(&table.records[index]))
            }
            (Method::Delete, "destroy", Some(id)) => {
                let index = table.position(id)?;
                table.records.remove(index);
                Ok(Value::Null)
            }
            _ => Err(ApiError::server(404, "Not found")),
        }
    }
}

#[async_trait]
impl ApiClient for InMemoryBackend {
    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        // Let other tasks run, as a real round trip would.
        tokio::task::yield_now().await;
        self.handle(request)
    }
}

fn body_object(request: &ApiRequest) -> Result<Map<String, Value>, ApiError> {
    match &request.body {
        Some(Value::Object(map)) => Ok(map.clone()),
        _ => Err(ApiError::server(400, "Expected a JSON object body")),
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        other => other.to_string(),
    }
}

fn list(table: &Table, request: &ApiRequest) -> Value {
    let prefixes: Vec<&str> = request
        .query
        .iter()
        .filter(|(key, _)| key.starts_with("prefix["))
        .map(|(_, value)| value.as_str())
        .collect();
    let filters: Vec<&(String, String)> = request
        .query
        .iter()
        .filter(|(key, _)| !matches!(key.as_str(), "page" | "limit" | "sort"))
        .filter(|(key, _)| !key.starts_with("prefix["))
        .collect();

    let mut matching: Vec<&Map<String, Value>> = table
        .records
        .iter()
        .filter(|record| {
            filters
                .iter()
                .all(|(key, value)| record.get(key.as_str()).map(as_text).as_deref() == Some(value))
        })
        .filter(|record| {
            prefixes.is_empty()
                || record
                    .get("path")
                    .and_then(Value::as_str)
                    .is_some_and(|path| prefixes.iter().any(|p| path.starts_with(p)))
        })
        .collect();

    if let Some(sort) = request.query_param("sort") {
        let (field, descending) = match sort.strip_prefix('-') {
            Some(field) => (field, true),
            None => (sort, false),
        };
        matching.sort_by_key(|record| record.get(field).map(as_text).unwrap_or_default());
        if descending {
            matching.reverse();
        }
    }

    let total = matching.len() as u64;
    let limit = request
        .query_param("limit")
        .and_then(|l| l.parse::<usize>().ok());
    let page = request
        .query_param("page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    let items: Vec<Value> = match limit {
        Some(limit) => matching
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .map(|r| Value::Object(r.clone()))
            .collect(),
        None => matching.into_iter().map(|r| Value::Object(r.clone())).collect(),
    };
    list_envelope(table.list_key, Value::Array(items), Some(total))
}
