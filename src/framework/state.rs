//! Slice state and its transitions.
//!
//! Status moves `Idle -> Loading -> (Succeeded | Failed) -> Loading -> ...`. Overlapping
//! requests are counted: the slice stays `Loading` until the last one settles, and then
//! shows the outcome of the most recent settlement. `error` is only set while `Failed`
//! and is hidden whenever a request begins. The last failure stays paired with its
//! outcome, so a slice that falls back to `Failed` always carries an error.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::query::ListQuery;
use super::resource::{ListMode, ListPage, Resource};
use crate::api::ApiError;

/// Request status of a slice.
///
/// `Loading` normally settles into `Succeeded` or `Failed`. An abandon that leaves nothing
/// in flight instead falls back to the last settled outcome, which is `Idle` when no
/// request ever settled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// Observable state of one resource slice.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SliceState<T> {
    pub name: &'static str,
    pub status: SliceStatus,
    pub items: Vec<T>,
    /// Record loaded by the last detail fetch.
    pub selected: Option<T>,
    /// Secondary lists keyed by caller-chosen keys (e.g. a customer's invoice history).
    pub lookups: BTreeMap<String, Vec<T>>,
    pub error: Option<ApiError>,
    /// Query of the last applied list, replayed after writes.
    pub last_query: Option<ListQuery>,
    pub total: Option<u64>,
    pub has_more: bool,
    #[serde(skip)]
    pending: usize,
    #[serde(skip)]
    outcome: SliceStatus,
    #[serde(skip)]
    deferred_error: Option<ApiError>,
}

impl<T> SliceState<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            status: SliceStatus::Idle,
            items: Vec::new(),
            selected: None,
            lookups: BTreeMap::new(),
            error: None,
            last_query: None,
            total: None,
            has_more: false,
            pending: 0,
            outcome: SliceStatus::Idle,
            deferred_error: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == SliceStatus::Loading
    }

    /// Requests currently in flight.
    pub fn pending(&self) -> usize {
        self.pending
    }

    pub(crate) fn begin(&mut self) {
        self.pending += 1;
        self.status = SliceStatus::Loading;
        self.error = None;
    }

    pub(crate) fn succeed(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.outcome = SliceStatus::Succeeded;
        self.deferred_error = None;
        self.settle();
    }

    pub(crate) fn fail(&mut self, error: ApiError) {
        self.pending = self.pending.saturating_sub(1);
        self.outcome = SliceStatus::Failed;
        self.deferred_error = Some(error);
        self.settle();
    }

    /// A request finished without affecting state (stale response).
    pub(crate) fn discard(&mut self) {
        self.pending = self.pending.saturating_sub(1);
        self.settle();
    }

    /// `count` requests were dropped before completing.
    ///
    /// When nothing else is pending the status falls back to the last settled outcome,
    /// which is `Idle` if no request ever settled.
    pub(crate) fn abandon(&mut self, count: usize) {
        self.pending = self.pending.saturating_sub(count);
        self.settle();
    }

    fn settle(&mut self) {
        if self.pending > 0 {
            self.status = SliceStatus::Loading;
            return;
        }
        self.status = self.outcome;
        self.error = match self.outcome {
            SliceStatus::Failed => self.deferred_error.clone(),
            _ => None,
        };
    }

    pub(crate) fn apply_list(&mut self, page: ListPage<T>, query: ListQuery, mode: ListMode) {
        let count = page.items.len() as u64;
        if query.appends(mode) {
            self.items.extend(page.items);
        } else {
            self.items = page.items;
        }
        self.total = page.total;
        let limit = query.limit.map(u64::from);
        self.has_more = match (mode, limit, page.total) {
            (ListMode::Append, Some(limit), _) => count >= limit,
            (ListMode::Replace, Some(limit), Some(total)) => {
                let page = query.page.map(u64::from).unwrap_or(0);
                (page + 1) * limit < total
            }
            (ListMode::Replace, Some(limit), None) => count >= limit,
            (ListMode::Replace, None, Some(total)) => (self.items.len() as u64) < total,
            _ => false,
        };
        self.last_query = Some(query);
    }
}

impl<T: Resource> SliceState<T> {
    pub fn find(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn position(&self, id: &T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Adds a record the server just created. A list that landed meanwhile may
    /// already hold it, in which case it is replaced in place.
    pub(crate) fn insert_created(&mut self, item: T) {
        match self.position(item.id()) {
            Some(index) => self.items[index] = item,
            None => {
                self.items.push(item);
                self.total = self.total.map(|t| t + 1);
            }
        }
    }

    /// Patches the item with `id`, returning its previous value.
    pub(crate) fn patch(&mut self, id: &T::Id, f: impl FnOnce(&mut T)) -> Option<T> {
        let index = self.position(id)?;
        let previous = self.items[index].clone();
        f(&mut self.items[index]);
        Some(previous)
    }

    /// Replaces the item with the same id, if present.
    pub(crate) fn replace(&mut self, item: T) {
        if let Some(index) = self.position(item.id()) {
            self.items[index] = item;
        }
    }

    pub(crate) fn remove(&mut self, id: &T::Id) -> Option<(usize, T)> {
        let index = self.position(id)?;
        self.total = self.total.map(|t| t.saturating_sub(1));
        Some((index, self.items.remove(index)))
    }

    /// Puts back a record whose delete failed, unless a newer list already did.
    pub(crate) fn reinsert(&mut self, index: usize, item: T) {
        if let Some(current) = self.position(item.id()) {
            self.items[current] = item;
            return;
        }
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        self.total = self.total.map(|t| t + 1);
    }
}
