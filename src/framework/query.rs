use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::resource::ListMode;

/// Parameters of a list read. Stored as `last_query` and replayed after writes.
///
/// `page` follows the client convention of the resource's [`ListMode`]: 0-based for
/// replaced (paginated) lists, sent as-is for appended (infinite scroll) lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub filters: BTreeMap<String, String>,
    pub prefix: Vec<String>,
    pub sort: Option<String>,
    /// Append mode only: `false` appends the page to the current items.
    pub reset: bool,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: None,
            limit: None,
            filters: BTreeMap::new(),
            prefix: Vec::new(),
            sort: None,
            reset: true,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    pub fn filter(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.filters.insert(key.into(), value.to_string());
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix.push(prefix.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Marks the page as a continuation of the current items.
    pub fn appending(mut self) -> Self {
        self.reset = false;
        self
    }

    pub fn appends(&self, mode: ListMode) -> bool {
        mode == ListMode::Append && !self.reset
    }

    /// Query string pairs in the backend's conventions.
    pub fn to_pairs(&self, mode: ListMode) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(page) = self.page {
            let page = match mode {
                ListMode::Replace => page + 1,
                ListMode::Append => page,
            };
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        for (key, value) in &self.filters {
            pairs.push((key.clone(), value.clone()));
        }
        for (i, prefix) in self.prefix.iter().enumerate() {
            pairs.push((format!("prefix[{i}]"), prefix.clone()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort".to_string(), sort.clone()));
        }
        pairs
    }

    /// The query replayed after a write. Appended lists restart from their first page.
    pub fn for_refetch(&self, mode: ListMode) -> Self {
        match mode {
            ListMode::Replace => self.clone(),
            ListMode::Append => Self {
                page: self.page.map(|_| 1),
                reset: true,
                ..self.clone()
            },
        }
    }
}
