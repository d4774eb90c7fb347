//! # Cross-resource Dependencies
//!
//! Some lists go stale when a *different* resource changes: editing a discount changes the
//! product-discount listing, deleting a brand changes the product listing. Those couplings
//! are declared as edges of a [`DependencyGraph`]:
//!
//! ```text
//! (trigger resource, trigger kinds) --> dependent slice, params = mapper(event)
//! ```
//!
//! When a write on the trigger succeeds and the trigger's own list has settled, each
//! matching dependent is refreshed in declaration order, and only then does the write
//! resolve for its caller. Cycles are rejected by [`DependencyGraph::validate`]; a
//! two-way coupling must be broken by refreshing one side explicitly.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::error::SliceError;
use super::query::ListQuery;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    Create,
    Update,
    UpdateStatus,
    Delete,
}

impl MutationKind {
    pub const ALL: &'static [MutationKind] = &[
        MutationKind::Create,
        MutationKind::Update,
        MutationKind::UpdateStatus,
        MutationKind::Delete,
    ];

    pub fn past_tense(self) -> &'static str {
        match self {
            MutationKind::Create => "created",
            MutationKind::Update => "updated",
            MutationKind::UpdateStatus => "status updated",
            MutationKind::Delete => "deleted",
        }
    }
}

/// A successful write, as seen by dependency mappers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MutationEvent {
    pub resource: &'static str,
    pub kind: MutationKind,
    /// Target id for update, status and delete.
    pub id: Option<String>,
    /// Serialized payload of the write (`null` for deletes).
    pub payload: Value,
}

/// Which list a dependent should reload.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshParams {
    /// Replay the dependent's own last query.
    LastQuery,
    Query(ListQuery),
}

/// Something that can reload its list on behalf of another resource.
#[async_trait]
pub trait Refresh: Send + Sync {
    fn resource(&self) -> &'static str;
    async fn refresh(&self, params: RefreshParams) -> Result<(), SliceError>;
}

pub type ParamMapper = Arc<dyn Fn(&MutationEvent) -> RefreshParams + Send + Sync>;

#[derive(Clone)]
pub struct DependencyEdge {
    pub trigger: &'static str,
    pub kinds: Vec<MutationKind>,
    pub dependent: Arc<dyn Refresh>,
    pub mapper: ParamMapper,
}

impl fmt::Debug for DependencyEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DependencyEdge")
            .field("trigger", &self.trigger)
            .field("kinds", &self.kinds)
            .field("dependent", &self.dependent.resource())
            .finish()
    }
}

impl DependencyEdge {
    pub fn matches(&self, event: &MutationEvent) -> bool {
        self.trigger == event.resource && self.kinds.contains(&event.kind)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum OrchestratorError {
    #[error("Dependency cycle: {}", .path.join(" -> "))]
    Cycle { path: Vec<&'static str> },
}

/// Declared refresh edges between slices.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    edges: Vec<DependencyEdge>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that `kinds` of writes on `trigger` refresh `dependent` with `mapper(event)`.
    pub fn on<F>(
        mut self,
        trigger: &'static str,
        kinds: &[MutationKind],
        dependent: Arc<dyn Refresh>,
        mapper: F,
    ) -> Self
    where
        F: Fn(&MutationEvent) -> RefreshParams + Send + Sync + 'static,
    {
        self.edges.push(DependencyEdge {
            trigger,
            kinds: kinds.to_vec(),
            dependent,
            mapper: Arc::new(mapper),
        });
        self
    }

    pub fn edges(&self) -> &[DependencyEdge] {
        &self.edges
    }

    pub fn edges_for(&self, trigger: &str) -> Arc<[DependencyEdge]> {
        self.edges
            .iter()
            .filter(|edge| edge.trigger == trigger)
            .cloned()
            .collect()
    }

    /// Rejects graphs where a write could, through refreshes, trigger itself.
    pub fn validate(&self) -> Result<(), OrchestratorError> {
        let mut adjacency: BTreeMap<&'static str, BTreeSet<&'static str>> = BTreeMap::new();
        for edge in &self.edges {
            adjacency
                .entry(edge.trigger)
                .or_default()
                .insert(edge.dependent.resource());
        }

        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            node: &'static str,
            adjacency: &BTreeMap<&'static str, BTreeSet<&'static str>>,
            marks: &mut BTreeMap<&'static str, Mark>,
            path: &mut Vec<&'static str>,
        ) -> Result<(), OrchestratorError> {
            match marks.get(&node) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|n| *n == node).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(node);
                    return Err(OrchestratorError::Cycle { path: cycle });
                }
                None => {}
            }
            marks.insert(node, Mark::Visiting);
            path.push(node);
            if let Some(next) = adjacency.get(node) {
                for dependent in next {
                    visit(*dependent, adjacency, marks, path)?;
                }
            }
            path.pop();
            marks.insert(node, Mark::Done);
            Ok(())
        }

        let mut marks = BTreeMap::new();
        for node in adjacency.keys() {
            visit(*node, &adjacency, &mut marks, &mut Vec::new())?;
        }
        Ok(())
    }
}

/// Refreshes every dependent matching `event`, one after another.
///
/// Dependent failures are logged and do not fail the triggering write.
pub(crate) async fn refresh_dependents(edges: &[DependencyEdge], event: &MutationEvent) {
    for edge in edges.iter().filter(|edge| edge.matches(event)) {
        let dependent = edge.dependent.resource();
        let params = (edge.mapper)(event);
        debug!(resource = event.resource, dependent, ?params, "Refreshing dependent");
        if let Err(e) = edge.dependent.refresh(params).await {
            warn!(resource = event.resource, dependent, error = %e, "Dependent refresh failed");
        }
    }
}
