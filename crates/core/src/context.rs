// SPDX-License-Identifier: MIT

//! Content-addressed identifiers for runs and statuses, and the metadata
//! blobs (`context.yaml` on disk) that accompany each.
//!
//! Unlike the random ids in [`crate::id`], these are derived from a hash of
//! the object's contents — the hash is computed in `silo-store`, where the
//! event/run data actually lives; this module only defines the id shape and
//! the context payloads that travel alongside it.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Deterministic id of a run, derived from `start_timestamp-hash(context +
/// sorted(event names))`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(SmolStr);

impl RunId {
    pub fn from_raw(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Deterministic id of a status node, derived from `hash(parent ::
/// sorted(integrated run ids))`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatusId(SmolStr);

impl StatusId {
    pub fn from_raw(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id of the root status: the empty lineage with no parent and no
    /// integrated runs.
    pub fn root() -> Self {
        Self(SmolStr::new("root"))
    }

    pub fn is_root(&self) -> bool {
        self.0 == "root"
    }
}

impl std::fmt::Display for StatusId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// `context.yaml` for a run: the environment it was collected under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunContext {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub commit_hash: Option<String>,
    pub start_timestamp_ms: u64,
    /// Equivalent of a `pip freeze` snapshot: the dependency set active
    /// when this run was collected, for reproducibility auditing.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dependency_freeze: Option<String>,
}

/// `context.yaml` for a status: its place in the lineage DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusContext {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub parent: Option<StatusId>,
    pub integrated_runs: Vec<RunId>,
    pub created_at_ms: u64,
}

impl StatusContext {
    pub fn root() -> Self {
        Self {
            parent: None,
            integrated_runs: Vec::new(),
            created_at_ms: 0,
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
