// SPDX-License-Identifier: MIT

//! Statuses form a DAG: every status (except the root) names a parent
//! status and the set of runs newly integrated since that parent. A
//! status's *full run tree* is the transitive union of integrated runs
//! along its parent chain — the complete queue state that status
//! represents. `StatusCache` is a small in-memory/on-disk index so
//! recomputing full run trees doesn't require re-walking the whole chain
//! from scratch after every pull.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use silo_core::{RunId, StatusContext, StatusId};

use crate::error::StoreError;

const CONTEXT_FILE: &str = "context.json";
const CURRENT_FILE: &str = "current";
const CACHE_FILE: &str = "status-cache";

pub fn compute_status_id(parent: &StatusId, runs: &[RunId]) -> StatusId {
    let mut sorted = runs.to_vec();
    sorted.sort();
    let mut hasher = Sha256::new();
    hasher.update(parent.as_str().as_bytes());
    for run in &sorted {
        hasher.update(run.as_str().as_bytes());
    }
    let digest = format!("{:x}", hasher.finalize());
    StatusId::from_raw(&digest[..16])
}

fn status_dir(statuses_root: &Path, id: &StatusId) -> PathBuf {
    statuses_root.join(id.as_str())
}

/// Writes a new status node (or returns the existing one if this exact
/// `(parent, runs)` pair was already recorded — status ids are a pure hash
/// of that pair, so recomputation is idempotent).
pub fn write_status(
    statuses_root: &Path,
    parent: &StatusId,
    newly_integrated_runs: &[RunId],
    created_at_ms: u64,
) -> Result<StatusId, StoreError> {
    let id = compute_status_id(parent, newly_integrated_runs);
    let dir = status_dir(statuses_root, &id);
    let context_path = dir.join(CONTEXT_FILE);
    if context_path.exists() {
        return Ok(id);
    }
    fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
    let context = StatusContext {
        parent: (!parent.is_root()).then(|| parent.clone()),
        integrated_runs: newly_integrated_runs.to_vec(),
        created_at_ms,
    };
    fs::write(&context_path, serde_json::to_vec_pretty(&context)?)
        .map_err(|e| StoreError::io(&context_path, e))?;
    Ok(id)
}

pub fn read_status_context(statuses_root: &Path, id: &StatusId) -> Result<StatusContext, StoreError> {
    if id.is_root() {
        return Ok(StatusContext::root());
    }
    let path = status_dir(statuses_root, id).join(CONTEXT_FILE);
    let bytes = fs::read(&path).map_err(|_| StoreError::UnknownStatus(id.to_string()))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn list_status_ids(statuses_root: &Path) -> Result<Vec<StatusId>, StoreError> {
    if !statuses_root.exists() {
        return Ok(Vec::new());
    }
    let mut out = Vec::new();
    for entry in fs::read_dir(statuses_root).map_err(|e| StoreError::io(statuses_root, e))? {
        let entry = entry.map_err(|e| StoreError::io(statuses_root, e))?;
        if entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            if let Some(name) = entry.file_name().to_str() {
                out.push(StatusId::from_raw(name));
            }
        }
    }
    Ok(out)
}

/// The transitive union of every run integrated along `id`'s parent chain.
pub fn full_run_tree(statuses_root: &Path, id: &StatusId) -> Result<HashSet<RunId>, StoreError> {
    let mut runs = HashSet::new();
    let mut cursor = id.clone();
    loop {
        let context = read_status_context(statuses_root, &cursor)?;
        runs.extend(context.integrated_runs.iter().cloned());
        match context.parent {
            Some(parent) => cursor = parent,
            None => break,
        }
    }
    Ok(runs)
}

/// Statuses with no child referencing them as parent. Among leaves, the
/// one with the largest full run tree wins; ties break on the lexically
/// smallest status id, so leaf selection is fully deterministic.
pub fn select_leaf(statuses_root: &Path) -> Result<Option<StatusId>, StoreError> {
    let all = list_status_ids(statuses_root)?;
    if all.is_empty() {
        return Ok(None);
    }
    let mut parents = HashSet::new();
    let mut contexts = HashMap::new();
    for id in &all {
        let context = read_status_context(statuses_root, id)?;
        if let Some(parent) = &context.parent {
            parents.insert(parent.clone());
        }
        contexts.insert(id.clone(), context);
    }
    let leaves: Vec<&StatusId> = all.iter().filter(|id| !parents.contains(*id)).collect();

    let mut best: Option<(usize, &StatusId)> = None;
    for leaf in leaves {
        let tree_size = full_run_tree(statuses_root, leaf)?.len();
        best = Some(match best {
            None => (tree_size, leaf),
            Some((best_size, best_id)) => {
                if tree_size > best_size || (tree_size == best_size && leaf.as_str() < best_id.as_str())
                {
                    (tree_size, leaf)
                } else {
                    (best_size, best_id)
                }
            }
        });
    }
    Ok(best.map(|(_, id)| id.clone()))
}

pub fn set_current(workspace_root: &Path, id: &StatusId) -> Result<(), StoreError> {
    let path = workspace_root.join(CURRENT_FILE);
    fs::write(&path, id.as_str()).map_err(|e| StoreError::io(&path, e))
}

pub fn current(workspace_root: &Path) -> Result<StatusId, StoreError> {
    let path = workspace_root.join(CURRENT_FILE);
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(StatusId::from_raw(contents.trim())),
        Err(_) => Ok(StatusId::root()),
    }
}

/// Union of every known status and its parent-chain pointer, kept so a
/// pull can merge a remote's lineage into the local one without re-reading
/// every status context from disk again.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusCache {
    pub statuses: HashSet<StatusId>,
    pub parent_keys: HashMap<StatusId, StatusId>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: StatusId, context: &StatusContext) {
        self.statuses.insert(id.clone());
        if let Some(parent) = &context.parent {
            self.parent_keys.insert(id, parent.clone());
        }
    }

    pub fn merge(&mut self, other: &StatusCache) {
        self.statuses.extend(other.statuses.iter().cloned());
        for (id, parent) in &other.parent_keys {
            self.parent_keys.insert(id.clone(), parent.clone());
        }
    }
}

/// Loads the workspace's cache index, defaulting to an empty cache when
/// absent — the index is an optimization and must degrade to on-disk scan
/// without changing semantics, never a hard failure.
pub fn load_cache(workspace_root: &Path) -> Result<StatusCache, StoreError> {
    let path = workspace_root.join(CACHE_FILE);
    match fs::read(&path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(_) => Ok(StatusCache::new()),
    }
}

pub fn save_cache(workspace_root: &Path, cache: &StatusCache) -> Result<(), StoreError> {
    let path = workspace_root.join(CACHE_FILE);
    fs::write(&path, serde_json::to_vec_pretty(cache)?).map_err(|e| StoreError::io(&path, e))
}

#[cfg(test)]
#[path = "status_lineage_tests.rs"]
mod tests;
