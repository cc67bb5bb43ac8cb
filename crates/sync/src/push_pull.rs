// SPDX-License-Identifier: MIT

//! Diff-based push/pull between two depots, grounded on the original
//! depot's `RemoteMixin`: push never overwrites (objects are
//! content-addressed and therefore collision-free; statuses are
//! content-hashed so a name collision can only mean identical content),
//! and pull comes in three modes trading completeness for transfer size.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use silo_core::{Event, RunId, StatusId};
use silo_store::{status_lineage, Depot, StatusCache};

use crate::error::SyncError;
use crate::transport::RemoteTransport;

#[derive(Debug, Clone)]
pub enum PullMode {
    /// Pull only the statuses and runs not reachable from the local
    /// leaf's full run tree. Never pulls objects.
    Default,
    /// Pull every remote status, run, and object.
    Complete,
    /// Pull exactly the runs (and their referenced objects) needed to
    /// reach `target`, beyond what `target`'s own full run tree already
    /// covers.
    PostStatus(StatusId),
}

/// Pushes every local run, status, and object the remote doesn't already
/// have, then merges and re-pushes the status-cache index. Idempotent:
/// re-running against an up-to-date remote is a no-op past the initial
/// `find .` listing.
pub async fn push(depot: &Depot, transport: &dyn RemoteTransport) -> Result<(), SyncError> {
    let present = remote_present_paths(transport).await?;
    for base in [
        depot.runs_dir(),
        depot.statuses_dir(),
        depot.objects.root().to_path_buf(),
    ] {
        push_tree(depot.root(), &base, transport, &present).await?;
    }

    merge_remote_cache(depot, transport).await?;
    let cache_path = depot.root().join("status-cache");
    if cache_path.exists() {
        transport.put(&cache_path, "status-cache").await?;
    }
    Ok(())
}

/// Pulls from `transport` according to `mode`, returning the set of run
/// ids newly present locally afterward.
pub async fn pull(
    depot: &Depot,
    transport: &dyn RemoteTransport,
    mode: PullMode,
) -> Result<HashSet<RunId>, SyncError> {
    merge_remote_cache(depot, transport).await?;
    let local_cache = status_lineage::load_cache(depot.root())?;

    let remote_statuses = list_remote(transport, "statuses").await?;
    let statuses_to_pull: Vec<&str> = match &mode {
        PullMode::Complete => remote_statuses.iter().map(String::as_str).collect(),
        _ => remote_statuses
            .iter()
            .filter(|s| !local_cache.statuses.contains(&StatusId::from_raw(s.as_str())))
            .map(String::as_str)
            .collect(),
    };
    for status in &statuses_to_pull {
        pull_file(
            transport,
            &format!("statuses/{status}/context.json"),
            &depot.statuses_dir().join(status).join("context.json"),
        )
        .await?;
    }

    let local_leaf = depot.complete_status()?;
    let status_dbs_to_pull: Vec<String> = match &mode {
        PullMode::Complete => remote_statuses.clone(),
        PullMode::PostStatus(target) => vec![target.as_str().to_string()],
        PullMode::Default => {
            let leaf_str = local_leaf.as_str().to_string();
            if remote_statuses.contains(&leaf_str) {
                vec![leaf_str]
            } else {
                Vec::new()
            }
        }
    };
    for status in &status_dbs_to_pull {
        let _ = pull_file(
            transport,
            &format!("statuses/{status}/queue.sqlite.zip"),
            &depot.statuses_dir().join(status).join("queue.sqlite.zip"),
        )
        .await;
    }

    let remote_runs = list_remote(transport, "runs").await?;
    let runs_to_pull: HashSet<String> = match &mode {
        PullMode::Complete => remote_runs.iter().cloned().collect(),
        PullMode::PostStatus(target) => {
            let target_tree = depot.full_run_tree(target)?;
            remote_runs
                .iter()
                .filter(|r| target_tree.contains(&RunId::from_raw(r.as_str())))
                .cloned()
                .collect()
        }
        PullMode::Default => {
            let local_tree = depot.full_run_tree(&local_leaf)?;
            remote_runs
                .iter()
                .filter(|r| !local_tree.contains(&RunId::from_raw(r.as_str())))
                .cloned()
                .collect()
        }
    };
    for run in &runs_to_pull {
        pull_file(
            transport,
            &format!("runs/{run}/events.zip"),
            &depot.runs_dir().join(run).join("events.zip"),
        )
        .await?;
        pull_file(
            transport,
            &format!("runs/{run}/context.json"),
            &depot.runs_dir().join(run).join("context.json"),
        )
        .await?;
    }
    let pulled_run_ids: HashSet<RunId> =
        runs_to_pull.iter().map(|s| RunId::from_raw(s.as_str())).collect();

    match &mode {
        PullMode::Default => {}
        PullMode::Complete => pull_all_objects(depot, transport).await?,
        PullMode::PostStatus(_) => {
            let mut digests = HashSet::new();
            for run_id in &pulled_run_ids {
                for event in silo_store::run_archive::read_events(&depot.runs_dir(), run_id)? {
                    if let Event::Collection(c) = event {
                        if let Some(digest) = c.content_digest {
                            digests.insert(digest);
                        }
                    }
                }
            }
            pull_selected_objects(depot, transport, &digests).await?;
        }
    }

    Ok(pulled_run_ids)
}

async fn merge_remote_cache(depot: &Depot, transport: &dyn RemoteTransport) -> Result<(), SyncError> {
    let mut local = status_lineage::load_cache(depot.root())?;
    let tmp = depot.root().join(".status-cache.remote.tmp");
    if transport.get("status-cache", &tmp).await.is_ok() {
        let bytes = std::fs::read(&tmp).map_err(|e| SyncError::io(&tmp, e))?;
        let remote: StatusCache = serde_json::from_slice(&bytes)?;
        local.merge(&remote);
        let _ = std::fs::remove_file(&tmp);
    }
    status_lineage::save_cache(depot.root(), &local)?;
    Ok(())
}

async fn remote_present_paths(transport: &dyn RemoteTransport) -> Result<HashSet<String>, SyncError> {
    let listing = transport.run("find .").await?;
    Ok(listing
        .lines()
        .filter_map(|line| line.strip_prefix("./"))
        .map(String::from)
        .collect())
}

async fn list_remote(transport: &dyn RemoteTransport, dir: &str) -> Result<Vec<String>, SyncError> {
    match transport.run(&format!("ls {dir}")).await {
        Ok(listing) => Ok(listing
            .lines()
            .map(str::to_string)
            .filter(|name| !name.is_empty())
            .collect()),
        Err(_) => Ok(Vec::new()),
    }
}

async fn push_tree(
    root: &Path,
    base: &Path,
    transport: &dyn RemoteTransport,
    present: &HashSet<String>,
) -> Result<(), SyncError> {
    if !base.exists() {
        return Ok(());
    }
    for entry in std::fs::read_dir(base).map_err(|e| SyncError::io(base, e))? {
        let entry = entry.map_err(|e| SyncError::io(base, e))?;
        let subdir = entry.path();
        if !subdir.is_dir() {
            continue;
        }
        let rel_subdir = relative(root, &subdir);
        if !present.contains(&rel_subdir) {
            transport.run(&format!("mkdir -p {rel_subdir}")).await?;
        }
        for file_entry in std::fs::read_dir(&subdir).map_err(|e| SyncError::io(&subdir, e))? {
            let file_entry = file_entry.map_err(|e| SyncError::io(&subdir, e))?;
            let file_path = file_entry.path();
            if !file_path.is_file() {
                continue;
            }
            let rel_file = relative(root, &file_path);
            if present.contains(&rel_file) {
                continue;
            }
            transport.put(&file_path, &rel_file).await?;
        }
    }
    Ok(())
}

async fn pull_file(
    transport: &dyn RemoteTransport,
    remote_relative: &str,
    local: &Path,
) -> Result<(), SyncError> {
    if local.exists() {
        return Ok(());
    }
    if let Some(parent) = local.parent() {
        std::fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
    }
    transport.get(remote_relative, local).await
}

async fn pull_all_objects(depot: &Depot, transport: &dyn RemoteTransport) -> Result<(), SyncError> {
    let prefixes = list_remote(transport, "objects").await?;
    for prefix in prefixes {
        let files = list_remote(transport, &format!("objects/{prefix}")).await?;
        for file in files {
            let remote_relative = format!("objects/{prefix}/{file}");
            let local_path = depot.objects.root().join(&prefix).join(&file);
            pull_file(transport, &remote_relative, &local_path).await?;
        }
    }
    Ok(())
}

/// Materializes the needed blob names from the newly pulled runs' Collection
/// events and fetches only those, instead of the whole content store. A
/// missing remote object is not a hard error: reads degrade to `NotFound`
/// lazily, per the depot's documented open-question resolution.
async fn pull_selected_objects(
    depot: &Depot,
    transport: &dyn RemoteTransport,
    digests: &HashSet<String>,
) -> Result<(), SyncError> {
    for digest in digests {
        let prefix = &digest[..digest.len().min(2)];
        let file_name = format!("{digest}.bin");
        let remote_relative = format!("objects/{prefix}/{file_name}");
        let local_path: PathBuf = depot.objects.root().join(prefix).join(&file_name);
        let _ = pull_file(transport, &remote_relative, &local_path).await;
    }
    Ok(())
}

fn relative(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

#[cfg(test)]
#[path = "push_pull_tests.rs"]
mod tests;
