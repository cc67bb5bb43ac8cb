// SPDX-License-Identifier: MIT

//! The composition root: a `Depot` ties the object store, run archive,
//! status lineage, and queue together into the operations the rest of the
//! workspace (the engine and the CLI) actually call.

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use silo_core::{Event, RunContext, RunId, StatusId};

use crate::error::StoreError;
use crate::object_store::ObjectStore;
use crate::queue::Queue;
use crate::{run_archive, status_lineage};

const QUEUE_SNAPSHOT_FILE: &str = "queue.sqlite.zip";

#[derive(Debug, Clone)]
pub enum EventScope {
    /// Every run reachable from the currently checked-out status.
    CurrentWorkspace,
    /// An explicit set of runs, e.g. the ones just pulled from a remote.
    Runs(Vec<RunId>),
}

#[derive(Debug, Clone)]
pub struct Depot {
    root: PathBuf,
    pub objects: ObjectStore,
}

impl Depot {
    pub fn open(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let objects = ObjectStore::new(root.join("objects"));
        Self { root, objects }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn runs_dir(&self) -> PathBuf {
        self.root.join("runs")
    }

    pub fn statuses_dir(&self) -> PathBuf {
        self.root.join("statuses")
    }

    fn queue_snapshot_path(&self, status: &StatusId) -> PathBuf {
        self.statuses_dir().join(status.as_str()).join(QUEUE_SNAPSHOT_FILE)
    }

    /// Writes a new run from already-collected events. Does not touch the
    /// queue or lineage — call [`Depot::integrate`] to fold it in.
    pub fn commit_run(&self, events: &[Event], context: &RunContext) -> Result<RunId, StoreError> {
        run_archive::write_run(&self.runs_dir(), events, context)
    }

    pub fn current_status(&self) -> Result<StatusId, StoreError> {
        status_lineage::current(&self.root)
    }

    /// Loads the queue snapshot for the currently checked-out status.
    pub fn current_queue(&self) -> Result<Queue, StoreError> {
        let current = self.current_status()?;
        if current.is_root() {
            return Ok(Queue::new());
        }
        Queue::load(&self.queue_snapshot_path(&current))
    }

    /// Folds `runs` into the queue snapshot for `base`, producing a new
    /// status as `base`'s child. Does not touch "current" — callers building
    /// a merge status out of runs pulled from elsewhere use this directly;
    /// [`Depot::integrate`] is the thin wrapper that folds one run onto the
    /// checked-out status and checks the result out.
    pub fn integrate_into(&self, base: &StatusId, runs: &[RunId], now_ms: u64) -> Result<StatusId, StoreError> {
        let mut queue = if base.is_root() {
            Queue::new()
        } else {
            Queue::load(&self.queue_snapshot_path(base))?
        };
        for run_id in runs {
            let events = run_archive::read_events(&self.runs_dir(), run_id)?;
            queue.integrate_events(&events, now_ms)?;
        }

        let new_status = status_lineage::write_status(&self.statuses_dir(), base, runs, now_ms)?;
        queue.save(&self.queue_snapshot_path(&new_status))?;
        Ok(new_status)
    }

    /// Folds a run's events into the queue, producing a new status that
    /// becomes the current one. This is the only place the queue table is
    /// mutated, matching the "only the orchestrator writes" concurrency
    /// model.
    pub fn integrate(&self, run_id: RunId, now_ms: u64) -> Result<StatusId, StoreError> {
        let current = self.current_status()?;
        let new_status = self.integrate_into(&current, std::slice::from_ref(&run_id), now_ms)?;
        status_lineage::set_current(&self.root, &new_status)?;
        Ok(new_status)
    }

    /// The leaf status with the largest full run tree — the most complete
    /// view of the depot's history.
    pub fn complete_status(&self) -> Result<StatusId, StoreError> {
        Ok(status_lineage::select_leaf(&self.statuses_dir())?.unwrap_or_else(StatusId::root))
    }

    /// Checks out the complete status in one call.
    pub fn checkout_complete(&self) -> Result<StatusId, StoreError> {
        let id = self.complete_status()?;
        status_lineage::set_current(&self.root, &id)?;
        Ok(id)
    }

    pub fn checkout(&self, status: &StatusId) -> Result<(), StoreError> {
        status_lineage::set_current(&self.root, status)
    }

    pub fn full_run_tree(&self, status: &StatusId) -> Result<HashSet<RunId>, StoreError> {
        status_lineage::full_run_tree(&self.statuses_dir(), status)
    }

    fn runs_in_scope(&self, scope: &EventScope) -> Result<Vec<RunId>, StoreError> {
        match scope {
            EventScope::CurrentWorkspace => {
                let current = self.current_status()?;
                Ok(self.full_run_tree(&current)?.into_iter().collect())
            }
            EventScope::Runs(ids) => Ok(ids.clone()),
        }
    }

    /// Reads every event a `handler` produced within `scope`, optionally
    /// filtering down to successful outcomes and/or the single latest
    /// event per url. This is the read surface external consumers (a
    /// dashboard, downstream ingestion) are expected to call instead of
    /// reaching into the run archive directly.
    pub fn handler_events(
        &self,
        handler: &str,
        successful_only: bool,
        latest_only: bool,
        scope: EventScope,
    ) -> Result<Vec<Event>, StoreError> {
        let run_ids = self.runs_in_scope(&scope)?;
        let mut collected = Vec::new();
        for run_id in run_ids {
            for event in run_archive::read_events(&self.runs_dir(), &run_id)? {
                if event.handler() != handler {
                    continue;
                }
                if successful_only {
                    match &event {
                        Event::Collection(c) if c.is_success() => {}
                        _ => continue,
                    }
                }
                collected.push(event);
            }
        }

        if !latest_only {
            return Ok(collected);
        }

        let mut latest: HashMap<String, Event> = HashMap::new();
        for event in collected {
            let ts = timestamp_of(&event);
            latest
                .entry(event.url().to_string())
                .and_modify(|existing| {
                    if ts > timestamp_of(existing) {
                        *existing = event.clone();
                    }
                })
                .or_insert(event);
        }
        Ok(latest.into_values().collect())
    }
}

fn timestamp_of(event: &Event) -> u64 {
    match event {
        Event::Collection(c) => c.timestamp_ms,
        Event::Registration(_) => 0,
    }
}

#[cfg(test)]
#[path = "depot_tests.rs"]
mod tests;
