// SPDX-License-Identifier: MIT

//! Capability-matched task dispatch: each task carries the capability
//! bundle it needs, tasks needing the same bundle queue FIFO, and bundles
//! are otherwise served in no particular order. A task that keeps failing
//! past `ALLOWED_FAILS` attempts is dropped as a poison pill rather than
//! retried forever.
//!
//! Grounded on `Scheduler`/`ActorSet`/`TaskQueue` from the original
//! scheduler: `_reorganize_actors` becomes [`Scheduler::available_capacity`],
//! the uniform `[0.1, 0.6)` retry sleep becomes [`retry_backoff`].

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use rand::Rng;
use silo_core::{CapabilitySet, ResourceLimitSet, TaskId};

/// How many times a task may fail before it is abandoned instead of
/// retried, matching the original scheduler's `ALLOWED_CONSUMER_FAILS`.
pub const ALLOWED_FAILS: u32 = 5;

#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub handler: String,
    pub url: String,
    pub capabilities: CapabilitySet,
}

/// Returns a jittered back-off duration in `[100ms, 600ms)`, scaled up
/// linearly with the number of prior failures so a persistently broken
/// handler backs off further each time.
pub fn retry_backoff(fail_count: u32) -> Duration {
    let base_ms = rand::thread_rng().gen_range(100..600);
    Duration::from_millis(base_ms * u64::from(fail_count.max(1)))
}

#[derive(Debug, Default)]
pub struct TaskQueue {
    bundles: HashMap<CapabilitySet, VecDeque<Task>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, task: Task) {
        self.bundles
            .entry(task.capabilities.clone())
            .or_default()
            .push_back(task);
    }

    /// Pops the first task (FIFO within its bundle) whose capability
    /// requirement is dominated by `available`. Bundles themselves are
    /// visited in no particular order.
    pub fn pop_matching(&mut self, available: &CapabilitySet) -> Option<Task> {
        let key = self
            .bundles
            .iter()
            .find(|(bundle, queue)| !queue.is_empty() && available.dominates(bundle))
            .map(|(bundle, _)| bundle.clone())?;
        self.bundles.get_mut(&key).and_then(|queue| queue.pop_front())
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.values().all(VecDeque::is_empty)
    }

    pub fn len(&self) -> usize {
        self.bundles.values().map(VecDeque::len).sum()
    }
}

/// Tracks per-worker capability capacity and the subset currently reserved
/// by in-flight tasks, enforcing the pool-wide ceilings in
/// [`ResourceLimitSet`] on top of raw per-worker capacity.
#[derive(Debug)]
pub struct CapacityTracker {
    total: CapabilitySet,
    reserved: CapabilitySet,
    limits: ResourceLimitSet,
    in_use: HashMap<String, u32>,
}

impl CapacityTracker {
    pub fn new(total: CapabilitySet, limits: ResourceLimitSet) -> Self {
        Self {
            total,
            reserved: CapabilitySet::new(),
            limits,
            in_use: HashMap::new(),
        }
    }

    /// The raw per-worker capacity this tracker was built with, ignoring
    /// both reservations and resource limits — the ceiling a capability
    /// bundle is checked against to tell "busy right now" apart from
    /// "can never be served".
    pub fn total(&self) -> &CapabilitySet {
        &self.total
    }

    /// Capacity still free: raw capacity minus what's reserved, further
    /// capped by any configured resource limit for each capability.
    pub fn available(&self) -> CapabilitySet {
        let mut available = CapabilitySet::new();
        for (capability, total_count) in self.total.iter() {
            let reserved = self.reserved.count(capability);
            let mut free = total_count.saturating_sub(reserved);
            if let Some(limit) = self.limits.limit(capability) {
                let used = *self.in_use.get(capability.as_str()).unwrap_or(&0);
                free = free.min(limit.saturating_sub(used));
            }
            available = available.with(capability.clone(), free);
        }
        available
    }

    pub fn reserve(&mut self, bundle: &CapabilitySet) {
        self.reserved.merge(bundle);
        for (capability, count) in bundle.iter() {
            *self.in_use.entry(capability.as_str().to_string()).or_insert(0) += count;
        }
    }

    pub fn release(&mut self, bundle: &CapabilitySet) {
        if let Some(remaining) = self.reserved.checked_sub(bundle) {
            self.reserved = remaining;
        }
        for (capability, count) in bundle.iter() {
            if let Some(used) = self.in_use.get_mut(capability.as_str()) {
                *used = used.saturating_sub(*count);
            }
        }
    }
}

/// Tracks consecutive failures per `(handler, url)` so a task can be
/// retried a bounded number of times before being treated as a poison
/// pill and dropped.
#[derive(Debug, Default)]
pub struct FailureTracker {
    counts: HashMap<(String, String), u32>,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure and returns `true` if the task should still be
    /// retried (fewer than [`ALLOWED_FAILS`] failures so far).
    pub fn record_failure(&mut self, handler: &str, url: &str) -> bool {
        let count = self
            .counts
            .entry((handler.to_string(), url.to_string()))
            .or_insert(0);
        *count += 1;
        *count < ALLOWED_FAILS
    }

    pub fn clear(&mut self, handler: &str, url: &str) {
        self.counts.remove(&(handler.to_string(), url.to_string()));
    }

    pub fn failures(&self, handler: &str, url: &str) -> u32 {
        self.counts
            .get(&(handler.to_string(), url.to_string()))
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
