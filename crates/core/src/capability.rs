// SPDX-License-Identifier: MIT

//! Capability matching for the scheduler: a worker advertises a multiset of
//! capabilities (e.g. two `browser` slots and one `proxy:residential`
//! slot); a task names the multiset of capabilities it requires. A worker
//! can run a task when its capability multiset *dominates* the task's
//! requirement multiset — every required capability is present in at
//! least the required quantity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capability(pub SmolStr);

impl Capability {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Capability {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A multiset of capabilities, stored as capability -> count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CapabilitySet(BTreeMap<Capability, u32>);

impl CapabilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, capability: impl Into<Capability>, count: u32) -> Self {
        if count > 0 {
            *self.0.entry(capability.into()).or_insert(0) += count;
        }
        self
    }

    pub fn count(&self, capability: &Capability) -> u32 {
        self.0.get(capability).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Capability, &u32)> {
        self.0.iter()
    }

    /// True if `self` has at least as many of each capability as `required`.
    pub fn dominates(&self, required: &CapabilitySet) -> bool {
        required
            .iter()
            .all(|(capability, count)| self.count(capability) >= *count)
    }

    /// Subtracts `required` from `self`, saturating at zero. Used by the
    /// scheduler to reserve capacity while a task is in flight.
    pub fn checked_sub(&self, required: &CapabilitySet) -> Option<Self> {
        if !self.dominates(required) {
            return None;
        }
        let mut out = self.clone();
        for (capability, count) in required.iter() {
            let entry = out.0.entry(capability.clone()).or_insert(0);
            *entry = entry.saturating_sub(*count);
        }
        out.0.retain(|_, count| *count > 0);
        Some(out)
    }

    pub fn merge(&mut self, other: &CapabilitySet) {
        for (capability, count) in other.iter() {
            *self.0.entry(capability.clone()).or_insert(0) += count;
        }
    }
}

/// Resource ceilings applied across the whole worker pool (e.g. at most 4
/// concurrent browser sessions regardless of how many browser-capable
/// workers exist).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceLimitSet(BTreeMap<Capability, u32>);

impl ResourceLimitSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(mut self, capability: impl Into<Capability>, limit: u32) -> Self {
        self.0.insert(capability.into(), limit);
        self
    }

    pub fn limit(&self, capability: &Capability) -> Option<u32> {
        self.0.get(capability).copied()
    }
}

#[cfg(test)]
#[path = "capability_tests.rs"]
mod tests;
