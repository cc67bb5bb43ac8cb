// SPDX-License-Identifier: MIT

//! The two immutable event kinds that make up the depot's append-only log:
//! a [`CollectionEvent`] records the outcome of fetching one URL, a
//! [`RegistrationEvent`] records a request to add a URL to the queue.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::status::SourceStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEvent {
    pub handler: SmolStr,
    pub url: String,
    pub timestamp_ms: u64,
    pub status: SourceStatus,
    /// Hex-encoded content digest of the fetched blob. `None` for error
    /// outcomes that never produced content.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub content_digest: Option<String>,
    /// Seconds after which a successful fetch should be eligible for
    /// re-queueing by `Queue::reset_expired`. `None` means it never expires.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expiry_seconds: Option<u64>,
    /// Human-readable detail for error statuses.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub message: Option<String>,
}

impl CollectionEvent {
    pub fn is_success(&self) -> bool {
        matches!(
            self.status,
            SourceStatus::Processed
                | SourceStatus::PersistentProcessed
                | SourceStatus::CacheLoaded
                | SourceStatus::PersistentCached
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationEvent {
    pub handler: SmolStr,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub expiry_seconds: Option<u64>,
    /// Whether this registration should reset an existing `(handler, url)`
    /// row back to `Todo` rather than leave its current status alone.
    #[serde(default)]
    pub overwrite: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Collection(CollectionEvent),
    Registration(RegistrationEvent),
}

impl Event {
    pub fn handler(&self) -> &str {
        match self {
            Event::Collection(e) => &e.handler,
            Event::Registration(e) => &e.handler,
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Event::Collection(e) => &e.url,
            Event::Registration(e) => &e.url,
        }
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
