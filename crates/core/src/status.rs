// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Lifecycle state of a single `(handler, url)` row in the queue.
///
/// The `Persistent*` and `Cache*` variants never get deleted from the queue
/// table on success — see [`crate::handler::FetchOutcome`] and the queue
/// engine's `integrate_events` for how a row lands here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SourceStatus {
    Todo,
    Processing,
    Processed,
    PersistentProcessed,
    CacheLoaded,
    PersistentCached,
    ParsingError,
    ConnectionError,
    SessionBroken,
}

impl SourceStatus {
    /// A row in this status is finished and, absent a persistent/cache
    /// variant, eligible for removal from the queue table once its event
    /// has been integrated.
    pub fn is_terminal(self) -> bool {
        !matches!(self, SourceStatus::Todo | SourceStatus::Processing)
    }

    /// Persistent and cache statuses are kept in the table across
    /// integrations instead of being deleted on success.
    pub fn is_persistent(self) -> bool {
        matches!(
            self,
            SourceStatus::PersistentProcessed
                | SourceStatus::CacheLoaded
                | SourceStatus::PersistentCached
        )
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            SourceStatus::ParsingError | SourceStatus::ConnectionError | SourceStatus::SessionBroken
        )
    }
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SourceStatus::Todo => "TODO",
            SourceStatus::Processing => "PROCESSING",
            SourceStatus::Processed => "PROCESSED",
            SourceStatus::PersistentProcessed => "PERSISTENT_PROCESSED",
            SourceStatus::CacheLoaded => "CACHE_LOADED",
            SourceStatus::PersistentCached => "PERSISTENT_CACHED",
            SourceStatus::ParsingError => "PARSING_ERROR",
            SourceStatus::ConnectionError => "CONNECTION_ERROR",
            SourceStatus::SessionBroken => "SESSION_BROKEN",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
