// SPDX-License-Identifier: MIT

//! Interfaces the orchestrator core depends on but never implements itself:
//! handler parsing logic, proxy provisioning, and the outcome shape a
//! session reports back after attempting a fetch. Concrete handlers, proxy
//! pools, and HTTP/browser sessions live in `silo-adapters`.

use async_trait::async_trait;
use rand::Rng;

use crate::capability::CapabilitySet;
use crate::error::CoreError;
use crate::event::RegistrationEvent;

/// What a session attempt produced, before a [`Handler`] gets to interpret
/// the bytes. This is the redesigned, exception-free replacement for the
/// original implementation's exception-as-control-flow dispatch: every
/// terminal outcome is a value, not a thrown error.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// The session got content back successfully.
    Ok(Vec<u8>),
    /// A transient HTTP-layer failure (5xx, connection reset) that should
    /// be retried with a fresh session rather than surfaced as a parsing
    /// problem.
    TransientHttp { status: Option<u16>, detail: String },
    /// The session itself is unusable and must be torn down and restarted
    /// before any further fetch is attempted on it.
    BrokenSession { detail: String },
    /// The session took too long to respond.
    Timeout,
    /// Any other failure the session can't classify more specifically.
    Other(String),
}

/// What a [`Handler`] produces after successfully parsing fetched content.
#[derive(Debug, Clone, Default)]
pub struct ParsedUnit {
    /// New URLs discovered while parsing this page, to be registered for
    /// future collection.
    pub registrations: Vec<RegistrationEvent>,
    /// When true, this fetch's success status is recorded as one of the
    /// `Persistent*`/`Cache*` variants instead of the plain transient one,
    /// so the source-url row survives re-integration rather than being
    /// deleted from the queue table.
    pub persistent: bool,
    /// Seconds after which this source should become eligible again.
    pub expiry_seconds: Option<u64>,
}

/// A crawl handler: owns the capability requirements for fetching its URLs,
/// the session-lifecycle knobs the runtime drives it with, and the logic
/// for turning a fetched response into new registrations. Every method
/// beyond `name`/`capabilities`/`parse` has a default so a handler that
/// doesn't care about retries, caching, or session reuse can ignore them
/// entirely.
#[async_trait]
pub trait Handler: Send + Sync {
    fn name(&self) -> &str;

    /// Capabilities a session needs to fetch this handler's URLs (e.g.
    /// `browser`, or `proxy:residential`).
    fn capabilities(&self) -> CapabilitySet;

    /// URLs to seed the queue with when this handler is registered for the
    /// first time. Most handlers discover URLs dynamically instead and
    /// return an empty seed set.
    fn seed_urls(&self) -> Vec<String> {
        Vec::new()
    }

    /// Upper bound on fetch attempts against a single url within one
    /// `Fetch` pass before the worker gives up and reports a connection
    /// error.
    fn max_retries(&self) -> u32 {
        3
    }

    /// Upper bound on how many times a failed `start_session` is retried
    /// (via a session restart) before the task itself is failed.
    fn initiation_retries(&self) -> u32 {
        1
    }

    /// Seconds to wait before retrying a failed session initiation.
    fn wait_on_initiation_fail(&self) -> f64 {
        1.0
    }

    /// Number of fetches a session may serve before it's proactively
    /// restarted even though it's still alive. `None` means never.
    fn restart_session_after(&self) -> Option<u32> {
        None
    }

    /// When true, successful fetches and cache hits are recorded with the
    /// `Persistent*`/cache status variants instead of the plain transient
    /// ones, so the source-url row survives re-integration rather than
    /// being deleted once collected.
    fn process_indefinitely(&self) -> bool {
        false
    }

    /// Runs once against a freshly started session, before any fetch is
    /// attempted on it. The session handle itself lives in `silo-adapters`
    /// (this crate cannot depend on it without a cycle), so this hook only
    /// carries the handler-side half of initiation — warming up cookies,
    /// headers, or other state the handler keeps for itself. The engine
    /// calls `Session::start` and this hook together before the first
    /// fetch on every new session.
    async fn start_session(&self) -> Result<(), CoreError> {
        Ok(())
    }

    /// Tells the handler which url is about to be fetched, for handlers
    /// that key per-request state (headers, referer chains) off of it.
    fn set_url(&self, _url: &str) {}

    /// Seconds to sleep before issuing a fetch. Runs in the worker, never
    /// in the orchestrator.
    fn get_sleep_time(&self) -> f64 {
        0.0
    }

    /// Seconds to sleep between retry attempts inside the fetch loop.
    /// Default is a uniform random pick in `[0.1, 0.6)`.
    fn get_retry_sleep_time(&self) -> f64 {
        rand::thread_rng().gen_range(0.1..0.6)
    }

    /// Transforms raw fetched bytes before `parse` sees them. The
    /// identity transform by default.
    fn pre_parse(&self, content: &[u8]) -> Vec<u8> {
        content.to_vec()
    }

    /// Parses previously fetched (and `pre_parse`d) content. Implementations
    /// should not perform I/O here — by the time this is called the bytes
    /// are already in hand.
    fn parse(&self, url: &str, content: &[u8]) -> Result<ParsedUnit, CoreError>;

    /// A previously produced payload for `url`, if this handler keeps its
    /// own cache and already has one on hand. Returning `Some` short-circuits
    /// the fetch entirely.
    fn load_cache(&self, _url: &str) -> Option<Vec<u8>> {
        None
    }

    /// Whether a failed fetch (the session's own error detail) means the
    /// session itself is unusable and must be restarted rather than just
    /// retried on the same connection.
    fn is_session_broken(&self, _detail: &str) -> bool {
        false
    }

    /// Links accumulated by the handler outside of a single `parse` call's
    /// return value (e.g. discovered across several pages before being
    /// flushed as a batch). Most handlers register everything through
    /// `parse`'s `ParsedUnit::registrations` and leave this empty; calling
    /// it drains whatever is pending.
    fn pop_registered_links(&self) -> Vec<RegistrationEvent> {
        Vec::new()
    }

    /// Resolves a link captured while parsing into the absolute url it
    /// should be registered under. The identity function for handlers that
    /// only ever emit already-absolute urls.
    fn extend_link(&self, raw: &str) -> String {
        raw.to_string()
    }
}

/// A single proxy endpoint leased from a [`ProxyProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyHandle {
    pub address: String,
}

/// Supplies and reclaims proxy endpoints for capabilities that require one
/// (e.g. `proxy:residential`). Concrete pools live in `silo-adapters`.
#[async_trait]
pub trait ProxyProvider: Send + Sync {
    async fn acquire(&self, capability_hint: &str) -> Option<ProxyHandle>;
    async fn release(&self, handle: ProxyHandle);
}

#[cfg(test)]
#[path = "handler_tests.rs"]
mod tests;
