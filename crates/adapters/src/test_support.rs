// SPDX-License-Identifier: MIT

//! Scripted [`Session`] and [`Handler`] implementations for other crates'
//! tests, gated behind the `test-support` feature the way a fake adapter
//! backend is normally exposed only to tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use silo_core::{CapabilitySet, CoreError, FetchOutcome, Handler, ParsedUnit};

use crate::error::AdapterError;
use crate::session::Session;

/// A session that plays back a fixed queue of outcomes, one per `fetch`
/// call, repeating the last one once the queue is exhausted.
pub struct FakeSession {
    id: String,
    script: Mutex<Vec<FetchOutcome>>,
    alive: Mutex<bool>,
    fetch_count: Mutex<u32>,
}

impl FakeSession {
    pub fn new(id: impl Into<String>, script: Vec<FetchOutcome>) -> Self {
        Self {
            id: id.into(),
            script: Mutex::new(script),
            alive: Mutex::new(false),
            fetch_count: Mutex::new(0),
        }
    }

    /// How many times `fetch` has been called so far, for tests asserting
    /// an exact retry-attempt count.
    pub fn fetch_count(&self) -> u32 {
        *self.fetch_count.lock()
    }
}

#[async_trait]
impl Session for FakeSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self) -> Result<(), AdapterError> {
        *self.alive.lock() = true;
        Ok(())
    }

    async fn fetch(&self, _url: &str) -> FetchOutcome {
        *self.fetch_count.lock() += 1;
        let mut script = self.script.lock();
        if script.len() > 1 {
            script.remove(0)
        } else {
            script
                .first()
                .cloned()
                .unwrap_or_else(|| FetchOutcome::Other("no scripted outcome".into()))
        }
    }

    async fn is_alive(&self) -> bool {
        *self.alive.lock()
    }

    async fn stop(&self) {
        *self.alive.lock() = false;
    }
}

/// A handler that requires a fixed capability bundle and always produces
/// the same [`ParsedUnit`], for engine-level tests that don't care about
/// real parsing logic. Retry/sleep knobs default to fast, deterministic
/// values (no sleeping, three retries) so tests exercising the fetch retry
/// loop don't pay real wall-clock time; use the `with_*` builders to probe
/// other values.
pub struct FakeHandler {
    name: String,
    capabilities: CapabilitySet,
    result: ParsedUnit,
    max_retries: u32,
    retry_sleep_seconds: f64,
    sleep_seconds: f64,
    process_indefinitely: bool,
    cached: Mutex<Option<Vec<u8>>>,
}

impl FakeHandler {
    pub fn new(name: impl Into<String>, capabilities: CapabilitySet, result: ParsedUnit) -> Self {
        Self {
            name: name.into(),
            capabilities,
            result,
            max_retries: 3,
            retry_sleep_seconds: 0.0,
            sleep_seconds: 0.0,
            process_indefinitely: false,
            cached: Mutex::new(None),
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_process_indefinitely(mut self, process_indefinitely: bool) -> Self {
        self.process_indefinitely = process_indefinitely;
        self
    }

    /// Makes `load_cache` return `payload` for every url instead of `None`.
    pub fn with_cached(mut self, payload: Vec<u8>) -> Self {
        self.cached = Mutex::new(Some(payload));
        self
    }
}

impl Handler for FakeHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities.clone()
    }

    fn max_retries(&self) -> u32 {
        self.max_retries
    }

    fn get_sleep_time(&self) -> f64 {
        self.sleep_seconds
    }

    fn get_retry_sleep_time(&self) -> f64 {
        self.retry_sleep_seconds
    }

    fn process_indefinitely(&self) -> bool {
        self.process_indefinitely
    }

    fn load_cache(&self, _url: &str) -> Option<Vec<u8>> {
        self.cached.lock().clone()
    }

    fn parse(&self, _url: &str, content: &[u8]) -> Result<ParsedUnit, CoreError> {
        if content.is_empty() {
            return Err(CoreError::HandlerRejected {
                handler: self.name.clone(),
                url: String::new(),
                reason: "empty body".into(),
            });
        }
        Ok(self.result.clone())
    }
}

#[cfg(test)]
#[path = "test_support_tests.rs"]
mod tests;
