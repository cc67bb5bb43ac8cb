// SPDX-License-Identifier: MIT

//! The seam between the engine's state machine and a concrete way of
//! fetching bytes over the network. Shaped after an `AgentAdapter`-style
//! trait (`spawn`/`send`/`kill`/`is_alive`), generalized from "drive an
//! interactive agent process" to "drive a fetch session".

use async_trait::async_trait;
use silo_core::FetchOutcome;

#[async_trait]
pub trait Session: Send + Sync {
    /// Opaque identifier for logging/tracing, not necessarily globally
    /// unique.
    fn id(&self) -> &str;

    /// Prepares the session for use (opening a connection, launching a
    /// browser process, etc). Called once before the first `fetch`.
    async fn start(&self) -> Result<(), crate::error::AdapterError>;

    /// Fetches a single url. Implementations classify failures into the
    /// [`FetchOutcome`] variants instead of propagating an error, since the
    /// runtime needs to distinguish "retry on a fresh session" from
    /// "this session is broken" from "give up".
    async fn fetch(&self, url: &str) -> FetchOutcome;

    /// Whether the underlying connection/process is still usable. The
    /// runtime checks this before reusing a session for another fetch.
    async fn is_alive(&self) -> bool;

    /// Tears the session down. Always safe to call, including on an
    /// already-dead session.
    async fn stop(&self);
}
