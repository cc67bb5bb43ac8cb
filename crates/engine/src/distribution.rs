// SPDX-License-Identifier: MIT

//! How scheduled tasks actually get to run: a pluggable executor from
//! "which executor drives a worker future" — swapping this out is how
//! tests get deterministic sequential execution while production gets real
//! concurrency.

use futures_util::future::BoxFuture;

pub trait DistributionDriver: Send + Sync {
    /// Starts `future` running and returns a future that resolves once it's
    /// done. The starting happens *inside this call*, not when the caller
    /// later awaits the result — that's what lets an orchestrator hold many
    /// of these in a `FuturesUnordered` and have them make progress
    /// concurrently instead of one completing before the next begins.
    fn spawn(&self, future: BoxFuture<'static, ()>) -> BoxFuture<'static, ()>;
}

/// Runs every task inline, one at a time. The default for tests: fully
/// deterministic, no real concurrency — `spawn` hands the future straight
/// back unexecuted, so it only starts running once something actually
/// awaits it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncDriver;

impl DistributionDriver for SyncDriver {
    fn spawn(&self, future: BoxFuture<'static, ()>) -> BoxFuture<'static, ()> {
        future
    }
}

/// Runs each task as its own tokio task. The production default: the
/// orchestrator can have many of these in flight at once, bounded only by
/// the capability/resource accounting in [`crate::scheduler::CapacityTracker`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDriver;

impl DistributionDriver for TokioDriver {
    fn spawn(&self, future: BoxFuture<'static, ()>) -> BoxFuture<'static, ()> {
        let handle = tokio::spawn(future);
        Box::pin(async move {
            if let Err(join_error) = handle.await {
                tracing::error!(%join_error, "scheduled task panicked");
            }
        })
    }
}

#[cfg(test)]
#[path = "distribution_tests.rs"]
mod tests;
