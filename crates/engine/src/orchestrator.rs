// SPDX-License-Identifier: MIT

//! Wires the task queue, capacity tracker, session runtime, and object
//! store together into the single entry point the CLI's `run` command
//! calls: drain a batch of registered urls and come back with the
//! collection/registration events ready to commit as a run.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::stream::{FuturesUnordered, StreamExt};
use parking_lot::Mutex;
use silo_adapters::Session;
use silo_core::{Clock, CollectionEvent, Event, Handler, SourceStatus};
use silo_store::ObjectStore;

use crate::distribution::DistributionDriver;
use crate::error::EngineError;
use crate::runtime::run_handling_task;
use crate::scheduler::{retry_backoff, CapacityTracker, FailureTracker, Task, TaskQueue};

/// Produces a fresh session for a task about to run. Kept generic over the
/// capability bundle so callers can hand out a browser session for
/// browser-capable tasks and a request session for everything else. Called
/// at most once per handler per [`Orchestrator::drain`] call — the
/// orchestrator keeps the resulting session alive across every task routed
/// to that handler instead of minting a new one per task.
pub type SessionFactory = Arc<dyn Fn(&Task) -> Arc<dyn Session> + Send + Sync>;

/// What one task produced once its worker finished, whether or not the
/// worker itself survived to report a proper [`crate::runtime::FetchResult`].
struct TaskOutcome {
    task: Task,
    events: Vec<Event>,
    needs_restart: bool,
    /// True when the spawned worker never reported back at all (e.g. it
    /// panicked) — a worker-exception retry path, distinct from
    /// an ordinary fetch failure the handler's own retry budget already
    /// absorbed.
    worker_failed: bool,
}

pub struct Orchestrator {
    pub handlers: HashMap<String, Arc<dyn Handler>>,
    pub session_factory: SessionFactory,
    pub objects: ObjectStore,
}

impl Orchestrator {
    pub fn new(
        handlers: HashMap<String, Arc<dyn Handler>>,
        session_factory: SessionFactory,
        objects: ObjectStore,
    ) -> Self {
        Self {
            handlers,
            session_factory,
            objects,
        }
    }

    /// Returns the session currently held open for `task`'s handler,
    /// creating one the first time this handler is seen. Restarting a
    /// session (on a broken-session result, or after
    /// `restart_session_after` queries) drops it from this map so the next
    /// call mints a fresh one.
    fn session_for(
        &self,
        task: &Task,
        sessions: &mut HashMap<String, Arc<dyn Session>>,
    ) -> Arc<dyn Session> {
        sessions
            .entry(task.handler.clone())
            .or_insert_with(|| (self.session_factory)(task))
            .clone()
    }

    /// Drains `queue` against `capacity`, running tasks concurrently (up to
    /// whatever `capacity` and `driver` allow) through the session/handler
    /// state machine and collecting the resulting events. A session is
    /// reused across every task for the same handler until the handler
    /// reports it broken or its query budget (`restart_session_after`) is
    /// spent. A worker that never reports back (panics) is retried with
    /// jittered back-off up to [`crate::scheduler::ALLOWED_FAILS`] times
    /// before being dropped as a poison pill. Returns
    /// [`EngineError::NotEnoughResources`] if the queue still has work but
    /// nothing is in flight and no remaining task's capability bundle is
    /// ever satisfiable by `capacity`'s total capacity.
    pub async fn drain(
        &self,
        mut queue: TaskQueue,
        mut capacity: CapacityTracker,
        driver: &dyn DistributionDriver,
        clock: &dyn Clock,
    ) -> Result<Vec<Event>, EngineError> {
        let mut events = Vec::new();
        let mut failures = FailureTracker::new();
        let mut sessions: HashMap<String, Arc<dyn Session>> = HashMap::new();
        let mut query_counts: HashMap<String, u32> = HashMap::new();
        let mut in_flight: FuturesUnordered<BoxFuture<'static, TaskOutcome>> = FuturesUnordered::new();

        loop {
            // Fill up to however much capacity (and the queue) allows.
            loop {
                let available = capacity.available();
                let Some(task) = queue.pop_matching(&available) else {
                    break;
                };
                capacity.reserve(&task.capabilities);

                let Some(handler) = self.handlers.get(&task.handler).cloned() else {
                    capacity.release(&task.capabilities);
                    continue;
                };

                let restart_after = handler.restart_session_after();
                let queries_so_far = query_counts.entry(task.handler.clone()).or_insert(0);
                if let Some(limit) = restart_after {
                    if *queries_so_far >= limit {
                        if let Some(stale) = sessions.remove(&task.handler) {
                            stale.stop().await;
                        }
                        *queries_so_far = 0;
                    }
                }
                *queries_so_far += 1;

                let session = self.session_for(&task, &mut sessions);
                let now_ms = clock.epoch_ms();
                let objects = self.objects.clone();
                let task_for_future = task.clone();

                let slot: Arc<Mutex<Option<TaskOutcome>>> = Arc::new(Mutex::new(None));
                let slot_for_worker = slot.clone();
                let work: BoxFuture<'static, ()> = Box::pin(async move {
                    let result =
                        run_handling_task(session.as_ref(), handler.as_ref(), &task_for_future.url, now_ms)
                            .await;
                    let content_digest = match &result.content {
                        Some(bytes) => objects.dump_bytes("bin", bytes).ok(),
                        None => None,
                    };
                    let expiry_seconds = result.parsed.as_ref().and_then(|p| p.expiry_seconds);
                    let mut batch = vec![Event::Collection(CollectionEvent {
                        handler: result.handler.clone().into(),
                        url: result.url.clone(),
                        timestamp_ms: result.timestamp_ms,
                        status: result.status,
                        content_digest,
                        expiry_seconds,
                        message: result.message.clone(),
                    })];
                    if let Some(parsed) = result.parsed {
                        batch.extend(parsed.registrations.into_iter().map(Event::Registration));
                    }
                    *slot_for_worker.lock() = Some(TaskOutcome {
                        task: task_for_future,
                        events: batch,
                        needs_restart: result.needs_restart,
                        worker_failed: false,
                    });
                });

                let driven = driver.spawn(work);
                let task_for_fallback = task.clone();
                in_flight.push(Box::pin(async move {
                    driven.await;
                    slot.lock().take().unwrap_or(TaskOutcome {
                        task: task_for_fallback,
                        events: Vec::new(),
                        needs_restart: false,
                        worker_failed: true,
                    })
                }));
            }

            if in_flight.is_empty() {
                if queue.is_empty() {
                    break;
                }
                return Err(EngineError::NotEnoughResources);
            }

            let Some(outcome) = in_flight.next().await else {
                break;
            };
            capacity.release(&outcome.task.capabilities);

            if outcome.worker_failed {
                let should_retry = failures.record_failure(&outcome.task.handler, &outcome.task.url);
                if should_retry {
                    tokio::time::sleep(retry_backoff(failures.failures(&outcome.task.handler, &outcome.task.url)))
                        .await;
                    queue.push(outcome.task);
                } else {
                    events.push(Event::Collection(CollectionEvent {
                        handler: outcome.task.handler.clone().into(),
                        url: outcome.task.url.clone(),
                        timestamp_ms: clock.epoch_ms(),
                        status: SourceStatus::ConnectionError,
                        content_digest: None,
                        expiry_seconds: None,
                        message: Some("worker failed repeatedly".into()),
                    }));
                }
                continue;
            }

            failures.clear(&outcome.task.handler, &outcome.task.url);
            if outcome.needs_restart {
                if let Some(stale) = sessions.remove(&outcome.task.handler) {
                    stale.stop().await;
                }
                query_counts.insert(outcome.task.handler.clone(), 0);
            }
            events.extend(outcome.events);
        }

        Ok(events)
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
