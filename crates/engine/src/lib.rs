// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! The scheduling and execution layer: capability-matched dispatch, the
//! session/handler state machine, the pluggable execution driver, and the
//! [`orchestrator::Orchestrator`] that ties them to the depot's object
//! store.

pub mod distribution;
pub mod error;
pub mod orchestrator;
pub mod runtime;
pub mod scheduler;

pub use distribution::{DistributionDriver, SyncDriver, TokioDriver};
pub use error::EngineError;
pub use orchestrator::{Orchestrator, SessionFactory};
pub use runtime::{run_handling_task, FetchResult};
pub use scheduler::{retry_backoff, CapacityTracker, FailureTracker, Task, TaskQueue, ALLOWED_FAILS};
