// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

//! Dependency-free domain types shared by every other `silo` crate: ids,
//! the clock abstraction, the queue status enum, depot events, capability
//! matching, and the handler/proxy seams the runtime is built against.

pub mod capability;
pub mod clock;
pub mod context;
pub mod error;
pub mod event;
pub mod handler;
pub mod id;
pub mod status;

pub use capability::{Capability, CapabilitySet, ResourceLimitSet};
pub use clock::{Clock, FakeClock, SystemClock};
pub use context::{RunContext, RunId, StatusContext, StatusId};
pub use error::CoreError;
pub use event::{CollectionEvent, Event, RegistrationEvent};
pub use handler::{FetchOutcome, Handler, ParsedUnit, ProxyHandle, ProxyProvider};
pub use status::SourceStatus;

define_id!(WorkerId, "w-");
define_id!(TaskId, "tk-");
define_id!(SessionSlotId, "ss-");
