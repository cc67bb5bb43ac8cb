// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! The depot: content-addressed object storage, the event codec, run
//! archives, status lineage, the persistent queue, and the `Depot` facade
//! that ties them together.

pub mod depot;
pub mod error;
pub mod event_codec;
pub mod object_store;
pub mod queue;
pub mod run_archive;
pub mod status_lineage;

pub use depot::{Depot, EventScope};
pub use error::StoreError;
pub use event_codec::{encode_event, EventKind, EventName, PartialEvent};
pub use object_store::{Blob, ObjectStore};
pub use queue::{Queue, SourceRow};
pub use status_lineage::{load_cache, save_cache, StatusCache};
