// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! Remote replication: a depot treated as a filesystem reachable through a
//! small command/put/get/cd transport, and the push/pull diff logic built
//! on top of it.

pub mod error;
pub mod push_pull;
pub mod transport;

pub use error::SyncError;
pub use push_pull::{pull, push, PullMode};
pub use transport::{LocalTransport, RemoteTransport};
