// SPDX-License-Identifier: MIT
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

//! Concrete [`Session`] backends and a [`silo_core::ProxyProvider`]
//! implementation: the seams between the engine's state machine and the
//! outside world.

pub mod browser_session;
pub mod error;
pub mod proxy;
pub mod raw_bytes_handler;
pub mod request_session;
pub mod session;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use browser_session::BrowserSession;
pub use error::AdapterError;
pub use proxy::FakeProxyProvider;
pub use raw_bytes_handler::RawBytesHandler;
pub use request_session::RequestSession;
pub use session::Session;

#[cfg(feature = "test-support")]
pub use test_support::{FakeHandler, FakeSession};
