// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid capability bundle: {0}")]
    InvalidCapability(String),

    #[error("invalid context: {0}")]
    InvalidContext(String),

    #[error("handler {handler:?} rejected url {url:?}: {reason}")]
    HandlerRejected {
        handler: String,
        url: String,
        reason: String,
    },
}
