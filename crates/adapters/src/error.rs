// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("session {0} is not alive")]
    SessionNotAlive(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("no proxy available for {0}")]
    NoProxyAvailable(String),
}
