// SPDX-License-Identifier: MIT

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object {0} not found")]
    NotFound(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("malformed event file name: {0}")]
    MalformedEventName(String),

    #[error("malformed event payload: {0}")]
    MalformedEventPayload(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("corrupt queue snapshot: {0}")]
    CorruptQueue(String),

    #[error("no such run: {0}")]
    UnknownRun(String),

    #[error("no such status: {0}")]
    UnknownStatus(String),

    #[error("refusing to commit a run with zero events")]
    EmptyRun,
}

impl StoreError {
    pub fn io(path: impl Into<std::path::PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
