// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("remote command failed: {0}")]
    CommandFailed(String),

    #[error("transport does not understand command: {0}")]
    UnsupportedCommand(String),

    #[error("no remote configured and no default remote in the environment")]
    NoRemoteConfigured,

    #[error(transparent)]
    Store(#[from] silo_store::StoreError),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl SyncError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
