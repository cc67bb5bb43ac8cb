// SPDX-License-Identifier: MIT

//! Remote-as-filesystem transport: the depot treats a remote as something
//! reachable via shell command execution plus file `put`/`get`/`cd`,
//! mirroring the original depot's fabric-connection abstraction. Concrete
//! backends (SSH, local) live outside the core; this module defines the
//! seam and a local filesystem reference implementation used for tests and
//! single-machine replication.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::SyncError;

#[async_trait]
pub trait RemoteTransport: Send + Sync {
    /// Runs a shell command against the remote's current directory and
    /// returns its captured stdout.
    async fn run(&self, shell_command: &str) -> Result<String, SyncError>;

    /// Copies a local file to a path relative to the remote's current
    /// directory.
    async fn put(&self, local: &Path, remote_relative: &str) -> Result<(), SyncError>;

    /// Copies a path relative to the remote's current directory to a
    /// local file.
    async fn get(&self, remote_relative: &str, local: &Path) -> Result<(), SyncError>;

    /// Changes the remote's current directory for subsequent operations.
    async fn cd(&self, path: &str) -> Result<(), SyncError>;
}

/// Treats a local directory as "the remote". Used for tests and for
/// replicating between two depots on the same machine without an SSH hop.
/// Understands the small vocabulary of commands `push_pull` actually
/// issues (`find .`, `mkdir -p <path>`, `ls <path>`) rather than spawning a
/// real shell.
pub struct LocalTransport {
    root: PathBuf,
    cwd: Mutex<PathBuf>,
}

impl LocalTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            cwd: Mutex::new(root.clone()),
            root,
        }
    }

    fn resolve(&self, relative: &str) -> PathBuf {
        self.cwd.lock().join(relative)
    }
}

#[async_trait]
impl RemoteTransport for LocalTransport {
    async fn run(&self, shell_command: &str) -> Result<String, SyncError> {
        let cwd = self.cwd.lock().clone();
        if shell_command == "find ." {
            let mut entries = Vec::new();
            if cwd.exists() {
                walk(&cwd, &cwd, &mut entries)?;
            }
            return Ok(entries.join("\n"));
        }
        if let Some(path) = shell_command.strip_prefix("mkdir -p ") {
            let dir = cwd.join(path);
            std::fs::create_dir_all(&dir).map_err(|e| SyncError::io(&dir, e))?;
            return Ok(String::new());
        }
        if let Some(path) = shell_command.strip_prefix("ls ") {
            let dir = cwd.join(path);
            let mut names = Vec::new();
            if dir.exists() {
                for entry in std::fs::read_dir(&dir).map_err(|e| SyncError::io(&dir, e))? {
                    let entry = entry.map_err(|e| SyncError::io(&dir, e))?;
                    names.push(entry.file_name().to_string_lossy().into_owned());
                }
            }
            return Ok(names.join("\n"));
        }
        Err(SyncError::UnsupportedCommand(shell_command.to_string()))
    }

    async fn put(&self, local: &Path, remote_relative: &str) -> Result<(), SyncError> {
        let dest = self.resolve(remote_relative);
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        std::fs::copy(local, &dest).map_err(|e| SyncError::io(local, e))?;
        Ok(())
    }

    async fn get(&self, remote_relative: &str, local: &Path) -> Result<(), SyncError> {
        let src = self.resolve(remote_relative);
        if !src.exists() {
            return Err(SyncError::CommandFailed(format!(
                "no such remote path: {remote_relative}"
            )));
        }
        if let Some(parent) = local.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SyncError::io(parent, e))?;
        }
        std::fs::copy(&src, local).map_err(|e| SyncError::io(&src, e))?;
        Ok(())
    }

    async fn cd(&self, path: &str) -> Result<(), SyncError> {
        let mut cwd = self.cwd.lock();
        *cwd = cwd.join(path);
        Ok(())
    }
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) -> Result<(), SyncError> {
    for entry in std::fs::read_dir(dir).map_err(|e| SyncError::io(dir, e))? {
        let entry = entry.map_err(|e| SyncError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            walk(root, &path, out)?;
        } else {
            let rel = path.strip_prefix(root).unwrap_or(&path);
            out.push(format!("./{}", rel.to_string_lossy().replace('\\', "/")));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
