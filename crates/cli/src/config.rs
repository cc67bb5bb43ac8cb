// SPDX-License-Identifier: MIT

//! Resolves the depot a `silo` invocation operates against and the remote
//! it talks to by default. Priority, highest first: a CLI flag, an
//! environment variable, `~/.config/silo/config.toml`, then a built-in
//! default.

use std::path::PathBuf;

use serde::Deserialize;

const DEPOT_ROOT_ENV: &str = "SILO_DEPOT_ROOT";
const DEFAULT_REMOTE_ENV: &str = "SILO_DEFAULT_REMOTE";
const REMOTE_AUTH_ENV: &str = "SILO_REMOTE_AUTH";

#[derive(Debug, Clone, Default, Deserialize)]
struct FileConfig {
    depot_root: Option<PathBuf>,
    default_remote: Option<String>,
    remote_auth: Option<String>,
}

/// Resolved configuration for one `silo` invocation.
#[derive(Debug, Clone)]
pub struct DepotConfig {
    pub depot_root: PathBuf,
    pub default_remote: Option<String>,
    /// Opaque credential string handed to transports that need one.
    /// Unused by [`silo_sync::LocalTransport`]; carried for remote
    /// backends that do.
    pub remote_auth: Option<String>,
}

impl DepotConfig {
    pub fn resolve(
        cli_depot_root: Option<PathBuf>,
        cli_remote: Option<String>,
    ) -> anyhow::Result<Self> {
        let file = read_config_file().unwrap_or_default();

        let depot_root = cli_depot_root
            .or_else(|| std::env::var_os(DEPOT_ROOT_ENV).map(PathBuf::from))
            .or(file.depot_root)
            .unwrap_or_else(|| PathBuf::from(".silo"));

        let default_remote = cli_remote
            .or_else(|| std::env::var(DEFAULT_REMOTE_ENV).ok())
            .or(file.default_remote);

        let remote_auth = std::env::var(REMOTE_AUTH_ENV).ok().or(file.remote_auth);

        Ok(Self {
            depot_root,
            default_remote,
            remote_auth,
        })
    }

    /// The remote to use when a command didn't pass its own `--remote`,
    /// failing with a clear message instead of silently doing nothing.
    pub fn require_remote(&self, override_remote: Option<String>) -> anyhow::Result<PathBuf> {
        override_remote
            .or_else(|| self.default_remote.clone())
            .map(PathBuf::from)
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "no remote given and no default remote configured (pass --remote or set {DEFAULT_REMOTE_ENV})"
                )
            })
    }
}

fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("silo").join("config.toml"))
}

fn read_config_file() -> Option<FileConfig> {
    let path = config_file_path()?;
    let text = std::fs::read_to_string(path).ok()?;
    toml::from_str(&text).ok()
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
