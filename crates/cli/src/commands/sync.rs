// SPDX-License-Identifier: MIT

//! `silo push`/`silo pull`: replication against a remote depot reachable
//! as a local path. A real SSH/object-storage transport would slot in
//! behind the same [`silo_sync::RemoteTransport`] seam.

use clap::{Args, ValueEnum};
use silo_store::Depot;
use silo_sync::{pull as sync_pull, push as sync_push, LocalTransport, PullMode};

use crate::config::DepotConfig;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct PushArgs {
    /// Remote depot path. Falls back to the configured default remote.
    #[arg(long)]
    pub remote: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum PullModeArg {
    #[default]
    Default,
    Complete,
    PostStatus,
}

#[derive(Args, Debug)]
pub struct PullArgs {
    /// Remote depot path. Falls back to the configured default remote.
    #[arg(long)]
    pub remote: Option<String>,
    /// Which pull strategy to use
    #[arg(long, value_enum, default_value_t)]
    pub mode: PullModeArg,
    /// Status id to pull up to, required when `--mode post-status`
    #[arg(long)]
    pub target: Option<String>,
}

pub async fn push(args: PushArgs, config: &DepotConfig, format: OutputFormat) -> anyhow::Result<()> {
    let depot = Depot::open(&config.depot_root);
    let remote_root = config.require_remote(args.remote)?;
    let transport = LocalTransport::new(&remote_root);

    sync_push(&depot, &transport).await?;

    match format {
        OutputFormat::Text => println!("pushed to {}", remote_root.display()),
        OutputFormat::Json => {
            let obj = serde_json::json!({ "remote": remote_root });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}

pub async fn pull(args: PullArgs, config: &DepotConfig, format: OutputFormat) -> anyhow::Result<()> {
    let depot = Depot::open(&config.depot_root);
    let remote_root = config.require_remote(args.remote)?;
    let transport = LocalTransport::new(&remote_root);

    let mode = match args.mode {
        PullModeArg::Default => PullMode::Default,
        PullModeArg::Complete => PullMode::Complete,
        PullModeArg::PostStatus => {
            let target = args
                .target
                .ok_or_else(|| anyhow::anyhow!("--mode post-status requires --target <status-id>"))?;
            PullMode::PostStatus(silo_core::StatusId::from_raw(target))
        }
    };

    let pulled = sync_pull(&depot, &transport, mode).await?;

    match format {
        OutputFormat::Text => {
            println!("pulled {} run(s) from {}", pulled.len(), remote_root.display());
        }
        OutputFormat::Json => {
            let ids: Vec<&str> = pulled.iter().map(|id| id.as_str()).collect();
            let obj = serde_json::json!({ "remote": remote_root, "pulled_runs": ids });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}
