// SPDX-License-Identifier: MIT

//! `silo status show|leaf`: inspect the status lineage without mutating
//! anything.

use clap::{Args, Subcommand};
use silo_store::Depot;

use crate::config::DepotConfig;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(subcommand)]
    pub command: StatusCommand,
}

#[derive(Subcommand, Debug)]
pub enum StatusCommand {
    /// Print the currently checked-out status
    Show,
    /// Print the leaf status with the largest full run tree and check it
    /// out
    Leaf,
}

pub fn handle(args: StatusArgs, config: &DepotConfig, format: OutputFormat) -> anyhow::Result<()> {
    let depot = Depot::open(&config.depot_root);
    let status_id = match args.command {
        StatusCommand::Show => depot.current_status()?,
        StatusCommand::Leaf => depot.checkout_complete()?,
    };
    let tree_size = depot.full_run_tree(&status_id)?.len();
    let queue_len = depot.current_queue()?.len();

    match format {
        OutputFormat::Text => {
            println!("status {status_id} ({tree_size} integrated run(s), {queue_len} queued url(s))");
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "status_id": status_id.as_str(),
                "integrated_runs": tree_size,
                "queued_urls": queue_len,
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}
