// SPDX-License-Identifier: MIT

//! silo - a crawl orchestrator with a versioned, content-addressed depot

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{events, gc, register, run, status, sync};
use config::DepotConfig;
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "silo",
    version,
    about = "A crawl orchestrator with a versioned, content-addressed depot"
)]
struct Cli {
    /// Depot root directory
    #[arg(long, global = true, value_name = "DIR")]
    depot_root: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register one or more urls for a handler
    Register(register::RegisterArgs),
    /// Drain pending urls through the engine and commit the resulting events
    Run(run::RunArgs),
    /// Inspect the status lineage
    Status(status::StatusArgs),
    /// Read a handler's collection/registration history
    Events(events::EventsArgs),
    /// Push local runs, statuses, and objects to a remote
    Push(sync::PushArgs),
    /// Pull runs, statuses, and (optionally) objects from a remote
    Pull(sync::PullArgs),
    /// Report orphaned object references
    Gc(gc::GcArgs),
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("Error: {}", format_error(&err));
        std::process::exit(1);
    }
}

/// Formats an anyhow error, collapsing the source chain when the
/// top-level message already contains every cause (common with thiserror
/// `#[from]` variants), rendering the full chain otherwise.
fn format_error(err: &anyhow::Error) -> String {
    let top = err.to_string();
    let chain_redundant = err.chain().skip(1).all(|cause| top.contains(&cause.to_string()));
    if chain_redundant {
        return top;
    }
    let mut buf = top;
    for cause in err.chain().skip(1) {
        buf.push_str(&format!("\ncaused by: {cause}"));
    }
    buf
}

async fn run_cli() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = DepotConfig::resolve(cli.depot_root.clone(), None)?;
    let format = cli.output;

    match cli.command {
        Commands::Register(args) => register::handle(args, &config, format),
        Commands::Run(args) => run::handle(args, &config, format).await,
        Commands::Status(args) => status::handle(args, &config, format),
        Commands::Events(args) => events::handle(args, &config, format),
        Commands::Push(args) => sync::push(args, &config, format).await,
        Commands::Pull(args) => sync::pull(args, &config, format).await,
        Commands::Gc(args) => gc::handle(args, &config, format),
    }
}
