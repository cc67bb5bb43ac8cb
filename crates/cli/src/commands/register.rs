// SPDX-License-Identifier: MIT

//! `silo register`: commits a standalone run of pure registration events,
//! the same shape a handler's own link discovery would produce, and
//! integrates it immediately.

use clap::Args;
use silo_core::{Clock, Event, RegistrationEvent, RunContext, SystemClock};
use silo_store::Depot;

use crate::config::DepotConfig;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct RegisterArgs {
    /// Handler the urls belong to
    pub handler: String,
    /// One or more urls to register
    #[arg(required = true)]
    pub urls: Vec<String>,
    /// Reset any already-registered matching rows back to TODO
    #[arg(long)]
    pub overwrite: bool,
    /// Seconds until a persistent/cache row becomes eligible again
    #[arg(long, value_name = "SECONDS")]
    pub expiry_seconds: Option<u64>,
}

pub fn handle(args: RegisterArgs, config: &DepotConfig, format: OutputFormat) -> anyhow::Result<()> {
    let depot = Depot::open(&config.depot_root);
    let clock = SystemClock;

    let events: Vec<Event> = args
        .urls
        .iter()
        .map(|url| {
            Event::Registration(RegistrationEvent {
                handler: args.handler.clone().into(),
                url: url.clone(),
                expiry_seconds: args.expiry_seconds,
                overwrite: args.overwrite,
            })
        })
        .collect();

    let context = RunContext {
        commit_hash: Some(env!("BUILD_GIT_HASH").to_string()),
        start_timestamp_ms: clock.epoch_ms(),
        dependency_freeze: None,
    };
    let run_id = depot.commit_run(&events, &context)?;
    let status_id = depot.integrate(run_id.clone(), clock.epoch_ms())?;

    match format {
        OutputFormat::Text => {
            println!(
                "registered {} url(s) for '{}' (run {run_id}, status {status_id})",
                args.urls.len(),
                args.handler,
            );
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "handler": args.handler,
                "registered": args.urls.len(),
                "run_id": run_id.as_str(),
                "status_id": status_id.as_str(),
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}
