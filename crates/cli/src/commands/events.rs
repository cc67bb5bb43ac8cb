// SPDX-License-Identifier: MIT

//! `silo events`: the read surface over a handler's history within the
//! current workspace's full run tree.

use clap::Args;
use silo_core::Event;
use silo_store::{Depot, EventScope};

use crate::config::DepotConfig;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct EventsArgs {
    /// Handler to read events for
    pub handler: String,
    /// Only include successful collection events
    #[arg(long)]
    pub successful_only: bool,
    /// Collapse to the single latest event per url
    #[arg(long)]
    pub latest_only: bool,
}

pub fn handle(args: EventsArgs, config: &DepotConfig, format: OutputFormat) -> anyhow::Result<()> {
    let depot = Depot::open(&config.depot_root);
    let mut events = depot.handler_events(
        &args.handler,
        args.successful_only,
        args.latest_only,
        EventScope::CurrentWorkspace,
    )?;
    events.sort_by(|a, b| a.url().cmp(b.url()));

    match format {
        OutputFormat::Text => {
            if events.is_empty() {
                println!("no events for '{}'", args.handler);
            }
            for event in &events {
                println!("{}", describe(event));
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
    }
    Ok(())
}

fn describe(event: &Event) -> String {
    match event {
        Event::Collection(c) => format!(
            "{} {} {} {}",
            c.timestamp_ms,
            c.status,
            c.url,
            c.message.as_deref().unwrap_or("")
        )
        .trim_end()
        .to_string(),
        Event::Registration(r) => format!("registration {} (overwrite={})", r.url, r.overwrite),
    }
}
