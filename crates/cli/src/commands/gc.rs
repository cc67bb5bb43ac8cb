// SPDX-License-Identifier: MIT

//! `silo gc`: the minimal version of the future garbage-collection pass
//! spec.md leaves as an open question. Reports Collection events whose
//! referenced blob is missing from the object store. Never deletes
//! anything.

use clap::Args;
use silo_core::Event;
use silo_store::Depot;

use crate::config::DepotConfig;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct GcArgs {
    /// Report only, never delete. This is currently the only mode; a
    /// future pass may add a `--force` flag that actually prunes.
    #[arg(long, default_value_t = true)]
    pub dry_run: bool,
}

pub fn handle(args: GcArgs, config: &DepotConfig, format: OutputFormat) -> anyhow::Result<()> {
    if !args.dry_run {
        anyhow::bail!("gc only supports --dry-run; pruning orphaned objects is not implemented yet");
    }

    let depot = Depot::open(&config.depot_root);
    let leaf = depot.complete_status()?;
    let run_ids = depot.full_run_tree(&leaf)?;

    let mut missing = Vec::new();
    for run_id in &run_ids {
        for event in silo_store::run_archive::read_events(&depot.runs_dir(), run_id)? {
            if let Event::Collection(c) = event {
                if let Some(digest) = c.content_digest {
                    if !depot.objects.exists(&digest, "bin") {
                        missing.push((run_id.clone(), c.url, digest));
                    }
                }
            }
        }
    }

    match format {
        OutputFormat::Text => {
            if missing.is_empty() {
                println!("no orphaned object references across {} run(s)", run_ids.len());
            } else {
                for (run_id, url, digest) in &missing {
                    println!("missing object {digest} referenced by {url} (run {run_id})");
                }
                println!("{} orphaned reference(s) found, 0 deleted (dry run)", missing.len());
            }
        }
        OutputFormat::Json => {
            let entries: Vec<_> = missing
                .iter()
                .map(|(run_id, url, digest)| {
                    serde_json::json!({ "run_id": run_id.as_str(), "url": url, "digest": digest })
                })
                .collect();
            let obj = serde_json::json!({ "dry_run": true, "missing": entries });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}
