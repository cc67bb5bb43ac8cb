// SPDX-License-Identifier: MIT

//! `silo run`: drains pending urls for one or more handlers through the
//! engine, then commits and integrates whatever events the pass produced.

use std::collections::HashMap;
use std::sync::Arc;

use clap::Args;
use silo_adapters::{RawBytesHandler, RequestSession, Session};
use silo_core::{CapabilitySet, Clock, Event, Handler, ResourceLimitSet, RunContext, SystemClock, TaskId};
use silo_engine::{CapacityTracker, Orchestrator, SessionFactory, Task, TaskQueue, TokioDriver};
use silo_store::Depot;

use crate::config::DepotConfig;
use crate::output::OutputFormat;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Handlers to drain. Defaults to every handler with pending rows in
    /// the current queue.
    pub handlers: Vec<String>,
    /// Maximum rows pulled off the queue per handler for this pass
    #[arg(long, default_value_t = 100)]
    pub batch_size: usize,
}

pub async fn handle(args: RunArgs, config: &DepotConfig, format: OutputFormat) -> anyhow::Result<()> {
    let depot = Depot::open(&config.depot_root);
    let clock = SystemClock;
    let mut queue = depot.current_queue()?;

    let handler_names: Vec<String> = if args.handlers.is_empty() {
        let mut names: Vec<String> = queue.rows().map(|row| row.handler.clone()).collect();
        names.sort();
        names.dedup();
        names
    } else {
        args.handlers.clone()
    };

    if handler_names.is_empty() {
        println!("nothing registered to run");
        return Ok(());
    }

    let mut handlers: HashMap<String, Arc<dyn Handler>> = HashMap::new();
    let mut task_queue = TaskQueue::new();
    for name in &handler_names {
        let handler: Arc<dyn Handler> = Arc::new(RawBytesHandler::new(name.clone()));
        for row in queue.next_batch(name, args.batch_size, true) {
            task_queue.push(Task {
                id: TaskId::new(),
                handler: name.clone(),
                url: row.url,
                capabilities: handler.capabilities(),
            });
        }
        handlers.insert(name.clone(), handler);
    }

    if task_queue.is_empty() {
        println!("no pending urls for {}", handler_names.join(", "));
        return Ok(());
    }

    let session_factory: SessionFactory = Arc::new(|task: &Task| {
        Arc::new(RequestSession::new(task.id.to_string())) as Arc<dyn Session>
    });
    let orchestrator = Orchestrator::new(handlers, session_factory, depot.objects.clone());
    let capacity = CapacityTracker::new(CapabilitySet::new(), ResourceLimitSet::new());

    let events = orchestrator.drain(task_queue, capacity, &TokioDriver, &clock).await?;

    if events.is_empty() {
        println!("run produced no events");
        return Ok(());
    }

    let context = RunContext {
        commit_hash: Some(env!("BUILD_GIT_HASH").to_string()),
        start_timestamp_ms: clock.epoch_ms(),
        dependency_freeze: None,
    };
    let run_id = depot.commit_run(&events, &context)?;
    let status_id = depot.integrate(run_id.clone(), clock.epoch_ms())?;

    let mut successes = 0usize;
    let mut failures = 0usize;
    let mut registrations = 0usize;
    for event in &events {
        match event {
            Event::Collection(c) if c.is_success() => successes += 1,
            Event::Collection(_) => failures += 1,
            Event::Registration(_) => registrations += 1,
        }
    }

    match format {
        OutputFormat::Text => {
            println!(
                "run {run_id}: {successes} ok, {failures} failed, {registrations} new registration(s) (status {status_id})"
            );
        }
        OutputFormat::Json => {
            let obj = serde_json::json!({
                "run_id": run_id.as_str(),
                "status_id": status_id.as_str(),
                "successes": successes,
                "failures": failures,
                "registrations": registrations,
            });
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
    }
    Ok(())
}
