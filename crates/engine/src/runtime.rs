// SPDX-License-Identifier: MIT

//! The per-task state machine: `CheckHandler -> Initiate? -> Cache? ->
//! Fetch -> Restart`. Given a session and a handler, drives one url
//! through to a [`FetchResult`] without ever raising — every terminal
//! outcome, including session death, is a value.
//!
//! Grounded on the original `ConnectionSession`/`HandlingTask` state
//! machine: a session is (re)initiated lazily on first use, a broken
//! session is torn down and the caller is told to restart rather than the
//! task being silently dropped, and exceptions are classified into a fixed
//! small set of statuses instead of propagating arbitrary error types.

use std::time::Duration;

use silo_adapters::Session;
use silo_core::{FetchOutcome, Handler, ParsedUnit, SourceStatus};

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub handler: String,
    pub url: String,
    pub timestamp_ms: u64,
    pub status: SourceStatus,
    pub message: Option<String>,
    pub content: Option<Vec<u8>>,
    pub parsed: Option<ParsedUnit>,
    /// True when the session died and the caller should hand this handler
    /// a fresh session before its next fetch rather than reusing this one.
    pub needs_restart: bool,
}

fn sleep_seconds(seconds: f64) -> impl std::future::Future<Output = ()> {
    tokio::time::sleep(Duration::from_secs_f64(seconds.max(0.0)))
}

/// Runs one url through `CheckHandler -> Initiate -> Cache? -> Fetch`: starts
/// the session if it isn't alive yet, short-circuits on a cache hit, then
/// retries the fetch itself up to `handler.max_retries()` times before
/// giving up. Exactly one terminal [`FetchResult`] is produced per call,
/// regardless of how many attempts the Fetch step took internally.
pub async fn run_handling_task(
    session: &dyn Session,
    handler: &dyn Handler,
    url: &str,
    now_ms: u64,
) -> FetchResult {
    if !session.is_alive().await {
        if let Err(err) = session.start().await {
            return terminal(
                handler.name(),
                url,
                now_ms,
                SourceStatus::SessionBroken,
                Some(err.to_string()),
                true,
            );
        }
        if let Err(err) = handler.start_session().await {
            session.stop().await;
            return terminal(
                handler.name(),
                url,
                now_ms,
                SourceStatus::SessionBroken,
                Some(err.to_string()),
                true,
            );
        }
    }

    if let Some(cached) = handler.load_cache(url) {
        let status = if handler.process_indefinitely() {
            SourceStatus::PersistentCached
        } else {
            SourceStatus::CacheLoaded
        };
        return FetchResult {
            handler: handler.name().to_string(),
            url: url.to_string(),
            timestamp_ms: now_ms,
            status,
            message: None,
            content: Some(cached),
            parsed: None,
            needs_restart: false,
        };
    }

    handler.set_url(url);
    sleep_seconds(handler.get_sleep_time()).await;

    let max_attempts = handler.max_retries().max(1);
    let mut attempt = 0u32;
    loop {
        match session.fetch(url).await {
            FetchOutcome::Ok(bytes) => {
                let pre_parsed = handler.pre_parse(&bytes);
                return match handler.parse(url, &pre_parsed) {
                    Ok(mut parsed) => {
                        parsed.registrations.extend(handler.pop_registered_links());
                        let persistent = parsed.persistent || handler.process_indefinitely();
                        let status = if persistent {
                            SourceStatus::PersistentProcessed
                        } else {
                            SourceStatus::Processed
                        };
                        FetchResult {
                            handler: handler.name().to_string(),
                            url: url.to_string(),
                            timestamp_ms: now_ms,
                            status,
                            message: None,
                            content: Some(bytes),
                            parsed: Some(parsed),
                            needs_restart: false,
                        }
                    }
                    Err(err) => terminal(
                        handler.name(),
                        url,
                        now_ms,
                        SourceStatus::ParsingError,
                        Some(err.to_string()),
                        false,
                    ),
                };
            }
            FetchOutcome::BrokenSession { detail } => {
                session.stop().await;
                return terminal(
                    handler.name(),
                    url,
                    now_ms,
                    SourceStatus::SessionBroken,
                    Some(detail),
                    true,
                );
            }
            FetchOutcome::TransientHttp { status, detail } => {
                let message = format!("{detail} (status {status:?})");
                if handler.is_session_broken(&message) {
                    session.stop().await;
                    return terminal(
                        handler.name(),
                        url,
                        now_ms,
                        SourceStatus::SessionBroken,
                        Some(message),
                        true,
                    );
                }
                attempt += 1;
                if attempt >= max_attempts {
                    return terminal(
                        handler.name(),
                        url,
                        now_ms,
                        SourceStatus::ConnectionError,
                        Some(message),
                        false,
                    );
                }
                sleep_seconds(handler.get_retry_sleep_time()).await;
            }
            FetchOutcome::Timeout => {
                attempt += 1;
                if attempt >= max_attempts {
                    return terminal(
                        handler.name(),
                        url,
                        now_ms,
                        SourceStatus::ConnectionError,
                        Some("timed out".into()),
                        false,
                    );
                }
                sleep_seconds(handler.get_retry_sleep_time()).await;
            }
            FetchOutcome::Other(message) => {
                if handler.is_session_broken(&message) {
                    session.stop().await;
                    return terminal(
                        handler.name(),
                        url,
                        now_ms,
                        SourceStatus::SessionBroken,
                        Some(message),
                        true,
                    );
                }
                return terminal(
                    handler.name(),
                    url,
                    now_ms,
                    SourceStatus::ParsingError,
                    Some(message),
                    false,
                );
            }
        }
    }
}

fn terminal(
    handler: &str,
    url: &str,
    now_ms: u64,
    status: SourceStatus,
    message: Option<String>,
    needs_restart: bool,
) -> FetchResult {
    FetchResult {
        handler: handler.to_string(),
        url: url.to_string(),
        timestamp_ms: now_ms,
        status,
        message,
        content: None,
        parsed: None,
        needs_restart,
    }
}

#[cfg(test)]
#[path = "runtime_tests.rs"]
mod tests;
