// SPDX-License-Identifier: MIT

//! Encodes events into self-describing file names plus a small payload, and
//! decodes them back. The name alone carries enough information (handler,
//! timestamp, status, content digest) to filter and sort a run's events
//! without decompressing anything; [`PartialEvent::extend`] is the lazy
//! step that pulls in the remaining fields from the payload bytes.

use sha2::{Digest as _, Sha256};
use silo_core::{CollectionEvent, Event, RegistrationEvent, SourceStatus};
use smol_str::SmolStr;

use crate::error::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Collection,
    Registration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventName {
    pub kind: EventKind,
    pub handler: SmolStr,
    pub timestamp_ms: Option<u64>,
    pub status: Option<SourceStatus>,
    pub digest: String,
}

fn status_token(status: SourceStatus) -> &'static str {
    match status {
        SourceStatus::Todo => "TODO",
        SourceStatus::Processing => "PROCESSING",
        SourceStatus::Processed => "PROCESSED",
        SourceStatus::PersistentProcessed => "PERSISTENT_PROCESSED",
        SourceStatus::CacheLoaded => "CACHE_LOADED",
        SourceStatus::PersistentCached => "PERSISTENT_CACHED",
        SourceStatus::ParsingError => "PARSING_ERROR",
        SourceStatus::ConnectionError => "CONNECTION_ERROR",
        SourceStatus::SessionBroken => "SESSION_BROKEN",
    }
}

fn parse_status_token(token: &str) -> Option<SourceStatus> {
    Some(match token {
        "TODO" => SourceStatus::Todo,
        "PROCESSING" => SourceStatus::Processing,
        "PROCESSED" => SourceStatus::Processed,
        "PERSISTENT_PROCESSED" => SourceStatus::PersistentProcessed,
        "CACHE_LOADED" => SourceStatus::CacheLoaded,
        "PERSISTENT_CACHED" => SourceStatus::PersistentCached,
        "PARSING_ERROR" => SourceStatus::ParsingError,
        "CONNECTION_ERROR" => SourceStatus::ConnectionError,
        "SESSION_BROKEN" => SourceStatus::SessionBroken,
        _ => return None,
    })
}

impl EventName {
    pub fn encode(&self) -> String {
        match self.kind {
            EventKind::Collection => format!(
                "c-{}-{:x}-{}-{}",
                self.handler,
                self.timestamp_ms.unwrap_or_default(),
                status_token(self.status.unwrap_or(SourceStatus::Todo)),
                self.digest
            ),
            EventKind::Registration => format!("r-{}-{}", self.handler, self.digest),
        }
    }

    pub fn parse(name: &str) -> Result<Self, StoreError> {
        let malformed = || StoreError::MalformedEventName(name.to_string());
        let parts: Vec<&str> = name.split('-').collect();
        if parts.len() < 3 {
            return Err(malformed());
        }
        let digest = parts.last().ok_or_else(malformed)?.to_string();
        match parts[0] {
            "c" => {
                if parts.len() < 5 {
                    return Err(malformed());
                }
                let status = parse_status_token(parts[parts.len() - 2]).ok_or_else(malformed)?;
                let timestamp_ms = u64::from_str_radix(parts[parts.len() - 3], 16)
                    .map_err(|_| malformed())?;
                let handler = parts[1..parts.len() - 3].join("-");
                if handler.is_empty() {
                    return Err(malformed());
                }
                Ok(Self {
                    kind: EventKind::Collection,
                    handler: SmolStr::new(handler),
                    timestamp_ms: Some(timestamp_ms),
                    status: Some(status),
                    digest,
                })
            }
            "r" => {
                let handler = parts[1..parts.len() - 1].join("-");
                if handler.is_empty() {
                    return Err(malformed());
                }
                Ok(Self {
                    kind: EventKind::Registration,
                    handler: SmolStr::new(handler),
                    timestamp_ms: None,
                    status: None,
                    digest,
                })
            }
            _ => Err(malformed()),
        }
    }
}

fn digest_of(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn encode_payload(event: &Event) -> String {
    match event {
        Event::Collection(e) => format!(
            "{}\n{}\n{}\n{}",
            e.url,
            e.content_digest.as_deref().unwrap_or(""),
            e.expiry_seconds.map(|s| s.to_string()).unwrap_or_default(),
            e.message.as_deref().unwrap_or("")
        ),
        Event::Registration(e) => format!(
            "{}\n{}\n{}",
            e.url,
            e.expiry_seconds.map(|s| s.to_string()).unwrap_or_default(),
            if e.overwrite { "T" } else { "F" }
        ),
    }
}

/// Encodes a full event into its `(name, payload)` pair, ready to be
/// written as a single zip entry in a run's `events.zip`.
pub fn encode_event(event: &Event) -> (String, String) {
    let payload = encode_payload(event);
    let digest = digest_of(&payload);
    let name = match event {
        Event::Collection(e) => EventName {
            kind: EventKind::Collection,
            handler: e.handler.clone(),
            timestamp_ms: Some(e.timestamp_ms),
            status: Some(e.status),
            digest,
        },
        Event::Registration(e) => EventName {
            kind: EventKind::Registration,
            handler: e.handler.clone(),
            timestamp_ms: None,
            status: None,
            digest,
        },
    };
    (name.encode(), payload)
}

/// A decoded event name, not yet joined with its payload. Reading the list
/// of entry names out of a run's `events.zip` costs one listing; reading
/// every payload costs one decompression per event. Callers that only need
/// to filter by handler/status/timestamp should stay at this level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialEvent {
    pub name: EventName,
}

impl PartialEvent {
    pub fn from_entry_name(entry_name: &str) -> Result<Self, StoreError> {
        Ok(Self {
            name: EventName::parse(entry_name)?,
        })
    }

    /// Materializes the full event given the entry's decompressed payload.
    pub fn extend(&self, payload: &str) -> Result<Event, StoreError> {
        let malformed = || StoreError::MalformedEventPayload(payload.to_string());
        match self.name.kind {
            EventKind::Collection => {
                let mut fields = payload.splitn(4, '\n');
                let url = fields.next().ok_or_else(malformed)?.to_string();
                let content_digest = fields.next().ok_or_else(malformed)?;
                let expiry = fields.next().ok_or_else(malformed)?;
                let message = fields.next().unwrap_or("");
                Ok(Event::Collection(CollectionEvent {
                    handler: self.name.handler.clone(),
                    url,
                    timestamp_ms: self.name.timestamp_ms.unwrap_or_default(),
                    status: self.name.status.unwrap_or(SourceStatus::Todo),
                    content_digest: (!content_digest.is_empty())
                        .then(|| content_digest.to_string()),
                    expiry_seconds: expiry.parse::<u64>().ok(),
                    message: (!message.is_empty()).then(|| message.to_string()),
                }))
            }
            EventKind::Registration => {
                let mut fields = payload.splitn(3, '\n');
                let url = fields.next().ok_or_else(malformed)?.to_string();
                let expiry = fields.next().unwrap_or("");
                let overwrite = fields.next().unwrap_or("") == "T";
                Ok(Event::Registration(RegistrationEvent {
                    handler: self.name.handler.clone(),
                    url,
                    expiry_seconds: expiry.parse::<u64>().ok(),
                    overwrite,
                }))
            }
        }
    }
}

#[cfg(test)]
#[path = "event_codec_tests.rs"]
mod tests;
