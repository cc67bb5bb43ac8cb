// SPDX-License-Identifier: MIT

//! The persistent source-URL table: one row per `(handler, url)`, holding
//! its current [`SourceStatus`]. Successful, non-persistent rows are
//! deleted from the table once their collection event is integrated —
//! there is nothing further to track once a one-shot fetch has succeeded.
//! `Persistent*`/`Cache*` rows stay in the table across integrations so
//! their expiry (if any) can be tracked.
//!
//! On disk the table is a JSON snapshot inside a single-entry zip
//! container, following the same "one file, one zip entry" shape as every
//! other depot artifact, named to match the original `db.sqlite` naming
//! convention (`queue.sqlite.zip`) without pulling in an embedded SQL
//! engine this crate otherwise has no use for (see `DESIGN.md`).

use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use silo_core::{Event, SourceStatus};

use crate::error::StoreError;

const ENTRY_NAME: &str = "table.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRow {
    pub handler: String,
    pub url: String,
    pub status: SourceStatus,
    pub expiry_seconds: Option<u64>,
    pub processed_at_ms: Option<u64>,
    pub fail_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Queue {
    rows: BTreeMap<(String, String), SourceRow>,
}

impl Queue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &SourceRow> {
        self.rows.values()
    }

    pub fn get(&self, handler: &str, url: &str) -> Option<&SourceRow> {
        self.rows.get(&(handler.to_string(), url.to_string()))
    }

    /// Registers `url` for `handler` if not already present. Returns
    /// `true` if a new row was inserted. Equivalent to
    /// [`Queue::add_url_overwrite`] with `overwrite = false`.
    pub fn add_url(&mut self, handler: &str, url: &str, expiry_seconds: Option<u64>) -> bool {
        self.add_url_overwrite(handler, url, expiry_seconds, false)
    }

    /// Registers `url` for `handler`. If a row already exists for this
    /// `(handler, url)` and `overwrite` is true, its status is reset to
    /// `Todo` (spec.md §4.E `add_urls`); if `overwrite` is false the
    /// existing row is left untouched. Returns `true` if a new row was
    /// inserted.
    pub fn add_url_overwrite(
        &mut self,
        handler: &str,
        url: &str,
        expiry_seconds: Option<u64>,
        overwrite: bool,
    ) -> bool {
        let key = (handler.to_string(), url.to_string());
        if let Some(row) = self.rows.get_mut(&key) {
            if overwrite {
                row.status = SourceStatus::Todo;
                row.processed_at_ms = None;
            }
            return false;
        }
        self.rows.insert(
            key,
            SourceRow {
                handler: handler.to_string(),
                url: url.to_string(),
                status: SourceStatus::Todo,
                expiry_seconds,
                processed_at_ms: None,
                fail_count: 0,
            },
        );
        true
    }

    /// Selects up to `limit` rows for `handler` in status `Todo` or
    /// `SessionBroken` (spec.md §4.E), and — when `to_processing` is true —
    /// atomically promotes them to `Processing` before returning them.
    pub fn next_batch(&mut self, handler: &str, limit: usize, to_processing: bool) -> Vec<SourceRow> {
        let keys: Vec<(String, String)> = self
            .rows
            .iter()
            .filter(|(_, row)| {
                row.handler == handler
                    && matches!(row.status, SourceStatus::Todo | SourceStatus::SessionBroken)
            })
            .take(limit)
            .map(|(key, _)| key.clone())
            .collect();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(row) = self.rows.get_mut(&key) {
                if to_processing {
                    row.status = SourceStatus::Processing;
                }
                out.push(row.clone());
            }
        }
        out
    }

    /// Reverts every `Processing` row back to `Todo`. Used on startup to
    /// recover rows left mid-flight by a crashed previous run. Equivalent
    /// to [`Queue::reset`] with `&[SourceStatus::Processing]`.
    pub fn reset_processing(&mut self) {
        self.reset(&[SourceStatus::Processing]);
    }

    /// Sets every row whose status is in `statuses` back to `Todo` (spec.md
    /// §4.E `reset`). Used to retry errors (`ConnectionError`,
    /// `ParsingError`, `SessionBroken`) after a crash, or to recover
    /// `Processing` rows left mid-flight.
    pub fn reset(&mut self, statuses: &[SourceStatus]) {
        for row in self.rows.values_mut() {
            if statuses.contains(&row.status) {
                row.status = SourceStatus::Todo;
            }
        }
    }

    /// Re-queues persistent/cache rows whose `expiry_seconds` has elapsed
    /// since they were last processed.
    pub fn reset_expired(&mut self, now_ms: u64) {
        for row in self.rows.values_mut() {
            if !row.status.is_persistent() {
                continue;
            }
            let (Some(expiry), Some(processed_at)) = (row.expiry_seconds, row.processed_at_ms) else {
                continue;
            };
            if now_ms.saturating_sub(processed_at) >= expiry.saturating_mul(1000) {
                row.status = SourceStatus::Todo;
                row.processed_at_ms = None;
            }
        }
    }

    /// Applies a batch of events atomically: registrations add rows,
    /// collection events transition or delete rows. Either every event
    /// applies or (on the first malformed event) none of the later ones
    /// do — callers should only pass already-integrated runs, so this is a
    /// defensive measure rather than an expected failure path.
    pub fn integrate_events(&mut self, events: &[Event], now_ms: u64) -> Result<(), StoreError> {
        for event in events {
            match event {
                Event::Registration(e) => {
                    self.add_url_overwrite(&e.handler, &e.url, e.expiry_seconds, e.overwrite);
                }
                Event::Collection(e) => {
                    let key = (e.handler.to_string(), e.url.clone());
                    if e.is_success() {
                        if e.status.is_persistent() {
                            let row = self.rows.entry(key).or_insert_with(|| SourceRow {
                                handler: e.handler.to_string(),
                                url: e.url.clone(),
                                status: e.status,
                                expiry_seconds: e.expiry_seconds,
                                processed_at_ms: None,
                                fail_count: 0,
                            });
                            row.status = e.status;
                            row.expiry_seconds = e.expiry_seconds.or(row.expiry_seconds);
                            row.processed_at_ms = Some(now_ms);
                        } else {
                            self.rows.remove(&key);
                        }
                    } else {
                        let row = self.rows.entry(key).or_insert_with(|| SourceRow {
                            handler: e.handler.to_string(),
                            url: e.url.clone(),
                            status: e.status,
                            expiry_seconds: None,
                            processed_at_ms: None,
                            fail_count: 0,
                        });
                        row.status = e.status;
                        row.fail_count += 1;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let file = std::fs::File::create(path).map_err(|e| StoreError::io(path, e))?;
        let mut writer = zip::ZipWriter::new(file);
        let options =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        writer.start_file(ENTRY_NAME, options)?;
        let bytes = serde_json::to_vec(self)?;
        writer
            .write_all(&bytes)
            .map_err(|e| StoreError::io(path, e))?;
        writer.finish()?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            return Ok(Self::new());
        }
        let file = std::fs::File::open(path).map_err(|e| StoreError::io(path, e))?;
        let mut archive = zip::ZipArchive::new(file)?;
        let mut entry = archive.by_name(ENTRY_NAME)?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| StoreError::io(path, e))?;
        Ok(serde_json::from_slice(&buf).map_err(|e| StoreError::CorruptQueue(e.to_string()))?)
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
