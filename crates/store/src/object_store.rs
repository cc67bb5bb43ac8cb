// SPDX-License-Identifier: MIT

//! Content-addressed blob storage. Every blob is written as a single-entry
//! zip archive named `{sha256-digest}.{ext}`, sharded into a two-character
//! prefix directory so no single directory accumulates millions of entries.
//! Writes are idempotent: dumping the same bytes twice is a no-op the
//! second time, since the digest (and therefore the path) is identical.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest as _, Sha256};

use crate::error::StoreError;

/// The single entry name used inside every blob's zip container, matching
/// the one-entry-per-archive convention the depot's other zip artifacts
/// (`events.zip`, queue snapshots) also follow.
const ENTRY_NAME: &str = "content";

/// Disambiguates concurrent writers' temp files for the same digest so two
/// tasks dumping byte-identical content never race on one `tmp_path`.
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

/// Dispatches a value to the right typed dump method, mirroring the
/// original depot's `dump` convenience that picks an encoding by shape.
pub enum Blob<'a> {
    Json(&'a [u8]),
    Text(&'a str),
    Bytes(&'a [u8]),
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn digest_of(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }

    fn path_for(&self, digest: &str, ext: &str) -> PathBuf {
        let prefix = &digest[..digest.len().min(2)];
        self.root.join(prefix).join(format!("{digest}.{ext}"))
    }

    /// Writes `bytes` under its content digest if not already present.
    /// Returns the digest, which together with `ext` identifies the blob.
    pub fn dump_bytes(&self, ext: &str, bytes: &[u8]) -> Result<String, StoreError> {
        let digest = Self::digest_of(bytes);
        let path = self.path_for(&digest, ext);
        if path.exists() {
            return Ok(digest);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let unique = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_path = path.with_extension(format!("{ext}.{}.{unique}.tmp", std::process::id()));
        {
            let file =
                std::fs::File::create(&tmp_path).map_err(|e| StoreError::io(&tmp_path, e))?;
            let mut writer = zip::ZipWriter::new(file);
            let options = zip::write::FileOptions::default()
                .compression_method(zip::CompressionMethod::Deflated);
            writer.start_file(ENTRY_NAME, options)?;
            writer
                .write_all(bytes)
                .map_err(|e| StoreError::io(&tmp_path, e))?;
            writer.finish()?;
        }
        std::fs::rename(&tmp_path, &path).map_err(|e| StoreError::io(&path, e))?;
        Ok(digest)
    }

    pub fn read_bytes(&self, digest: &str, ext: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(digest, ext);
        let file = std::fs::File::open(&path)
            .map_err(|_| StoreError::NotFound(format!("{digest}.{ext}")))?;
        let mut archive = zip::ZipArchive::new(file)?;
        let mut entry = archive.by_name(ENTRY_NAME)?;
        let mut buf = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buf)
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(buf)
    }

    pub fn exists(&self, digest: &str, ext: &str) -> bool {
        self.path_for(digest, ext).exists()
    }

    pub fn dump_json<T: Serialize>(&self, value: &T) -> Result<String, StoreError> {
        let bytes = serde_json::to_vec(value)?;
        self.dump_bytes("json", &bytes)
    }

    pub fn read_json<T: DeserializeOwned>(&self, digest: &str) -> Result<T, StoreError> {
        let bytes = self.read_bytes(digest, "json")?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn dump_text(&self, text: &str) -> Result<String, StoreError> {
        self.dump_bytes("txt", text.as_bytes())
    }

    pub fn read_text(&self, digest: &str) -> Result<String, StoreError> {
        let bytes = self.read_bytes(digest, "txt")?;
        String::from_utf8(bytes).map_err(|e| StoreError::CorruptQueue(e.to_string()))
    }

    pub fn dump_auto(&self, blob: Blob<'_>) -> Result<String, StoreError> {
        match blob {
            Blob::Json(bytes) => self.dump_bytes("json", bytes),
            Blob::Text(text) => self.dump_text(text),
            Blob::Bytes(bytes) => self.dump_bytes("bin", bytes),
        }
    }
}

#[cfg(test)]
#[path = "object_store_tests.rs"]
mod tests;
