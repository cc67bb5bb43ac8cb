// SPDX-License-Identifier: MIT

//! A generic handler that treats any non-empty response as successfully
//! parsed content, with no link discovery and no persistence. Concrete
//! parsing logic is out of scope for this workspace (fetch/parse policy
//! is caller-supplied per spec), but a crawl needs *some* default handler
//! to be runnable out of the box — this is that default.

use silo_core::{CapabilitySet, CoreError, Handler, ParsedUnit};

pub struct RawBytesHandler {
    name: String,
}

impl RawBytesHandler {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Handler for RawBytesHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new()
    }

    fn parse(&self, url: &str, content: &[u8]) -> Result<ParsedUnit, CoreError> {
        if content.is_empty() {
            return Err(CoreError::HandlerRejected {
                handler: self.name.clone(),
                url: url.to_string(),
                reason: "empty response body".into(),
            });
        }
        Ok(ParsedUnit::default())
    }
}

#[cfg(test)]
#[path = "raw_bytes_handler_tests.rs"]
mod tests;
