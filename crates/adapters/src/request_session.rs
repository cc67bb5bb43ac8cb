// SPDX-License-Identifier: MIT

//! The default production [`Session`]: a plain HTTP client, one per
//! session slot, reused across fetches until the scheduler decides to
//! recycle it.

use async_trait::async_trait;
use parking_lot::Mutex;
use silo_core::FetchOutcome;
use tracing::instrument;

use crate::error::AdapterError;
use crate::session::Session;

pub struct RequestSession {
    id: String,
    client: reqwest::Client,
    alive: Mutex<bool>,
}

impl RequestSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            client: reqwest::Client::new(),
            alive: Mutex::new(false),
        }
    }
}

#[async_trait]
impl Session for RequestSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self) -> Result<(), AdapterError> {
        *self.alive.lock() = true;
        Ok(())
    }

    #[instrument(skip(self), fields(session_id = %self.id, url = %url))]
    async fn fetch(&self, url: &str) -> FetchOutcome {
        if !*self.alive.lock() {
            return FetchOutcome::BrokenSession {
                detail: "session not started".into(),
            };
        }
        match self.client.get(url).send().await {
            Ok(response) if response.status().is_success() => match response.bytes().await {
                Ok(bytes) => FetchOutcome::Ok(bytes.to_vec()),
                Err(err) => FetchOutcome::Other(err.to_string()),
            },
            Ok(response) if response.status().is_server_error() => FetchOutcome::TransientHttp {
                status: Some(response.status().as_u16()),
                detail: response.status().to_string(),
            },
            Ok(response) => FetchOutcome::Other(format!("unexpected status {}", response.status())),
            Err(err) if err.is_timeout() => FetchOutcome::Timeout,
            Err(err) if err.is_connect() => FetchOutcome::BrokenSession {
                detail: err.to_string(),
            },
            Err(err) => FetchOutcome::Other(err.to_string()),
        }
    }

    async fn is_alive(&self) -> bool {
        *self.alive.lock()
    }

    async fn stop(&self) {
        *self.alive.lock() = false;
    }
}

#[cfg(test)]
#[path = "request_session_tests.rs"]
mod tests;
