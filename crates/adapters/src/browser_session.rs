// SPDX-License-Identifier: MIT

//! Describes the shape a headless-browser-backed [`Session`] would take.
//! Driving an actual browser process is explicitly out of scope — this
//! type exists so the engine has something concrete to schedule against
//! in tests and so a real implementation has a documented seam to fill in.

use async_trait::async_trait;
use parking_lot::Mutex;
use silo_core::FetchOutcome;

use crate::error::AdapterError;
use crate::session::Session;

pub struct BrowserSession {
    id: String,
    alive: Mutex<bool>,
}

impl BrowserSession {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            alive: Mutex::new(false),
        }
    }
}

#[async_trait]
impl Session for BrowserSession {
    fn id(&self) -> &str {
        &self.id
    }

    async fn start(&self) -> Result<(), AdapterError> {
        *self.alive.lock() = true;
        Ok(())
    }

    async fn fetch(&self, _url: &str) -> FetchOutcome {
        FetchOutcome::Other("browser driving is not implemented in this workspace".into())
    }

    async fn is_alive(&self) -> bool {
        *self.alive.lock()
    }

    async fn stop(&self) {
        *self.alive.lock() = false;
    }
}
