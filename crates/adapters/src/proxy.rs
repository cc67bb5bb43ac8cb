// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use parking_lot::Mutex;
use silo_core::{ProxyHandle, ProxyProvider};

/// A fixed pool of proxy addresses handed out round-robin. Used as the
/// default provider when no real proxy list is configured, and as the
/// backend for tests.
pub struct FakeProxyProvider {
    addresses: Vec<String>,
    next: Mutex<usize>,
}

impl FakeProxyProvider {
    pub fn new(addresses: Vec<String>) -> Self {
        Self {
            addresses,
            next: Mutex::new(0),
        }
    }

    pub fn single(address: impl Into<String>) -> Self {
        Self::new(vec![address.into()])
    }
}

#[async_trait]
impl ProxyProvider for FakeProxyProvider {
    async fn acquire(&self, _capability_hint: &str) -> Option<ProxyHandle> {
        if self.addresses.is_empty() {
            return None;
        }
        let mut next = self.next.lock();
        let address = self.addresses[*next % self.addresses.len()].clone();
        *next += 1;
        Some(ProxyHandle { address })
    }

    async fn release(&self, _handle: ProxyHandle) {}
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
