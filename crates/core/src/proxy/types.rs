use std::time::Duration;

use serde::Serialize;

use super::ProxyEndpoint;
use crate::config::ProxyConfig;
use crate::gate::SlotGate;

/// A configured upstream proxy backed by a [`SlotGate`].
#[derive(Debug)]
pub struct Proxy {
    name: String,
    base_url: String,
    requests_per_minute: u32,
    gate: SlotGate,
}

impl Proxy {
    /// Create a proxy whose gate starts full with `burst` slots.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        requests_per_minute: u32,
        burst: u32,
    ) -> Self {
        Self::with_gate(name, base_url, requests_per_minute, SlotGate::new(burst))
    }

    pub fn with_gate(
        name: impl Into<String>,
        base_url: impl Into<String>,
        requests_per_minute: u32,
        gate: SlotGate,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into(),
            requests_per_minute,
            gate,
        }
    }

    pub fn from_config(config: &ProxyConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.base_url.clone(),
            config.requests_per_minute,
            config.burst,
        )
    }

    pub fn gate(&self) -> &SlotGate {
        &self.gate
    }

    pub fn requests_per_minute(&self) -> u32 {
        self.requests_per_minute
    }

    /// Time between two single-slot refills.
    pub fn refill_interval(&self) -> Duration {
        Duration::from_secs(60) / self.requests_per_minute.max(1)
    }

    /// Snapshot for status reporting.
    pub fn status(&self) -> ProxyStatus {
        ProxyStatus {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            requests_per_minute: self.requests_per_minute,
            burst: self.gate.capacity(),
            available: self.gate.available(),
        }
    }
}

impl ProxyEndpoint for Proxy {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn try_acquire_capacity(&self) -> bool {
        self.gate.try_acquire()
    }
}

/// Point-in-time view of a proxy's capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyStatus {
    pub name: String,
    pub base_url: String,
    pub requests_per_minute: u32,
    pub burst: u32,
    pub available: u32,
}
