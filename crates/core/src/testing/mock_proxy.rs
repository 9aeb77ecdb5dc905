//! Mock proxy with scriptable capacity.

use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

use crate::proxy::ProxyEndpoint;

/// Mock implementation of the ProxyEndpoint trait.
///
/// Provides controllable behavior for testing:
/// - A finite number of slots, or unlimited capacity
/// - Granting extra slots from another thread mid-test
/// - Counting capacity checks and successful grants
#[derive(Debug)]
pub struct MockProxy {
    name: String,
    base_url: String,
    remaining: AtomicU32,
    unlimited: AtomicBool,
    checks: AtomicU64,
    granted: AtomicU64,
}

impl MockProxy {
    /// Mock with `slots` units of capacity.
    pub fn new(name: impl Into<String>, slots: u32) -> Self {
        let name = name.into();
        Self {
            base_url: format!("http://{}.mock", name),
            name,
            remaining: AtomicU32::new(slots),
            unlimited: AtomicBool::new(false),
            checks: AtomicU64::new(0),
            granted: AtomicU64::new(0),
        }
    }

    /// Mock that always has capacity.
    pub fn unlimited(name: impl Into<String>) -> Self {
        let proxy = Self::new(name, 0);
        proxy.set_unlimited();
        proxy
    }

    /// Switch to always having capacity.
    pub fn set_unlimited(&self) {
        self.unlimited.store(true, Ordering::Release);
    }

    /// Add `slots` units of capacity.
    pub fn grant(&self, slots: u32) {
        self.remaining.fetch_add(slots, Ordering::AcqRel);
    }

    /// Remove all capacity, including unlimited mode.
    pub fn exhaust(&self) {
        self.unlimited.store(false, Ordering::Release);
        self.remaining.store(0, Ordering::Release);
    }

    /// Units left (ignores unlimited mode).
    pub fn remaining(&self) -> u32 {
        self.remaining.load(Ordering::Acquire)
    }

    /// Number of capacity checks made against this proxy.
    pub fn checks(&self) -> u64 {
        self.checks.load(Ordering::Acquire)
    }

    /// Number of checks that consumed capacity.
    pub fn granted(&self) -> u64 {
        self.granted.load(Ordering::Acquire)
    }
}

impl ProxyEndpoint for MockProxy {
    fn name(&self) -> &str {
        &self.name
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn try_acquire_capacity(&self) -> bool {
        self.checks.fetch_add(1, Ordering::AcqRel);
        let ok = self.unlimited.load(Ordering::Acquire)
            || self
                .remaining
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
                .is_ok();
        if ok {
            self.granted.fetch_add(1, Ordering::AcqRel);
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_proxy_finite_slots() {
        let proxy = MockProxy::new("m", 2);
        assert!(proxy.try_acquire_capacity());
        assert!(proxy.try_acquire_capacity());
        assert!(!proxy.try_acquire_capacity());
        assert_eq!(proxy.checks(), 3);
        assert_eq!(proxy.granted(), 2);
    }

    #[test]
    fn test_mock_proxy_grant_and_exhaust() {
        let proxy = MockProxy::unlimited("m");
        assert!(proxy.try_acquire_capacity());

        proxy.exhaust();
        assert!(!proxy.try_acquire_capacity());

        proxy.grant(1);
        assert_eq!(proxy.remaining(), 1);
        assert!(proxy.try_acquire_capacity());
        assert_eq!(proxy.remaining(), 0);
    }

    #[test]
    fn test_mock_proxy_base_url() {
        let proxy = MockProxy::new("edge", 0);
        assert_eq!(proxy.name(), "edge");
        assert_eq!(proxy.base_url(), "http://edge.mock");
    }
}
