//! Per-proxy request slot counter.
//!
//! A [`SlotGate`] holds a bounded number of request slots. Consumers take
//! one slot at a time with [`SlotGate::try_acquire`]; an external refill
//! process puts slots back with [`SlotGate::replenish`]. Both are lock-free
//! and never block.

use std::sync::atomic::{AtomicU32, Ordering};

/// Bounded, atomically updated count of available request slots.
#[derive(Debug)]
pub struct SlotGate {
    /// Max slots that can be banked.
    capacity: u32,
    /// Slots currently available.
    available: AtomicU32,
}

impl SlotGate {
    /// Create a gate with `capacity` slots. The gate starts full.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            available: AtomicU32::new(capacity),
        }
    }

    /// Create a gate with `capacity` slots and none available.
    pub fn empty(capacity: u32) -> Self {
        Self {
            capacity,
            available: AtomicU32::new(0),
        }
    }

    /// Take one slot if any is available.
    ///
    /// The check and the decrement are one atomic step, so a slot is never
    /// handed to two callers.
    pub fn try_acquire(&self) -> bool {
        self.available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1))
            .is_ok()
    }

    /// Add up to `slots` slots, never exceeding capacity.
    ///
    /// Returns the number of slots actually added.
    pub fn replenish(&self, slots: u32) -> u32 {
        let capacity = self.capacity;
        match self
            .available
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < capacity).then(|| n.saturating_add(slots).min(capacity))
            }) {
            Ok(previous) => previous.saturating_add(slots).min(capacity) - previous,
            Err(_) => 0,
        }
    }

    /// Slots currently available.
    pub fn available(&self) -> u32 {
        self.available.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_gate_starts_full() {
        let gate = SlotGate::new(3);
        assert_eq!(gate.capacity(), 3);
        assert_eq!(gate.available(), 3);
    }

    #[test]
    fn test_gate_acquire_until_empty() {
        let gate = SlotGate::new(2);
        assert!(gate.try_acquire());
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        assert_eq!(gate.available(), 0);
    }

    #[test]
    fn test_empty_gate_rejects() {
        let gate = SlotGate::empty(5);
        assert_eq!(gate.available(), 0);
        assert!(!gate.try_acquire());
    }

    #[test]
    fn test_replenish_is_capped() {
        let gate = SlotGate::empty(3);
        assert_eq!(gate.replenish(2), 2);
        assert_eq!(gate.replenish(5), 1);
        assert_eq!(gate.available(), 3);

        // Already full
        assert_eq!(gate.replenish(1), 0);
        assert_eq!(gate.available(), 3);
    }

    #[test]
    fn test_replenish_after_acquire() {
        let gate = SlotGate::new(1);
        assert!(gate.try_acquire());
        assert!(!gate.try_acquire());
        assert_eq!(gate.replenish(1), 1);
        assert!(gate.try_acquire());
    }

    #[test]
    fn test_zero_capacity_gate_never_grants() {
        let gate = SlotGate::new(0);
        assert!(!gate.try_acquire());
        assert_eq!(gate.replenish(10), 0);
        assert!(!gate.try_acquire());
    }

    #[test]
    fn test_concurrent_acquire_never_double_spends() {
        const SLOTS: u32 = 500;
        let gate = Arc::new(SlotGate::new(SLOTS));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || (0..200).filter(|_| gate.try_acquire()).count())
            })
            .collect();

        let granted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(granted, SLOTS as usize);
        assert_eq!(gate.available(), 0);
    }
}
