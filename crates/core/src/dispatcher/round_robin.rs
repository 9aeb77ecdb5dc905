use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::{DispatchError, SpinPolicy, Ticker};
use crate::metrics::{DISPATCH_ATTEMPTS, DISPATCH_EXHAUSTED, DISPATCH_SELECTIONS};
use crate::proxy::{Proxy, ProxyEndpoint};

/// Selects the next proxy with capacity, rotating through a fixed pool.
///
/// Every candidate check advances the shared [`Ticker`] once, so successive
/// selections start where the previous one stopped instead of rescanning
/// from index zero. A saturated proxy is skipped, not waited on.
///
/// Three entry points share that loop:
///
/// - [`select_proxy`](Self::select_proxy) spins on the calling thread until
///   some proxy has capacity. It never gives up.
/// - [`try_select_proxy`](Self::try_select_proxy) spins the same way but
///   stops at the policy's attempt or time limit.
/// - [`acquire`](Self::acquire) is the async form. After a sweep over the
///   whole pool finds nothing it parks on the capacity signal (or a
///   doubling backoff) instead of burning CPU.
pub struct Dispatcher<P: ProxyEndpoint = Proxy> {
    proxies: Vec<Arc<P>>,
    ticker: Ticker,
    policy: SpinPolicy,
    capacity_signal: Arc<Notify>,
}

impl<P: ProxyEndpoint> std::fmt::Debug for Dispatcher<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("proxies", &self.proxies.len())
            .field("ticker", &self.ticker)
            .field("policy", &self.policy)
            .finish()
    }
}

impl<P: ProxyEndpoint> Dispatcher<P> {
    /// Create a dispatcher over `proxies`. Order is preserved and fixed.
    pub fn new(proxies: Vec<Arc<P>>) -> Result<Self, DispatchError> {
        let ticker = Ticker::new(proxies.len())?;
        Ok(Self {
            proxies,
            ticker,
            policy: SpinPolicy::unbounded(),
            capacity_signal: Arc::new(Notify::new()),
        })
    }

    /// Set the policy used by [`acquire`](Self::acquire).
    pub fn with_policy(mut self, policy: SpinPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &SpinPolicy {
        &self.policy
    }

    /// Signal to notify when capacity is added to any proxy in the pool.
    pub fn capacity_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.capacity_signal)
    }

    pub fn proxies(&self) -> &[Arc<P>] {
        &self.proxies
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Always false; construction rejects an empty pool.
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Index of the next candidate.
    pub fn cursor(&self) -> usize {
        self.ticker.position()
    }

    /// Return a proxy that accepted one unit of capacity.
    ///
    /// Busy-polls the pool until a proxy has capacity. If none ever does,
    /// this never returns; it blocks the calling thread, so async callers
    /// should use [`acquire`](Self::acquire).
    pub fn select_proxy(&self) -> Arc<P> {
        let mut attempts = 0u64;
        loop {
            attempts += 1;
            if let Some(proxy) = self.try_candidate() {
                record_selection(proxy.as_ref(), attempts);
                return proxy;
            }
            std::hint::spin_loop();
        }
    }

    /// Busy-poll like [`select_proxy`](Self::select_proxy) within `policy`'s limits.
    ///
    /// The backoff fields are ignored; this never sleeps.
    pub fn try_select_proxy(&self, policy: &SpinPolicy) -> Result<Arc<P>, DispatchError> {
        let started = std::time::Instant::now();
        let mut attempts = 0u64;
        loop {
            let elapsed = started.elapsed();
            if policy.attempts_exhausted(attempts)
                || policy.remaining(elapsed).is_some_and(|left| left.is_zero())
            {
                return Err(exhausted(attempts, elapsed));
            }
            attempts += 1;
            if let Some(proxy) = self.try_candidate() {
                record_selection(proxy.as_ref(), attempts);
                return Ok(proxy);
            }
            std::hint::spin_loop();
        }
    }

    /// Async selection using the dispatcher's configured policy.
    pub async fn acquire(&self) -> Result<Arc<P>, DispatchError> {
        let policy = self.policy;
        self.acquire_with(&policy).await
    }

    /// Async selection within `policy`'s limits.
    ///
    /// Sweeps the pool in ticker order. When a full sweep finds no capacity
    /// it waits for the capacity signal or the current backoff, whichever
    /// comes first, then sweeps again. Dropping the future abandons the
    /// search without consuming any capacity.
    pub async fn acquire_with(&self, policy: &SpinPolicy) -> Result<Arc<P>, DispatchError> {
        let started = Instant::now();
        let mut attempts = 0u64;
        let mut backoff = policy.backoff_initial;

        loop {
            // Register before sweeping so a refill that lands mid-sweep
            // still wakes us.
            let notified = self.capacity_signal.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            for _ in 0..self.proxies.len() {
                if policy.attempts_exhausted(attempts) {
                    return Err(exhausted(attempts, started.elapsed()));
                }
                attempts += 1;
                if let Some(proxy) = self.try_candidate() {
                    record_selection(proxy.as_ref(), attempts);
                    return Ok(proxy);
                }
            }

            let elapsed = started.elapsed();
            let wait = match policy.remaining(elapsed) {
                Some(left) if left.is_zero() => return Err(exhausted(attempts, elapsed)),
                Some(left) => backoff.min(left),
                None => backoff,
            };

            tokio::select! {
                _ = &mut notified => {
                    backoff = policy.backoff_initial;
                }
                _ = tokio::time::sleep(wait) => {
                    backoff = policy.next_backoff(backoff);
                }
            }
        }
    }

    /// Advance the ticker once and try to take capacity from that candidate.
    fn try_candidate(&self) -> Option<Arc<P>> {
        let proxy = &self.proxies[self.ticker.advance()];
        proxy
            .try_acquire_capacity()
            .then(|| Arc::clone(proxy))
    }
}

fn record_selection<P: ProxyEndpoint>(proxy: &P, attempts: u64) {
    debug!(proxy = proxy.name(), attempts, "Selected proxy");
    DISPATCH_SELECTIONS.with_label_values(&[proxy.name()]).inc();
    DISPATCH_ATTEMPTS.observe(attempts as f64);
}

fn exhausted(attempts: u64, elapsed: Duration) -> DispatchError {
    let waited_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    warn!(attempts, waited_ms, "No proxy capacity available");
    DISPATCH_EXHAUSTED.inc();
    DispatchError::CapacityExhausted {
        attempts,
        waited_ms,
    }
}
