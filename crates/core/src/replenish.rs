//! Periodic capacity refill for configured proxies.
//!
//! Each proxy gets its own task that adds one slot every
//! [`Proxy::refill_interval`] (never above the proxy's burst) and wakes any
//! dispatcher parked on the capacity signal. The dispatcher itself never
//! produces capacity; this is the process that does.

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, trace};

use crate::dispatcher::Dispatcher;
use crate::metrics::CAPACITY_REPLENISHED;
use crate::proxy::{Proxy, ProxyEndpoint};

/// Refills proxy gates on a fixed schedule.
pub struct Replenisher {
    proxies: Vec<Arc<Proxy>>,
    signal: Arc<Notify>,
}

impl Replenisher {
    pub fn new(proxies: Vec<Arc<Proxy>>, signal: Arc<Notify>) -> Self {
        Self { proxies, signal }
    }

    /// Refill the dispatcher's own pool and wake its waiters.
    pub fn for_dispatcher(dispatcher: &Dispatcher<Proxy>) -> Self {
        Self::new(dispatcher.proxies().to_vec(), dispatcher.capacity_signal())
    }

    /// Start one refill task per proxy.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> ReplenisherHandle {
        let tasks = self
            .proxies
            .into_iter()
            .map(|proxy| {
                debug!(
                    proxy = proxy.name(),
                    interval_ms = proxy.refill_interval().as_millis() as u64,
                    "Starting refill task"
                );
                tokio::spawn(refill_loop(proxy, Arc::clone(&self.signal)))
            })
            .collect::<Vec<_>>();

        info!(proxies = tasks.len(), "Replenisher started");
        ReplenisherHandle { tasks }
    }
}

async fn refill_loop(proxy: Arc<Proxy>, signal: Arc<Notify>) {
    let period = proxy.refill_interval();
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let added = proxy.gate().replenish(1);
        if added == 0 {
            continue;
        }
        trace!(
            proxy = proxy.name(),
            available = proxy.gate().available(),
            "Capacity replenished"
        );
        CAPACITY_REPLENISHED
            .with_label_values(&[proxy.name()])
            .inc_by(u64::from(added));
        signal.notify_waiters();
    }
}

/// Running refill tasks. Dropping the handle stops them.
pub struct ReplenisherHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl ReplenisherHandle {
    /// Number of refill tasks still running.
    pub fn running(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// Stop all refill tasks.
    pub fn shutdown(self) {
        info!(proxies = self.tasks.len(), "Stopping replenisher");
        // Tasks are aborted in Drop.
    }
}

impl Drop for ReplenisherHandle {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::SpinPolicy;
    use crate::gate::SlotGate;
    use std::time::Duration;

    fn empty_proxy(name: &str, rpm: u32, burst: u32) -> Arc<Proxy> {
        Arc::new(Proxy::with_gate(
            name,
            format!("http://{}.local", name),
            rpm,
            SlotGate::empty(burst),
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_adds_one_slot_per_interval() {
        let proxy = empty_proxy("p", 60, 3);
        let handle =
            Replenisher::new(vec![Arc::clone(&proxy)], Arc::new(Notify::new())).spawn();

        assert_eq!(proxy.gate().available(), 0);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(proxy.gate().available(), 1);

        tokio::time::sleep(Duration::from_millis(1_000)).await;
        assert_eq!(proxy.gate().available(), 2);

        handle.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_caps_at_burst() {
        let proxy = empty_proxy("p", 60, 2);
        let _handle =
            Replenisher::new(vec![Arc::clone(&proxy)], Arc::new(Notify::new())).spawn();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(proxy.gate().available(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_refills() {
        let proxy = empty_proxy("p", 60, 5);
        let handle =
            Replenisher::new(vec![Arc::clone(&proxy)], Arc::new(Notify::new())).spawn();
        assert_eq!(handle.running(), 1);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        handle.shutdown();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(proxy.gate().available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_wakes_waiting_dispatcher() {
        let proxies = vec![empty_proxy("a", 60, 1), empty_proxy("b", 30, 1)];
        // Backoff far longer than the refill interval, so only the signal
        // can complete the acquire in time.
        let dispatcher = Dispatcher::new(proxies).unwrap().with_policy(
            SpinPolicy::unbounded()
                .with_backoff(Duration::from_secs(600), Duration::from_secs(600)),
        );
        let _handle = Replenisher::for_dispatcher(&dispatcher).spawn();

        let started = Instant::now();
        let proxy = dispatcher.acquire().await.unwrap();

        assert_eq!(proxy.name(), "a");
        assert!(started.elapsed() < Duration::from_secs(2));
    }
}
