//! Round-robin dispatch over a fixed pool of rate-limited upstream proxies.
//!
//! Callers ask a [`Dispatcher`] for a proxy before each outbound request.
//! The dispatcher rotates through the pool with a [`Ticker`] and hands back
//! the first proxy that accepts one unit of capacity. Capacity itself is
//! refilled by a separate process such as the [`Replenisher`].

pub mod config;
pub mod dispatcher;
pub mod gate;
pub mod metrics;
pub mod proxy;
pub mod replenish;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DispatcherConfig,
    ProxyConfig, SanitizedConfig, ServerConfig,
};
pub use dispatcher::{DispatchError, Dispatcher, SpinPolicy, Ticker};
pub use gate::SlotGate;
pub use proxy::{build_pool, Proxy, ProxyEndpoint, ProxyStatus};
pub use replenish::{Replenisher, ReplenisherHandle};
