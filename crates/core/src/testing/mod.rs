//! Test doubles for code that drives a [`Dispatcher`](crate::Dispatcher).
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rotaproxy_core::{Dispatcher, testing::MockProxy};
//!
//! let busy = Arc::new(MockProxy::new("busy", 0));
//! let idle = Arc::new(MockProxy::unlimited("idle"));
//! let dispatcher = Dispatcher::new(vec![busy.clone(), idle.clone()])?;
//!
//! assert_eq!(dispatcher.select_proxy().name(), "idle");
//! assert_eq!(busy.checks(), 1);
//! ```

mod mock_proxy;

pub use mock_proxy::MockProxy;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::config::{Config, DispatcherConfig, ProxyConfig, ServerConfig};

    /// Proxy entry with a local base URL.
    pub fn proxy_config(name: &str, requests_per_minute: u32, burst: u32) -> ProxyConfig {
        ProxyConfig {
            name: name.to_string(),
            base_url: format!("http://{}.proxy.test", name),
            requests_per_minute,
            burst,
        }
    }

    /// Config with `count` proxies named `proxy-0..`, each 60 rpm with one slot.
    pub fn config_with_proxies(count: usize) -> Config {
        Config {
            server: ServerConfig::default(),
            dispatcher: DispatcherConfig::default(),
            proxies: (0..count)
                .map(|i| proxy_config(&format!("proxy-{}", i), 60, 1))
                .collect(),
        }
    }
}
