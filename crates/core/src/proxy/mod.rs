//! Upstream proxies and the capability the dispatcher consumes from them.

mod traits;
mod types;

pub use traits::*;
pub use types::*;

use std::sync::Arc;

use crate::config::ProxyConfig;
use crate::dispatcher::DispatchError;

/// Build the proxy pool from configuration, preserving order.
pub fn build_pool(configs: &[ProxyConfig]) -> Result<Vec<Arc<Proxy>>, DispatchError> {
    if configs.is_empty() {
        return Err(DispatchError::EmptyPool);
    }
    Ok(configs
        .iter()
        .map(|config| Arc::new(Proxy::from_config(config)))
        .collect())
}
