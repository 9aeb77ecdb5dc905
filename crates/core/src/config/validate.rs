use std::collections::HashSet;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one proxy, with unique non-empty names
/// - Proxy base URLs are http(s)
/// - Rates and bursts are positive
/// - Dispatcher limits, when set, are positive and backoff bounds are ordered
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    // Dispatcher validation
    let dispatcher = &config.dispatcher;
    if dispatcher.max_attempts == Some(0) {
        return Err(invalid("dispatcher.max_attempts must be greater than 0"));
    }
    if dispatcher.deadline_ms == Some(0) {
        return Err(invalid("dispatcher.deadline_ms must be greater than 0"));
    }
    if dispatcher.backoff_initial_ms == 0 {
        return Err(invalid("dispatcher.backoff_initial_ms must be greater than 0"));
    }
    if dispatcher.backoff_initial_ms > dispatcher.backoff_max_ms {
        return Err(invalid(
            "dispatcher.backoff_initial_ms cannot exceed dispatcher.backoff_max_ms",
        ));
    }

    // Proxy pool validation
    if config.proxies.is_empty() {
        return Err(invalid("at least one [[proxies]] entry is required"));
    }

    let mut names = HashSet::new();
    for proxy in &config.proxies {
        let name = proxy.name.trim();
        if name.is_empty() {
            return Err(invalid("proxies.name cannot be empty"));
        }
        if !names.insert(name) {
            return Err(invalid(format!("duplicate proxy name '{}'", name)));
        }
        if !(proxy.base_url.starts_with("http://") || proxy.base_url.starts_with("https://")) {
            return Err(invalid(format!(
                "proxy '{}': base_url must start with http:// or https://",
                name
            )));
        }
        if proxy.requests_per_minute == 0 {
            return Err(invalid(format!(
                "proxy '{}': requests_per_minute must be greater than 0",
                name
            )));
        }
        if proxy.burst == 0 {
            return Err(invalid(format!(
                "proxy '{}': burst must be greater than 0",
                name
            )));
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DispatcherConfig, ProxyConfig, ServerConfig};
    use std::net::IpAddr;

    fn proxy(name: &str) -> ProxyConfig {
        ProxyConfig {
            name: name.to_string(),
            base_url: format!("https://{}.example", name),
            requests_per_minute: 40,
            burst: 1,
        }
    }

    fn valid_config() -> Config {
        Config {
            server: ServerConfig::default(),
            dispatcher: DispatcherConfig::default(),
            proxies: vec![proxy("a"), proxy("b")],
        }
    }

    fn assert_invalid(config: &Config) {
        let result = validate_config(config);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = valid_config();
        config.server = ServerConfig {
            host: "0.0.0.0".parse::<IpAddr>().unwrap(),
            port: 0,
        };
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_empty_pool_fails() {
        let mut config = valid_config();
        config.proxies.clear();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_duplicate_names_fail() {
        let mut config = valid_config();
        config.proxies.push(proxy("a"));
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_blank_name_fails() {
        let mut config = valid_config();
        config.proxies[0].name = "  ".to_string();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_bad_scheme_fails() {
        let mut config = valid_config();
        config.proxies[1].base_url = "socks5://b.example".to_string();
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_zero_rate_or_burst_fails() {
        let mut config = valid_config();
        config.proxies[0].requests_per_minute = 0;
        assert_invalid(&config);

        let mut config = valid_config();
        config.proxies[0].burst = 0;
        assert_invalid(&config);
    }

    #[test]
    fn test_validate_dispatcher_limits() {
        let mut config = valid_config();
        config.dispatcher.max_attempts = Some(0);
        assert_invalid(&config);

        let mut config = valid_config();
        config.dispatcher.deadline_ms = Some(0);
        assert_invalid(&config);

        let mut config = valid_config();
        config.dispatcher.backoff_initial_ms = 100;
        config.dispatcher.backoff_max_ms = 10;
        assert_invalid(&config);

        let mut config = valid_config();
        config.dispatcher.max_attempts = Some(10);
        config.dispatcher.deadline_ms = Some(1000);
        assert!(validate_config(&config).is_ok());
    }
}
