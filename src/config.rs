//! Configuration Module
//!
//! Handles loading and managing gateway configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Gateway configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for cache writes without an explicit TTL
    pub default_ttl: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Purge task interval in seconds, 0 disables the task
    pub purge_interval: u64,
    /// Base URL of the product backend
    pub upstream_url: String,
    /// TTL in seconds for featured items
    pub featured_ttl: u64,
    /// TTL in seconds for favorite product batches
    pub favorites_ttl: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `PURGE_INTERVAL` - Purge frequency in seconds (default: 60)
    /// - `UPSTREAM_URL` - Product backend base URL (default: http://localhost:8080/api)
    /// - `FEATURED_TTL` - Featured items TTL in seconds (default: 600)
    /// - `FAVORITES_TTL` - Favorite products TTL in seconds (default: 120)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: env_or("DEFAULT_TTL", defaults.default_ttl),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            purge_interval: env_or("PURGE_INTERVAL", defaults.purge_interval),
            upstream_url: env::var("UPSTREAM_URL").unwrap_or(defaults.upstream_url),
            featured_ttl: env_or("FEATURED_TTL", defaults.featured_ttl),
            favorites_ttl: env_or("FAVORITES_TTL", defaults.favorites_ttl),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    /// Purge interval, or `None` when the purge task is disabled.
    pub fn purge_interval(&self) -> Option<Duration> {
        (self.purge_interval > 0).then(|| Duration::from_secs(self.purge_interval))
    }

    pub fn featured_ttl(&self) -> Duration {
        Duration::from_secs(self.featured_ttl)
    }

    pub fn favorites_ttl(&self) -> Duration {
        Duration::from_secs(self.favorites_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            server_port: 3000,
            purge_interval: 60,
            upstream_url: "http://localhost:8080/api".to_string(),
            featured_ttl: 600,
            favorites_ttl: 120,
        }
    }
}

/// Parses `name` from the environment, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
