//! Runtime configuration for butterfly-path
//!
//! Defaults point at the public Overpass instance; the CLI overlays flags and
//! environment variables on top.

use std::time::Duration;

/// Default public Overpass API endpoint
pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

/// Configuration for the map-data service
#[derive(Debug, Clone)]
pub struct OverpassConfig {
    /// Overpass interpreter endpoint
    pub endpoint: String,

    /// Overall request timeout
    pub timeout: Duration,

    /// Connection timeout
    pub connect_timeout: Duration,

    /// User agent sent with every request
    pub user_agent: String,

    /// Search radius around the start point when the caller gives none, in meters
    pub default_radius_m: f64,
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_OVERPASS_URL.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("butterfly-path/{}", env!("BUTTERFLY_VERSION")),
            default_radius_m: 1000.0,
        }
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone, PartialEq)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServeConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
