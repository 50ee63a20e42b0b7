//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Data-plane listener.
    pub listener: ListenerConfig,

    /// Control-plane listener and authentication.
    pub admin: AdminConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Routes installed at startup, before the listeners accept traffic.
    pub routes: Vec<RouteConfig>,
}

/// Data-plane listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8000".to_string(),
        }
    }
}

/// Control-plane configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Serve the control plane at all.
    pub enabled: bool,

    /// Control-plane bind address.
    pub bind_address: String,

    /// Bearer token required on every control request. `None` disables auth.
    pub api_key: Option<String>,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:8001".to_string(),
            api_key: None,
            max_body_size: 64 * 1024,
        }
    }
}

/// A route installed at startup.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct RouteConfig {
    /// Pattern (`/foo/` prefix route, `/bar` exact route, `host/path` host-qualified).
    pub pattern: String,

    /// Destination URL (e.g., "http://127.0.0.1:8081/").
    pub destination: String,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request timeout on both listeners, in seconds.
    pub request_secs: u64,

    /// Time allowed for a backend to start responding, in seconds.
    pub upstream_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            upstream_secs: 25,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: RouterConfig = toml::from_str("").unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8000");
        assert_eq!(config.admin.bind_address, "127.0.0.1:8001");
        assert!(config.admin.enabled);
        assert!(config.admin.api_key.is_none());
        assert!(config.routes.is_empty());
    }

    #[test]
    fn parses_seed_routes() {
        let config: RouterConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:9000"

            [[routes]]
            pattern = "/"
            destination = "http://:8080/"

            [[routes]]
            pattern = "/foo/"
            destination = "http://127.0.0.1:8081/"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:9000");
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].pattern, "/foo/");
    }
}
