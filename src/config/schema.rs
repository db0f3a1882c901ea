//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration for the CGI gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Dispatch rules: document root, interpreters, execution mode.
    pub dispatch: DispatchConfig,

    /// Remote FastCGI backend target.
    pub upstream: UpstreamConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How CGI-classified requests are executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ExecMode {
    /// Spawn the interpreter locally, one process per request.
    #[serde(rename = "local")]
    Local,
    /// Forward to the configured FastCGI backend.
    #[serde(rename = "fastcgi")]
    Remote,
}

/// Dispatch rules for classifying requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Document root for static files and scripts.
    pub root: PathBuf,

    /// Script substituted when a directory or missing path has no
    /// interpreter mapping (front-controller deployments).
    pub default_app: Option<PathBuf>,

    /// File extension (with leading dot) → interpreter binary.
    pub interpreters: HashMap<String, PathBuf>,

    /// Local process execution or remote FastCGI forwarding.
    pub mode: ExecMode,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            default_app: None,
            interpreters: HashMap::new(),
            mode: ExecMode::Local,
        }
    }
}

/// Remote FastCGI backend target.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// TCP target (e.g., "127.0.0.1:9000").
    pub address: String,

    /// Unix socket path; takes precedence over `address` on Unix hosts.
    pub unix_socket: Option<PathBuf>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:9000".to_string(),
            unix_socket: None,
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter directive when RUST_LOG is unset.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "cgi_gateway=info,tower_http=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_round_trips() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [listener]
            bind_address = "127.0.0.1:8081"

            [dispatch]
            root = "/srv/www"
            mode = "fastcgi"

            [dispatch.interpreters]
            ".php" = "/usr/bin/php-cgi"

            [upstream]
            address = "127.0.0.1:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.bind_address, "127.0.0.1:8081");
        assert_eq!(config.dispatch.mode, ExecMode::Remote);
        assert_eq!(
            config.dispatch.interpreters[".php"],
            PathBuf::from("/usr/bin/php-cgi")
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.limits.max_body_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_empty_config_is_valid_defaults() {
        let config: GatewayConfig = toml::from_str("").unwrap();
        assert_eq!(config.dispatch.mode, ExecMode::Local);
        assert!(config.dispatch.interpreters.is_empty());
        assert!(config.dispatch.default_app.is_none());
    }
}
