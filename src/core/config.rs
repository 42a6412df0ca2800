//! Configuration management for the iFlow proxy server.
//!
//! Configuration is read once from the environment at startup and passed
//! into the handlers through [`crate::api::AppState`].

use serde::{Deserialize, Serialize};

/// Default upstream base URL.
pub const DEFAULT_API_BASE: &str = "https://apis.iflow.cn/v1";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream iFlow API configuration
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Whether to verify SSL certificates for upstream requests
    #[serde(default = "default_verify_ssl")]
    pub verify_ssl: bool,

    /// Overall upstream request timeout in seconds (no timeout when unset)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Server-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upstream API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Base URL, `/chat/completions` is appended to it
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Bearer credential sent to the upstream
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            upstream: UpstreamConfig::default(),
            verify_ssl: default_verify_ssl(),
            request_timeout_secs: None,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_verify_ssl() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from process environment variables.
    ///
    /// Recognized variables: `HOST`, `PORT`, `IFLOW_API_BASE`, `IFLOW_API_KEY`,
    /// `VERIFY_SSL`, `REQUEST_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Unparseable numeric values are ignored with a warning and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AppConfig::default();

        if let Some(host) = non_empty(lookup("HOST")) {
            config.server.host = host;
        }

        if let Some(port_str) = non_empty(lookup("PORT")) {
            match port_str.trim().parse::<u16>() {
                Ok(port) => config.server.port = port,
                Err(_) => tracing::warn!(
                    value = %port_str,
                    default = config.server.port,
                    "Ignoring invalid PORT"
                ),
            }
        }

        if let Some(api_base) = non_empty(lookup("IFLOW_API_BASE")) {
            config.upstream.api_base = api_base.trim_end_matches('/').to_string();
        }

        config.upstream.api_key = non_empty(lookup("IFLOW_API_KEY"));

        if let Some(verify_ssl_str) = non_empty(lookup("VERIFY_SSL")) {
            config.verify_ssl = str_to_bool(&verify_ssl_str);
        }

        if let Some(timeout_str) = non_empty(lookup("REQUEST_TIMEOUT_SECS")) {
            match timeout_str.trim().parse::<u64>() {
                Ok(timeout) if timeout > 0 => config.request_timeout_secs = Some(timeout),
                _ => tracing::warn!(
                    value = %timeout_str,
                    "Ignoring invalid REQUEST_TIMEOUT_SECS, upstream requests have no timeout"
                ),
            }
        }

        config
    }

    /// Full upstream chat completions URL.
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.upstream.api_base)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Convert string to boolean.
///
/// Accepts: "true", "1", "yes", "on" (case-insensitive)
fn str_to_bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
