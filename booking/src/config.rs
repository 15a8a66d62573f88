//! Configuration management for the booking engine.
//!
//! Loads configuration from environment variables with sensible defaults.

use serde::{Deserialize, Serialize};
use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application server configuration
    pub server: ServerConfig,
    /// Payment gateway configuration
    pub gateway: GatewayConfig,
    /// Side-effect dispatcher configuration
    pub dispatch: DispatchConfig,
    /// Ticket artifact storage configuration
    pub artifacts: ArtifactConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Tracing filter directives; `RUST_LOG` takes precedence when set
    pub log_level: String,
    /// Metrics server host (for Prometheus scraping)
    pub metrics_host: String,
    /// Metrics server port
    pub metrics_port: u16,
}

/// Which gateway implementation to wire at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayMode {
    /// In-process mock that settles every initiation
    Mock,
    /// Real HTTP gateway
    Live,
}

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway implementation to use (mock for development)
    pub mode: GatewayMode,
    /// Gateway API base URL
    pub base_url: String,
    /// Merchant identifier issued by the provider
    pub merchant_id: String,
    /// Shared salt for request signing; a missing value fails initiations
    pub salt_key: Option<String>,
    /// Salt key index sent alongside the signature
    pub salt_index: u32,
    /// URL the provider calls back with settlement outcomes
    pub callback_url: String,
    /// URL the buyer is returned to after checkout
    pub redirect_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Side-effect dispatcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Delivery attempts per effect, including the first
    pub max_attempts: u32,
    /// First retry delay in milliseconds
    pub initial_delay_ms: u64,
    /// Retry delay ceiling in milliseconds
    pub max_delay_ms: u64,
}

/// Ticket artifact storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory ticket artifacts are written under
    pub root: String,
    /// Public base URL the stored artifacts resolve from
    pub public_base_url: String,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(8080),
                log_level: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "boxoffice_booking=info,tower_http=debug".to_string()),
                metrics_host: env::var("METRICS_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                metrics_port: env::var("METRICS_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(9090),
            },
            gateway: GatewayConfig {
                mode: match env::var("GATEWAY_MODE").as_deref() {
                    Ok("live") => GatewayMode::Live,
                    _ => GatewayMode::Mock,
                },
                base_url: env::var("GATEWAY_BASE_URL")
                    .unwrap_or_else(|_| "https://api.phonepe.com/apis/hermes".to_string()),
                merchant_id: env::var("GATEWAY_MERCHANT_ID")
                    .unwrap_or_else(|_| "MERCHANTUAT".to_string()),
                salt_key: env::var("GATEWAY_SALT_KEY").ok(),
                salt_index: env::var("GATEWAY_SALT_INDEX")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1),
                callback_url: env::var("GATEWAY_CALLBACK_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/api/payments/callback".to_string()),
                redirect_url: env::var("GATEWAY_REDIRECT_URL")
                    .unwrap_or_else(|_| "http://localhost:3000/booking/complete".to_string()),
                timeout_secs: env::var("GATEWAY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            },
            dispatch: DispatchConfig {
                max_attempts: env::var("DISPATCH_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3),
                initial_delay_ms: env::var("DISPATCH_INITIAL_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(100),
                max_delay_ms: env::var("DISPATCH_MAX_DELAY_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5000),
            },
            artifacts: ArtifactConfig {
                root: env::var("ARTIFACT_ROOT").unwrap_or_else(|_| "./tickets".to_string()),
                public_base_url: env::var("ARTIFACT_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080/tickets".to_string()),
            },
        }
    }
}
