//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a dev session.
//! All types derive Serde traits for deserialization from config files.

use serde::Deserialize;

use crate::routing::{ExportInventory, ExposureConfig, ServiceDefinition};

/// Root configuration for the development proxy.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct DevConfig {
    /// Listener configuration (bind address, local root).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Services active in this session, in declaration order.
    pub services: Vec<ServiceConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8787").
    pub bind_address: String,

    /// Root every routed host ends with.
    pub local_root: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8787".to_string(),
            local_root: "localhost".to_string(),
        }
    }
}

/// One service process of the session.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Declared service name; its derived label addresses the service.
    pub name: String,

    /// Address of the running service (e.g., "127.0.0.1:9001").
    pub address: String,

    /// Handles the bare root host. Defaults to the first service.
    #[serde(default)]
    pub primary: bool,

    /// `true`, or a table of `Export = "alias" | true`.
    #[serde(default)]
    pub expose_entrypoints: ExposureConfig,

    /// Export name → kind, as reported by static analysis of the service.
    #[serde(default)]
    pub exports: ExportInventory,
}

impl ServiceConfig {
    /// The routing view of this service.
    pub fn definition(&self) -> ServiceDefinition {
        ServiceDefinition::new(self.name.clone())
            .primary(self.primary)
            .exposure(self.expose_entrypoints.clone())
            .exports(self.exports.clone())
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
