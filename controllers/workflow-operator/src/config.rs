//! Operator configuration loaded from environment variables.

use crate::controller::DEFAULT_QUEUE_CAPACITY;
use crate::error::ControllerError;
use std::env;

/// Runtime settings for the operator binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorConfig {
    /// Namespace to watch; `None` watches all namespaces
    pub watch_namespace: Option<String>,
    /// Controller event queue capacity
    pub queue_capacity: usize,
    /// Whether to watch the Kubernetes API at all
    pub watch_kubernetes: bool,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            watch_namespace: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            watch_kubernetes: true,
        }
    }
}

impl OperatorConfig {
    /// Reads `WATCH_NAMESPACE`, `EVENT_QUEUE_CAPACITY` and `WATCH_KUBERNETES`.
    pub fn from_env() -> Result<Self, ControllerError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ControllerError> {
        let mut config = Self {
            watch_namespace: lookup("WATCH_NAMESPACE")
                .map(|ns| ns.trim().to_string())
                .filter(|ns| !ns.is_empty()),
            ..Self::default()
        };

        if let Some(raw) = lookup("EVENT_QUEUE_CAPACITY") {
            config.queue_capacity = match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    return Err(ControllerError::InvalidConfig(format!(
                        "EVENT_QUEUE_CAPACITY must be a positive integer, got {raw:?}"
                    )));
                }
            };
        }

        if let Some(raw) = lookup("WATCH_KUBERNETES") {
            config.watch_kubernetes = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ControllerError::InvalidConfig(format!(
                        "WATCH_KUBERNETES must be a boolean, got {raw:?}"
                    )));
                }
            };
        }

        Ok(config)
    }
}
