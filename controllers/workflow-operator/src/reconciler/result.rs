//! Outcome of a single `reconcile` call.

use serde::Serialize;
use std::fmt;

/// What a `reconcile` call did to converge a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileAction {
    /// First deployment for the key
    Created,
    /// Version, config or replicas changed and were redeployed
    Updated,
    /// Already converged; nothing was written
    Unchanged,
    /// The call failed; see the accompanying error
    Error,
}

impl ReconcileAction {
    /// Lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ReconcileAction::Created => "created",
            ReconcileAction::Updated => "updated",
            ReconcileAction::Unchanged => "unchanged",
            ReconcileAction::Error => "error",
        }
    }
}

impl fmt::Display for ReconcileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of reconciling one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    /// Resource key (`namespace/name`)
    pub key: String,
    /// Action taken
    pub action: ReconcileAction,
    /// Human-readable summary
    pub message: String,
}

impl ReconcileResult {
    pub(crate) fn new(key: impl Into<String>, action: ReconcileAction, message: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            action,
            message: message.into(),
        }
    }
}
