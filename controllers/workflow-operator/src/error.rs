//! Controller-specific error types.
//!
//! This module defines the errors surfaced by the workflow operator's
//! reconciler, controller loop and resource watcher.

use crate::reconciler::{ReconcileAction, ReconcileResult};
use kube::Error as KubeError;
use thiserror::Error;

/// Errors that can occur in the Workflow Operator.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Workflow config was empty or rejected by the parser.
    /// The resource is recorded with the `Failed` phase.
    #[error("Validation failed for {key}: {message}")]
    ValidationFailed {
        /// Resource key (`namespace/name`)
        key: String,
        /// Failure description, as stored in the resource status
        message: String,
    },

    /// WorkflowDefinition not found
    #[error("WorkflowDefinition not found: {0}")]
    NotFound(String),

    /// WorkflowDefinition carries neither a metadata name nor a spec name
    #[error("WorkflowDefinition has no name")]
    MissingName,

    /// Caller's cancellation token fired before the call started
    #[error("Operation cancelled")]
    Cancelled,

    /// `start` called while the loop is running
    #[error("Controller is already running")]
    AlreadyRunning,

    /// `stop` called while the loop is stopped
    #[error("Controller is not running")]
    NotRunning,

    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Invalid operator configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

/// A `reconcile` call that did not converge.
///
/// Carries the `error` result alongside the cause so callers can log the
/// outcome the same way as a successful one.
#[derive(Debug, Error)]
#[error("Reconciliation failed for {}: {source}", .result.key)]
pub struct ReconcileFailure {
    /// Outcome with `action == Error`
    pub result: ReconcileResult,
    /// Underlying cause
    #[source]
    pub source: ControllerError,
}

impl ReconcileFailure {
    pub(crate) fn new(key: impl Into<String>, source: ControllerError) -> Self {
        Self {
            result: ReconcileResult {
                key: key.into(),
                action: ReconcileAction::Error,
                message: source.to_string(),
            },
            source,
        }
    }

    /// Whether the failure was recorded on the resource (phase `Failed`),
    /// as opposed to a call that changed nothing.
    pub fn is_recorded(&self) -> bool {
        matches!(self.source, ControllerError::ValidationFailed { .. })
    }
}
