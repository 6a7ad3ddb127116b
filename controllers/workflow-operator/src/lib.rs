//! Workflow Operator
//!
//! Reconciles `WorkflowDefinition` custom resources toward their declared
//! spec:
//! - [`reconciler`]: state store and convergence logic
//! - [`controller`]: bounded event queue and the loop that drains it
//! - [`watcher`]: Kubernetes watch stream feeding the controller
//!
//! The reconciler and controller do not talk to the API server and can be
//! driven directly, as the tests do.

pub mod config;
pub mod controller;
pub mod error;
pub mod reconciler;
pub mod watcher;

#[cfg(test)]
mod test_utils;

pub use config::OperatorConfig;
pub use controller::{Controller, ControllerEvent, EventType, DEFAULT_QUEUE_CAPACITY};
pub use error::{ControllerError, ReconcileFailure};
pub use reconciler::{ReconcileAction, ReconcileResult, Reconciler};
pub use watcher::Watcher;
