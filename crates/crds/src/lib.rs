//! Workflow Operator CRD Definitions
//!
//! Kubernetes Custom Resource Definitions for the workflow operator.

pub mod workflow_definition;
pub mod schema;

pub use workflow_definition::*;
pub use schema::*;
