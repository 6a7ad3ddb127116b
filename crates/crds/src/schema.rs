//! Static schema document for the WorkflowDefinition resource.
//!
//! The document is checked in and served as-is. Regenerate it with
//! `cargo run -p crds --bin crdgen > crates/crds/crd/workflowdefinition.yaml`.

/// CustomResourceDefinition YAML for `WorkflowDefinition`.
pub const WORKFLOW_DEFINITION_CRD: &str = include_str!("../crd/workflowdefinition.yaml");

/// Returns the CRD document verbatim.
pub fn crd_yaml() -> &'static str {
    WORKFLOW_DEFINITION_CRD
}
