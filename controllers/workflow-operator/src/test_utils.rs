//! Test utilities for unit testing the reconciler and controller
//!
//! This module provides helpers for creating test data and waiting on the
//! controller loop.

use crds::{WorkflowDefinition, WorkflowDefinitionSpec};
use std::time::Duration;

/// Minimal but valid workflow config
pub const VALID_CONFIG: &str = r#"
modules:
  - name: httpServer
    type: http.server
    config:
      address: ":8080"
workflows:
  http:
    routes:
      - method: GET
        path: /health
        handler: httpServer
"#;

/// Payload that is not valid YAML
pub const INVALID_CONFIG: &str = "not: valid: yaml: {{";

/// Helper to create a test WorkflowDefinition with one replica
pub fn create_test_definition(
    name: &str,
    namespace: &str,
    version: i64,
    config: &str,
) -> WorkflowDefinition {
    let mut definition = WorkflowDefinition::new(
        name,
        WorkflowDefinitionSpec {
            name: name.to_string(),
            version,
            config: config.to_string(),
            replicas: 1,
            ..Default::default()
        },
    );
    definition.metadata.namespace = Some(namespace.to_string());
    definition
}

/// Polls `condition` every 10ms until it holds, panicking after 2s
pub async fn wait_until(what: &str, mut condition: impl FnMut() -> bool) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "timed out waiting for {what}");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
