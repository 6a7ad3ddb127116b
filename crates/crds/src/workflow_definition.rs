//! WorkflowDefinition CRD
//!
//! Declares a deployable workflow: its name, version, embedded configuration
//! and replica count. The operator drives the observed status toward the spec.

use chrono::{DateTime, Utc};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Namespace used when a resource does not carry one.
pub const DEFAULT_NAMESPACE: &str = "default";

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Default)]
#[kube(
    group = "workflow.microscaler.io",
    version = "v1alpha1",
    kind = "WorkflowDefinition",
    plural = "workflowdefinitions",
    shortname = "wfdef",
    namespaced,
    status = "WorkflowDefinitionStatus",
    printcolumn = r#"{"name":"Phase","type":"string","jsonPath":".status.phase"}"#,
    printcolumn = r#"{"name":"Version","type":"integer","jsonPath":".spec.version"}"#,
    printcolumn = r#"{"name":"Replicas","type":"integer","jsonPath":".spec.replicas"}"#,
    printcolumn = r#"{"name":"Ready","type":"integer","jsonPath":".status.readyReplicas"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinitionSpec {
    /// Workflow name
    pub name: String,

    /// Definition version. Any change triggers a redeploy.
    #[serde(default)]
    pub version: i64,

    /// Embedded workflow configuration (YAML)
    pub config: String,

    /// Desired replica count (values below 1 default to 1)
    #[serde(default)]
    pub replicas: i32,

    /// Compute resources requested per replica
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceRequests>,

    /// Environment variables passed to the workflow
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl WorkflowDefinitionSpec {
    /// Returns a copy with defaults applied (replicas below 1 become 1).
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut spec = self.clone();
        if spec.replicas <= 0 {
            spec.replicas = 1;
        }
        spec
    }

    /// Whether a redeploy is needed to go from `self` to `other`.
    ///
    /// Only version, config and replicas are compared; resources and env ride
    /// along with whichever of those changes.
    #[must_use]
    pub fn differs_from(&self, other: &Self) -> bool {
        self.version != other.version
            || self.config != other.config
            || self.replicas != other.replicas
    }
}

/// Per-replica compute requests.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRequests {
    /// CPU request (e.g. "500m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,

    /// Memory request (e.g. "256Mi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
}

/// Coarse lifecycle phase of a workflow.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
pub enum WorkflowPhase {
    /// Accepted, not yet deployed
    #[default]
    Pending,

    /// All replicas ready at the observed version
    Running,

    /// Validation or deployment failed; see `message`
    Failed,

    /// Deleted; the record is about to be removed
    Terminated,
}

impl WorkflowPhase {
    /// Wire name of the phase.
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowPhase::Pending => "Pending",
            WorkflowPhase::Running => "Running",
            WorkflowPhase::Failed => "Failed",
            WorkflowPhase::Terminated => "Terminated",
        }
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observed state, written only by the reconciler.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinitionStatus {
    /// Current phase
    pub phase: WorkflowPhase,

    /// Desired replicas, mirrored from the spec
    #[serde(default)]
    pub replicas: i32,

    /// Replicas ready at the observed version
    #[serde(default)]
    pub ready_replicas: i32,

    /// Human-readable detail, always set when failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// When the phase last changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<DateTime<Utc>>,

    /// Spec version the status describes
    #[serde(default)]
    pub observed_version: i64,
}

impl WorkflowDefinitionStatus {
    /// Status of a fully rolled out spec.
    #[must_use]
    pub fn running(spec: &WorkflowDefinitionSpec, now: DateTime<Utc>) -> Self {
        Self {
            phase: WorkflowPhase::Running,
            replicas: spec.replicas,
            ready_replicas: spec.replicas,
            message: None,
            last_transition_time: Some(now),
            observed_version: spec.version,
        }
    }

    /// Status of a spec that failed validation.
    #[must_use]
    pub fn failed(spec: &WorkflowDefinitionSpec, message: impl Into<String>, now: DateTime<Utc>) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = "workflow failed".to_string();
        }
        Self {
            phase: WorkflowPhase::Failed,
            replicas: spec.replicas,
            ready_replicas: 0,
            message: Some(message),
            last_transition_time: Some(now),
            observed_version: spec.version,
        }
    }

    /// Marks the status terminated, keeping the observed version.
    pub fn terminate(&mut self, now: DateTime<Utc>) {
        self.phase = WorkflowPhase::Terminated;
        self.ready_replicas = 0;
        self.message = Some("terminated".to_string());
        self.last_transition_time = Some(now);
    }
}

/// Store key for a resource: `namespace/name`, with an empty namespace
/// treated as [`DEFAULT_NAMESPACE`].
pub fn resource_key(namespace: &str, name: &str) -> String {
    format!("{}/{}", namespace_or_default(namespace), name)
}

/// Maps an empty namespace to [`DEFAULT_NAMESPACE`].
pub fn namespace_or_default(namespace: &str) -> &str {
    if namespace.is_empty() {
        DEFAULT_NAMESPACE
    } else {
        namespace
    }
}

impl WorkflowDefinition {
    /// Namespace of the resource, defaulted.
    pub fn namespace_or_default(&self) -> &str {
        namespace_or_default(self.metadata.namespace.as_deref().unwrap_or_default())
    }

    /// Object name, falling back to `spec.name` when metadata carries none.
    pub fn resource_name(&self) -> Option<&str> {
        self.metadata
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| Some(self.spec.name.as_str()).filter(|name| !name.is_empty()))
    }

    /// Store key (`namespace/name`), or `None` when the resource has no name.
    pub fn key(&self) -> Option<String> {
        self.resource_name()
            .map(|name| resource_key(self.namespace_or_default(), name))
    }

    /// Current phase, `Pending` when no status has been recorded.
    pub fn phase(&self) -> WorkflowPhase {
        self.status.as_ref().map(|status| status.phase).unwrap_or_default()
    }
}
