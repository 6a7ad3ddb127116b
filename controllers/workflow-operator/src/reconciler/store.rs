//! In-memory state store owned by the reconciler.
//!
//! Two maps keyed by `namespace/name`: the externally visible records and
//! the deployed-runtime bookkeeping used to tell create from update from
//! no-op. Both are always written and removed together.

use chrono::{DateTime, Utc};
use crds::{WorkflowDefinition, WorkflowDefinitionSpec, WorkflowPhase};
use std::collections::HashMap;

/// Runtime bookkeeping for a deployed workflow.
#[derive(Debug, Clone)]
pub(crate) struct DeployedWorkflow {
    /// Normalized spec at deploy time
    pub(crate) spec: WorkflowDefinitionSpec,
    pub(crate) runtime_status: WorkflowPhase,
    pub(crate) started_at: DateTime<Utc>,
    pub(crate) stopped_at: Option<DateTime<Utc>>,
    pub(crate) last_error: Option<String>,
}

impl DeployedWorkflow {
    pub(crate) fn running(spec: WorkflowDefinitionSpec, now: DateTime<Utc>) -> Self {
        Self {
            spec,
            runtime_status: WorkflowPhase::Running,
            started_at: now,
            stopped_at: None,
            last_error: None,
        }
    }

    pub(crate) fn failed(spec: WorkflowDefinitionSpec, error: String, now: DateTime<Utc>) -> Self {
        Self {
            spec,
            runtime_status: WorkflowPhase::Failed,
            started_at: now,
            stopped_at: Some(now),
            last_error: Some(error),
        }
    }

    /// Marks the workflow terminated. A failed workflow keeps the time it
    /// stopped at.
    pub(crate) fn terminate(&mut self, now: DateTime<Utc>) {
        self.runtime_status = WorkflowPhase::Terminated;
        self.stopped_at.get_or_insert(now);
    }
}

#[derive(Debug, Default)]
pub(crate) struct Store {
    pub(crate) definitions: HashMap<String, WorkflowDefinition>,
    pub(crate) deployed: HashMap<String, DeployedWorkflow>,
}

impl Store {
    pub(crate) fn write(&mut self, key: &str, record: WorkflowDefinition, entry: DeployedWorkflow) {
        self.definitions.insert(key.to_string(), record);
        self.deployed.insert(key.to_string(), entry);
    }

    /// Removes both entries for `key`. Leaves the store untouched unless
    /// both are present.
    pub(crate) fn remove(&mut self, key: &str) -> Option<(WorkflowDefinition, DeployedWorkflow)> {
        if !self.definitions.contains_key(key) || !self.deployed.contains_key(key) {
            return None;
        }
        let record = self.definitions.remove(key)?;
        let entry = self.deployed.remove(key)?;
        Some((record, entry))
    }
}
