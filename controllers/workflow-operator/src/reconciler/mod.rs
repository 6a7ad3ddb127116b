//! Reconciliation logic for WorkflowDefinition resources.
//!
//! The [`Reconciler`] owns the state store (desired records plus deployed
//! runtime bookkeeping) and converges the two. It is the single source of
//! truth for status; readers call [`Reconciler::get`] and
//! [`Reconciler::list`] directly while the controller loop drives
//! [`Reconciler::reconcile`] and [`Reconciler::delete`].
//!
//! All store access goes through one `RwLock`. `reconcile` holds the write
//! lock across its diff, validation and write, so two concurrent reconciles
//! of the same key are serialized and the returned action always matches
//! the state it produced.

mod result;
mod store;

pub use result::{ReconcileAction, ReconcileResult};

use crate::error::{ControllerError, ReconcileFailure};
use chrono::Utc;
use crds::{
    namespace_or_default, resource_key, WorkflowDefinition, WorkflowDefinitionSpec,
    WorkflowDefinitionStatus,
};
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use store::{DeployedWorkflow, Store};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;
use workflow_config::{ConfigParser, YamlConfigParser};

/// Identity of a resource inside the store.
struct Identity {
    key: String,
    name: String,
    namespace: String,
}

impl Identity {
    fn of(definition: &WorkflowDefinition) -> Result<Self, ControllerError> {
        let name = definition.resource_name().ok_or(ControllerError::MissingName)?;
        let namespace = definition.namespace_or_default();
        Ok(Self {
            key: resource_key(namespace, name),
            name: name.to_string(),
            namespace: namespace.to_string(),
        })
    }
}

/// Reconciles WorkflowDefinition resources.
pub struct Reconciler {
    parser: Box<dyn ConfigParser>,
    store: RwLock<Store>,
}

impl fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reconciler")
            .field("definitions", &self.read_store().definitions.len())
            .finish_non_exhaustive()
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::with_yaml_parser()
    }
}

impl Reconciler {
    /// Creates a new reconciler validating configs with `parser`.
    pub fn new(parser: impl ConfigParser + 'static) -> Self {
        Self {
            parser: Box::new(parser),
            store: RwLock::new(Store::default()),
        }
    }

    /// Creates a reconciler using the YAML workflow config parser.
    pub fn with_yaml_parser() -> Self {
        Self::new(YamlConfigParser::new())
    }

    /// Converges the store toward `definition`.
    ///
    /// Creates the resource if it was never deployed, redeploys it if its
    /// version, config or replicas changed, and does nothing otherwise.
    /// A config that fails validation is still recorded (phase `Failed`)
    /// and reported through [`ReconcileFailure`].
    pub fn reconcile(
        &self,
        cancel: &CancellationToken,
        definition: &WorkflowDefinition,
    ) -> Result<ReconcileResult, ReconcileFailure> {
        let identity = Identity::of(definition)
            .map_err(|e| ReconcileFailure::new(String::new(), e))?;
        if cancel.is_cancelled() {
            return Err(ReconcileFailure::new(identity.key, ControllerError::Cancelled));
        }

        let desired = definition.spec.normalized();
        let mut store = self.write_store();

        let action = match store.deployed.get(&identity.key) {
            None => ReconcileAction::Created,
            Some(deployed) if deployed.spec.differs_from(&desired) => ReconcileAction::Updated,
            Some(deployed) => {
                if let Some(last_error) = &deployed.last_error {
                    debug!("WorkflowDefinition {} unchanged, still failed: {}", identity.key, last_error);
                } else {
                    debug!("WorkflowDefinition {} unchanged at version {}", identity.key, desired.version);
                }
                return Ok(ReconcileResult::new(
                    identity.key,
                    ReconcileAction::Unchanged,
                    format!("version {} already deployed", desired.version),
                ));
            }
        };

        let version = desired.version;
        let replicas = desired.replicas;
        match self.write_record(&mut store, &identity, definition, desired) {
            Ok(()) => {
                info!(
                    "Reconciled WorkflowDefinition {}: {} (version {}, {} replica(s))",
                    identity.key, action, version, replicas
                );
                Ok(ReconcileResult::new(
                    identity.key,
                    action,
                    format!("{action} at version {version} with {replicas} replica(s)"),
                ))
            }
            Err(e) => Err(ReconcileFailure::new(identity.key, e)),
        }
    }

    /// Validates and writes `definition` regardless of what is deployed.
    ///
    /// On validation failure the record is written with phase `Failed` and
    /// the failure is returned.
    pub fn apply(
        &self,
        cancel: &CancellationToken,
        definition: &WorkflowDefinition,
    ) -> Result<(), ControllerError> {
        let identity = Identity::of(definition)?;
        if cancel.is_cancelled() {
            return Err(ControllerError::Cancelled);
        }

        let desired = definition.spec.normalized();
        let version = desired.version;
        let mut store = self.write_store();
        self.write_record(&mut store, &identity, definition, desired)?;
        info!("Applied WorkflowDefinition {} at version {}", identity.key, version);
        Ok(())
    }

    /// Terminates and removes a deployed workflow.
    ///
    /// Returns the final record, with status `Terminated`. Nothing for the
    /// key remains in the store afterwards.
    pub fn delete(
        &self,
        cancel: &CancellationToken,
        name: &str,
        namespace: &str,
    ) -> Result<WorkflowDefinition, ControllerError> {
        if cancel.is_cancelled() {
            return Err(ControllerError::Cancelled);
        }

        let key = resource_key(namespace, name);
        let (mut record, mut deployed) = self
            .write_store()
            .remove(&key)
            .ok_or_else(|| ControllerError::NotFound(key.clone()))?;

        let now = Utc::now();
        record.status.get_or_insert_with(Default::default).terminate(now);

        let runtime_status = deployed.runtime_status;
        deployed.terminate(now);
        let uptime = deployed
            .stopped_at
            .unwrap_or(now)
            .signed_duration_since(deployed.started_at);
        info!(
            "Deleted WorkflowDefinition {} (was {} for {}s)",
            key,
            runtime_status,
            uptime.num_seconds()
        );
        Ok(record)
    }

    /// Returns the current record for `namespace/name`.
    pub fn get(&self, name: &str, namespace: &str) -> Result<WorkflowDefinition, ControllerError> {
        let key = resource_key(namespace, name);
        self.read_store()
            .definitions
            .get(&key)
            .cloned()
            .ok_or(ControllerError::NotFound(key))
    }

    /// Lists records in `namespace`, or in every namespace when empty.
    ///
    /// Order is unspecified; sort at the call site if it matters.
    pub fn list(&self, namespace: &str) -> Vec<WorkflowDefinition> {
        let store = self.read_store();
        if namespace.is_empty() {
            return store.definitions.values().cloned().collect();
        }
        let namespace = namespace_or_default(namespace);
        store
            .definitions
            .values()
            .filter(|definition| definition.namespace_or_default() == namespace)
            .cloned()
            .collect()
    }

    /// Validates `desired` and writes the record and deployed entry.
    ///
    /// Both are written whether or not validation passes.
    fn write_record(
        &self,
        store: &mut Store,
        identity: &Identity,
        definition: &WorkflowDefinition,
        desired: WorkflowDefinitionSpec,
    ) -> Result<(), ControllerError> {
        let now = Utc::now();
        let validation = self.validate(&desired);

        let mut record = definition.clone();
        record.metadata.name = Some(identity.name.clone());
        record.metadata.namespace = Some(identity.namespace.clone());

        let previous = store.definitions.get(&identity.key).map(|p| &p.metadata);
        record.metadata.uid = previous
            .and_then(|meta| meta.uid.clone())
            .or_else(|| Some(Uuid::new_v4().to_string()));
        record.metadata.generation =
            Some(previous.and_then(|meta| meta.generation).unwrap_or_default() + 1);

        let (status, deployed) = match &validation {
            Ok(()) => (
                WorkflowDefinitionStatus::running(&desired, now),
                DeployedWorkflow::running(desired.clone(), now),
            ),
            Err(message) => (
                WorkflowDefinitionStatus::failed(&desired, message.clone(), now),
                DeployedWorkflow::failed(desired.clone(), message.clone(), now),
            ),
        };
        record.spec = desired;
        record.status = Some(status);
        store.write(&identity.key, record, deployed);

        validation.map_err(|message| {
            warn!("WorkflowDefinition {} failed validation: {}", identity.key, message);
            ControllerError::ValidationFailed {
                key: identity.key.clone(),
                message,
            }
        })
    }

    /// Checks the embedded config. The error string is stored verbatim in
    /// the resource status.
    fn validate(&self, spec: &WorkflowDefinitionSpec) -> Result<(), String> {
        if spec.config.trim().is_empty() {
            return Err("config is empty".to_string());
        }
        self.parser
            .parse(&spec.config)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    fn read_store(&self) -> RwLockReadGuard<'_, Store> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_store(&self) -> RwLockWriteGuard<'_, Store> {
        self.store.write().unwrap_or_else(PoisonError::into_inner)
    }
}
