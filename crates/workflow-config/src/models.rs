//! Workflow configuration models
//!
//! Only `modules` is interpreted here; the remaining sections are carried
//! through as raw YAML for the engine that executes the workflow.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parsed workflow configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    /// Modules instantiated by the workflow
    #[serde(default)]
    pub modules: Vec<ModuleConfig>,

    /// Workflow handlers keyed by workflow type
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub workflows: BTreeMap<String, serde_yaml::Value>,

    /// Triggers keyed by trigger type
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub triggers: BTreeMap<String, serde_yaml::Value>,

    /// Named pipelines
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub pipelines: BTreeMap<String, serde_yaml::Value>,
}

/// One module entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleConfig {
    /// Unique module name
    #[serde(default)]
    pub name: String,

    /// Module type, e.g. `http.server`
    #[serde(rename = "type", default)]
    pub module_type: String,

    /// Module-specific settings
    #[serde(default, skip_serializing_if = "serde_yaml::Value::is_null")]
    pub config: serde_yaml::Value,

    /// Names of modules that must start first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

impl ModuleConfig {
    /// Pipeline step modules may share names.
    pub fn is_pipeline_step(&self) -> bool {
        self.module_type.starts_with("step.")
    }
}

impl WorkflowConfig {
    /// Looks up a module by name.
    pub fn module(&self, name: &str) -> Option<&ModuleConfig> {
        self.modules.iter().find(|module| module.name == name)
    }
}
