//! YAML workflow configuration parser
//!
//! Deserializes the payload with `serde_yaml`, then runs a structural
//! validation pass that collects every problem before failing.

use crate::error::{ConfigError, ValidationError, ValidationErrors};
use crate::models::WorkflowConfig;
use crate::parser_trait::ConfigParser;
use std::collections::HashMap;
use tracing::debug;

/// Default [`ConfigParser`] used by the operator.
#[derive(Debug, Clone, Default)]
pub struct YamlConfigParser {
    allow_empty_modules: bool,
}

impl YamlConfigParser {
    /// Creates a parser that requires at least one module.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept configs that declare no modules.
    #[must_use]
    pub fn allow_empty_modules(mut self, allow: bool) -> Self {
        self.allow_empty_modules = allow;
        self
    }

    /// Checks a parsed config, returning all problems found.
    pub fn validate(&self, config: &WorkflowConfig) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();

        if config.modules.is_empty() && !self.allow_empty_modules {
            errors.push(ValidationError::new("modules", "at least one module is required"));
        }

        // name -> index of first definition
        let mut seen: HashMap<&str, usize> = HashMap::new();

        for (i, module) in config.modules.iter().enumerate() {
            let prefix = format!("modules[{i}]");

            if module.name.is_empty() {
                errors.push(ValidationError::new(
                    format!("{prefix}.name"),
                    "module name is required",
                ));
            } else if module.is_pipeline_step() {
                seen.entry(module.name.as_str()).or_insert(i);
            } else if let Some(first) = seen.get(module.name.as_str()) {
                errors.push(ValidationError::new(
                    format!("{prefix}.name"),
                    format!(
                        "duplicate module name {:?} (first defined at modules[{first}])",
                        module.name
                    ),
                ));
            } else {
                seen.insert(module.name.as_str(), i);
            }

            if module.module_type.is_empty() {
                errors.push(ValidationError::new(
                    format!("{prefix}.type"),
                    "module type is required",
                ));
            }

            for (j, dep) in module.depends_on.iter().enumerate() {
                if dep.is_empty() {
                    errors.push(ValidationError::new(
                        format!("{prefix}.dependsOn[{j}]"),
                        "dependency name must not be empty",
                    ));
                }
            }
        }

        // Second pass: every name is known now.
        for (i, module) in config.modules.iter().enumerate() {
            for (j, dep) in module.depends_on.iter().enumerate() {
                if !dep.is_empty() && !seen.contains_key(dep.as_str()) {
                    errors.push(ValidationError::new(
                        format!("modules[{i}].dependsOn[{j}]"),
                        format!("depends on undefined module {dep:?}"),
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }
}

impl ConfigParser for YamlConfigParser {
    fn parse(&self, text: &str) -> Result<WorkflowConfig, ConfigError> {
        if text.trim().is_empty() {
            return Err(ConfigError::Empty);
        }

        let config: WorkflowConfig = serde_yaml::from_str(text)?;
        self.validate(&config)?;

        debug!(
            "Parsed workflow config: {} module(s), {} workflow(s)",
            config.modules.len(),
            config.workflows.len()
        );
        Ok(config)
    }
}
