//! Configuration errors

use std::fmt;
use thiserror::Error;

/// Errors that can occur when parsing a workflow configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Payload was empty or whitespace only
    #[error("workflow config is empty")]
    Empty,

    /// Payload is not valid YAML for a workflow config
    #[error("invalid workflow config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Payload parsed but failed structural validation
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// Parser-specific failure
    #[error("{0}")]
    Other(String),
}

/// A single validation problem and the path to the offending field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path, e.g. `modules[0].type`
    pub path: String,
    /// What is wrong
    pub message: String,
}

impl ValidationError {
    pub(crate) fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every problem found in one validation pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    /// Number of problems found.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no problems were found.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the individual problems.
    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config validation failed with {} error(s):", self.0.len())?;
        for error in &self.0 {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}
