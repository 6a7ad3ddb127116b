//! Canned ConfigParser implementations for unit testing
//!
//! Lets operator tests drive the success and failure paths without writing
//! real workflow YAML.

use crate::error::ConfigError;
use crate::models::WorkflowConfig;
use crate::parser_trait::ConfigParser;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Parser that accepts every payload and returns a fixed config.
#[derive(Debug, Default)]
pub struct StaticConfigParser {
    config: WorkflowConfig,
    calls: AtomicUsize,
}

impl StaticConfigParser {
    /// Create a parser returning `config` for every payload
    pub fn new(config: WorkflowConfig) -> Self {
        Self {
            config,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `parse` has been invoked
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ConfigParser for StaticConfigParser {
    fn parse(&self, _text: &str) -> Result<WorkflowConfig, ConfigError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.config.clone())
    }
}

/// Parser that rejects every payload with the same message.
#[derive(Debug)]
pub struct FailingConfigParser {
    message: String,
}

impl FailingConfigParser {
    /// Create a parser failing with `message`
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl ConfigParser for FailingConfigParser {
    fn parse(&self, _text: &str) -> Result<WorkflowConfig, ConfigError> {
        Err(ConfigError::Other(self.message.clone()))
    }
}
