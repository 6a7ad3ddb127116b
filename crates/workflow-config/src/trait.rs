//! ConfigParser trait for mocking
//!
//! The operator only depends on this trait, so tests can substitute a
//! parser with canned results.

use crate::error::ConfigError;
use crate::models::WorkflowConfig;

/// Parses an embedded workflow configuration.
///
/// Implementations must not modify the payload and must not retry; the
/// error's `Display` output is surfaced verbatim in the resource status.
pub trait ConfigParser: Send + Sync {
    /// Parses and validates `text`.
    fn parse(&self, text: &str) -> Result<WorkflowConfig, ConfigError>;
}

impl<P: ConfigParser + ?Sized> ConfigParser for std::sync::Arc<P> {
    fn parse(&self, text: &str) -> Result<WorkflowConfig, ConfigError> {
        (**self).parse(text)
    }
}
