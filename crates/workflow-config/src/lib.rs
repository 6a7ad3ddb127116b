//! Workflow configuration parsing
//!
//! Turns the configuration embedded in a `WorkflowDefinition` into a
//! structured [`WorkflowConfig`], rejecting payloads that are not valid YAML
//! or that fail structural validation.
//!
//! # Example
//!
//! ```
//! use workflow_config::{ConfigParser, YamlConfigParser};
//!
//! let parser = YamlConfigParser::new();
//! let config = parser.parse("modules:\n  - name: web\n    type: http.server\n")?;
//! assert_eq!(config.modules[0].name, "web");
//! # Ok::<(), workflow_config::ConfigError>(())
//! ```
//!
//! The [`ConfigParser`] trait is the seam the operator depends on; enable the
//! `test-util` feature for canned parsers.

pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod parser_trait;
pub mod yaml;
#[cfg(feature = "test-util")]
pub mod mock;

pub use error::{ConfigError, ValidationError, ValidationErrors};
pub use models::*;
pub use parser_trait::ConfigParser;
pub use yaml::YamlConfigParser;
#[cfg(feature = "test-util")]
pub use mock::{FailingConfigParser, StaticConfigParser};
