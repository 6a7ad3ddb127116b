//! Lifecycle events fed into the controller queue.

use crds::WorkflowDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change observed for a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    /// Resource appeared
    Added,
    /// Resource spec changed
    Modified,
    /// Resource was removed
    Deleted,
    /// Anything else an upstream producer sends; logged and ignored
    #[serde(other)]
    Unknown,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EventType::Added => "ADDED",
            EventType::Modified => "MODIFIED",
            EventType::Deleted => "DELETED",
            EventType::Unknown => "UNKNOWN",
        })
    }
}

/// A change notification for one WorkflowDefinition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControllerEvent {
    /// What happened
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// The resource as observed
    pub definition: WorkflowDefinition,
}

impl ControllerEvent {
    /// Creates an event of `event_type` for `definition`.
    pub fn new(event_type: EventType, definition: WorkflowDefinition) -> Self {
        Self {
            event_type,
            definition,
        }
    }

    /// An `ADDED` event.
    pub fn added(definition: WorkflowDefinition) -> Self {
        Self::new(EventType::Added, definition)
    }

    /// A `MODIFIED` event.
    pub fn modified(definition: WorkflowDefinition) -> Self {
        Self::new(EventType::Modified, definition)
    }

    /// A `DELETED` event.
    pub fn deleted(definition: WorkflowDefinition) -> Self {
        Self::new(EventType::Deleted, definition)
    }
}
