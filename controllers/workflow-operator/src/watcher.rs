//! Kubernetes resource watcher.
//!
//! Streams WorkflowDefinition changes from the API server with
//! `kube_runtime::watcher` and feeds them into the [`Controller`] queue.
//! Reconnection after stream errors uses the runtime's default backoff.

use crate::controller::{Controller, ControllerEvent};
use crate::error::ControllerError;
use crds::WorkflowDefinition;
use futures::StreamExt;
use kube::Api;
use kube_runtime::{watcher, WatchStreamExt};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Maps a watch event to a controller event.
///
/// Objects listed during the initial sync become `ADDED`, later changes
/// `MODIFIED`. Sync markers carry no object and map to `None`.
pub fn to_controller_event(event: watcher::Event<WorkflowDefinition>) -> Option<ControllerEvent> {
    match event {
        watcher::Event::InitApply(definition) => Some(ControllerEvent::added(definition)),
        watcher::Event::Apply(definition) => Some(ControllerEvent::modified(definition)),
        watcher::Event::Delete(definition) => Some(ControllerEvent::deleted(definition)),
        watcher::Event::Init | watcher::Event::InitDone => None,
    }
}

/// Watches WorkflowDefinition resources and enqueues their changes.
pub struct Watcher {
    api: Api<WorkflowDefinition>,
    controller: Arc<Controller>,
}

impl Watcher {
    /// Creates a new watcher instance.
    pub fn new(api: Api<WorkflowDefinition>, controller: Arc<Controller>) -> Self {
        Self { api, controller }
    }

    /// Runs the watch until `cancel` fires.
    ///
    /// Returns [`ControllerError::Watch`] only if the stream ends on its
    /// own, which the backoff wrapper should prevent.
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), ControllerError> {
        info!("Starting WorkflowDefinition watcher");

        let mut stream = std::pin::pin!(
            watcher(self.api.clone(), watcher::Config::default()).default_backoff()
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("WorkflowDefinition watcher stopped");
                    return Ok(());
                }
                next = stream.next() => match next {
                    Some(Ok(event)) => self.dispatch(event),
                    Some(Err(e)) => warn!("WorkflowDefinition watch error (retrying): {}", e),
                    None => {
                        return Err(ControllerError::Watch(
                            "WorkflowDefinition watch stream ended".to_string(),
                        ));
                    }
                },
            }
        }
    }

    fn dispatch(&self, event: watcher::Event<WorkflowDefinition>) {
        match &event {
            watcher::Event::Init => debug!("WorkflowDefinition initial sync started"),
            watcher::Event::InitDone => debug!("WorkflowDefinition initial sync done"),
            _ => {}
        }
        if let Some(event) = to_controller_event(event) {
            // Dropped events are logged by the controller and recovered on resync.
            self.controller.enqueue(event);
        }
    }
}
