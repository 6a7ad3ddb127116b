//! Main controller implementation.
//!
//! This module contains the `Controller` struct that turns a stream of
//! lifecycle events into serialized calls against a [`Reconciler`].
//!
//! Events go through a bounded FIFO queue. [`Controller::enqueue`] never
//! blocks: when the queue is full the event is dropped with a warning, and
//! producers that need delivery re-enqueue on their next resync. A single
//! loop, run by [`Controller::start`], drains the queue one event at a time
//! in enqueue order until it is cancelled.

mod event;
mod lifecycle;
#[cfg(test)]
mod controller_test;

pub use event::{ControllerEvent, EventType};

use crate::error::ControllerError;
use crate::reconciler::Reconciler;
use lifecycle::Lifecycle;
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Queue capacity used by [`Controller::new`].
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Event-driven controller for WorkflowDefinition resources.
#[derive(Debug)]
pub struct Controller {
    reconciler: Arc<Reconciler>,
    sender: mpsc::Sender<ControllerEvent>,
    receiver: Mutex<mpsc::Receiver<ControllerEvent>>,
    lifecycle: Lifecycle,
}

impl Controller {
    /// Creates a controller with a queue of [`DEFAULT_QUEUE_CAPACITY`] events.
    pub fn new(reconciler: Arc<Reconciler>) -> Self {
        Self::with_capacity(reconciler, DEFAULT_QUEUE_CAPACITY)
    }

    /// Creates a controller with a queue of `capacity` events (at least one).
    pub fn with_capacity(reconciler: Arc<Reconciler>, capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            reconciler,
            sender,
            receiver: Mutex::new(receiver),
            lifecycle: Lifecycle::default(),
        }
    }

    /// The reconciler this controller drives.
    pub fn reconciler(&self) -> &Arc<Reconciler> {
        &self.reconciler
    }

    /// Queues an event without blocking.
    ///
    /// Returns `false` if the queue was full and the event was dropped.
    pub fn enqueue(&self, event: ControllerEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!(
                    "Event queue full ({} events), dropping {} event for {}",
                    self.capacity(),
                    event.event_type,
                    event.definition.key().unwrap_or_default()
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                warn!(
                    "Event queue closed, dropping {} event for {}",
                    event.event_type,
                    event.definition.key().unwrap_or_default()
                );
                false
            }
        }
    }

    /// Events waiting in the queue.
    pub fn pending_events(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    /// Maximum number of queued events.
    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    /// Whether the loop is running (including while it is stopping).
    pub fn is_running(&self) -> bool {
        self.lifecycle.is_running()
    }

    /// Runs the event loop until `cancel` fires or [`Controller::stop`] is
    /// called.
    ///
    /// Fails immediately with [`ControllerError::AlreadyRunning`] if the
    /// loop is already running.
    pub async fn start(&self, cancel: CancellationToken) -> Result<(), ControllerError> {
        let guard = self.lifecycle.begin(&cancel)?;
        let mut receiver = self.receiver.lock().await;
        info!("Workflow controller running (queue capacity {})", self.capacity());

        loop {
            tokio::select! {
                biased;
                () = guard.cancel.cancelled() => break,
                event = receiver.recv() => match event {
                    Some(event) => self.process_event(&guard.cancel, event),
                    // Unreachable while `self` holds the sender
                    None => break,
                },
            }
        }

        info!("Workflow controller stopped");
        Ok(())
    }

    /// Stops the loop and waits until it has exited.
    ///
    /// After this returns no further reconciler calls are made by this
    /// controller. Fails with [`ControllerError::NotRunning`] if the loop
    /// is not running or another `stop` is already in progress.
    pub async fn stop(&self) -> Result<(), ControllerError> {
        let mut done = self.lifecycle.stop()?;
        info!("Stopping workflow controller");
        if done.wait_for(|exited| *exited).await.is_err() {
            debug!("Controller loop exited before signalling completion");
        }
        Ok(())
    }

    /// Dispatches one event to the reconciler. Failures are logged and
    /// never end the loop.
    fn process_event(&self, cancel: &CancellationToken, event: ControllerEvent) {
        let ControllerEvent {
            event_type,
            definition,
        } = event;

        match event_type {
            EventType::Added | EventType::Modified => {
                match self.reconciler.reconcile(cancel, &definition) {
                    Ok(result) => info!(
                        "Processed {} event for {}: {} ({})",
                        event_type, result.key, result.action, result.message
                    ),
                    Err(failure) => error!(
                        "Failed to process {} event for {}: {} ({})",
                        event_type, failure.result.key, failure.result.action, failure.source
                    ),
                }
            }
            EventType::Deleted => {
                let name = definition.resource_name().unwrap_or_default();
                let namespace = definition.namespace_or_default();
                match self.reconciler.delete(cancel, name, namespace) {
                    Ok(_) => info!("Processed {} event for {}/{}", event_type, namespace, name),
                    Err(e) => error!(
                        "Failed to process {} event for {}/{}: {}",
                        event_type, namespace, name, e
                    ),
                }
            }
            EventType::Unknown => {
                warn!(
                    "Ignoring event of unknown type for {}",
                    definition.key().unwrap_or_default()
                );
            }
        }
    }
}
