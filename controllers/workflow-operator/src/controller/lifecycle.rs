//! Start/stop state machine for the controller loop.
//!
//! `Stopped -> Running -> Stopping -> Stopped`. [`Lifecycle::begin`] is the
//! only way into `Running` and hands back a [`RunGuard`];
//! [`Lifecycle::stop`] is the only way into `Stopping`, so one caller wins
//! a concurrent stop. Dropping the guard is the only way back to `Stopped`,
//! so the state resets even if the loop future is dropped mid-run.

use crate::error::ControllerError;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Default)]
enum State {
    #[default]
    Stopped,
    Running {
        cancel: CancellationToken,
        done: watch::Receiver<bool>,
    },
    Stopping,
}

/// Lifecycle of one controller.
#[derive(Debug, Default)]
pub(crate) struct Lifecycle {
    state: Mutex<State>,
}

impl Lifecycle {
    /// Transitions `Stopped -> Running`.
    ///
    /// The loop's token is a child of `parent`: cancelling either ends the
    /// loop, but stopping the controller never cancels the caller's token.
    pub(crate) fn begin(&self, parent: &CancellationToken) -> Result<RunGuard<'_>, ControllerError> {
        let mut state = self.lock();
        if !matches!(*state, State::Stopped) {
            return Err(ControllerError::AlreadyRunning);
        }
        let cancel = parent.child_token();
        let (done_tx, done_rx) = watch::channel(false);
        *state = State::Running {
            cancel: cancel.clone(),
            done: done_rx,
        };
        Ok(RunGuard {
            lifecycle: self,
            cancel,
            done: done_tx,
        })
    }

    /// Transitions `Running -> Stopping`, cancelling the loop.
    ///
    /// Returns the completion signal to wait on. Fails if the loop is
    /// stopped or another caller is already stopping it.
    pub(crate) fn stop(&self) -> Result<watch::Receiver<bool>, ControllerError> {
        let mut state = self.lock();
        match std::mem::replace(&mut *state, State::Stopping) {
            State::Running { cancel, done } => {
                cancel.cancel();
                Ok(done)
            }
            previous => {
                *state = previous;
                Err(ControllerError::NotRunning)
            }
        }
    }

    /// True from `begin` until the loop has exited.
    pub(crate) fn is_running(&self) -> bool {
        !matches!(*self.lock(), State::Stopped)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Held by the loop while it runs.
#[derive(Debug)]
pub(crate) struct RunGuard<'a> {
    lifecycle: &'a Lifecycle,
    /// Cancelled when the loop should exit
    pub(crate) cancel: CancellationToken,
    done: watch::Sender<bool>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        *self.lifecycle.lock() = State::Stopped;
        self.done.send_replace(true);
    }
}
