//! Deferred reload after state-changing actions.
//!
//! A controller never transitions in memory after a login or initialization.
//! It schedules a [`ReloadSignal`] instead and the host re-derives every view
//! from persisted storage when the signal arrives. The pending timer is owned
//! by [`ReloadTimer`]: cancelling it, scheduling a new one, or dropping the
//! timer stops a reload that has not fired yet.

use std::{sync::Mutex, time::Duration};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, warn};

/// Why a reload was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadReason {
    /// The fallback login stored a new token.
    LoggedIn,
    /// The bootstrap run completed and the marker was persisted.
    Initialized,
}

/// Delivered to the host when a scheduled reload fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSignal {
    /// What triggered the reload.
    pub reason: ReloadReason,
    /// How long the timer waited.
    pub delay: Duration,
}

/// Receiving half handed to the host.
pub type ReloadReceiver = mpsc::UnboundedReceiver<ReloadSignal>;

/// Owner of at most one pending reload.
#[derive(Debug)]
pub struct ReloadTimer {
    sender: mpsc::UnboundedSender<ReloadSignal>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl ReloadTimer {
    /// Creates a timer and the receiver its signals arrive on.
    #[must_use]
    pub fn new() -> (Self, ReloadReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let timer = Self {
            sender,
            pending: Mutex::new(None),
        };
        (timer, receiver)
    }

    /// Schedules a reload after `delay`, replacing any pending one.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule(&self, reason: ReloadReason, delay: Duration) {
        let sender = self.sender.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(?reason, "reload fired");
            if sender.send(ReloadSignal { reason, delay }).is_err() {
                debug!("reload receiver dropped");
            }
        });

        match self.pending.lock() {
            Ok(mut pending) => {
                if let Some(previous) = pending.replace(handle) {
                    previous.abort();
                }
            }
            Err(_) => {
                warn!("reload timer lock poisoned; dropping reload");
                handle.abort();
            }
        }
    }

    /// Cancels the pending reload. Returns whether one was still waiting.
    pub fn cancel(&self) -> bool {
        let Ok(mut pending) = self.pending.lock() else {
            return false;
        };
        match pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                debug!("pending reload cancelled");
                true
            }
            _ => false,
        }
    }

    /// Whether a reload is scheduled and has not fired yet.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .ok()
            .and_then(|pending| pending.as_ref().map(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for ReloadTimer {
    fn drop(&mut self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }
}
