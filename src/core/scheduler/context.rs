//! Cancellation and deadline context which is carried through one scheduling cycle.

use std::time::{Duration, Instant};

use tokio::sync::watch;

#[derive(Clone, Debug)]
pub struct CycleContext {
    deadline: Option<Instant>,
    cancelled: watch::Receiver<bool>,
}

/// Cancels every context created together with it and all contexts derived from them.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl CycleContext {
    /// Context which is never cancelled and has no deadline.
    pub fn background() -> Self {
        let (_sender, cancelled) = watch::channel(false);
        Self {
            deadline: None,
            cancelled,
        }
    }

    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, cancelled) = watch::channel(false);
        (
            Self {
                deadline: None,
                cancelled,
            },
            CancelHandle { sender },
        )
    }

    /// Derived context whose deadline is the earlier of the current one and `now + timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            deadline: Some(self.deadline.map_or(deadline, |d| d.min(deadline))),
            cancelled: self.cancelled.clone(),
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow()
    }

    pub fn is_expired(&self) -> bool {
        self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the context is cancelled. Never resolves for contexts whose cancel handle
    /// was dropped without cancelling.
    pub(crate) async fn cancelled(&self) {
        let mut receiver = self.cancelled.clone();
        if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Resolves once the deadline passes, never for contexts without one.
    pub(crate) async fn expired(&self) {
        match self.deadline {
            Some(deadline) => tokio::time::sleep_until(deadline.into()).await,
            None => std::future::pending::<()>().await,
        }
    }
}
