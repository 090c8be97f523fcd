//! Caller-supplied cancellation and deadline for list operations.

use std::future::{Future, pending};
use std::time::Duration;

use mapr_ticket_core::{AppError, AppResult};
use tokio::sync::watch;
use tokio::time::Instant;

const CANCELLED_MESSAGE: &str = "context canceled";
const DEADLINE_EXCEEDED_MESSAGE: &str = "context deadline exceeded";

/// Carries an optional deadline and an optional cancellation signal through
/// one list invocation.
#[derive(Debug, Clone, Default)]
pub struct ListContext {
    deadline: Option<Instant>,
    cancellation: Option<watch::Receiver<bool>>,
}

/// Cancels every context derived from the one that created it.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signals cancellation. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl ListContext {
    /// Context without deadline or cancellation.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Bounds the context by `timeout` from now. An earlier existing deadline
    /// is kept; a timeout too large to represent leaves the context unbounded.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Bounds the context by an absolute deadline. An earlier existing
    /// deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(
            self.deadline
                .map_or(deadline, |existing| existing.min(deadline)),
        );
        self
    }

    /// Attaches a fresh cancellation signal, replacing any previous one.
    #[must_use]
    pub fn with_cancel(mut self) -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        self.cancellation = Some(receiver);
        (self, CancelHandle { sender })
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the context error if the context is already done.
    #[must_use]
    pub fn err(&self) -> Option<AppError> {
        if self
            .cancellation
            .as_ref()
            .is_some_and(|receiver| *receiver.borrow())
        {
            return Some(cancelled());
        }

        if self
            .deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
        {
            return Some(deadline_exceeded());
        }

        None
    }

    /// Fails with the context error if the context is already done.
    pub fn check(&self) -> AppResult<()> {
        match self.err() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Runs one suspending step, abandoning it as soon as the context is
    /// cancelled or its deadline passes.
    pub async fn run<T, F>(&self, operation: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        self.check()?;

        tokio::select! {
            biased;
            () = wait_cancelled(self.cancellation.clone()) => Err(cancelled()),
            () = wait_deadline(self.deadline) => Err(deadline_exceeded()),
            result = operation => result,
        }
    }
}

async fn wait_cancelled(receiver: Option<watch::Receiver<bool>>) {
    let Some(mut receiver) = receiver else {
        return pending().await;
    };

    // A dropped handle can never cancel.
    if receiver.wait_for(|cancelled| *cancelled).await.is_err() {
        pending::<()>().await;
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => pending().await,
    }
}

fn cancelled() -> AppError {
    AppError::Cancelled(CANCELLED_MESSAGE.to_owned())
}

fn deadline_exceeded() -> AppError {
    AppError::DeadlineExceeded(DEADLINE_EXCEEDED_MESSAGE.to_owned())
}
