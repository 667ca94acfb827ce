//! Operation context - cancellation and deadlines for package manager calls.
//!
//! Every `PackageManager` operation receives an `OpContext`. The umbrella
//! hands the same context to each backend and never inspects it itself;
//! backends call `check()` at convenient points (between sources, between
//! archive entries) and bail out with the resulting error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::packmanager::errors::PackManagerError;

/// Cancellation flag plus optional deadline.
///
/// Clones share the cancellation flag, so cancelling any clone cancels
/// them all.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl OpContext {
    /// Create a context that never expires.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire `timeout` from now. A timeout too large to be represented as
    /// an instant leaves the context without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    /// Expire at `deadline`. An earlier existing deadline is kept.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every clone of it.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether `cancel()` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// The reason this context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<PackManagerError> {
        if self.is_cancelled() {
            return Some(PackManagerError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(PackManagerError::DeadlineExceeded)
            }
            _ => None,
        }
    }

    /// Fail if the context is cancelled or past its deadline.
    pub fn check(&self) -> Result<(), PackManagerError> {
        match self.err() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
