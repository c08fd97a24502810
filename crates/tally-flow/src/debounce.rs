use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep};

/// Trailing-edge debouncer.
///
/// Holds the most recent value pushed and releases it once `quiet` has
/// elapsed without another push. Intended to be polled from a
/// `tokio::select!` branch guarded by [`is_armed`](Self::is_armed).
///
/// Must be created inside a Tokio runtime.
pub struct Debounce<T> {
    quiet: Duration,
    pending: Option<T>,
    deadline: Pin<Box<Sleep>>,
}

impl<T> Debounce<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
            deadline: Box::pin(tokio::time::sleep(quiet)),
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Replace the pending value and restart the quiet window.
    pub fn push(&mut self, value: T) {
        self.pending = Some(value);
        self.deadline.as_mut().reset(Instant::now() + self.quiet);
    }

    /// Returns `true` while a value is waiting for the quiet window to end.
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value without waiting.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Wait until the quiet window ends and return the latest value.
    ///
    /// Never completes while nothing is pending. Cancel-safe: the pending
    /// value is only taken after the deadline fires.
    pub async fn ready(&mut self) -> T {
        loop {
            if self.pending.is_none() {
                std::future::pending::<()>().await;
            }
            self.deadline.as_mut().await;
            if let Some(value) = self.pending.take() {
                return value;
            }
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Debounce<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debounce")
            .field("quiet", &self.quiet)
            .field("pending", &self.pending)
            .finish()
    }
}
