//! Backoff sleeping
//!
//! Wrappers wait through a [`Sleeper`] so the waits can be observed without
//! slowing tests down.

use futures::future::BoxFuture;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Waits out a backoff delay
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Sleeps on the tokio timer
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Records requested sleeps and returns immediately
#[derive(Debug, Default, Clone)]
pub struct RecordingSleeper {
    sleeps: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .map(|sleeps| sleeps.clone())
            .unwrap_or_default()
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        Box::pin(std::future::ready(()))
    }
}
