//! Cancellable scheduled tasks for debounced input.
//!
//! A [`Debouncer`] owns one logical pending action: scheduling a new task
//! supersedes whatever was still waiting, so only the last action in a burst
//! of keystrokes actually fires. Supersession is a generation token checked
//! at fire time, the same mechanism the navigator uses for stale retries.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Schedule `task` to run after the configured delay. Calling again
    /// before the delay elapses supersedes the pending task. Must be called
    /// from within a tokio runtime.
    pub fn call<F>(&self, task: F) -> JoinHandle<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) == token {
                task();
            }
        })
    }

    /// Drop any pending task without scheduling a replacement.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
