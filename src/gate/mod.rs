//! Bounded admission for tool invocations.
//!
//! Every resolve spawns a yt-dlp process; the gate caps how many run at once.
//! Excess submissions wait for a permit in arrival order (tokio's semaphore is
//! fair), with no priority, cancellation or timeout.

use std::future::Future;
use tokio::sync::Semaphore;

/// Default number of concurrently executing resolutions
pub const DEFAULT_LIMIT: usize = 2;

pub struct ConcurrencyGate {
    permits: Semaphore,
    limit: usize,
}

impl ConcurrencyGate {
    pub fn new(limit: usize) -> Self {
        Self {
            permits: Semaphore::new(limit),
            limit,
        }
    }

    /// Run `task` once a slot is free
    pub async fn submit<F, T>(&self, task: F) -> T
    where
        F: Future<Output = T>,
    {
        // The semaphore is never closed, so acquiring only fails if that changes.
        let _permit = match self.permits.acquire().await {
            Ok(permit) => Some(permit),
            Err(e) => {
                tracing::error!("Concurrency gate unavailable, running ungated: {}", e);
                None
            }
        };

        task.await
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Tasks currently holding a slot
    pub fn in_flight(&self) -> usize {
        self.limit - self.permits.available_permits()
    }
}

impl Default for ConcurrencyGate {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}
