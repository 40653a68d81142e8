//! Concurrent fan-out of independent tasks.
//!
//! # Responsibilities
//! - Spawn every task at once (parallelism equals the task count)
//! - Wait until all tasks finished, or stop at the first failure
//! - Apply the configured policy to tasks still running after a failure
//!
//! # Design Decisions
//! - One `tokio::spawn` per task, so a slow backend never blocks the others
//! - Completion order is whatever the runtime produces; callers key results
//! - `Detach` lets survivors run to completion and drops their output
//! - `Abort` cancels survivors at their next await point

use std::future::Future;

use futures_util::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};

/// What happens to in-flight tasks once one task failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Return the failure; the remaining tasks keep running unobserved.
    #[default]
    Detach,
    /// Return the failure and abort the remaining tasks.
    Abort,
}

/// Why a fan-out stopped early.
#[derive(Debug)]
pub enum FanOutError<K, E> {
    /// The task returned an error.
    Failed { key: K, error: E },
    /// The task panicked or was cancelled.
    Panicked { key: K },
}

/// Runs keyed tasks concurrently and joins on all of them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FanOutExecutor {
    policy: FailurePolicy,
}

impl FanOutExecutor {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Spawn all tasks and collect `(key, output)` pairs in completion order.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn run<K, T, E, Fut>(
        &self,
        tasks: Vec<(K, Fut)>,
    ) -> Result<Vec<(K, T)>, FanOutError<K, E>>
    where
        K: Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let mut abort_handles = Vec::with_capacity(tasks.len());
        let mut pending = FuturesUnordered::new();

        for (key, task) in tasks {
            let handle = tokio::spawn(task);
            abort_handles.push(handle.abort_handle());
            pending.push(async move { (key, handle.await) });
        }

        let mut completed = Vec::with_capacity(abort_handles.len());
        while let Some((key, joined)) = pending.next().await {
            let failure = match joined {
                Ok(Ok(output)) => {
                    completed.push((key, output));
                    continue;
                }
                Ok(Err(error)) => FanOutError::Failed { key, error },
                Err(_) => FanOutError::Panicked { key },
            };

            if self.policy == FailurePolicy::Abort {
                for handle in &abort_handles {
                    handle.abort();
                }
            }
            return Err(failure);
        }

        Ok(completed)
    }
}
