//! Bounded fan-out/fan-in over a fixed set of workers.
//!
//! ```text
//! items ─► task queue ─► worker 1..n ─► result channel ─► collector
//! ```
//!
//! Workers pull from a shared queue until it is empty. Each item runs in
//! its own task so a panic is reported against that item only. Results
//! arrive in completion order.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};

use crate::error::AgentError;

/// Runs `f` over `items` with at most `workers` in flight.
///
/// The worker count is clamped to `1..=items.len()`. Each entry of the
/// returned vector is the output of one item, or
/// [`AgentError::Orchestration`] if that item's task panicked or was
/// cancelled.
pub async fn run_pool<T, R, F, Fut>(items: Vec<T>, workers: usize, f: F) -> Vec<Result<R, AgentError>>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
{
    let total = items.len();
    if total == 0 {
        return Vec::new();
    }
    let workers = workers.clamp(1, total);
    debug!(items = total, workers, "worker pool starting");

    let (task_tx, task_rx) = mpsc::channel(total);
    for item in items {
        if task_tx.send(item).await.is_err() {
            break;
        }
    }
    drop(task_tx);

    let queue = Arc::new(Mutex::new(task_rx));
    let f = Arc::new(f);
    let (result_tx, mut result_rx) = mpsc::channel(total);

    let mut handles = Vec::with_capacity(workers);
    for worker in 0..workers {
        let queue = Arc::clone(&queue);
        let f = Arc::clone(&f);
        let result_tx = result_tx.clone();
        handles.push(tokio::spawn(async move {
            loop {
                let next = queue.lock().await.recv().await;
                let Some(item) = next else { break };
                let outcome = tokio::spawn((*f)(item)).await.map_err(|e| {
                    warn!(worker, error = %e, "pool task failed");
                    AgentError::Orchestration {
                        message: format!("worker task failed: {e}"),
                    }
                });
                if result_tx.send(outcome).await.is_err() {
                    break;
                }
            }
        }));
    }
    drop(result_tx);

    let mut results = Vec::with_capacity(total);
    while let Some(result) = result_rx.recv().await {
        results.push(result);
    }
    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "pool worker exited abnormally");
        }
    }
    debug!(results = results.len(), "worker pool drained");
    results
}
