//! Worker pool draining the event queue
//!
//! N symmetric, stateless loops consume from the shared queue. Error-severity
//! events bump the per-origin counter; everything else is consumed and
//! discarded. Bad data never ends a loop - only queue closure does.

use crate::infra::metrics::PipelineMetrics;
use crate::services::aggregator::ErrorAggregator;
use crate::services::queue::EventQueue;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Handle over the spawned consumption loops.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Launch `n` consumption loops over the shared queue.
    ///
    /// `processing_delay` simulates per-event work (demo and test knob);
    /// zero means no artificial delay.
    pub fn spawn(
        n: usize,
        queue: Arc<EventQueue>,
        aggregator: Arc<ErrorAggregator>,
        metrics: Arc<PipelineMetrics>,
        processing_delay: Duration,
    ) -> Self {
        assert!(n > 0, "worker count must be positive");

        let handles = (0..n)
            .map(|worker_id| {
                let queue = queue.clone();
                let aggregator = aggregator.clone();
                let metrics = metrics.clone();
                tokio::spawn(async move {
                    run_worker(worker_id, queue, aggregator, metrics, processing_delay).await;
                })
            })
            .collect();

        Self { handles }
    }

    /// Wait until every worker has observed end-of-stream and returned.
    ///
    /// Must complete before the final aggregator snapshot is trusted.
    /// Idempotent: handles are drained on the first call, so a second call
    /// returns immediately.
    pub async fn wait(&mut self) {
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker_join_failed");
            }
        }
    }
}

/// One consumption loop: dequeue until end-of-stream, counting errors.
async fn run_worker(
    worker_id: usize,
    queue: Arc<EventQueue>,
    aggregator: Arc<ErrorAggregator>,
    metrics: Arc<PipelineMetrics>,
    processing_delay: Duration,
) {
    info!(worker_id = %worker_id, "worker_started");

    while let Some(event) = queue.dequeue().await {
        if !processing_delay.is_zero() {
            tokio::time::sleep(processing_delay).await;
        }

        if event.severity.is_error() {
            debug!(worker_id = %worker_id, origin = %event.origin, "error_event_counted");
            aggregator.increment(&event.origin);
            metrics.record_error_event();
        }
        metrics.record_processed();
    }

    info!(worker_id = %worker_id, "worker_stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::{LogEvent, Severity};

    fn shared_state() -> (Arc<EventQueue>, Arc<ErrorAggregator>, Arc<PipelineMetrics>) {
        (
            Arc::new(EventQueue::new(16)),
            Arc::new(ErrorAggregator::new()),
            Arc::new(PipelineMetrics::new()),
        )
    }

    #[tokio::test]
    async fn test_single_worker_counts_errors() {
        let (queue, aggregator, metrics) = shared_state();
        let mut pool =
            WorkerPool::spawn(1, queue.clone(), aggregator.clone(), metrics.clone(), Duration::ZERO);

        queue.enqueue(LogEvent::new("ok", Severity::Info, "Auth")).unwrap();
        queue.enqueue(LogEvent::new("boom", Severity::Error, "Payment")).unwrap();
        queue.enqueue(LogEvent::new("boom", Severity::Error, "Auth")).unwrap();
        queue.close();
        pool.wait().await;

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.get("Payment"), Some(&1));
        assert_eq!(snapshot.get("Auth"), Some(&1));
        assert_eq!(metrics.processed_total(), 3);
        assert_eq!(metrics.error_events_total(), 2);
    }

    #[tokio::test]
    async fn test_unknown_severity_consumed_not_counted() {
        let (queue, aggregator, metrics) = shared_state();
        let mut pool =
            WorkerPool::spawn(1, queue.clone(), aggregator.clone(), metrics.clone(), Duration::ZERO);

        queue.enqueue(LogEvent::new("weird", Severity::Unknown, "Auth")).unwrap();
        queue.enqueue(LogEvent::new("boom", Severity::Error, "Auth")).unwrap();
        queue.close();
        pool.wait().await;

        // The unknown event was consumed (worker survived it) but not aggregated.
        assert_eq!(aggregator.snapshot().get("Auth"), Some(&1));
        assert_eq!(metrics.processed_total(), 2);
    }

    #[tokio::test]
    async fn test_wait_is_idempotent() {
        let (queue, aggregator, metrics) = shared_state();
        let mut pool = WorkerPool::spawn(2, queue.clone(), aggregator, metrics, Duration::ZERO);

        queue.close();
        pool.wait().await;
        // Second wait has nothing to join and returns immediately.
        pool.wait().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_workers_drain_everything() {
        let (queue, aggregator, metrics) = shared_state();
        let mut pool =
            WorkerPool::spawn(8, queue.clone(), aggregator.clone(), metrics.clone(), Duration::ZERO);

        for i in 0..16 {
            let origin = if i % 2 == 0 { "Payment" } else { "Database" };
            queue.enqueue(LogEvent::new("boom", Severity::Error, origin)).unwrap();
        }
        queue.close();
        pool.wait().await;

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.get("Payment"), Some(&8));
        assert_eq!(snapshot.get("Database"), Some(&8));
        assert_eq!(metrics.processed_total(), 16);
        assert_eq!(queue.depth(), 0);
    }
}
