//! Pipeline lifecycle - wiring and shutdown ordering
//!
//! `start` builds the shared state and launches the pool, so workers are
//! consuming before any producer is handed the queue. `shutdown` closes the
//! queue exactly once, waits for the pool to drain, then reads the final
//! counts.

use crate::infra::metrics::PipelineMetrics;
use crate::services::aggregator::ErrorAggregator;
use crate::services::pool::WorkerPool;
use crate::services::queue::EventQueue;
use rustc_hash::FxHashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Pipeline sizing and behavior knobs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Number of concurrent consumers.
    pub worker_count: usize,
    /// Maximum buffered events before admission rejects.
    pub queue_capacity: usize,
    /// Simulated per-event processing time (zero in production).
    pub processing_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { worker_count: 2, queue_capacity: 100, processing_delay: Duration::ZERO }
    }
}

/// A running ingestion pipeline: queue, aggregator, and worker pool.
pub struct Pipeline {
    queue: Arc<EventQueue>,
    aggregator: Arc<ErrorAggregator>,
    pool: WorkerPool,
}

impl Pipeline {
    /// Build the shared state and launch the worker pool.
    pub fn start(config: PipelineConfig, metrics: Arc<PipelineMetrics>) -> Self {
        let queue = Arc::new(EventQueue::new(config.queue_capacity));
        let aggregator = Arc::new(ErrorAggregator::new());
        let pool = WorkerPool::spawn(
            config.worker_count,
            queue.clone(),
            aggregator.clone(),
            metrics,
            config.processing_delay,
        );

        info!(
            worker_count = %config.worker_count,
            queue_capacity = %config.queue_capacity,
            "pipeline_started"
        );

        Self { queue, aggregator, pool }
    }

    /// Shared queue handle for producers (the submission gateway).
    pub fn queue(&self) -> Arc<EventQueue> {
        self.queue.clone()
    }

    /// Aggregator handle for concurrent readers (operational endpoints).
    pub fn aggregator(&self) -> Arc<ErrorAggregator> {
        self.aggregator.clone()
    }

    /// Close the queue, wait for the pool to drain, return the final counts.
    ///
    /// Consuming `self` makes this the single shutdown path: the queue is
    /// closed exactly once and the snapshot is read only after every worker
    /// has returned.
    pub async fn shutdown(mut self) -> FxHashMap<String, u64> {
        self.queue.close();
        self.pool.wait().await;

        let snapshot = self.aggregator.snapshot();
        info!(origins = %snapshot.len(), "pipeline_drained");
        snapshot
    }
}
