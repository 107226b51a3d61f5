//! Services - the ingestion-to-aggregation core
//!
//! This module contains the pipeline core:
//! - `queue` - bounded FIFO with non-blocking admission and close semantics
//! - `pool` - worker pool draining the queue into the aggregator
//! - `aggregator` - concurrency-safe per-origin error counters
//! - `pipeline` - wiring and lifecycle (start, shutdown, final snapshot)

pub mod aggregator;
pub mod pipeline;
pub mod pool;
pub mod queue;

// Re-export commonly used types
pub use aggregator::ErrorAggregator;
pub use pipeline::{Pipeline, PipelineConfig};
pub use pool::WorkerPool;
pub use queue::{EnqueueError, EventQueue};
