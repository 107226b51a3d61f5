//! Lock-free pipeline counters and periodic reporting
//!
//! Uses atomics for hot-path operations to avoid mutex contention.
//!
//! NOTE: All atomics use Relaxed ordering intentionally—these are statistical
//! counters only. Do NOT use these atomics for coordination or logic decisions.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Lock-free pipeline counters.
///
/// All counters are monotonic for the lifetime of one run; `queue_depth`
/// is a point-in-time gauge updated by the sampler.
pub struct PipelineMetrics {
    /// Submissions received at the gateway (monotonic)
    submitted_total: AtomicU64,
    /// Submissions admitted into the queue (monotonic)
    accepted_total: AtomicU64,
    /// Submissions dropped because the queue was full or closed (monotonic)
    rejected_total: AtomicU64,
    /// Payloads rejected before the queue was touched (monotonic)
    malformed_total: AtomicU64,
    /// Events consumed by workers (monotonic)
    processed_total: AtomicU64,
    /// Error-severity events that reached the aggregator (monotonic)
    error_events_total: AtomicU64,
    /// Current queue depth (updated by sampler)
    queue_depth: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            submitted_total: AtomicU64::new(0),
            accepted_total: AtomicU64::new(0),
            rejected_total: AtomicU64::new(0),
            malformed_total: AtomicU64::new(0),
            processed_total: AtomicU64::new(0),
            error_events_total: AtomicU64::new(0),
            queue_depth: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_submitted(&self) {
        self.submitted_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_accepted(&self) {
        self.accepted_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a submission dropped at admission (queue full or closed).
    #[inline]
    pub fn record_rejected(&self) {
        self.rejected_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_malformed(&self) {
        self.malformed_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_processed(&self) {
        self.processed_total.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_error_event(&self) {
        self.error_events_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Set current queue depth (called by the sampler).
    #[inline]
    pub fn set_queue_depth(&self, depth: u64) {
        self.queue_depth.store(depth, Ordering::Relaxed);
    }

    #[inline]
    pub fn submitted_total(&self) -> u64 {
        self.submitted_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn accepted_total(&self) -> u64 {
        self.accepted_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn rejected_total(&self) -> u64 {
        self.rejected_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn malformed_total(&self) -> u64 {
        self.malformed_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn processed_total(&self) -> u64 {
        self.processed_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn error_events_total(&self) -> u64 {
        self.error_events_total.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn queue_depth(&self) -> u64 {
        self.queue_depth.load(Ordering::Relaxed)
    }

    /// Consistent-enough view of all counters for reporting.
    pub fn report(&self) -> MetricsSummary {
        MetricsSummary {
            submitted_total: self.submitted_total(),
            accepted_total: self.accepted_total(),
            rejected_total: self.rejected_total(),
            malformed_total: self.malformed_total(),
            processed_total: self.processed_total(),
            error_events_total: self.error_events_total(),
            queue_depth: self.queue_depth(),
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct MetricsSummary {
    pub submitted_total: u64,
    pub accepted_total: u64,
    pub rejected_total: u64,
    pub malformed_total: u64,
    pub processed_total: u64,
    pub error_events_total: u64,
    pub queue_depth: u64,
}

impl MetricsSummary {
    pub fn log(&self) {
        info!(
            submitted = %self.submitted_total,
            accepted = %self.accepted_total,
            rejected = %self.rejected_total,
            malformed = %self.malformed_total,
            processed = %self.processed_total,
            error_events = %self.error_events_total,
            queue_depth = %self.queue_depth,
            "metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = PipelineMetrics::new();
        assert_eq!(metrics.submitted_total(), 0);
        assert_eq!(metrics.rejected_total(), 0);
        assert_eq!(metrics.queue_depth(), 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let metrics = PipelineMetrics::new();

        metrics.record_submitted();
        metrics.record_submitted();
        metrics.record_accepted();
        metrics.record_rejected();
        metrics.record_processed();
        metrics.record_error_event();

        assert_eq!(metrics.submitted_total(), 2);
        assert_eq!(metrics.accepted_total(), 1);
        assert_eq!(metrics.rejected_total(), 1);
        assert_eq!(metrics.processed_total(), 1);
        assert_eq!(metrics.error_events_total(), 1);
    }

    #[test]
    fn test_queue_depth_gauge() {
        let metrics = PipelineMetrics::new();
        metrics.set_queue_depth(42);
        assert_eq!(metrics.queue_depth(), 42);
        metrics.set_queue_depth(3);
        assert_eq!(metrics.queue_depth(), 3);
    }

    #[test]
    fn test_report_snapshot() {
        let metrics = PipelineMetrics::new();
        metrics.record_submitted();
        metrics.record_malformed();

        let summary = metrics.report();
        assert_eq!(summary.submitted_total, 1);
        assert_eq!(summary.malformed_total, 1);
        assert_eq!(summary.accepted_total, 0);
    }

    #[test]
    fn test_concurrent_updates() {
        use std::sync::Arc;
        use std::thread;

        let metrics = Arc::new(PipelineMetrics::new());
        let mut handles = vec![];

        // Spawn 10 threads, each recording 1000 submissions
        for _ in 0..10 {
            let m = metrics.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..1000 {
                    m.record_submitted();
                }
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(metrics.submitted_total(), 10_000);
    }
}
