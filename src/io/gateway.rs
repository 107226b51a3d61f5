//! Submission gateway - the boundary between producers and the core
//!
//! Parses raw payloads and performs non-blocking admission into the shared
//! queue. Malformed input never reaches the queue; a full (or closing)
//! queue surfaces as `Overloaded` so the submitter decides whether to retry.

use crate::domain::event::parse_submission;
use crate::infra::metrics::PipelineMetrics;
use crate::services::queue::{EnqueueError, EventQueue};
use std::sync::Arc;
use tracing::{debug, warn};

/// Caller-visible result of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Event admitted into the queue.
    Accepted,
    /// Event dropped: queue full or no longer accepting.
    Overloaded,
    /// Payload rejected before the core was touched.
    Malformed,
}

/// Shared entry point for all producers (HTTP handler, load generators).
pub struct SubmissionGateway {
    queue: Arc<EventQueue>,
    metrics: Arc<PipelineMetrics>,
}

impl SubmissionGateway {
    pub fn new(queue: Arc<EventQueue>, metrics: Arc<PipelineMetrics>) -> Self {
        Self { queue, metrics }
    }

    /// Parse `raw` and attempt admission. Never blocks.
    pub fn submit(&self, raw: &[u8]) -> SubmitOutcome {
        self.metrics.record_submitted();

        let Some(event) = parse_submission(raw) else {
            self.metrics.record_malformed();
            debug!("submission_malformed");
            return SubmitOutcome::Malformed;
        };

        match self.queue.enqueue(event) {
            Ok(()) => {
                self.metrics.record_accepted();
                SubmitOutcome::Accepted
            }
            Err(EnqueueError::Full(event)) => {
                self.metrics.record_rejected();
                warn!(origin = %event.origin, "event_dropped_queue_full");
                SubmitOutcome::Overloaded
            }
            Err(EnqueueError::Closed(event)) => {
                self.metrics.record_rejected();
                warn!(origin = %event.origin, "event_dropped_queue_closed");
                SubmitOutcome::Overloaded
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway_with_capacity(capacity: usize) -> (SubmissionGateway, Arc<PipelineMetrics>) {
        let queue = Arc::new(EventQueue::new(capacity));
        let metrics = Arc::new(PipelineMetrics::new());
        (SubmissionGateway::new(queue, metrics.clone()), metrics)
    }

    fn payload(level: &str, source: &str) -> Vec<u8> {
        format!(r#"{{"message":"m","level":"{level}","source":"{source}"}}"#).into_bytes()
    }

    #[test]
    fn test_submit_accepted() {
        let (gateway, metrics) = gateway_with_capacity(4);
        assert_eq!(gateway.submit(&payload("ERROR", "Auth")), SubmitOutcome::Accepted);
        assert_eq!(metrics.accepted_total(), 1);
        assert_eq!(metrics.submitted_total(), 1);
    }

    #[test]
    fn test_submit_malformed_never_reaches_queue() {
        let (gateway, metrics) = gateway_with_capacity(4);
        assert_eq!(gateway.submit(b"{broken"), SubmitOutcome::Malformed);
        assert_eq!(metrics.malformed_total(), 1);
        assert_eq!(metrics.accepted_total(), 0);
    }

    #[test]
    fn test_submit_overloaded_when_full() {
        let (gateway, metrics) = gateway_with_capacity(1);
        assert_eq!(gateway.submit(&payload("INFO", "Auth")), SubmitOutcome::Accepted);
        assert_eq!(gateway.submit(&payload("ERROR", "Payment")), SubmitOutcome::Overloaded);
        assert_eq!(metrics.rejected_total(), 1);
    }

    #[test]
    fn test_submit_overloaded_after_close() {
        let queue = Arc::new(EventQueue::new(4));
        let metrics = Arc::new(PipelineMetrics::new());
        let gateway = SubmissionGateway::new(queue.clone(), metrics.clone());

        queue.close();
        assert_eq!(gateway.submit(&payload("ERROR", "Auth")), SubmitOutcome::Overloaded);
        assert_eq!(metrics.rejected_total(), 1);
    }

    #[test]
    fn test_unknown_level_still_accepted() {
        let (gateway, _metrics) = gateway_with_capacity(4);
        assert_eq!(gateway.submit(&payload("FATAL", "Auth")), SubmitOutcome::Accepted);
    }
}
