//! Bounded event queue between producers and the worker pool
//!
//! Admission is non-blocking: when the buffer is at capacity the event is
//! handed straight back to the caller. Consumption is async and waits until
//! an event arrives or the queue is closed and fully drained. The buffer and
//! the closed flag live behind a single mutex so the capacity and FIFO
//! invariants hold under concurrent producers and consumers.

use crate::domain::event::LogEvent;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;

/// Rejected admission. The event is handed back so the caller decides
/// whether to drop or retry it.
#[derive(Debug)]
pub enum EnqueueError {
    /// Buffer at capacity.
    Full(LogEvent),
    /// Queue already closed; no further admissions succeed.
    Closed(LogEvent),
}

struct QueueState {
    buf: VecDeque<LogEvent>,
    closed: bool,
}

/// Fixed-capacity FIFO with explicit close semantics.
///
/// Shared between one or more producers (via `enqueue`) and the worker
/// pool (via `dequeue`). The internal buffer is never exposed.
pub struct EventQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
}

impl EventQueue {
    /// Create a queue with a fixed capacity. Capacity is not resizable.
    ///
    /// Panics on zero capacity; the configuration layer rejects it earlier.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            state: Mutex::new(QueueState { buf: VecDeque::with_capacity(capacity), closed: false }),
            notify: Notify::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of buffered events (sampled for metrics).
    pub fn depth(&self) -> usize {
        self.state.lock().buf.len()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Attempt to admit an event without blocking.
    ///
    /// A full buffer rejects immediately: the queue sheds load rather than
    /// stalling the submitter or growing without bound.
    pub fn enqueue(&self, event: LogEvent) -> Result<(), EnqueueError> {
        {
            let mut state = self.state.lock();
            if state.closed {
                return Err(EnqueueError::Closed(event));
            }
            if state.buf.len() >= self.capacity {
                return Err(EnqueueError::Full(event));
            }
            state.buf.push_back(event);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Close the queue and wake every blocked consumer so end-of-stream
    /// propagates once the buffer drains. Buffered events stay dequeuable.
    ///
    /// There is exactly one designated closer (the pipeline shutdown path);
    /// a second close is a programming error and panics.
    pub fn close(&self) {
        {
            let mut state = self.state.lock();
            assert!(!state.closed, "event queue closed twice");
            state.closed = true;
        }
        self.notify.notify_waiters();
    }

    /// Wait for the next event in admission order.
    ///
    /// Returns `None` once the queue is closed and fully drained. Events are
    /// delivered FIFO; each is handed to exactly one caller.
    pub async fn dequeue(&self) -> Option<LogEvent> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register interest before checking state, so a wakeup issued
            // between the check and the await is not lost.
            notified.as_mut().enable();
            {
                let mut state = self.state.lock();
                if let Some(event) = state.buf.pop_front() {
                    if !state.buf.is_empty() {
                        // More work buffered: pass the wakeup on to a sibling.
                        self.notify.notify_one();
                    }
                    return Some(event);
                }
                if state.closed {
                    return None;
                }
            }
            notified.await;
        }
    }
}
