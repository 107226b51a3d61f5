//! Concurrency-safe error counters keyed by origin
//!
//! One mutex guards the whole map. Critical sections are short and the
//! lock is never held across an await point, so workers contend only for
//! the increment itself.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

/// Running per-origin error counts for one pipeline run.
///
/// Counts are monotonically non-decreasing; there is no decrement or reset.
#[derive(Default)]
pub struct ErrorAggregator {
    counts: Mutex<FxHashMap<String, u64>>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self { counts: Mutex::new(FxHashMap::default()) }
    }

    /// Add one to the count for `origin`, creating the key at 1 if absent.
    /// Safe under arbitrary concurrent callers.
    pub fn increment(&self, origin: &str) {
        let mut counts = self.counts.lock();
        if let Some(count) = counts.get_mut(origin) {
            *count += 1;
        } else {
            counts.insert(origin.to_string(), 1);
        }
    }

    /// Point-in-time copy of the counts.
    ///
    /// Authoritative only after the worker pool has drained; a snapshot
    /// taken while workers run is internally consistent but may miss
    /// in-flight events.
    pub fn snapshot(&self) -> FxHashMap<String, u64> {
        self.counts.lock().clone()
    }
}
