// src/samples.rs
//
// In-memory store of raw train position reports, bounded per train by a
// lookback window. The estimator needs a short history (not just the
// latest fix) to derive a rate of change.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// One raw position report. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionSample {
    /// Position along the track in trackmarker units.
    pub position: f64,
    pub observed_at: DateTime<Utc>,
}

/// Recent position history per tracked train.
#[derive(Debug)]
pub struct SampleStore {
    lookback: Duration,
    history: HashMap<String, Vec<PositionSample>>,
}

impl SampleStore {
    pub fn new(lookback: Duration) -> Self {
        SampleStore {
            lookback,
            history: HashMap::new(),
        }
    }

    /// Append a sample, keeping the per-train history ascending by time
    /// and pruning anything that has fallen out of the lookback window.
    pub fn record(&mut self, object_id: &str, position: f64, observed_at: DateTime<Utc>) {
        let samples = self.history.entry(object_id.to_string()).or_default();
        let sample = PositionSample {
            position,
            observed_at,
        };
        // Reports normally arrive in order; insert-sort covers the odd
        // late delivery.
        let idx = samples.partition_point(|s| s.observed_at <= observed_at);
        samples.insert(idx, sample);

        let newest = samples.last().map(|s| s.observed_at).unwrap_or(observed_at);
        let horizon = newest - self.lookback;
        samples.retain(|s| s.observed_at >= horizon);
    }

    /// Drop everything older than `now - lookback` across all trains,
    /// removing trains whose history empties out. Without this a train
    /// that stops reporting would keep its stale samples forever, since
    /// `record` only prunes the train it is recording for.
    pub fn prune(&mut self, now: DateTime<Utc>) {
        let horizon = now - self.lookback;
        self.history.retain(|_, samples| {
            samples.retain(|s| s.observed_at >= horizon);
            !samples.is_empty()
        });
    }

    /// Samples for one train, ascending by observation time. Empty slice
    /// for a train that has never reported.
    pub fn samples_for(&self, object_id: &str) -> &[PositionSample] {
        self.history
            .get(object_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn object_ids(&self) -> impl Iterator<Item = &str> {
        self.history.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
