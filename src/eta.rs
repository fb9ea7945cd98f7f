/*
 *  eta.rs
 *
 *  trackside - arrival & event schedule panel daemon
 *  (c) 2023-26 trackside contributors
 *
 *  Arrival time estimation from raw position history: velocity over the
 *  lookback window, linear extrapolation along the loop, and a jump
 *  clamp to keep the displayed ETA steady against noisy fixes.
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use chrono::{DateTime, Duration, Utc};
use log::debug;
use std::collections::HashMap;

use crate::samples::{PositionSample, SampleStore};
use crate::track;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrivalStatus {
    /// Moving towards the display, ETA computed.
    Approaching,
    /// Within the arrival zone around the display.
    InZone,
    /// No usable estimate this cycle.
    Unknown,
}

/// Derived per-train estimate, recomputed every cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrivalEstimate {
    pub object_id: String,
    pub eta: Option<DateTime<Utc>>,
    pub status: ArrivalStatus,
}

#[derive(Debug, Clone, Copy)]
pub struct EstimatorConfig {
    /// Trackmarker position of the display itself.
    pub query_position: f64,
    /// Total loop length in trackmarker units. Zero means the topology
    /// is not known yet; the estimator fails closed to Unknown.
    pub track_length: f64,
    /// "Station zone" radius around the display, in trackmarker units.
    pub arrival_zone: f64,
    /// Maximum plausible ETA change between consecutive cycles.
    pub max_jump_secs: i64,
}

/// Per-train smoothing state carried across cycles. Owned by the cycle
/// controller and rebuilt from scratch after a restart, so the
/// estimation itself stays a pure function of (config, samples, context).
#[derive(Debug, Default)]
pub struct EtaContext {
    previous: HashMap<String, DateTime<Utc>>,
}

impl EtaContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous_for(&self, object_id: &str) -> Option<DateTime<Utc>> {
        self.previous.get(object_id).copied()
    }
}

/// Estimate arrivals for every train currently in the store.
pub fn estimate_all(
    cfg: &EstimatorConfig,
    store: &SampleStore,
    ctx: &mut EtaContext,
    now: DateTime<Utc>,
) -> Vec<ArrivalEstimate> {
    let mut ids: Vec<&str> = store.object_ids().collect();
    ids.sort_unstable();

    let mut estimates = Vec::with_capacity(ids.len());
    for id in ids {
        let previous = ctx.previous_for(id);
        let (eta, status) = estimate_one(cfg, store.samples_for(id), previous, now);
        if let Some(eta) = eta {
            ctx.previous.insert(id.to_string(), eta);
        }
        debug!("{}: status {:?}, eta {:?}", id, status, eta);
        estimates.push(ArrivalEstimate {
            object_id: id.to_string(),
            eta,
            status,
        });
    }

    // Forget trains that are no longer reported at all.
    let live: Vec<String> = store.object_ids().map(str::to_string).collect();
    ctx.previous.retain(|id, _| live.iter().any(|l| l == id));

    estimates
}

fn estimate_one(
    cfg: &EstimatorConfig,
    samples: &[PositionSample],
    previous: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (Option<DateTime<Utc>>, ArrivalStatus) {
    // Without a known loop length every division below is meaningless.
    if !(cfg.track_length > 0.0) {
        return (None, ArrivalStatus::Unknown);
    }
    let (first, last) = match (samples.first(), samples.last()) {
        (Some(f), Some(l)) => (f, l),
        _ => return (None, ArrivalStatus::Unknown),
    };

    if track::loop_distance(last.position, cfg.query_position, cfg.track_length)
        <= cfg.arrival_zone
    {
        return (Some(now), ArrivalStatus::InZone);
    }

    let dt = (last.observed_at - first.observed_at).num_milliseconds() as f64 / 1000.0;
    if dt <= 0.0 {
        // Duplicate timestamps: no velocity this cycle, hold the previous
        // estimate if there is one.
        return match previous {
            Some(prev) => (Some(prev), ArrivalStatus::Approaching),
            None => (None, ArrivalStatus::Unknown),
        };
    }

    let travelled = track::normalize_delta(last.position - first.position, cfg.track_length);
    let velocity = travelled / dt;
    if !velocity.is_finite() || velocity <= 0.0 {
        return (None, ArrivalStatus::Unknown);
    }

    let remaining = track::forward_delta(last.position, cfg.query_position, cfg.track_length);
    let seconds = remaining / velocity;
    if !seconds.is_finite() {
        return (None, ArrivalStatus::Unknown);
    }
    // A barely-moving train produces an ETA far beyond the calendar's
    // range, which would overflow the addition.
    let eta = match now.checked_add_signed(Duration::milliseconds((seconds * 1000.0) as i64)) {
        Some(eta) => eta,
        None => return (None, ArrivalStatus::Unknown),
    };

    // Clamp implausible jumps against last cycle's value. The very first
    // estimate for a train has nothing to compare against and is exempt.
    let eta = match previous {
        Some(prev) if (eta - prev).num_seconds().abs() > cfg.max_jump_secs => prev,
        _ => eta,
    };

    (Some(eta), ArrivalStatus::Approaching)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cfg() -> EstimatorConfig {
        EstimatorConfig {
            query_position: 163.0,
            track_length: 1000.0,
            arrival_zone: 5.0,
            max_jump_secs: 30,
        }
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn store_with(samples: &[(f64, i64)]) -> SampleStore {
        let mut store = SampleStore::new(Duration::minutes(10));
        for (pos, secs) in samples {
            store.record("gigi", *pos, t(*secs));
        }
        store
    }

    #[test]
    fn no_samples_is_unknown() {
        let store = SampleStore::new(Duration::minutes(10));
        let mut ctx = EtaContext::new();
        assert!(estimate_all(&cfg(), &store, &mut ctx, t(0)).is_empty());

        let (eta, status) = estimate_one(&cfg(), &[], None, t(0));
        assert_eq!(status, ArrivalStatus::Unknown);
        assert!(eta.is_none());
    }

    #[test]
    fn approaching_train_extrapolates_linearly() {
        // 2 units/sec starting at 140, latest fix at 150: 13 units short
        // of the display, so ~6.5 seconds out.
        let store = store_with(&[(140.0, 0), (150.0, 5)]);
        let mut ctx = EtaContext::new();
        let now = t(5);
        let estimates = estimate_all(&cfg(), &store, &mut ctx, now);
        assert_eq!(estimates.len(), 1);
        assert_eq!(estimates[0].status, ArrivalStatus::Approaching);
        let eta = estimates[0].eta.expect("eta");
        assert_eq!((eta - now).num_milliseconds(), 6500);
    }

    #[test]
    fn in_zone_regardless_of_velocity_sign() {
        let mut c = cfg();
        c.arrival_zone = 20.0;
        // latest fix 13 units short of the display, drifting backwards
        let store = store_with(&[(160.0, 0), (150.0, 5)]);
        let mut ctx = EtaContext::new();
        let now = t(5);
        let estimates = estimate_all(&c, &store, &mut ctx, now);
        assert_eq!(estimates[0].status, ArrivalStatus::InZone);
        assert_eq!(estimates[0].eta, Some(now));
    }

    #[test]
    fn wraparound_velocity_is_forward() {
        // 995 -> 5 across the origin: 10 units in 5 seconds
        let store = store_with(&[(995.0, 0), (5.0, 5)]);
        let mut ctx = EtaContext::new();
        let now = t(5);
        let estimates = estimate_all(&cfg(), &store, &mut ctx, now);
        assert_eq!(estimates[0].status, ArrivalStatus::Approaching);
        let eta = estimates[0].eta.expect("eta");
        // 158 units remaining at 2 units/sec
        assert_eq!((eta - now).num_seconds(), 79);
    }

    #[test]
    fn stationary_train_is_unknown() {
        let store = store_with(&[(150.0, 0), (150.0, 5)]);
        let mut ctx = EtaContext::new();
        let estimates = estimate_all(&cfg(), &store, &mut ctx, t(5));
        assert_eq!(estimates[0].status, ArrivalStatus::Unknown);
        assert!(estimates[0].eta.is_none());
    }

    #[test]
    fn barely_moving_train_is_unknown_not_a_panic() {
        // a positional wobble of 1e-10 units over five minutes puts the
        // linear ETA beyond DateTime's range
        let store = store_with(&[(100.0, 0), (100.0000000001, 300)]);
        let mut ctx = EtaContext::new();
        let estimates = estimate_all(&cfg(), &store, &mut ctx, t(300));
        assert_eq!(estimates[0].status, ArrivalStatus::Unknown);
        assert!(estimates[0].eta.is_none());
    }

    #[test]
    fn duplicate_timestamps_reuse_previous_estimate() {
        let samples = [
            PositionSample {
                position: 100.0,
                observed_at: t(0),
            },
            PositionSample {
                position: 120.0,
                observed_at: t(0),
            },
        ];
        let prev = t(40);
        let (eta, status) = estimate_one(&cfg(), &samples, Some(prev), t(0));
        assert_eq!(status, ArrivalStatus::Approaching);
        assert_eq!(eta, Some(prev));

        let (eta, status) = estimate_one(&cfg(), &samples, None, t(0));
        assert_eq!(status, ArrivalStatus::Unknown);
        assert!(eta.is_none());
    }

    #[test]
    fn zero_track_length_fails_closed() {
        let mut c = cfg();
        c.track_length = 0.0;
        let store = store_with(&[(140.0, 0), (150.0, 5)]);
        let mut ctx = EtaContext::new();
        let estimates = estimate_all(&c, &store, &mut ctx, t(5));
        assert_eq!(estimates[0].status, ArrivalStatus::Unknown);
    }

    #[test]
    fn jump_clamp_holds_previous_eta() {
        let c = cfg();
        let mut ctx = EtaContext::new();
        let now = t(5);

        // First cycle: ~6.5s out, no prior value so no clamping.
        let store = store_with(&[(140.0, 0), (150.0, 5)]);
        let first = estimate_all(&c, &store, &mut ctx, now)[0].eta.expect("eta");

        // Next cycle the fix glitches far back down the track, which
        // would move the ETA by minutes. The previous value wins.
        let mut store = SampleStore::new(Duration::minutes(10));
        store.record("gigi", 140.0, t(0));
        store.record("gigi", 300.0, t(10));
        let second = estimate_all(&c, &store, &mut ctx, t(10))[0].clone();
        assert_eq!(second.eta, Some(first));

        // Invariant: consecutive non-null ETAs never differ by more than
        // the configured jump.
        assert!(
            (second.eta.unwrap() - first).num_seconds().abs() <= c.max_jump_secs
        );
    }

    #[test]
    fn smoothing_state_dropped_for_vanished_trains() {
        let c = cfg();
        let mut ctx = EtaContext::new();
        let store = store_with(&[(140.0, 0), (150.0, 5)]);
        estimate_all(&c, &store, &mut ctx, t(5));
        assert!(ctx.previous_for("gigi").is_some());

        let empty = SampleStore::new(Duration::minutes(10));
        estimate_all(&c, &empty, &mut ctx, t(10));
        assert!(ctx.previous_for("gigi").is_none());
    }
}
