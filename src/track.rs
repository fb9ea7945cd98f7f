// src/track.rs
//
// Closed-loop track arithmetic. The track is a loop of `track_length`
// trackmarker units; trains travel in one direction only, so distances
// are always measured forward along the loop.

/// Forward distance from `from` to `to` along the loop.
///
/// Always in `0.0..track_length`. A query position "behind" the current
/// position is most of a lap ahead, never a negative distance.
pub fn forward_delta(from: f64, to: f64, track_length: f64) -> f64 {
    (to - from).rem_euclid(track_length)
}

/// Shortest loop distance between two trackmarkers, ignoring direction.
pub fn loop_distance(a: f64, b: f64, track_length: f64) -> f64 {
    let fwd = forward_delta(a, b, track_length);
    fwd.min(track_length - fwd)
}

/// Normalize a raw position delta for forward-only travel.
///
/// A sign flip in the raw delta means the train crossed trackmarker zero
/// between the two samples; mapping through `rem_euclid` recovers the
/// real forward travel.
pub fn normalize_delta(raw: f64, track_length: f64) -> f64 {
    raw.rem_euclid(track_length)
}
