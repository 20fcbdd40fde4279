//! Keyframe tracks and time interpolation.

use serde::{Deserialize, Serialize};

/// Two keyframes closer than this merge into one (the newer wins).
pub const MERGE_WINDOW_MS: u64 = 10;

// ---------------------------------------------------------------------------
// Keyframe
// ---------------------------------------------------------------------------

/// One sampled value at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(clippy::derive_partial_eq_without_eq)] // f32 field prevents Eq
pub struct Keyframe {
    /// Time since sequence start, in milliseconds.
    pub time: u64,
    /// Servo angle in degrees.
    pub value: f32,
}

impl Keyframe {
    /// Create a keyframe.
    #[must_use]
    pub const fn new(time: u64, value: f32) -> Self {
        Self { time, value }
    }
}

// ---------------------------------------------------------------------------
// Track
// ---------------------------------------------------------------------------

/// Ordered keyframe sequence for one servo.
///
/// Times are strictly increasing: inserting within [`MERGE_WINDOW_MS`] of an
/// existing keyframe replaces it instead of adding a second point.
/// Serializes as a plain keyframe array, matching the sequence document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track {
    keys: Vec<Keyframe>,
}

impl Track {
    /// Create an empty track.
    #[must_use]
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    /// Keyframes in time order.
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keys
    }

    /// Number of keyframes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the track holds no keyframes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Value of the most recent keyframe, if any.
    #[must_use]
    pub fn last_value(&self) -> Option<f32> {
        self.keys.last().map(|k| k.value)
    }

    /// Insert a keyframe, replacing any existing one within
    /// [`MERGE_WINDOW_MS`] of `time`.
    pub fn insert(&mut self, time: u64, value: f32) {
        self.keys.retain(|k| k.time.abs_diff(time) > MERGE_WINDOW_MS);
        self.keys.push(Keyframe::new(time, value));
        self.keys.sort_by_key(|k| k.time);
    }

    /// Interpolated value at `t`.
    ///
    /// Returns `None` for an empty track. Before the first keyframe the
    /// first value holds; at or after the last keyframe the last value
    /// holds; in between, linear interpolation over the bracketing pair.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample(&self, t: u64) -> Option<f32> {
        let first = self.keys.first()?;
        let last = self.keys.last()?;
        if t <= first.time {
            return Some(first.value);
        }
        if t >= last.time {
            return Some(last.value);
        }
        for pair in self.keys.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if t >= prev.time && t < next.time {
                let span = (next.time - prev.time) as f32;
                let progress = (t - prev.time) as f32 / span;
                return Some(prev.value + (next.value - prev.value) * progress);
            }
        }
        // Unreachable: t is strictly between first and last.
        Some(last.value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn track(points: &[(u64, f32)]) -> Track {
        let mut t = Track::new();
        for &(time, value) in points {
            t.insert(time, value);
        }
        t
    }

    #[test]
    fn empty_track_samples_none() {
        assert_eq!(Track::new().sample(0), None);
    }

    #[test]
    fn single_keyframe_holds_everywhere() {
        let t = track(&[(500, 42.0)]);
        assert_eq!(t.sample(0), Some(42.0));
        assert_eq!(t.sample(500), Some(42.0));
        assert_eq!(t.sample(10_000), Some(42.0));
    }

    #[test]
    fn clamps_before_first_and_after_last() {
        let t = track(&[(100, 10.0), (200, 20.0)]);
        assert_eq!(t.sample(0), Some(10.0));
        assert_eq!(t.sample(100), Some(10.0));
        assert_eq!(t.sample(200), Some(20.0));
        assert_eq!(t.sample(999), Some(20.0));
    }

    #[test]
    fn linear_interpolation_between_keyframes() {
        let t = track(&[(0, 90.0), (500, 120.0)]);
        assert_eq!(t.sample(250), Some(105.0));
    }

    #[test]
    fn interpolation_picks_bracketing_pair() {
        let t = track(&[(0, 0.0), (100, 100.0), (200, 0.0)]);
        assert_eq!(t.sample(50), Some(50.0));
        assert_eq!(t.sample(150), Some(50.0));
    }

    #[test]
    fn interpolation_stays_within_bracketing_values() {
        let t = track(&[(0, 30.0), (400, 170.0), (800, 60.0)]);
        for q in (0..800).step_by(37) {
            let v = t.sample(q).unwrap();
            let (lo, hi) = if q < 400 { (30.0, 170.0) } else { (60.0, 170.0) };
            assert!(v >= lo && v <= hi, "sample({q}) = {v} out of [{lo}, {hi}]");
        }
    }

    #[test]
    fn insert_within_merge_window_replaces() {
        let mut t = track(&[(100, 1.0)]);
        t.insert(105, 2.0);
        assert_eq!(t.len(), 1);
        assert_eq!(t.keyframes()[0], Keyframe::new(105, 2.0));
    }

    #[test]
    fn insert_at_window_edge_replaces() {
        let mut t = track(&[(100, 1.0)]);
        t.insert(110, 2.0);
        assert_eq!(t.len(), 1);
        assert_eq!(t.last_value(), Some(2.0));
    }

    #[test]
    fn insert_outside_merge_window_adds() {
        let mut t = track(&[(100, 1.0)]);
        t.insert(111, 2.0);
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn insert_keeps_time_order() {
        let t = track(&[(300, 3.0), (100, 1.0), (200, 2.0)]);
        let times: Vec<u64> = t.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![100, 200, 300]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let t = track(&[(0, 90.0)]);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, r#"[{"time":0,"value":90.0}]"#);
    }
}
