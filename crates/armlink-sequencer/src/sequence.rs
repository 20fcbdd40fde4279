//! Sequences and the `{duration, tracks}` document.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use armlink_core::DocumentError;

use crate::track::Track;

/// Duration assumed when an imported document carries none.
pub const DEFAULT_DURATION_MS: u64 = 5000;

/// A keyframe past the current duration extends it by this much headroom.
const DURATION_HEADROOM_MS: u64 = 1000;

// ---------------------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------------------

/// A recorded motion: per-servo keyframe tracks plus a total duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    /// Total duration in milliseconds.
    #[serde(default = "default_duration")]
    pub duration: u64,
    /// Servo id → keyframe track.
    #[serde(default)]
    pub tracks: HashMap<u32, Track>,
}

const fn default_duration() -> u64 {
    DEFAULT_DURATION_MS
}

impl Default for Sequence {
    fn default() -> Self {
        Self {
            duration: DEFAULT_DURATION_MS,
            tracks: HashMap::new(),
        }
    }
}

impl Sequence {
    /// Empty sequence with the default duration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Track for a servo, if one exists.
    #[must_use]
    pub fn track(&self, id: u32) -> Option<&Track> {
        self.tracks.get(&id)
    }

    /// Keyframes for a servo (empty slice when the servo has no track).
    #[must_use]
    pub fn keyframes(&self, id: u32) -> &[crate::track::Keyframe] {
        self.tracks.get(&id).map_or(&[], Track::keyframes)
    }

    /// Insert a keyframe, merging within ±10 ms, and extend the duration
    /// with one second of headroom when the keyframe lands past it.
    pub fn add_keyframe(&mut self, id: u32, time: u64, value: f32) {
        self.tracks.entry(id).or_default().insert(time, value);
        if time > self.duration {
            self.duration = time + DURATION_HEADROOM_MS;
        }
    }

    /// Drop all tracks and reset the duration to zero (recording start).
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.duration = 0;
    }

    /// Serialize as a `{duration, tracks}` document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse a `{duration, tracks}` document.
    ///
    /// Absent fields default (`duration` 5000, `tracks` empty); malformed
    /// JSON is an error and nothing is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON of this shape.
    pub fn import_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
