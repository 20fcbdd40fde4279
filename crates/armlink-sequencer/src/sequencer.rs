//! The record/playback state machine.
//!
//! [`Sequencer`] cycles freely between idle, recording, and playing — there
//! is no terminal state. While playing it takes exclusive authority over the
//! [`ArmModel`]; while recording it only observes. The input mapping engine
//! honors this by suspending its output whenever the state is
//! [`RunState::Playing`].
//!
//! All time comes from the caller (the tick system passes the
//! [`TickClock`](armlink_core::TickClock) value), so the whole state machine
//! is deterministic under test.

use bevy::prelude::*;

use armlink_arm::ArmModel;
use armlink_core::DocumentError;

use crate::events::SequencerNotification;
use crate::sequence::Sequence;

/// Recording skips samples that moved no more than this (degrees) since the
/// last recorded keyframe.
pub const RECORD_DEADBAND_DEG: f32 = 1.0;

// ---------------------------------------------------------------------------
// RunState
// ---------------------------------------------------------------------------

/// Sequencer run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Recording,
    Playing,
}

// ---------------------------------------------------------------------------
// Sequencer
// ---------------------------------------------------------------------------

/// Motion sequencer resource.
#[derive(Resource, Debug, Clone, Default)]
pub struct Sequencer {
    state: RunState,
    /// Tick-clock time corresponding to playhead zero.
    origin_ms: i64,
    playhead_ms: u64,
    loop_enabled: bool,
    sequence: Sequence,
    pending: Vec<SequencerNotification>,
}

impl Sequencer {
    /// Create an idle sequencer with an empty sequence.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -- Reads ---------------------------------------------------------------

    /// Current run state.
    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    /// Whether playback currently has exclusive authority over the arm.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.state, RunState::Playing)
    }

    /// Current playhead position in milliseconds.
    #[must_use]
    pub const fn playhead_ms(&self) -> u64 {
        self.playhead_ms
    }

    /// Total sequence duration in milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.sequence.duration
    }

    /// The recorded sequence.
    #[must_use]
    pub const fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    /// Whether playback wraps at the end.
    #[must_use]
    pub const fn loop_enabled(&self) -> bool {
        self.loop_enabled
    }

    /// Enable or disable loop playback.
    pub const fn set_loop(&mut self, enabled: bool) {
        self.loop_enabled = enabled;
    }

    // -- Transitions ---------------------------------------------------------

    /// idle → recording: clear all tracks, reset the duration, and capture
    /// one t=0 keyframe per servo from its current angle.
    pub fn start_recording(&mut self, now_ms: u64, arm: &ArmModel) {
        self.state = RunState::Recording;
        self.origin_ms = to_i64(now_ms);
        self.playhead_ms = 0;
        self.sequence.clear();
        for servo in arm.servos() {
            self.add_keyframe(servo.id, 0, servo.angle);
        }
        self.pending
            .push(SequencerNotification::StateChanged(RunState::Recording));
    }

    /// playing/recording → idle with the playhead reset to zero.
    pub fn stop(&mut self) {
        self.state = RunState::Idle;
        self.playhead_ms = 0;
        self.pending.push(SequencerNotification::TimeChanged(0));
        self.pending
            .push(SequencerNotification::StateChanged(RunState::Idle));
    }

    /// playing → idle with the playhead retained.
    pub fn pause(&mut self) {
        self.state = RunState::Idle;
        self.pending
            .push(SequencerNotification::StateChanged(RunState::Idle));
    }

    /// idle → playing, resuming from the current playhead.
    /// No-op when already playing.
    pub fn play(&mut self, now_ms: u64) {
        if self.is_playing() {
            return;
        }
        self.state = RunState::Playing;
        self.origin_ms = to_i64(now_ms) - to_i64(self.playhead_ms);
        self.pending
            .push(SequencerNotification::StateChanged(RunState::Playing));
    }

    /// Move the playhead and apply the interpolated pose immediately,
    /// regardless of run state.
    pub fn seek(&mut self, time_ms: u64, arm: &mut ArmModel) {
        self.playhead_ms = time_ms;
        self.apply_pose_at(time_ms, arm);
        self.pending
            .push(SequencerNotification::TimeChanged(time_ms));
    }

    /// One scheduler tick: advance the playhead from the clock and either
    /// record or play back. Idle ticks do nothing.
    pub fn tick(&mut self, now_ms: u64, arm: &mut ArmModel) {
        match self.state {
            RunState::Idle => {}
            RunState::Playing => self.playback_tick(now_ms, arm),
            RunState::Recording => self.record_tick(now_ms, arm),
        }
    }

    fn playback_tick(&mut self, now_ms: u64, arm: &mut ArmModel) {
        self.playhead_ms = self.elapsed(now_ms);
        if self.playhead_ms >= self.sequence.duration {
            if self.loop_enabled {
                self.origin_ms = to_i64(now_ms);
                self.playhead_ms = 0;
            } else {
                self.stop();
                return;
            }
        }
        self.apply_pose_at(self.playhead_ms, arm);
        self.pending
            .push(SequencerNotification::TimeChanged(self.playhead_ms));
    }

    fn record_tick(&mut self, now_ms: u64, arm: &ArmModel) {
        self.playhead_ms = self.elapsed(now_ms);
        if self.playhead_ms > self.sequence.duration {
            self.sequence.duration = self.playhead_ms;
        }
        let samples: Vec<(u32, f32)> = arm
            .servos()
            .iter()
            .filter(|servo| {
                self.sequence
                    .track(servo.id)
                    .and_then(crate::track::Track::last_value)
                    .is_none_or(|last| (last - servo.angle).abs() > RECORD_DEADBAND_DEG)
            })
            .map(|servo| (servo.id, servo.angle))
            .collect();
        for (id, angle) in samples {
            self.add_keyframe(id, self.playhead_ms, angle);
        }
        self.pending
            .push(SequencerNotification::TimeChanged(self.playhead_ms));
    }

    // -- Keyframes -----------------------------------------------------------

    /// Insert a keyframe (±10 ms merge, duration headroom rule).
    pub fn add_keyframe(&mut self, id: u32, time_ms: u64, value: f32) {
        self.sequence.add_keyframe(id, time_ms, value);
        self.pending.push(SequencerNotification::TrackChanged);
    }

    /// Write the interpolated pose at `t` into the arm model.
    /// Servos without a track are left untouched.
    pub fn apply_pose_at(&self, time_ms: u64, arm: &mut ArmModel) {
        let targets: Vec<(u32, f32)> = arm
            .ids()
            .filter_map(|id| {
                self.sequence
                    .track(id)
                    .and_then(|track| track.sample(time_ms))
                    .map(|value| (id, value))
            })
            .collect();
        for (id, value) in targets {
            arm.set_angle(id, value);
        }
    }

    // -- Documents -----------------------------------------------------------

    /// Serialize the sequence as a `{duration, tracks}` document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String, DocumentError> {
        self.sequence.export_json()
    }

    /// Replace the sequence from a document. Malformed documents are
    /// rejected whole; nothing is partially applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid.
    pub fn import_json(&mut self, json: &str) -> Result<(), DocumentError> {
        self.sequence = Sequence::import_json(json)?;
        self.pending.push(SequencerNotification::TrackChanged);
        Ok(())
    }

    // -- Notifications -------------------------------------------------------

    /// Drain queued notifications (called once per tick by the flush system).
    pub fn drain_notifications(&mut self) -> Vec<SequencerNotification> {
        std::mem::take(&mut self.pending)
    }

    /// Number of queued notifications.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn elapsed(&self, now_ms: u64) -> u64 {
        u64::try_from(to_i64(now_ms) - self.origin_ms).unwrap_or(0)
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn to_i64(ms: u64) -> i64 {
    ms as i64
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
