//! Typed notifications emitted by the sequencer.

use bevy::prelude::*;

use crate::sequencer::RunState;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The run state changed (idle / recording / playing).
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerStateChanged(pub RunState);

/// The playhead moved. Emitted once per recording/playback tick and on seek.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequencerTimeChanged(pub u64);

/// Keyframe data changed (keyframe added or sequence imported).
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackChanged;

// ---------------------------------------------------------------------------
// SequencerNotification
// ---------------------------------------------------------------------------

/// Internal queue entry, drained into the typed events above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerNotification {
    StateChanged(RunState),
    TimeChanged(u64),
    TrackChanged,
}
