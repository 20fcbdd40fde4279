//! Motion sequencer for the armlink arm controller.
//!
//! Records servo angle history into time-stamped tracks and plays it back
//! with linear interpolation:
//!
//! - [`Keyframe`] / [`Track`] — per-servo keyframe storage with ±10 ms merge
//! - [`Sequence`] — tracks plus total duration, the `{duration, tracks}`
//!   document
//! - [`Sequencer`] — the idle/recording/playing state machine
//!
//! While playing, the sequencer has exclusive authority over the
//! [`ArmModel`](armlink_arm::ArmModel); the input mapping engine checks
//! [`Sequencer::is_playing`] and suspends its own output.
//!
//! # Example
//!
//! ```
//! use bevy::prelude::*;
//! use armlink_core::prelude::*;
//! use armlink_arm::prelude::*;
//! use armlink_sequencer::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(ArmlinkCorePlugin);
//! app.add_plugins(ArmModelPlugin);
//! app.add_plugins(SequencerPlugin);
//! app.insert_resource(ArmModel::standard_arm());
//! app.update();
//! ```

pub mod events;
pub mod sequence;
pub mod sequencer;
pub mod systems;
pub mod track;

use bevy::prelude::*;

use armlink_core::ArmlinkSet;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use events::{SequencerStateChanged, SequencerTimeChanged, TrackChanged};
pub use sequence::Sequence;
pub use sequencer::{RunState, Sequencer};
pub use track::{Keyframe, Track};

// ---------------------------------------------------------------------------
// SequencerPlugin
// ---------------------------------------------------------------------------

/// Bevy plugin running the sequencer tick in
/// [`ArmlinkSet::Sequence`] and its notification flush in
/// [`ArmlinkSet::Communicate`].
pub struct SequencerPlugin;

impl Plugin for SequencerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Sequencer>()
            .add_event::<SequencerStateChanged>()
            .add_event::<SequencerTimeChanged>()
            .add_event::<TrackChanged>()
            .add_systems(
                Update,
                (
                    systems::sequencer_tick_system.in_set(ArmlinkSet::Sequence),
                    systems::flush_sequencer_notifications.in_set(ArmlinkSet::Communicate),
                ),
            );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        SequencerPlugin,
        events::{SequencerStateChanged, SequencerTimeChanged, TrackChanged},
        sequence::Sequence,
        sequencer::{RunState, Sequencer},
        track::{Keyframe, Track},
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
