//! Input mapping engine for the armlink arm controller.
//!
//! Translates device channel samples (gamepad axes and buttons) into servo
//! angle updates:
//!
//! - [`DeviceSnapshot`] / [`InputDevices`] — slot-indexed device state buffer
//! - [`ServoMapping`] / [`MappingTable`] — channel-to-servo bindings, also
//!   the mapping document
//! - [`InputEngine`] — device arbitration, the learning flow, and the three
//!   control laws (absolute, incremental, button stepping)
//!
//! The engine polls in [`ArmlinkSet::Input`], ahead of the sequencer; while
//! the sequencer is playing the engine keeps its device bookkeeping running
//! but suspends angle output.
//!
//! # Example
//!
//! ```
//! use bevy::prelude::*;
//! use armlink_core::prelude::*;
//! use armlink_arm::prelude::*;
//! use armlink_sequencer::prelude::*;
//! use armlink_input::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(ArmlinkCorePlugin);
//! app.add_plugins(ArmModelPlugin);
//! app.add_plugins(SequencerPlugin);
//! app.add_plugins(InputPlugin);
//! app.insert_resource(ArmModel::standard_arm());
//! app.update();
//! ```

pub mod device;
pub mod engine;
pub mod events;
pub mod mapping;
pub mod systems;

use bevy::prelude::*;

use armlink_core::ArmlinkSet;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use device::{DeviceSnapshot, InputDevices};
pub use engine::InputEngine;
pub use events::{LearningCompleted, MappingChanged};
pub use mapping::{ChannelKind, ControlMode, MappingPatch, MappingTable, ServoMapping};

// ---------------------------------------------------------------------------
// InputPlugin
// ---------------------------------------------------------------------------

/// Bevy plugin polling input devices in [`ArmlinkSet::Input`] and flushing
/// engine notifications in [`ArmlinkSet::Communicate`].
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputDevices>()
            .init_resource::<InputEngine>()
            .init_resource::<MappingTable>()
            .add_event::<MappingChanged>()
            .add_event::<LearningCompleted>()
            .add_systems(
                Update,
                (
                    systems::poll_input_system.in_set(ArmlinkSet::Input),
                    systems::flush_input_notifications.in_set(ArmlinkSet::Communicate),
                ),
            );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        InputPlugin,
        device::{DeviceSnapshot, InputDevices},
        engine::InputEngine,
        events::{LearningCompleted, MappingChanged},
        mapping::{ChannelKind, ControlMode, MappingPatch, MappingTable, ServoMapping},
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
