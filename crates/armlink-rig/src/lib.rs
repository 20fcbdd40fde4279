//! Full armlink control station as one plugin.
//!
//! [`ArmlinkRigPlugin`] wires the clock, arm model, sequencer, input engine,
//! and transport into a single Bevy plugin group with the canonical system
//! ordering (`Input` before `Sequence` before `Communicate`). Apps add this
//! one plugin and then insert their own [`ArmModel`](armlink_arm::ArmModel)
//! and transport backend.

use bevy::app::{PluginGroup, PluginGroupBuilder};

use armlink_arm::ArmModelPlugin;
use armlink_core::ArmlinkCorePlugin;
use armlink_input::InputPlugin;
use armlink_sequencer::SequencerPlugin;
use armlink_transport::TransportPlugin;

// ---------------------------------------------------------------------------
// ArmlinkRigPlugin
// ---------------------------------------------------------------------------

/// Plugin group assembling the whole control station.
pub struct ArmlinkRigPlugin;

impl PluginGroup for ArmlinkRigPlugin {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::start::<Self>()
            .add(ArmlinkCorePlugin)
            .add(ArmModelPlugin)
            .add(SequencerPlugin)
            .add(InputPlugin)
            .add(TransportPlugin)
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::ArmlinkRigPlugin;
    pub use armlink_arm::prelude::*;
    pub use armlink_core::prelude::*;
    pub use armlink_input::prelude::*;
    pub use armlink_sequencer::prelude::*;
    pub use armlink_transport::prelude::*;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
