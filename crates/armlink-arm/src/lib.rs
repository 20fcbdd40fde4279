//! Canonical actuator state model for the armlink arm controller.
//!
//! This crate provides the single source of truth for servo state:
//!
//! - [`Servo`] — per-actuator record (also the configuration document entry)
//! - [`ArmModel`] — resource holding the ordered servo collection
//! - [`ConfigChanged`] / [`ServoUpdated`] / [`ServoCommand`] — typed change
//!   notifications for presentation, persistence, and transport collaborators
//!
//! Mutations queue notifications; [`ArmModelPlugin`] flushes them once per
//! tick in [`ArmlinkSet::Communicate`](armlink_core::ArmlinkSet).
//!
//! # Example
//!
//! ```
//! use bevy::prelude::*;
//! use armlink_core::prelude::*;
//! use armlink_arm::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(ArmlinkCorePlugin);
//! app.add_plugins(ArmModelPlugin);
//! app.insert_resource(ArmModel::standard_arm());
//! app.update();
//! ```

pub mod events;
pub mod model;
pub mod servo;
pub mod systems;

use bevy::prelude::*;

use armlink_core::ArmlinkSet;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use events::{ConfigChanged, ServoCommand, ServoUpdated};
pub use model::ArmModel;
pub use servo::{Servo, ServoCategory, ServoMode, ServoPatch};

// ---------------------------------------------------------------------------
// ArmModelPlugin
// ---------------------------------------------------------------------------

/// Bevy plugin registering the arm model and its notification events.
///
/// Inserts an empty [`ArmModel`] by default; insert your own (for example
/// [`ArmModel::standard_arm`]) before the first update to override it.
pub struct ArmModelPlugin;

impl Plugin for ArmModelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ArmModel>()
            .add_event::<ConfigChanged>()
            .add_event::<ServoUpdated>()
            .add_event::<ServoCommand>()
            .add_systems(
                Update,
                systems::flush_arm_notifications.in_set(ArmlinkSet::Communicate),
            );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ArmModelPlugin,
        events::{ConfigChanged, ServoCommand, ServoUpdated},
        model::ArmModel,
        servo::{Servo, ServoCategory, ServoMode, ServoPatch},
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
