//! Scheduling, time, errors, and station configuration for armlink.
//!
//! Every armlink subsystem runs inside one cooperative tick on the Bevy
//! [`Update`] schedule, ordered by [`ArmlinkSet`]:
//!
//! 1. [`ArmlinkSet::Input`] — the input mapping engine translates device
//!    samples into servo commands
//! 2. [`ArmlinkSet::Sequence`] — the sequencer records or plays back
//! 3. [`ArmlinkSet::Communicate`] — queued notifications are flushed to
//!    typed events and forwarded to the transport
//!
//! All mutation derived from one clock sample completes before the next tick
//! begins, so external observers always see a self-consistent generation of
//! state.
//!
//! # Example
//!
//! ```
//! use bevy::prelude::*;
//! use armlink_core::prelude::*;
//!
//! let mut app = App::new();
//! app.add_plugins(ArmlinkCorePlugin);
//! app.update();
//! ```

pub mod config;
pub mod error;
pub mod time;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use config::StationConfig;
pub use error::{ArmlinkError, ConfigError, DocumentError};
pub use time::TickClock;

// ---------------------------------------------------------------------------
// ArmlinkSet
// ---------------------------------------------------------------------------

/// System-set ordering for one armlink tick.
///
/// Configured as a chain by [`ArmlinkCorePlugin`]; downstream plugins place
/// their systems with `.in_set(...)` and inherit the ordering.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArmlinkSet {
    /// Input mapping engine: device samples → servo commands.
    Input,
    /// Motion sequencer: record or play back.
    Sequence,
    /// Flush queued notifications and drive the transport.
    Communicate,
}

// ---------------------------------------------------------------------------
// ArmlinkCorePlugin
// ---------------------------------------------------------------------------

/// Core plugin: tick clock plus system-set ordering.
///
/// Must be added before the arm, sequencer, input, and transport plugins —
/// they all place systems into [`ArmlinkSet`].
pub struct ArmlinkCorePlugin;

impl Plugin for ArmlinkCorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TickClock>()
            .configure_sets(
                Update,
                (
                    ArmlinkSet::Input,
                    ArmlinkSet::Sequence,
                    ArmlinkSet::Communicate,
                )
                    .chain(),
            )
            .add_systems(First, time::advance_tick_clock);
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ArmlinkCorePlugin, ArmlinkSet,
        config::StationConfig,
        error::{ArmlinkError, ConfigError, DocumentError},
        time::TickClock,
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plugin_builds_without_panic() {
        let mut app = App::new();
        app.add_plugins(ArmlinkCorePlugin);
        app.finish();
        app.cleanup();
        app.update();

        assert!(app.world().get_resource::<TickClock>().is_some());
    }

    #[test]
    fn manual_clock_survives_updates() {
        let mut app = App::new();
        app.add_plugins(ArmlinkCorePlugin);
        app.insert_resource(TickClock::manual());

        app.world_mut().resource_mut::<TickClock>().advance(250);
        app.update();
        app.update();

        assert_eq!(app.world().resource::<TickClock>().now_ms(), 250);
    }
}
