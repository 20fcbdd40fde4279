//! Typed change notifications emitted by the arm model.
//!
//! Collaborators (presentation, persistence, transport) subscribe to these
//! events instead of coupling to the model. Mutations queue notifications
//! inside [`ArmModel`](crate::model::ArmModel); the flush system in
//! [`ArmlinkSet::Communicate`](armlink_core::ArmlinkSet) drains the queue
//! once per tick, so observers always see a complete generation of state.

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Structural change: servo added, removed, reordered, reconfigured, or the
/// whole collection replaced by import.
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigChanged;

/// A servo's logical angle changed.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ServoUpdated {
    pub id: u32,
    pub angle: f32,
}

/// Physical output command for the transport collaborator.
///
/// Carries the already-inverted physical angle for the servo's output
/// channel.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ServoCommand {
    pub channel: u8,
    pub angle: f32,
}

// ---------------------------------------------------------------------------
// ArmNotification
// ---------------------------------------------------------------------------

/// Internal queue entry, drained into the typed events above.
#[derive(Debug, Clone, PartialEq)]
pub enum ArmNotification {
    ConfigChanged,
    ServoUpdated { id: u32, angle: f32 },
    Command { channel: u8, angle: f32 },
}
