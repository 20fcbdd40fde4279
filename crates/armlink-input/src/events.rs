//! Typed notifications emitted by the input mapping engine.

use bevy::prelude::*;

use crate::mapping::ChannelKind;

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The mapping table changed (registration, update, removal, or import).
#[derive(Event, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MappingChanged;

/// A learning pass selected a channel and registered a mapping.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LearningCompleted {
    pub servo_id: u32,
    pub kind: ChannelKind,
    pub index: usize,
}

// ---------------------------------------------------------------------------
// InputNotification
// ---------------------------------------------------------------------------

/// Internal queue entry, drained into the typed events above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputNotification {
    LearningCompleted {
        servo_id: u32,
        kind: ChannelKind,
        index: usize,
    },
}
