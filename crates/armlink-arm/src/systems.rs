//! Notification flush system.

use bevy::prelude::*;

use crate::events::{ArmNotification, ConfigChanged, ServoCommand, ServoUpdated};
use crate::model::ArmModel;

// ---------------------------------------------------------------------------
// flush_arm_notifications
// ---------------------------------------------------------------------------

/// `Communicate` system: drain the model's queue into typed events.
///
/// Runs after input and sequencer mutation, so one tick's worth of changes
/// reaches every observer as a single consistent batch.
pub fn flush_arm_notifications(
    mut arm: ResMut<ArmModel>,
    mut config_changed: EventWriter<ConfigChanged>,
    mut servo_updated: EventWriter<ServoUpdated>,
    mut commands: EventWriter<ServoCommand>,
) {
    if arm.pending_len() == 0 {
        return;
    }
    for note in arm.drain_notifications() {
        match note {
            ArmNotification::ConfigChanged => {
                config_changed.send(ConfigChanged);
            }
            ArmNotification::ServoUpdated { id, angle } => {
                servo_updated.send(ServoUpdated { id, angle });
            }
            ArmNotification::Command { channel, angle } => {
                commands.send(ServoCommand { channel, angle });
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
