//! Poll and flush systems for the input mapping engine.

use bevy::prelude::*;

use armlink_arm::ArmModel;
use armlink_sequencer::Sequencer;

use crate::device::InputDevices;
use crate::engine::InputEngine;
use crate::events::{InputNotification, LearningCompleted, MappingChanged};
use crate::mapping::MappingTable;

// ---------------------------------------------------------------------------
// poll_input_system
// ---------------------------------------------------------------------------

/// `Input` system: run one engine tick against the current device snapshots.
///
/// The sequencer is optional so the plugin works standalone; without one,
/// playback never holds authority.
#[allow(clippy::needless_pass_by_value)] // Bevy system parameters are extracted by value
pub fn poll_input_system(
    devices: Res<InputDevices>,
    mut engine: ResMut<InputEngine>,
    mut mappings: ResMut<MappingTable>,
    mut arm: ResMut<ArmModel>,
    sequencer: Option<Res<Sequencer>>,
) {
    let playback_active = sequencer.is_some_and(|s| s.is_playing());
    engine.tick(&devices, &mut mappings, &mut arm, playback_active);
}

// ---------------------------------------------------------------------------
// flush_input_notifications
// ---------------------------------------------------------------------------

/// `Communicate` system: drain the engine's queue into typed events and
/// surface mapping table changes.
pub fn flush_input_notifications(
    mut engine: ResMut<InputEngine>,
    mut mappings: ResMut<MappingTable>,
    mut learning_completed: EventWriter<LearningCompleted>,
    mut mapping_changed: EventWriter<MappingChanged>,
) {
    if engine.pending_len() > 0 {
        for note in engine.drain_notifications() {
            match note {
                InputNotification::LearningCompleted {
                    servo_id,
                    kind,
                    index,
                } => {
                    learning_completed.send(LearningCompleted {
                        servo_id,
                        kind,
                        index,
                    });
                }
            }
        }
    }
    if mappings.take_dirty() {
        mapping_changed.send(MappingChanged);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceSnapshot;
    use crate::mapping::{ChannelKind, ServoMapping};
    use armlink_arm::ArmModelPlugin;
    use armlink_core::{ArmlinkCorePlugin, TickClock};
    use armlink_sequencer::SequencerPlugin;

    fn build_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(ArmlinkCorePlugin);
        app.add_plugins(ArmModelPlugin);
        app.add_plugins(SequencerPlugin);
        app.add_plugins(crate::InputPlugin);
        app.insert_resource(TickClock::manual());
        app.insert_resource(ArmModel::standard_arm());
        app.finish();
        app.cleanup();
        app
    }

    fn connect_pad(app: &mut App) {
        app.world_mut().resource_mut::<InputDevices>().connect(
            0,
            DeviceSnapshot::new("Logitech F310")
                .with_axes(4)
                .with_buttons(8),
        );
    }

    #[test]
    fn learning_registers_mapping_through_schedule() {
        let mut app = build_test_app();
        connect_pad(&mut app);
        app.world_mut()
            .resource_mut::<InputEngine>()
            .start_learning(2);

        app.update(); // baseline snapshot
        app.world_mut()
            .resource_mut::<InputDevices>()
            .set_axis(0, 1, 0.8);
        app.update(); // selection

        let mappings = app.world().resource::<MappingTable>();
        let mapping = mappings.get(2).unwrap();
        assert_eq!(mapping.kind, ChannelKind::Axis);
        assert_eq!(mapping.index, 1);

        let events = app.world().resource::<Events<LearningCompleted>>();
        let mut cursor = events.get_cursor();
        assert!(cursor
            .read(events)
            .any(|e| e.servo_id == 2 && e.index == 1));

        let changed = app.world().resource::<Events<MappingChanged>>();
        let mut cursor = changed.get_cursor();
        assert!(cursor.read(changed).next().is_some());
    }

    #[test]
    fn mapped_axis_moves_servo_through_schedule() {
        let mut app = build_test_app();
        connect_pad(&mut app);
        app.world_mut()
            .resource_mut::<MappingTable>()
            .set(0, ServoMapping::new(ChannelKind::Axis, 0));
        app.world_mut()
            .resource_mut::<InputDevices>()
            .set_axis(0, 0, 0.6);

        app.update();

        let arm = app.world().resource::<ArmModel>();
        assert!((arm.servo(0).unwrap().angle - 144.0).abs() < 1e-4);
    }

    #[test]
    fn playback_suspends_input_output() {
        let mut app = build_test_app();
        connect_pad(&mut app);
        app.world_mut()
            .resource_mut::<MappingTable>()
            .set(0, ServoMapping::new(ChannelKind::Axis, 0));
        {
            let mut seq = app.world_mut().resource_mut::<Sequencer>();
            seq.import_json(r#"{"duration": 10000, "tracks": {}}"#).unwrap();
            seq.play(0);
        }
        app.world_mut()
            .resource_mut::<InputDevices>()
            .set_axis(0, 0, 1.0);

        app.update();

        let arm = app.world().resource::<ArmModel>();
        assert!((arm.servo(0).unwrap().angle - 90.0).abs() < f32::EPSILON);
    }
}
