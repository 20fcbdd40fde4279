//! Tick and flush systems for the sequencer.

use bevy::prelude::*;

use armlink_arm::ArmModel;
use armlink_core::TickClock;

use crate::events::{
    SequencerNotification, SequencerStateChanged, SequencerTimeChanged, TrackChanged,
};
use crate::sequencer::Sequencer;

// ---------------------------------------------------------------------------
// sequencer_tick_system
// ---------------------------------------------------------------------------

/// `Sequence` system: advance the sequencer from the tick clock.
///
/// During playback this writes the interpolated pose into the arm model;
/// during recording it only reads.
#[allow(clippy::needless_pass_by_value)] // Bevy system parameters are extracted by value
pub fn sequencer_tick_system(
    clock: Res<TickClock>,
    mut sequencer: ResMut<Sequencer>,
    mut arm: ResMut<ArmModel>,
) {
    sequencer.tick(clock.now_ms(), &mut arm);
}

// ---------------------------------------------------------------------------
// flush_sequencer_notifications
// ---------------------------------------------------------------------------

/// `Communicate` system: drain the sequencer's queue into typed events.
pub fn flush_sequencer_notifications(
    mut sequencer: ResMut<Sequencer>,
    mut state_changed: EventWriter<SequencerStateChanged>,
    mut time_changed: EventWriter<SequencerTimeChanged>,
    mut track_changed: EventWriter<TrackChanged>,
) {
    if sequencer.pending_len() == 0 {
        return;
    }
    for note in sequencer.drain_notifications() {
        match note {
            SequencerNotification::StateChanged(state) => {
                state_changed.send(SequencerStateChanged(state));
            }
            SequencerNotification::TimeChanged(time) => {
                time_changed.send(SequencerTimeChanged(time));
            }
            SequencerNotification::TrackChanged => {
                track_changed.send(TrackChanged);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::RunState;
    use armlink_arm::ArmModelPlugin;
    use armlink_core::ArmlinkCorePlugin;

    fn build_test_app() -> App {
        let mut app = App::new();
        app.add_plugins(ArmlinkCorePlugin);
        app.add_plugins(ArmModelPlugin);
        app.add_plugins(crate::SequencerPlugin);
        app.insert_resource(TickClock::manual());
        app.insert_resource(ArmModel::standard_arm());
        app.finish();
        app.cleanup();
        app
    }

    fn advance(app: &mut App, ms: u64) {
        app.world_mut().resource_mut::<TickClock>().advance(ms);
        app.update();
    }

    #[test]
    fn playback_tick_drives_arm_through_schedule() {
        let mut app = build_test_app();
        {
            let mut seq = app.world_mut().resource_mut::<Sequencer>();
            seq.import_json(
                r#"{"duration": 1000, "tracks": {"0": [{"time":0,"value":0.0},{"time":1000,"value":100.0}]}}"#,
            )
            .unwrap();
            seq.play(0);
        }

        advance(&mut app, 500);

        let arm = app.world().resource::<ArmModel>();
        assert!((arm.servo(0).unwrap().angle - 50.0).abs() < 1e-4);
    }

    #[test]
    fn recording_through_schedule_samples_changes() {
        let mut app = build_test_app();
        {
            let world = app.world_mut();
            let arm = world.resource::<ArmModel>().clone();
            world
                .resource_mut::<Sequencer>()
                .start_recording(0, &arm);
        }

        app.world_mut()
            .resource_mut::<ArmModel>()
            .set_angle(0, 120.0);
        advance(&mut app, 500);

        let seq = app.world().resource::<Sequencer>();
        assert_eq!(seq.state(), RunState::Recording);
        let keys = seq.sequence().keyframes(0);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[1].time, 500);
    }

    #[test]
    fn flush_emits_time_and_state_events() {
        let mut app = build_test_app();
        {
            let mut seq = app.world_mut().resource_mut::<Sequencer>();
            seq.import_json(r#"{"duration": 1000, "tracks": {}}"#).unwrap();
            seq.play(0);
        }

        advance(&mut app, 100);

        let states = app.world().resource::<Events<SequencerStateChanged>>();
        let mut cursor = states.get_cursor();
        assert!(cursor
            .read(states)
            .any(|e| e.0 == RunState::Playing));

        let times = app.world().resource::<Events<SequencerTimeChanged>>();
        let mut cursor = times.get_cursor();
        assert!(cursor.read(times).any(|e| e.0 == 100));
    }

    #[test]
    fn idle_tick_is_inert() {
        let mut app = build_test_app();
        advance(&mut app, 1000);
        let seq = app.world().resource::<Sequencer>();
        assert_eq!(seq.state(), RunState::Idle);
        assert_eq!(seq.playhead_ms(), 0);
    }
}
