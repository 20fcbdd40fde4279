//! Hardware command transport for the armlink arm controller.
//!
//! Forwards [`ServoCommand`](armlink_arm::ServoCommand) events to whatever
//! link drives the physical arm. The wire format is one line per command,
//! `"{channel}:{angle}\n"`, with the angle rounded to the nearest whole
//! degree. A missing or disconnected link drops commands silently; the rest
//! of the station keeps running.

use bevy::prelude::*;
use thiserror::Error;

use armlink_arm::ServoCommand;
use armlink_core::ArmlinkSet;

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

/// Render one command line. Angles are rounded to whole degrees; the
/// receiving firmware parses integers only.
#[must_use]
pub fn command_line(channel: u8, angle: f32) -> String {
    format!("{channel}:{}\n", angle.round() as i32)
}

// ---------------------------------------------------------------------------
// TransportError / ArmTransport
// ---------------------------------------------------------------------------

/// Errors raised by a transport backend.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("transport i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("link not open")]
    NotConnected,
}

/// A one-way link to the arm hardware.
///
/// Implementations write already-formatted command lines; they do not
/// interpret them.
pub trait ArmTransport: Send + Sync {
    /// Write one command line to the link.
    ///
    /// # Errors
    ///
    /// Returns an error if the link rejects the write.
    fn send_line(&mut self, line: &str) -> Result<(), TransportError>;

    /// Whether the link is currently open.
    fn is_connected(&self) -> bool;
}

// ---------------------------------------------------------------------------
// TransportLink
// ---------------------------------------------------------------------------

/// Resource holding the active transport, if any.
#[derive(Resource, Default)]
pub struct TransportLink {
    backend: Option<Box<dyn ArmTransport>>,
}

impl TransportLink {
    /// A link with no backend attached.
    #[must_use]
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// A link driving the given backend.
    #[must_use]
    pub fn new(backend: Box<dyn ArmTransport>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// Attach a backend, replacing any existing one.
    pub fn attach(&mut self, backend: Box<dyn ArmTransport>) {
        self.backend = Some(backend);
    }

    /// Drop the backend.
    pub fn detach(&mut self) {
        self.backend = None;
    }

    /// Whether a connected backend is attached.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.backend.as_ref().is_some_and(|b| b.is_connected())
    }

    /// Format and send one command. Dropped silently when no backend is
    /// connected; write failures are logged and swallowed.
    pub fn send(&mut self, channel: u8, angle: f32) {
        let Some(backend) = &mut self.backend else {
            return;
        };
        if !backend.is_connected() {
            return;
        }
        let line = command_line(channel, angle);
        if let Err(err) = backend.send_line(&line) {
            warn!("transport write failed: {err}");
        }
    }
}

// ---------------------------------------------------------------------------
// MockTransport
// ---------------------------------------------------------------------------

/// In-memory transport recording every line, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MockTransport {
    lines: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    connected: bool,
}

impl MockTransport {
    /// A connected mock.
    #[must_use]
    pub fn new() -> Self {
        Self {
            lines: std::sync::Arc::default(),
            connected: true,
        }
    }

    /// Shared handle to the recorded lines.
    #[must_use]
    pub fn lines(&self) -> std::sync::Arc<std::sync::Mutex<Vec<String>>> {
        std::sync::Arc::clone(&self.lines)
    }

    /// Simulate the link dropping.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl ArmTransport for MockTransport {
    fn send_line(&mut self, line: &str) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::NotConnected);
        }
        self.lines.lock().unwrap().push(line.to_owned());
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

// ---------------------------------------------------------------------------
// forward_servo_commands
// ---------------------------------------------------------------------------

/// `Communicate` system: forward flushed [`ServoCommand`] events down the
/// link. Ordered after the arm's notification flush so commands emitted this
/// tick go out this tick.
pub fn forward_servo_commands(
    mut commands: EventReader<ServoCommand>,
    mut link: ResMut<TransportLink>,
) {
    for command in commands.read() {
        link.send(command.channel, command.angle);
    }
}

// ---------------------------------------------------------------------------
// TransportPlugin
// ---------------------------------------------------------------------------

/// Bevy plugin forwarding servo commands to the hardware link.
pub struct TransportPlugin;

impl Plugin for TransportPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TransportLink>().add_systems(
            Update,
            forward_servo_commands
                .in_set(ArmlinkSet::Communicate)
                .after(armlink_arm::systems::flush_arm_notifications),
        );
    }
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ArmTransport, MockTransport, TransportError, TransportLink, TransportPlugin, command_line,
    };
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use armlink_arm::{ArmModel, ArmModelPlugin};
    use armlink_core::ArmlinkCorePlugin;

    #[test]
    fn command_line_rounds_to_whole_degrees() {
        assert_eq!(command_line(3, 90.4), "3:90\n");
        assert_eq!(command_line(3, 90.5), "3:91\n");
        assert_eq!(command_line(10, 0.0), "10:0\n");
    }

    #[test]
    fn send_without_backend_is_silent() {
        let mut link = TransportLink::disconnected();
        link.send(3, 90.0);
        assert!(!link.is_connected());
    }

    #[test]
    fn mock_records_sent_lines() {
        let mock = MockTransport::new();
        let lines = mock.lines();
        let mut link = TransportLink::new(Box::new(mock));

        link.send(5, 45.2);
        link.send(9, 120.8);

        assert_eq!(*lines.lock().unwrap(), vec!["5:45\n", "9:121\n"]);
    }

    #[test]
    fn disconnected_mock_drops_writes() {
        let mut mock = MockTransport::new();
        mock.set_connected(false);
        let lines = mock.lines();
        let mut link = TransportLink::new(Box::new(mock));

        link.send(3, 90.0);
        assert!(lines.lock().unwrap().is_empty());
    }

    #[test]
    fn commands_forward_through_schedule() {
        let mut app = App::new();
        app.add_plugins(ArmlinkCorePlugin);
        app.add_plugins(ArmModelPlugin);
        app.add_plugins(TransportPlugin);
        app.insert_resource(ArmModel::standard_arm());

        let mock = MockTransport::new();
        let lines = mock.lines();
        app.insert_resource(TransportLink::new(Box::new(mock)));
        app.finish();
        app.cleanup();

        // Servo 0 sits on pin 3; inversion does not apply to the default arm.
        app.world_mut()
            .resource_mut::<ArmModel>()
            .set_angle(0, 120.3);
        app.update();

        assert_eq!(*lines.lock().unwrap(), vec!["3:120\n"]);
    }

    #[test]
    fn inverted_servo_sends_physical_angle() {
        let mut app = App::new();
        app.add_plugins(ArmlinkCorePlugin);
        app.add_plugins(ArmModelPlugin);
        app.add_plugins(TransportPlugin);
        app.insert_resource(ArmModel::standard_arm());

        let mock = MockTransport::new();
        let lines = mock.lines();
        app.insert_resource(TransportLink::new(Box::new(mock)));
        app.finish();
        app.cleanup();

        {
            let mut arm = app.world_mut().resource_mut::<ArmModel>();
            arm.update_config(
                0,
                armlink_arm::ServoPatch::default().with_inverted(true),
            );
            arm.drain_notifications();
            arm.set_angle(0, 30.0);
        }
        app.update();

        // Physical angle is max - (angle - min) = 180 - 30 = 150.
        assert_eq!(*lines.lock().unwrap(), vec!["3:150\n"]);
    }
}
