//! The canonical actuator state model.
//!
//! [`ArmModel`] owns the ordered servo collection and is the single shared
//! mutable resource of the controller. The sequencer (while playing) and
//! the input mapping engine are mutually exclusive writers; presentation
//! and transport observe through the notification events.
//!
//! Unknown servo ids are silently ignored by every operation — downstream
//! collaborators rely on this permissive contract.

use bevy::prelude::*;

use armlink_core::DocumentError;

use crate::events::ArmNotification;
use crate::servo::{Servo, ServoCategory, ServoPatch};

// ---------------------------------------------------------------------------
// ArmModel
// ---------------------------------------------------------------------------

/// Canonical per-servo state plus a monotonic id allocator.
///
/// Ids are never reused after a removal: the allocator only moves forward,
/// and import re-seeds it above the imported maximum.
#[derive(Resource, Debug, Clone, Default)]
pub struct ArmModel {
    servos: Vec<Servo>,
    next_id: u32,
    pending: Vec<ArmNotification>,
}

impl ArmModel {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The original five-servo bench arm.
    #[must_use]
    pub fn standard_arm() -> Self {
        let servos = vec![
            preset(0, 3, "Base", ServoCategory::Base, 90.0, 0.0, 180.0, "#1a1a1a"),
            preset(1, 5, "Shoulder", ServoCategory::Joint, 45.0, 0.0, 180.0, "#2a2a2a"),
            preset(2, 6, "Elbow", ServoCategory::Joint, 150.0, 0.0, 180.0, "#3a3a3a"),
            preset(3, 9, "Wrist", ServoCategory::Wrist, 90.0, 0.0, 180.0, "#4a4a4a"),
            preset(4, 10, "Gripper", ServoCategory::Gripper, 90.0, 30.0, 120.0, "#00f3ff"),
        ];
        Self {
            next_id: 5,
            servos,
            pending: Vec::new(),
        }
    }

    /// Build a model from a servo list (normalizes and seeds the allocator).
    #[must_use]
    pub fn from_servos(mut servos: Vec<Servo>) -> Self {
        for servo in &mut servos {
            servo.normalize();
        }
        let next_id = servos.iter().map(|s| s.id + 1).max().unwrap_or(0);
        Self {
            servos,
            next_id,
            pending: Vec::new(),
        }
    }

    // -- Reads ---------------------------------------------------------------

    /// Look up a servo by id.
    #[must_use]
    pub fn servo(&self, id: u32) -> Option<&Servo> {
        self.servos.iter().find(|s| s.id == id)
    }

    /// All servos in display order.
    #[must_use]
    pub fn servos(&self) -> &[Servo] {
        &self.servos
    }

    /// Ids in display order.
    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.servos.iter().map(|s| s.id)
    }

    /// Number of servos.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servos.len()
    }

    /// Whether the model holds no servos.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servos.is_empty()
    }

    // -- Value mutation ------------------------------------------------------

    /// Store a logical angle and queue the physical output command.
    ///
    /// The stored value is always the uninverted logical angle; inversion is
    /// applied only to the outgoing [`Command`](ArmNotification::Command).
    /// The model does not clamp — bounds are the caller's contract.
    /// Unknown ids are ignored.
    pub fn set_angle(&mut self, id: u32, angle: f32) {
        let Some(servo) = self.servos.iter_mut().find(|s| s.id == id) else {
            return;
        };
        servo.angle = angle;
        let channel = servo.pin;
        let physical = servo.physical_angle();
        self.pending.push(ArmNotification::ServoUpdated { id, angle });
        self.pending.push(ArmNotification::Command {
            channel,
            angle: physical,
        });
    }

    /// Set every servo to its start angle.
    pub fn reset_to_start(&mut self) {
        let targets: Vec<(u32, f32)> = self.servos.iter().map(|s| (s.id, s.start_angle)).collect();
        for (id, start) in targets {
            self.set_angle(id, start);
        }
    }

    // -- Structural mutation -------------------------------------------------

    /// Merge a partial update into a servo (defaulting pass included).
    /// Unknown ids are ignored.
    pub fn update_config(&mut self, id: u32, patch: ServoPatch) {
        let Some(servo) = self.servos.iter_mut().find(|s| s.id == id) else {
            return;
        };
        patch.apply_to(servo);
        self.pending.push(ArmNotification::ConfigChanged);
    }

    /// Set a servo's display color. Unknown ids are ignored.
    pub fn set_color(&mut self, id: u32, color: impl Into<String>) {
        let Some(servo) = self.servos.iter_mut().find(|s| s.id == id) else {
            return;
        };
        servo.color = color.into();
        self.pending.push(ArmNotification::ConfigChanged);
    }

    /// Set a servo's display mesh. An empty mesh falls back to `default`.
    /// Unknown ids are ignored.
    pub fn set_mesh(&mut self, id: u32, mesh_type: impl Into<String>) {
        let Some(servo) = self.servos.iter_mut().find(|s| s.id == id) else {
            return;
        };
        let mesh_type = mesh_type.into();
        servo.mesh_type = if mesh_type.is_empty() {
            "default".into()
        } else {
            mesh_type
        };
        self.pending.push(ArmNotification::ConfigChanged);
    }

    /// Append a default servo of the given category and return its id.
    pub fn add(&mut self, category: ServoCategory) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.servos.push(Servo::new(id, category));
        self.pending.push(ArmNotification::ConfigChanged);
        id
    }

    /// Remove a servo. Unknown ids are ignored (no notification either).
    pub fn remove(&mut self, id: u32) {
        let before = self.servos.len();
        self.servos.retain(|s| s.id != id);
        if self.servos.len() != before {
            self.pending.push(ArmNotification::ConfigChanged);
        }
    }

    /// Stable relocation of the servo at `from` to position `to`.
    ///
    /// An out-of-range `from` is a no-op; `to` past the end appends.
    pub fn reorder(&mut self, from: usize, to: usize) {
        if from >= self.servos.len() || from == to {
            return;
        }
        let servo = self.servos.remove(from);
        let to = to.min(self.servos.len());
        self.servos.insert(to, servo);
        self.pending.push(ArmNotification::ConfigChanged);
    }

    // -- Documents -----------------------------------------------------------

    /// Serialize the servo list as a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(&self.servos)?)
    }

    /// Replace the whole collection from a configuration document.
    ///
    /// The document is parsed in full before anything is applied; a corrupt
    /// document leaves the model unchanged. Every imported record goes
    /// through the defaulting pass, the id allocator is re-seeded above the
    /// imported maximum, and every servo is then reset to its start angle.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid servo array.
    pub fn import_json(&mut self, json: &str) -> Result<(), DocumentError> {
        let mut servos: Vec<Servo> = serde_json::from_str(json)?;
        for servo in &mut servos {
            servo.normalize();
        }
        self.next_id = servos.iter().map(|s| s.id + 1).max().unwrap_or(0);
        self.servos = servos;
        self.pending.push(ArmNotification::ConfigChanged);
        self.reset_to_start();
        Ok(())
    }

    // -- Notifications -------------------------------------------------------

    /// Drain queued notifications (called once per tick by the flush system).
    pub fn drain_notifications(&mut self) -> Vec<ArmNotification> {
        std::mem::take(&mut self.pending)
    }

    /// Number of queued notifications.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

fn preset(
    id: u32,
    pin: u8,
    name: &str,
    category: ServoCategory,
    start_angle: f32,
    min: f32,
    max: f32,
    color: &str,
) -> Servo {
    let mut servo = Servo::new(id, category);
    servo.pin = pin;
    servo.name = name.into();
    servo.start_angle = start_angle;
    servo.min = min;
    servo.max = max;
    servo.color = color.into();
    servo
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::servo::ServoMode;

    #[test]
    fn standard_arm_layout() {
        let arm = ArmModel::standard_arm();
        assert_eq!(arm.len(), 5);
        assert_eq!(arm.servo(4).unwrap().category, ServoCategory::Gripper);
        assert!((arm.servo(1).unwrap().start_angle - 45.0).abs() < f32::EPSILON);
        assert!((arm.servo(4).unwrap().min - 30.0).abs() < f32::EPSILON);
    }

    #[test]
    fn set_angle_stores_logical_value() {
        let mut arm = ArmModel::standard_arm();
        arm.set_angle(0, 135.0);
        assert!((arm.servo(0).unwrap().angle - 135.0).abs() < f32::EPSILON);
    }

    #[test]
    fn set_angle_queues_update_and_command() {
        let mut arm = ArmModel::standard_arm();
        arm.drain_notifications();
        arm.set_angle(0, 135.0);

        let notes = arm.drain_notifications();
        assert_eq!(notes.len(), 2);
        assert_eq!(
            notes[0],
            ArmNotification::ServoUpdated { id: 0, angle: 135.0 }
        );
        assert_eq!(
            notes[1],
            ArmNotification::Command {
                channel: 3,
                angle: 135.0
            }
        );
    }

    #[test]
    fn inverted_servo_commands_mirrored_angle() {
        let mut arm = ArmModel::standard_arm();
        arm.update_config(4, ServoPatch::default().with_inverted(true));
        arm.drain_notifications();

        arm.set_angle(4, 40.0);

        // Gripper bounds [30, 120]: physical = 120 - (40 - 30) = 110.
        let notes = arm.drain_notifications();
        assert!(notes.contains(&ArmNotification::Command {
            channel: 10,
            angle: 110.0
        }));
        // Stored value stays logical.
        assert!((arm.servo(4).unwrap().angle - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn set_angle_unknown_id_is_silent_noop() {
        let mut arm = ArmModel::standard_arm();
        arm.drain_notifications();
        arm.set_angle(99, 10.0);
        assert!(arm.drain_notifications().is_empty());
    }

    #[test]
    fn set_angle_does_not_clamp() {
        let mut arm = ArmModel::standard_arm();
        arm.set_angle(0, 400.0);
        assert!((arm.servo(0).unwrap().angle - 400.0).abs() < f32::EPSILON);
    }

    #[test]
    fn update_config_merges_and_notifies() {
        let mut arm = ArmModel::standard_arm();
        arm.drain_notifications();
        arm.update_config(1, ServoPatch::default().with_bounds(10.0, 170.0));

        let servo = arm.servo(1).unwrap();
        assert!((servo.min - 10.0).abs() < f32::EPSILON);
        assert!((servo.max - 170.0).abs() < f32::EPSILON);
        assert_eq!(servo.name, "Shoulder");
        assert_eq!(
            arm.drain_notifications(),
            vec![ArmNotification::ConfigChanged]
        );
    }

    #[test]
    fn gripper_mode_forced_positional_through_update() {
        let mut arm = ArmModel::standard_arm();
        arm.update_config(4, ServoPatch::default().with_mode(ServoMode::Continuous));
        assert_eq!(arm.servo(4).unwrap().mode, ServoMode::Positional);
    }

    #[test]
    fn add_allocates_monotonic_ids() {
        let mut arm = ArmModel::new();
        let a = arm.add(ServoCategory::Joint);
        let b = arm.add(ServoCategory::Joint);
        arm.remove(b);
        let c = arm.add(ServoCategory::Wrist);

        assert_eq!(a, 0);
        assert_eq!(b, 1);
        // Id 1 is never reused.
        assert_eq!(c, 2);
    }

    #[test]
    fn remove_unknown_id_is_silent() {
        let mut arm = ArmModel::standard_arm();
        arm.drain_notifications();
        arm.remove(99);
        assert!(arm.drain_notifications().is_empty());
        assert_eq!(arm.len(), 5);
    }

    #[test]
    fn reorder_is_stable_relocation() {
        let mut arm = ArmModel::standard_arm();
        arm.reorder(0, 2);
        let ids: Vec<u32> = arm.ids().collect();
        assert_eq!(ids, vec![1, 2, 0, 3, 4]);
    }

    #[test]
    fn reorder_out_of_range_from_is_noop() {
        let mut arm = ArmModel::standard_arm();
        arm.drain_notifications();
        arm.reorder(10, 0);
        let ids: Vec<u32> = arm.ids().collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert!(arm.drain_notifications().is_empty());
    }

    #[test]
    fn reorder_past_end_appends() {
        let mut arm = ArmModel::standard_arm();
        arm.reorder(0, 99);
        let ids: Vec<u32> = arm.ids().collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 0]);
    }

    #[test]
    fn reset_to_start_restores_start_angles() {
        let mut arm = ArmModel::standard_arm();
        arm.set_angle(1, 10.0);
        arm.set_angle(2, 10.0);
        arm.reset_to_start();
        assert!((arm.servo(1).unwrap().angle - 45.0).abs() < f32::EPSILON);
        assert!((arm.servo(2).unwrap().angle - 150.0).abs() < f32::EPSILON);
    }

    #[test]
    fn import_replaces_collection_and_resets() {
        let mut arm = ArmModel::standard_arm();
        let json = r#"[
            {"id": 0, "pin": 2, "name": "A", "startAngle": 60},
            {"id": 7, "pin": 4, "type": "claw", "mode": "continuous"}
        ]"#;
        arm.import_json(json).unwrap();

        assert_eq!(arm.len(), 2);
        // Defaulting pass: claw alias maps to gripper, forced positional.
        let gripper = arm.servo(7).unwrap();
        assert_eq!(gripper.category, ServoCategory::Gripper);
        assert_eq!(gripper.mode, ServoMode::Positional);
        // Import always resets to start angles.
        assert!((arm.servo(0).unwrap().angle - 60.0).abs() < f32::EPSILON);
        // Allocator seeded past the imported maximum.
        assert_eq!(arm.add(ServoCategory::Joint), 8);
    }

    #[test]
    fn corrupt_import_leaves_state_unchanged() {
        let mut arm = ArmModel::standard_arm();
        arm.set_angle(0, 123.0);
        arm.drain_notifications();

        let result = arm.import_json("{not json");
        assert!(result.is_err());
        assert_eq!(arm.len(), 5);
        assert!((arm.servo(0).unwrap().angle - 123.0).abs() < f32::EPSILON);
        assert!(arm.drain_notifications().is_empty());
    }

    #[test]
    fn export_import_roundtrip() {
        let mut arm = ArmModel::standard_arm();
        let json = arm.export_json().unwrap();

        let mut restored = ArmModel::new();
        restored.import_json(&json).unwrap();

        assert_eq!(restored.len(), 5);
        assert_eq!(restored.servo(4).unwrap().color, "#00f3ff");
        assert_eq!(restored.servo(3).unwrap().name, "Wrist");
    }
}
