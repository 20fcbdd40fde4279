//! Servo mappings and the mapping document.

use std::collections::HashMap;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use armlink_core::DocumentError;

/// Default axis deadzone for a freshly learned mapping.
pub const DEFAULT_DEADZONE: f32 = 0.1;

// ---------------------------------------------------------------------------
// ChannelKind / ControlMode
// ---------------------------------------------------------------------------

/// Which kind of device channel a mapping reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    Axis,
    Button,
}

/// How an axis value turns into a target angle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Target derived directly from the raw magnitude (spring-centered).
    #[default]
    Absolute,
    /// Raw value sets a rate of change applied to the current angle.
    Incremental,
}

// ---------------------------------------------------------------------------
// ServoMapping
// ---------------------------------------------------------------------------

/// Binding of one device channel to one servo.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServoMapping {
    /// Channel kind.
    #[serde(rename = "type")]
    pub kind: ChannelKind,
    /// Channel index on the active device.
    pub index: usize,
    /// Negate the sampled value.
    #[serde(default)]
    pub invert: bool,
    /// Axis control law.
    #[serde(default)]
    pub control_mode: ControlMode,
    /// Axis magnitudes below this are treated as zero.
    #[serde(default = "default_deadzone")]
    pub deadzone: f32,
}

const fn default_deadzone() -> f32 {
    DEFAULT_DEADZONE
}

impl ServoMapping {
    /// Create a mapping with learning defaults: not inverted, absolute,
    /// deadzone 0.1.
    #[must_use]
    pub const fn new(kind: ChannelKind, index: usize) -> Self {
        Self {
            kind,
            index,
            invert: false,
            control_mode: ControlMode::Absolute,
            deadzone: DEFAULT_DEADZONE,
        }
    }

    /// Builder: set inversion.
    #[must_use]
    pub const fn with_invert(mut self, invert: bool) -> Self {
        self.invert = invert;
        self
    }

    /// Builder: set the control mode.
    #[must_use]
    pub const fn with_control_mode(mut self, mode: ControlMode) -> Self {
        self.control_mode = mode;
        self
    }

    /// Builder: set the deadzone.
    #[must_use]
    pub const fn with_deadzone(mut self, deadzone: f32) -> Self {
        self.deadzone = deadzone;
        self
    }
}

// ---------------------------------------------------------------------------
// MappingPatch
// ---------------------------------------------------------------------------

/// Partial mapping update with merge semantics (`None` keeps the value).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingPatch {
    #[serde(default, rename = "type")]
    pub kind: Option<ChannelKind>,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub invert: Option<bool>,
    #[serde(default)]
    pub control_mode: Option<ControlMode>,
    #[serde(default)]
    pub deadzone: Option<f32>,
}

impl MappingPatch {
    fn apply_to(self, mapping: &mut ServoMapping) {
        if let Some(kind) = self.kind {
            mapping.kind = kind;
        }
        if let Some(index) = self.index {
            mapping.index = index;
        }
        if let Some(invert) = self.invert {
            mapping.invert = invert;
        }
        if let Some(mode) = self.control_mode {
            mapping.control_mode = mode;
        }
        if let Some(deadzone) = self.deadzone {
            mapping.deadzone = deadzone;
        }
    }
}

// ---------------------------------------------------------------------------
// MappingTable
// ---------------------------------------------------------------------------

/// Servo id → mapping, with change tracking for the notification flush.
#[derive(Resource, Debug, Clone, Default)]
pub struct MappingTable {
    map: HashMap<u32, ServoMapping>,
    dirty: bool,
}

impl MappingTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mapping for a servo, if one exists.
    #[must_use]
    pub fn get(&self, servo_id: u32) -> Option<&ServoMapping> {
        self.map.get(&servo_id)
    }

    /// Register (or replace) a mapping.
    pub fn set(&mut self, servo_id: u32, mapping: ServoMapping) {
        self.map.insert(servo_id, mapping);
        self.dirty = true;
    }

    /// Merge a partial update into an existing mapping.
    /// Unmapped servo ids are ignored.
    pub fn update(&mut self, servo_id: u32, patch: MappingPatch) {
        if let Some(mapping) = self.map.get_mut(&servo_id) {
            patch.apply_to(mapping);
            self.dirty = true;
        }
    }

    /// Remove a mapping. Unknown ids are ignored.
    pub fn remove(&mut self, servo_id: u32) {
        if self.map.remove(&servo_id).is_some() {
            self.dirty = true;
        }
    }

    /// All mappings, unordered.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &ServoMapping)> {
        self.map.iter().map(|(&id, m)| (id, m))
    }

    /// Number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether no servo is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Consume the change flag (used by the notification flush).
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Serialize as a mapping document (servo id → mapping).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(&self.map)?)
    }

    /// Replace the whole table from a mapping document.
    /// Malformed documents are rejected whole.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid.
    pub fn import_json(&mut self, json: &str) -> Result<(), DocumentError> {
        self.map = serde_json::from_str(json)?;
        self.dirty = true;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
