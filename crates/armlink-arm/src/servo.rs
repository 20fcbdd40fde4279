//! Servo records and the defaulting pass applied to imported documents.
//!
//! [`Servo`] doubles as the runtime state of one actuator and as one entry
//! of the arm configuration document — the document is an ordered JSON
//! array of these records with every field optional except `id`.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_angle() -> f32 {
    90.0
}
const fn default_min() -> f32 {
    0.0
}
const fn default_max() -> f32 {
    180.0
}
fn default_color() -> String {
    "#222222".into()
}
fn default_mesh_type() -> String {
    "default".into()
}

// ---------------------------------------------------------------------------
// ServoCategory
// ---------------------------------------------------------------------------

/// Mechanical role of a servo. Fixed logic, not cosmetic: gripper servos
/// are forced to positional mode by the defaulting pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServoCategory {
    Base,
    #[default]
    Joint,
    Wrist,
    /// End-effector gripper. Legacy documents use `claw`.
    #[serde(alias = "claw")]
    Gripper,
}

impl ServoCategory {
    /// Whether this category admits continuous mode.
    #[must_use]
    pub const fn allows_continuous(self) -> bool {
        !matches!(self, Self::Gripper)
    }
}

// ---------------------------------------------------------------------------
// ServoMode
// ---------------------------------------------------------------------------

/// Operating mode of a servo output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServoMode {
    /// Holds a commanded angle.
    #[default]
    Positional,
    /// Free-running rotation (speed-controlled).
    Continuous,
}

// ---------------------------------------------------------------------------
// Servo
// ---------------------------------------------------------------------------

/// State of one actuator, and one record of the configuration document.
///
/// `angle` is always the logical (uninverted) value; the physical output is
/// derived by [`physical_angle`](Self::physical_angle) when the servo is
/// inverted. `color` and `mesh_type` are opaque display attributes carried
/// verbatim for presentation collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Servo {
    /// Stable unique id.
    pub id: u32,

    /// Physical output channel.
    #[serde(default)]
    pub pin: u8,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Mechanical role.
    #[serde(default, rename = "type")]
    pub category: ServoCategory,

    /// Operating mode (gripper servos are always positional).
    #[serde(default)]
    pub mode: ServoMode,

    /// Current logical angle in degrees.
    #[serde(default = "default_angle")]
    pub angle: f32,

    /// Angle taken on reset and after import.
    #[serde(default = "default_angle")]
    pub start_angle: f32,

    /// Inclusive lower bound (degrees).
    #[serde(default = "default_min")]
    pub min: f32,

    /// Inclusive upper bound (degrees).
    #[serde(default = "default_max")]
    pub max: f32,

    /// Display color, preserved verbatim.
    #[serde(default = "default_color")]
    pub color: String,

    /// Display mesh identifier, preserved verbatim.
    #[serde(default = "default_mesh_type")]
    pub mesh_type: String,

    /// Whether the physical output runs opposite to the logical angle.
    #[serde(default)]
    pub inverted: bool,
}

impl Servo {
    /// Create a default servo of the given category.
    #[must_use]
    pub fn new(id: u32, category: ServoCategory) -> Self {
        Self {
            id,
            pin: 0,
            name: format!("Servo {id}"),
            category,
            mode: ServoMode::Positional,
            angle: default_angle(),
            start_angle: default_angle(),
            min: default_min(),
            max: default_max(),
            color: default_color(),
            mesh_type: default_mesh_type(),
            inverted: false,
        }
    }

    /// Apply the defaulting pass.
    ///
    /// Gripper servos are forced to positional mode regardless of the
    /// requested value; an empty name or mesh type gets a default.
    pub fn normalize(&mut self) {
        if self.category == ServoCategory::Gripper {
            self.mode = ServoMode::Positional;
        }
        if self.name.is_empty() {
            self.name = format!("Servo {}", self.id);
        }
        if self.mesh_type.is_empty() {
            self.mesh_type = default_mesh_type();
        }
    }

    /// Physical output angle: `max - (angle - min)` when inverted,
    /// the logical angle otherwise.
    #[must_use]
    pub fn physical_angle(&self) -> f32 {
        if self.inverted {
            self.max - (self.angle - self.min)
        } else {
            self.angle
        }
    }

    /// Midpoint of the operating range.
    #[must_use]
    pub fn center(&self) -> f32 {
        self.min + (self.max - self.min) / 2.0
    }

    /// Clamp a requested angle into `[min, max]`.
    #[must_use]
    pub fn clamp(&self, angle: f32) -> f32 {
        angle.clamp(self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// ServoPatch
// ---------------------------------------------------------------------------

/// Partial servo update with merge semantics.
///
/// `None` fields keep the existing value; the defaulting pass runs after
/// the merge, so a gripper keeps positional mode no matter what the patch
/// requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServoPatch {
    #[serde(default)]
    pub pin: Option<u8>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub category: Option<ServoCategory>,
    #[serde(default)]
    pub mode: Option<ServoMode>,
    #[serde(default)]
    pub start_angle: Option<f32>,
    #[serde(default)]
    pub min: Option<f32>,
    #[serde(default)]
    pub max: Option<f32>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub mesh_type: Option<String>,
    #[serde(default)]
    pub inverted: Option<bool>,
}

impl ServoPatch {
    /// Merge this patch into a servo, then re-run the defaulting pass.
    pub fn apply_to(self, servo: &mut Servo) {
        if let Some(pin) = self.pin {
            servo.pin = pin;
        }
        if let Some(name) = self.name {
            servo.name = name;
        }
        if let Some(category) = self.category {
            servo.category = category;
        }
        if let Some(mode) = self.mode {
            servo.mode = mode;
        }
        if let Some(start_angle) = self.start_angle {
            servo.start_angle = start_angle;
        }
        if let Some(min) = self.min {
            servo.min = min;
        }
        if let Some(max) = self.max {
            servo.max = max;
        }
        if let Some(color) = self.color {
            servo.color = color;
        }
        if let Some(mesh_type) = self.mesh_type {
            servo.mesh_type = mesh_type;
        }
        if let Some(inverted) = self.inverted {
            servo.inverted = inverted;
        }
        servo.normalize();
    }

    /// Builder: set the operating mode.
    #[must_use]
    pub const fn with_mode(mut self, mode: ServoMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Builder: set the category.
    #[must_use]
    pub const fn with_category(mut self, category: ServoCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Builder: set the inversion flag.
    #[must_use]
    pub const fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = Some(inverted);
        self
    }

    /// Builder: set the bounds.
    #[must_use]
    pub const fn with_bounds(mut self, min: f32, max: f32) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
