//! The input mapping engine: device bookkeeping, calibration ("learning"),
//! and the per-tick translation of channel samples into target angles.
//!
//! The engine never blocks and never raises on odd input: placeholder
//! devices are filtered, out-of-range channel indices contribute zero, and
//! unknown servo ids fall through silently.

use std::collections::HashMap;

use bevy::prelude::*;

use armlink_arm::ArmModel;

use crate::device::InputDevices;
use crate::events::InputNotification;
use crate::mapping::{ChannelKind, ControlMode, MappingTable, ServoMapping};

/// Axis deviation from the learning baseline that selects a channel.
pub const LEARN_AXIS_THRESHOLD: f32 = 0.5;

/// Degrees per tick for incremental axis control.
pub const AXIS_STEP_DEG: f32 = 2.0;

/// Degrees per tick for button control.
pub const BUTTON_STEP_DEG: f32 = 2.0;

/// Absolute-mode targets within this many degrees of the current angle are
/// not applied (hysteresis against jitter).
pub const APPLY_HYSTERESIS_DEG: f32 = 1.0;

// ---------------------------------------------------------------------------
// Learning state
// ---------------------------------------------------------------------------

/// Reference snapshot taken on the first learning tick per device.
#[derive(Debug, Clone, Default)]
struct Baseline {
    axes: Vec<f32>,
    buttons: Vec<bool>,
}

#[derive(Debug, Clone)]
struct Learning {
    target: u32,
    baselines: HashMap<usize, Baseline>,
}

// ---------------------------------------------------------------------------
// InputEngine
// ---------------------------------------------------------------------------

/// Input mapping engine resource.
#[derive(Resource, Debug, Clone)]
pub struct InputEngine {
    enabled: bool,
    active: Option<usize>,
    known: Vec<usize>,
    learning: Option<Learning>,
    pending: Vec<InputNotification>,
}

impl Default for InputEngine {
    fn default() -> Self {
        Self {
            enabled: true,
            active: None,
            known: Vec::new(),
            learning: None,
            pending: Vec::new(),
        }
    }
}

impl InputEngine {
    /// Create an enabled engine with no active device.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether ticks translate input into servo commands.
    #[must_use]
    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable the engine. Takes effect on the next tick.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Toggle the enabled state.
    pub fn toggle_enabled(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Slot index of the active device, if any.
    #[must_use]
    pub const fn active_device(&self) -> Option<usize> {
        self.active
    }

    /// Whether a learning pass is in progress.
    #[must_use]
    pub const fn is_learning(&self) -> bool {
        self.learning.is_some()
    }

    /// Begin calibration for a servo, clearing any prior baselines.
    pub fn start_learning(&mut self, servo_id: u32) {
        debug!("learning started for servo {servo_id}");
        self.learning = Some(Learning {
            target: servo_id,
            baselines: HashMap::new(),
        });
    }

    /// Abort calibration without registering a mapping.
    pub fn cancel_learning(&mut self) {
        self.learning = None;
    }

    /// One scheduler tick.
    ///
    /// Device bookkeeping always runs; the translation stages are skipped
    /// when the engine is disabled or the sequencer holds playback authority.
    pub fn tick(
        &mut self,
        devices: &InputDevices,
        mappings: &mut MappingTable,
        arm: &mut ArmModel,
        playback_active: bool,
    ) {
        self.sync_devices(devices);

        if !self.enabled || playback_active {
            return;
        }

        if self.is_learning() {
            self.learning_tick(devices, mappings);
            return;
        }

        self.control_tick(devices, mappings, arm);
    }

    // -- Device bookkeeping --------------------------------------------------

    /// Track connections and disconnections.
    ///
    /// The first connected non-placeholder device becomes active; when the
    /// active device disappears the lowest-indexed remaining one takes over,
    /// and its learning baseline (if any) is discarded.
    fn sync_devices(&mut self, devices: &InputDevices) {
        for (index, device) in devices.iter() {
            if device.is_placeholder() || self.known.contains(&index) {
                continue;
            }
            info!("input device connected: slot {index} ({})", device.id);
            self.known.push(index);
            self.known.sort_unstable();
            if self.active.is_none() {
                self.active = Some(index);
            }
        }

        let disconnected: Vec<usize> = self
            .known
            .iter()
            .copied()
            .filter(|&index| devices.get(index).is_none())
            .collect();
        for index in disconnected {
            info!("input device disconnected: slot {index}");
            self.known.retain(|&i| i != index);
            if let Some(learning) = &mut self.learning {
                learning.baselines.remove(&index);
            }
            if self.active == Some(index) {
                self.active = self.known.first().copied();
            }
        }
    }

    // -- Learning ------------------------------------------------------------

    fn learning_tick(&mut self, devices: &InputDevices, mappings: &mut MappingTable) {
        let Some(selection) = self.observe_learning(devices) else {
            return;
        };
        self.register_learned(selection.0, selection.1, selection.2, mappings);
    }

    /// Snapshot missing baselines or pick the first deviating channel.
    /// Returns `Some((device, kind, channel))` once a channel is selected.
    fn observe_learning(
        &mut self,
        devices: &InputDevices,
    ) -> Option<(usize, ChannelKind, usize)> {
        let learning = self.learning.as_mut()?;

        for (index, device) in devices.iter() {
            if device.is_placeholder() {
                continue;
            }

            let Some(baseline) = learning.baselines.get(&index) else {
                learning.baselines.insert(
                    index,
                    Baseline {
                        axes: device.axes.clone(),
                        buttons: device.buttons.clone(),
                    },
                );
                return None;
            };

            for (axis_index, (&value, &reference)) in
                device.axes.iter().zip(&baseline.axes).enumerate()
            {
                if (value - reference).abs() > LEARN_AXIS_THRESHOLD {
                    return Some((index, ChannelKind::Axis, axis_index));
                }
            }
            for (button_index, (&pressed, &reference)) in
                device.buttons.iter().zip(&baseline.buttons).enumerate()
            {
                if pressed && !reference {
                    return Some((index, ChannelKind::Button, button_index));
                }
            }
        }
        None
    }

    fn register_learned(
        &mut self,
        device_index: usize,
        kind: ChannelKind,
        channel_index: usize,
        mappings: &mut MappingTable,
    ) {
        let Some(learning) = self.learning.take() else {
            return;
        };
        if self.active != Some(device_index) {
            self.active = Some(device_index);
        }
        mappings.set(learning.target, ServoMapping::new(kind, channel_index));
        info!(
            "learning complete: servo {} mapped to {kind:?} {channel_index}",
            learning.target
        );
        self.pending.push(InputNotification::LearningCompleted {
            servo_id: learning.target,
            kind,
            index: channel_index,
        });
    }

    // -- Mapped control ------------------------------------------------------

    #[allow(clippy::float_cmp)] // exact compare mirrors the change-detection contract
    fn control_tick(
        &mut self,
        devices: &InputDevices,
        mappings: &MappingTable,
        arm: &mut ArmModel,
    ) {
        let Some(active) = self.active else {
            return;
        };
        let Some(device) = devices.get(active) else {
            return;
        };
        if device.is_placeholder() {
            return;
        }

        for (servo_id, mapping) in mappings.iter() {
            let Some(servo) = arm.servo(servo_id) else {
                continue;
            };
            let angle = servo.angle;
            let (min, max) = (servo.min, servo.max);
            let center = servo.center();

            // Out-of-range channel indices contribute zero input.
            let raw = match mapping.kind {
                ChannelKind::Axis => device
                    .axis(mapping.index)
                    .map_or(0.0, |v| if v.abs() < mapping.deadzone { 0.0 } else { v }),
                ChannelKind::Button => device
                    .button(mapping.index)
                    .map_or(0.0, |pressed| if pressed { 1.0 } else { -1.0 }),
            };
            let value = if mapping.invert { -raw } else { raw };

            let target = match (mapping.kind, mapping.control_mode) {
                (ChannelKind::Axis, ControlMode::Incremental) => {
                    if value == 0.0 {
                        continue;
                    }
                    let target = (angle + value * AXIS_STEP_DEG).clamp(min, max);
                    (target != angle).then_some(target)
                }
                (ChannelKind::Axis, ControlMode::Absolute) => {
                    let target = center + value * ((max - min) / 2.0);
                    ((target - angle).abs() > APPLY_HYSTERESIS_DEG).then_some(target)
                }
                (ChannelKind::Button, _) => {
                    let target = (angle + value * BUTTON_STEP_DEG).clamp(min, max);
                    (target != angle).then_some(target)
                }
            };

            if let Some(target) = target {
                arm.set_angle(servo_id, target);
            }
        }
    }

    // -- Notifications -------------------------------------------------------

    /// Drain queued notifications (called once per tick by the flush system).
    pub fn drain_notifications(&mut self) -> Vec<InputNotification> {
        std::mem::take(&mut self.pending)
    }

    /// Number of queued notifications.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
