//! Input device snapshots.
//!
//! [`InputDevices`] is a slot-indexed buffer written by whatever backend
//! samples the physical hardware (or by tests). The engine only ever reads
//! the latest snapshot per slot, so any input source can drive it.

use bevy::prelude::*;

/// Identity substrings of virtual/placeholder devices that must never be
/// polled, learned from, or promoted to active.
const PLACEHOLDER_SIGNATURES: &[&str] = &["unknown gamepad"];

// ---------------------------------------------------------------------------
// DeviceSnapshot
// ---------------------------------------------------------------------------

/// Latest sampled state of one input device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    /// Device identity string as reported by the backend.
    pub id: String,
    /// Continuous axis values in `[-1, 1]`.
    pub axes: Vec<f32>,
    /// Digital button pressed-states.
    pub buttons: Vec<bool>,
}

impl DeviceSnapshot {
    /// Create a snapshot with the given identity and no channels.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            axes: Vec::new(),
            buttons: Vec::new(),
        }
    }

    /// Builder: allocate `n` centered axes.
    #[must_use]
    pub fn with_axes(mut self, n: usize) -> Self {
        self.axes = vec![0.0; n];
        self
    }

    /// Builder: allocate `n` released buttons.
    #[must_use]
    pub fn with_buttons(mut self, n: usize) -> Self {
        self.buttons = vec![false; n];
        self
    }

    /// Axis value, or `None` when the index exceeds the channel count.
    #[must_use]
    pub fn axis(&self, index: usize) -> Option<f32> {
        self.axes.get(index).copied()
    }

    /// Button state, or `None` when the index exceeds the channel count.
    #[must_use]
    pub fn button(&self, index: usize) -> Option<bool> {
        self.buttons.get(index).copied()
    }

    /// Whether this device matches a known placeholder signature.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        let id = self.id.to_lowercase();
        PLACEHOLDER_SIGNATURES.iter().any(|sig| id.contains(sig))
    }
}

// ---------------------------------------------------------------------------
// InputDevices
// ---------------------------------------------------------------------------

/// Slot-indexed device buffer resource.
///
/// Slots mirror the backend's device indices; a disconnected slot is `None`.
#[derive(Resource, Debug, Clone, Default)]
pub struct InputDevices {
    slots: Vec<Option<DeviceSnapshot>>,
}

impl InputDevices {
    /// Create an empty device buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a device in a slot (growing the slot list as needed).
    pub fn connect(&mut self, index: usize, snapshot: DeviceSnapshot) {
        if index >= self.slots.len() {
            self.slots.resize(index + 1, None);
        }
        self.slots[index] = Some(snapshot);
    }

    /// Clear a slot.
    pub fn disconnect(&mut self, index: usize) {
        if let Some(slot) = self.slots.get_mut(index) {
            *slot = None;
        }
    }

    /// Snapshot in a slot, if connected.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&DeviceSnapshot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Mutable snapshot in a slot, if connected.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut DeviceSnapshot> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Overwrite one axis of a connected device.
    pub fn set_axis(&mut self, index: usize, axis: usize, value: f32) {
        if let Some(dev) = self.get_mut(index) {
            if let Some(slot) = dev.axes.get_mut(axis) {
                *slot = value;
            }
        }
    }

    /// Overwrite one button of a connected device.
    pub fn set_button(&mut self, index: usize, button: usize, pressed: bool) {
        if let Some(dev) = self.get_mut(index) {
            if let Some(slot) = dev.buttons.get_mut(button) {
                *slot = pressed;
            }
        }
    }

    /// Connected slot indices in ascending order.
    pub fn connected(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| i))
    }

    /// Connected snapshots with their slot indices, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &DeviceSnapshot)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|d| (i, d)))
    }

    /// Number of slots (connected or not).
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connect_grows_slots() {
        let mut devices = InputDevices::new();
        devices.connect(2, DeviceSnapshot::new("pad"));
        assert_eq!(devices.slot_count(), 3);
        assert!(devices.get(0).is_none());
        assert!(devices.get(2).is_some());
    }

    #[test]
    fn disconnect_clears_slot() {
        let mut devices = InputDevices::new();
        devices.connect(0, DeviceSnapshot::new("pad"));
        devices.disconnect(0);
        assert!(devices.get(0).is_none());
        assert_eq!(devices.slot_count(), 1);
    }

    #[test]
    fn disconnect_unknown_slot_is_noop() {
        let mut devices = InputDevices::new();
        devices.disconnect(5);
        assert_eq!(devices.slot_count(), 0);
    }

    #[test]
    fn set_axis_and_button() {
        let mut devices = InputDevices::new();
        devices.connect(0, DeviceSnapshot::new("pad").with_axes(4).with_buttons(2));
        devices.set_axis(0, 2, 0.7);
        devices.set_button(0, 1, true);

        let dev = devices.get(0).unwrap();
        assert!((dev.axis(2).unwrap() - 0.7).abs() < f32::EPSILON);
        assert_eq!(dev.button(1), Some(true));
    }

    #[test]
    fn out_of_range_channel_is_none() {
        let dev = DeviceSnapshot::new("pad").with_axes(2);
        assert_eq!(dev.axis(5), None);
        assert_eq!(dev.button(0), None);
    }

    #[test]
    fn connected_indices_ascending() {
        let mut devices = InputDevices::new();
        devices.connect(3, DeviceSnapshot::new("b"));
        devices.connect(1, DeviceSnapshot::new("a"));
        let indices: Vec<usize> = devices.connected().collect();
        assert_eq!(indices, vec![1, 3]);
    }

    #[test]
    fn placeholder_signature_is_case_insensitive() {
        assert!(DeviceSnapshot::new("Unknown Gamepad (Vendor: beef Product: 046d)").is_placeholder());
        assert!(DeviceSnapshot::new("UNKNOWN GAMEPAD").is_placeholder());
        assert!(!DeviceSnapshot::new("Logitech F310").is_placeholder());
    }
}
