//! Injectable millisecond tick clock.
//!
//! [`TickClock`] is the single time source for recording, playback, and
//! input polling. In a normal run it is advanced from [`bevy_time::Time`]
//! once per frame; tests switch it to manual mode and advance it explicitly,
//! so every time-dependent behavior is deterministic.

use std::fmt;
use std::time::Duration;

use bevy::prelude::*;

// ---------------------------------------------------------------------------
// TickClock
// ---------------------------------------------------------------------------

/// Integer-millisecond monotonic clock.
///
/// Tracks elapsed time as a `u64` millisecond count to avoid floating-point
/// accumulation errors across long sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource)]
pub struct TickClock {
    now_ms: u64,
    auto: bool,
}

impl Default for TickClock {
    fn default() -> Self {
        Self {
            now_ms: 0,
            auto: true,
        }
    }
}

impl TickClock {
    /// Create an auto-advancing clock at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now_ms: 0,
            auto: true,
        }
    }

    /// Create a manually-advanced clock at zero.
    ///
    /// [`advance_tick_clock`] leaves manual clocks untouched; tests call
    /// [`advance`](Self::advance) themselves.
    #[must_use]
    pub const fn manual() -> Self {
        Self {
            now_ms: 0,
            auto: false,
        }
    }

    /// Current time in milliseconds since clock start.
    #[must_use]
    pub const fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Current time as a [`Duration`].
    #[must_use]
    pub const fn to_duration(&self) -> Duration {
        Duration::from_millis(self.now_ms)
    }

    /// Whether the clock is advanced from frame time.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        self.auto
    }

    /// Advance the clock by `delta_ms` milliseconds.
    pub const fn advance(&mut self, delta_ms: u64) {
        self.now_ms = self.now_ms.saturating_add(delta_ms);
    }
}

impl fmt::Display for TickClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.now_ms)
    }
}

// ---------------------------------------------------------------------------
// advance_tick_clock
// ---------------------------------------------------------------------------

/// `First` system: advance an auto clock from frame time.
///
/// `Time` is optional so apps without `TimePlugin` (and tests driving a
/// manual clock) still build.
#[allow(clippy::needless_pass_by_value)] // Bevy system parameters are extracted by value
pub fn advance_tick_clock(time: Option<Res<Time>>, mut clock: ResMut<TickClock>) {
    if !clock.auto {
        return;
    }
    let Some(time) = time else {
        return;
    };
    #[allow(clippy::cast_possible_truncation)]
    clock.advance(time.delta().as_millis() as u64);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let clock = TickClock::new();
        assert_eq!(clock.now_ms(), 0);
        assert!(clock.is_auto());
    }

    #[test]
    fn manual_starts_at_zero_not_auto() {
        let clock = TickClock::manual();
        assert_eq!(clock.now_ms(), 0);
        assert!(!clock.is_auto());
    }

    #[test]
    fn advance_accumulates() {
        let mut clock = TickClock::manual();
        clock.advance(16);
        clock.advance(16);
        assert_eq!(clock.now_ms(), 32);
    }

    #[test]
    fn advance_saturates() {
        let mut clock = TickClock::manual();
        clock.advance(u64::MAX);
        clock.advance(100);
        assert_eq!(clock.now_ms(), u64::MAX);
    }

    #[test]
    fn duration_conversion() {
        let mut clock = TickClock::manual();
        clock.advance(1500);
        assert_eq!(clock.to_duration(), Duration::from_millis(1500));
    }

    #[test]
    fn display_format() {
        let mut clock = TickClock::manual();
        clock.advance(42);
        assert_eq!(clock.to_string(), "42ms");
    }

    #[test]
    fn system_skips_manual_clock() {
        let mut world = World::new();
        world.insert_resource(TickClock::manual());

        let mut schedule = Schedule::default();
        schedule.add_systems(advance_tick_clock);
        schedule.run(&mut world);

        assert_eq!(world.resource::<TickClock>().now_ms(), 0);
    }
}
