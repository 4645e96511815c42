//! Timing and progression settings.
//!
//! Periods are given as prescaler/reload pairs for a timer fed from
//! [`Config::timer_clock`], the way the game was first tuned.

use embassy_time::Duration;
use fugit::{
    HertzU32,
    MicrosDurationU64,
};

/// One timer setting: the timer counts `prescaler + 1` input clocks per tick
/// and fires every `reload + 1` ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimerConfig {
    pub prescaler: u16,
    pub reload: u16,
}

impl TimerConfig {
    pub const fn new(prescaler: u16, reload: u16) -> Self {
        Self { prescaler, reload }
    }

    /// Time between firings for a timer clocked at `clock`.
    pub fn period(self, clock: HertzU32) -> MicrosDurationU64 {
        let counts = (u64::from(self.prescaler) + 1) * (u64::from(self.reload) + 1);
        let hz = u64::from(clock.to_Hz()).max(1);
        MicrosDurationU64::from_ticks(counts * 1_000_000 / hz)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    pub timer_clock: HertzU32,
    /// Gravity at level 0.
    pub gravity: TimerConfig,
    /// Reload counts taken off the gravity period per level.
    pub gravity_step: u16,
    /// Auto-repeat timer while Down/Left/Right is held.
    pub repeat: TimerConfig,
    /// Auto-repeat firings per horizontal move.
    pub repeat_divider: u8,
    pub rows_per_level: u32,
    pub max_level: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timer_clock: HertzU32::MHz(48),
            gravity: TimerConfig::new(1024, 46785),
            gravity_step: 3072,
            repeat: TimerConfig::new(2048, 3584),
            repeat_divider: 3,
            rows_per_level: 5,
            max_level: 10,
        }
    }
}

impl Config {
    #[must_use]
    pub const fn with_timer_clock(mut self, clock: HertzU32) -> Self {
        self.timer_clock = clock;
        self
    }

    #[must_use]
    pub const fn with_gravity(mut self, gravity: TimerConfig, step: u16) -> Self {
        self.gravity = gravity;
        self.gravity_step = step;
        self
    }

    #[must_use]
    pub const fn with_repeat(mut self, repeat: TimerConfig, divider: u8) -> Self {
        self.repeat = repeat;
        self.repeat_divider = divider;
        self
    }

    #[must_use]
    pub const fn with_levels(mut self, rows_per_level: u32, max_level: u8) -> Self {
        self.rows_per_level = rows_per_level;
        self.max_level = max_level;
        self
    }

    /// Gravity timer setting for `level`: the base reload shortened by
    /// `gravity_step` per level.
    pub fn gravity_at(&self, level: u8) -> TimerConfig {
        let cut = u32::from(self.gravity_step) * u32::from(level);
        let reload = u32::from(self.gravity.reload).saturating_sub(cut);
        TimerConfig::new(self.gravity.prescaler, reload as u16)
    }

    pub fn gravity_period(&self, level: u8) -> Duration {
        to_duration(self.gravity_at(level).period(self.timer_clock))
    }

    pub fn repeat_period(&self) -> Duration {
        to_duration(self.repeat.period(self.timer_clock))
    }
}

fn to_duration(d: MicrosDurationU64) -> Duration {
    Duration::from_micros(d.ticks())
}
