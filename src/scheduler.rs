//! The two game timers: gravity and button auto-repeat.
//!
//! The scheduler is the only thing that arms or stops them. Every change of
//! a timer's state bumps its epoch, and a firing is only honoured when it
//! carries the current epoch, so a tick that was already queued when its
//! timer got stopped or re-armed is dropped instead of acted on.

use embassy_time::Duration;

/// Generation counter of one timer's arming.
pub type Epoch = u16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerId {
    /// Drops the active piece one row per firing.
    Gravity,
    /// Auto-repeat while Down, Left or Right is held.
    Repeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerMode {
    Periodic,
    OneShot,
}

/// Period and running state of a timer, always replaced as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerState {
    Stopped,
    Running { period: Duration, mode: TimerMode },
}

/// Hardware (or task) side of a timer.
///
/// After `arm`, the source reports each expiry as
/// [`Event::Tick`](crate::Event::Tick) tagged with the given epoch, until the
/// next `arm` or `disarm` for the same timer. Re-arming restarts the period
/// from zero.
pub trait TickSource {
    fn arm(&mut self, timer: TimerId, period: Duration, mode: TimerMode, epoch: Epoch);
    fn disarm(&mut self, timer: TimerId);
}

impl<T: TickSource + ?Sized> TickSource for &mut T {
    fn arm(&mut self, timer: TimerId, period: Duration, mode: TimerMode, epoch: Epoch) {
        (**self).arm(timer, period, mode, epoch);
    }

    fn disarm(&mut self, timer: TimerId) {
        (**self).disarm(timer);
    }
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    epoch: Epoch,
    state: TimerState,
}

impl Slot {
    const IDLE: Self = Self {
        epoch: 0,
        state: TimerState::Stopped,
    };
}

pub struct Scheduler<T> {
    source: T,
    gravity: Slot,
    repeat: Slot,
    /// Auto-repeat firings since the last horizontal move.
    repeat_count: u8,
}

impl<T: TickSource> Scheduler<T> {
    pub const fn new(source: T) -> Self {
        Self {
            source,
            gravity: Slot::IDLE,
            repeat: Slot::IDLE,
            repeat_count: 0,
        }
    }

    const fn slot(&self, timer: TimerId) -> &Slot {
        match timer {
            TimerId::Gravity => &self.gravity,
            TimerId::Repeat => &self.repeat,
        }
    }

    const fn slot_mut(&mut self, timer: TimerId) -> &mut Slot {
        match timer {
            TimerId::Gravity => &mut self.gravity,
            TimerId::Repeat => &mut self.repeat,
        }
    }

    pub fn state(&self, timer: TimerId) -> TimerState {
        self.slot(timer).state
    }

    pub fn epoch(&self, timer: TimerId) -> Epoch {
        self.slot(timer).epoch
    }

    pub fn is_running(&self, timer: TimerId) -> bool {
        matches!(self.state(timer), TimerState::Running { .. })
    }

    /// (Re)start `timer` from a full period, discarding whatever it was doing.
    pub fn start(&mut self, timer: TimerId, period: Duration, mode: TimerMode) {
        let slot = self.slot_mut(timer);
        slot.epoch = slot.epoch.wrapping_add(1);
        slot.state = TimerState::Running { period, mode };
        let epoch = slot.epoch;
        trace!("timer {} armed, {} us, epoch {}", timer, period.as_micros(), epoch);
        self.source.arm(timer, period, mode, epoch);
    }

    /// Stop `timer`; ticks already in flight become stale.
    pub fn stop(&mut self, timer: TimerId) {
        let slot = self.slot_mut(timer);
        slot.epoch = slot.epoch.wrapping_add(1);
        slot.state = TimerState::Stopped;
        if timer == TimerId::Repeat {
            self.repeat_count = 0;
        }
        trace!("timer {} stopped", timer);
        self.source.disarm(timer);
    }

    /// Decide whether a firing belongs to the current arming of `timer`.
    /// A one-shot timer counts as stopped once its firing is accepted.
    pub fn accept(&mut self, timer: TimerId, epoch: Epoch) -> bool {
        let slot = self.slot_mut(timer);
        let TimerState::Running { mode, .. } = slot.state else {
            debug!("dropping tick from stopped timer {}", timer);
            return false;
        };
        if slot.epoch != epoch {
            debug!("dropping stale {} tick, epoch {} != {}", timer, epoch, slot.epoch);
            return false;
        }
        if mode == TimerMode::OneShot {
            slot.state = TimerState::Stopped;
        }
        true
    }

    /// Count one auto-repeat firing; `true` on every `divider`-th call.
    pub fn repeat_step(&mut self, divider: u8) -> bool {
        self.repeat_count += 1;
        if self.repeat_count >= divider {
            self.repeat_count = 0;
            return true;
        }
        false
    }

    pub const fn repeat_count(&self) -> u8 {
        self.repeat_count
    }

    pub const fn source(&self) -> &T {
        &self.source
    }
}
