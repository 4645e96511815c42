//! Task plumbing around [`Game`]: the event queue, timer tasks and the
//! arbiter that owns the game.
//!
//! Every producer (button watcher, timer tasks) posts [`Event`]s into one
//! bounded channel. The [`Arbiter`] is its only consumer; it applies events
//! one at a time, so game state is never touched from two places at once.

use embassy_futures::select::{
    Either,
    select,
};
use embassy_sync::{
    blocking_mutex::raw::CriticalSectionRawMutex,
    channel::{
        Channel,
        Receiver,
        Sender,
        TrySendError,
    },
    signal::Signal,
};
use embassy_time::{
    Duration,
    Instant,
    Timer,
};

use crate::{
    entropy::EntropySource,
    game::Game,
    input::Event,
    scene::SceneSink,
    scheduler::{
        Epoch,
        TickSource,
        TimerId,
        TimerMode,
    },
};

pub const EVENT_QUEUE_DEPTH: usize = 16;

pub type EventChannel = Channel<CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>;
pub type EventReceiver<'ch> = Receiver<'ch, CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>;

/// Producer handle for the event queue.
#[derive(Clone, Copy)]
pub struct EventSender<'ch>(Sender<'ch, CriticalSectionRawMutex, Event, EVENT_QUEUE_DEPTH>);

impl<'ch> EventSender<'ch> {
    pub fn new(channel: &'ch EventChannel) -> Self {
        Self(channel.sender())
    }

    /// Queue `event` without waiting. A full queue drops it.
    pub fn post(&self, event: Event) -> bool {
        match self.0.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!("event queue full, dropping {}", event);
                false
            }
        }
    }

    /// Queue `event`, waiting for room if the queue is full.
    ///
    /// Releases go through here: the game learns which buttons are held
    /// only from press and release events, and a lost release would keep
    /// auto-repeat running.
    pub async fn send(&self, event: Event) {
        self.0.send(event).await;
    }
}

// ── Timers ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerCommand {
    Arm {
        period: Duration,
        mode: TimerMode,
        epoch: Epoch,
    },
    Disarm,
}

/// Command mailboxes for the two timer tasks.
///
/// Only the latest command matters, so each timer gets a [`Signal`]: a new
/// arm or disarm overwrites one the task has not picked up yet.
pub struct TimerControl {
    gravity: Signal<CriticalSectionRawMutex, TimerCommand>,
    repeat: Signal<CriticalSectionRawMutex, TimerCommand>,
}

impl Default for TimerControl {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerControl {
    pub const fn new() -> Self {
        Self {
            gravity: Signal::new(),
            repeat: Signal::new(),
        }
    }

    pub fn signal(&self, timer: TimerId) -> &Signal<CriticalSectionRawMutex, TimerCommand> {
        match timer {
            TimerId::Gravity => &self.gravity,
            TimerId::Repeat => &self.repeat,
        }
    }
}

impl TickSource for &TimerControl {
    fn arm(&mut self, timer: TimerId, period: Duration, mode: TimerMode, epoch: Epoch) {
        self.signal(timer)
            .signal(TimerCommand::Arm { period, mode, epoch });
    }

    fn disarm(&mut self, timer: TimerId) {
        self.signal(timer).signal(TimerCommand::Disarm);
    }
}

#[derive(Clone, Copy)]
struct Armed {
    deadline: Instant,
    period: Duration,
    mode: TimerMode,
    epoch: Epoch,
}

impl Armed {
    fn from_command(command: TimerCommand) -> Option<Self> {
        match command {
            TimerCommand::Arm { period, mode, epoch } => {
                let period = period.max(Duration::from_ticks(1));
                Some(Self {
                    deadline: Instant::now() + period,
                    period,
                    mode,
                    epoch,
                })
            }
            TimerCommand::Disarm => None,
        }
    }
}

/// Drive one timer: wait for commands from [`TimerControl`] and post a
/// [`Event::Tick`] on every expiry.
///
/// Periodic deadlines advance by whole periods from the arming instant, so
/// the period does not drift with event-loop latency. After a long stall the
/// missed firings are skipped rather than posted in a burst.
pub async fn timer_task(control: &TimerControl, timer: TimerId, events: EventSender<'_>) -> ! {
    let signal = control.signal(timer);
    let mut armed: Option<Armed> = None;
    loop {
        let Some(current) = armed else {
            armed = Armed::from_command(signal.wait().await);
            continue;
        };

        match select(signal.wait(), Timer::at(current.deadline)).await {
            Either::First(command) => armed = Armed::from_command(command),
            Either::Second(()) => {
                events.post(Event::Tick {
                    timer,
                    epoch: current.epoch,
                });
                armed = match current.mode {
                    TimerMode::OneShot => None,
                    TimerMode::Periodic => {
                        let mut deadline = current.deadline + current.period;
                        let now = Instant::now();
                        if deadline <= now {
                            deadline = now + current.period;
                        }
                        Some(Armed { deadline, ..current })
                    }
                };
            }
        }
    }
}

// ── Arbiter ─────────────────────────────────────────────────────────────────

/// Sole owner of the game state and the scene sink.
pub struct Arbiter<'ch, T, E, S> {
    game: Game<T, E>,
    events: EventReceiver<'ch>,
    sink: S,
}

impl<'ch, T, E, S> Arbiter<'ch, T, E, S>
where
    T: TickSource,
    E: EntropySource,
    S: SceneSink,
{
    pub fn new(game: Game<T, E>, events: EventReceiver<'ch>, sink: S) -> Self {
        Self { game, events, sink }
    }

    pub fn game(&self) -> &Game<T, E> {
        &self.game
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Wait for one event, apply it together with everything else already
    /// queued, then present the result.
    pub async fn pump(&mut self) {
        let first = self.events.receive().await;
        self.game.handle(first);
        while let Ok(event) = self.events.try_receive() {
            self.game.handle(event);
        }
        self.present().await;
    }

    /// Run a pending gravity step and hand the scene to the sink if it
    /// changed.
    pub async fn present(&mut self) {
        if let Some(scene) = self.game.service() {
            self.sink.present(&scene).await;
        }
    }

    pub async fn run(mut self) -> ! {
        self.present().await;
        loop {
            self.pump().await;
        }
    }
}
