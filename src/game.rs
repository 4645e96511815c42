//! The game state machine.
//!
//! [`Game`] owns every piece of mutable game state. Events are applied one at
//! a time through [`Game::handle`]; [`Game::service`] then runs the gravity
//! step if one was requested and hands out a [`Scene`] when something
//! visible changed. Nothing here blocks or allocates.

use crate::{
    active::ActivePiece,
    config::Config,
    entropy::{
        EntropySource,
        next_piece_kind,
    },
    input::{
        Button,
        ButtonSet,
        Event,
    },
    piece::{
        PieceKind,
        Rotation,
    },
    playfield::{
        Lock,
        Playfield,
    },
    scene::Scene,
    scheduler::{
        Scheduler,
        TickSource,
        TimerId,
        TimerMode,
    },
    scoring::Progress,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GameState {
    MainMenu,
    InGame,
    Paused,
    GameOver,
}

/// Main menu entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MenuItem {
    #[default]
    Start,
}

pub struct Game<T, E> {
    config: Config,
    state: GameState,
    menu: MenuItem,
    field: Playfield,
    piece: ActivePiece,
    progress: Progress,
    scheduler: Scheduler<T>,
    entropy: E,
    held: ButtonSet,
    indicator: bool,
    /// A gravity step is due.
    tick_requested: bool,
    /// Something visible changed since the last scene went out.
    dirty: bool,
}

impl<T: TickSource, E: EntropySource> Game<T, E> {
    pub fn new(config: Config, ticks: T, entropy: E) -> Self {
        Self {
            config,
            state: GameState::MainMenu,
            menu: MenuItem::Start,
            field: Playfield::new(),
            piece: ActivePiece::spawn(PieceKind::I),
            progress: Progress::default(),
            scheduler: Scheduler::new(ticks),
            entropy,
            held: ButtonSet::EMPTY,
            indicator: false,
            tick_requested: false,
            // the menu has to be drawn once
            dirty: true,
        }
    }

    pub const fn state(&self) -> GameState {
        self.state
    }

    pub const fn piece(&self) -> &ActivePiece {
        &self.piece
    }

    pub const fn field(&self) -> &Playfield {
        &self.field
    }

    pub const fn score(&self) -> u32 {
        self.progress.score
    }

    pub const fn level(&self) -> u8 {
        self.progress.level
    }

    /// Buttons currently down, as last reported by the button watcher.
    pub const fn held(&self) -> ButtonSet {
        self.held
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    pub const fn scheduler(&self) -> &Scheduler<T> {
        &self.scheduler
    }

    pub fn scene(&self) -> Scene {
        Scene {
            state: self.state,
            menu: self.menu,
            field: self.field,
            piece: self.piece,
            score: self.progress.score,
            level: self.progress.level,
            indicator: self.indicator,
        }
    }

    /// Apply one event. Events that mean nothing in the current state are
    /// dropped without effect.
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Pressed(button) => {
                self.held.insert(button);
                self.on_press(button);
            }
            Event::Released(button) => self.held.remove(button),
            Event::Tick { timer, epoch } => {
                if !self.scheduler.accept(timer, epoch) {
                    return;
                }
                match timer {
                    TimerId::Gravity => self.on_gravity_tick(),
                    TimerId::Repeat => self.on_repeat_tick(),
                }
            }
        }
    }

    /// Run a pending gravity step, then return a scene if the picture
    /// changed. Call once after each batch of [`handle`](Self::handle)s.
    pub fn service(&mut self) -> Option<Scene> {
        if self.tick_requested {
            self.tick_requested = false;
            if self.state == GameState::InGame {
                self.drop_step();
            }
            self.dirty = true;
        }
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.scene())
    }

    fn on_press(&mut self, button: Button) {
        match (self.state, button) {
            (GameState::MainMenu, Button::A) => match self.menu {
                MenuItem::Start => self.start_game(),
            },
            (GameState::InGame, Button::Down) => {
                self.tick_requested = true;
                self.arm_repeat();
            }
            (GameState::InGame, Button::Right) => {
                if self.shift(1) {
                    self.arm_repeat();
                }
            }
            (GameState::InGame, Button::Left) => {
                if self.shift(-1) {
                    self.arm_repeat();
                }
            }
            (GameState::InGame, Button::B) => self.rotate(self.piece.rotation.clockwise()),
            (GameState::InGame, Button::A) => {
                self.rotate(self.piece.rotation.counter_clockwise());
            }
            (GameState::InGame, Button::Up) => self.pause(),
            (GameState::Paused, Button::Up) => self.resume(),
            (GameState::GameOver, Button::A | Button::B) => self.return_to_menu(),
            (state, button) => trace!("{} ignored in {}", button, state),
        }
    }

    fn on_gravity_tick(&mut self) {
        self.indicator = !self.indicator;
        self.dirty = true;
        if self.state == GameState::InGame {
            self.tick_requested = true;
        }
    }

    /// Auto-repeat: Down on every firing, Left/Right on every
    /// `repeat_divider`-th, and stop once none of them is held.
    fn on_repeat_tick(&mut self) {
        if !self.held.intersects(ButtonSet::REPEATING) {
            self.scheduler.stop(TimerId::Repeat);
            return;
        }
        if self.state != GameState::InGame {
            return;
        }
        if self.scheduler.repeat_step(self.config.repeat_divider) {
            if self.held.contains(Button::Right) {
                self.shift(1);
            }
            if self.held.contains(Button::Left) {
                self.shift(-1);
            }
        }
        if self.held.contains(Button::Down) {
            self.tick_requested = true;
        }
    }

    fn arm_repeat(&mut self) {
        if !self.scheduler.is_running(TimerId::Repeat) {
            let period = self.config.repeat_period();
            self.scheduler
                .start(TimerId::Repeat, period, TimerMode::Periodic);
        }
    }

    fn restart_gravity(&mut self) {
        let period = self.config.gravity_period(self.progress.level);
        self.scheduler
            .start(TimerId::Gravity, period, TimerMode::Periodic);
    }

    fn shift(&mut self, dx: i8) -> bool {
        let moved = self.piece.try_shift(&self.field, dx);
        if moved {
            self.dirty = true;
        }
        moved
    }

    fn rotate(&mut self, rotation: Rotation) {
        if self.piece.try_rotate(&self.field, rotation) {
            self.dirty = true;
        }
    }

    fn spawn(&mut self) {
        self.piece = ActivePiece::spawn(next_piece_kind(&mut self.entropy));
    }

    /// Back to an empty field with nothing scored and the piece at its
    /// spawn spot.
    fn reset_round(&mut self) {
        self.progress.reset();
        self.field.reset();
        self.piece = ActivePiece::spawn(self.piece.kind);
        self.tick_requested = false;
    }

    fn start_game(&mut self) {
        self.reset_round();
        self.state = GameState::InGame;
        self.indicator = false;
        self.spawn();
        self.restart_gravity();
        self.dirty = true;
        info!("new game, first piece {}", self.piece.kind);
    }

    fn pause(&mut self) {
        self.state = GameState::Paused;
        self.scheduler.stop(TimerId::Gravity);
        self.dirty = true;
        info!("paused");
    }

    fn resume(&mut self) {
        self.state = GameState::InGame;
        self.restart_gravity();
        self.dirty = true;
        info!("resumed");
    }

    fn return_to_menu(&mut self) {
        self.state = GameState::MainMenu;
        self.menu = MenuItem::Start;
        self.indicator = false;
        self.scheduler.stop(TimerId::Gravity);
        self.scheduler.stop(TimerId::Repeat);
        self.reset_round();
        self.dirty = true;
        info!("back to main menu");
    }

    /// One gravity step: fall a row, or lock, clear rows and spawn the next
    /// piece.
    fn drop_step(&mut self) {
        if self.piece.try_fall(&self.field) {
            self.dirty = true;
            return;
        }

        if self.field.lock(&self.piece) == Lock::ToppedOut {
            self.state = GameState::GameOver;
            self.indicator = false;
            self.scheduler.stop(TimerId::Gravity);
            info!("topped out, final score {}", self.progress.score);
        }

        self.clear_rows();
        // no collision check here: a spawn into occupied cells only shows
        // up when that piece locks
        self.spawn();
        self.dirty = true;
    }

    fn clear_rows(&mut self) {
        let cleared = self.field.sweep();
        if cleared == 0 {
            return;
        }
        debug!("cleared {} rows", cleared);
        for _ in 0..cleared {
            let leveled = self
                .progress
                .award_row(self.config.rows_per_level, self.config.max_level);
            if leveled {
                info!(
                    "level {}, gravity {} us",
                    self.progress.level,
                    self.config.gravity_period(self.progress.level).as_micros()
                );
                // also after a top-out: the heartbeat keeps the new pace
                self.restart_gravity();
            }
        }
    }
}
