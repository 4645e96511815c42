//! # badgetris
//!
//! Falling-block puzzle game for the Disobey 2026 badge.
//!
//! The game core is hardware independent and runs on the host:
//! - **Rules**: 10×20 playfield, seven pieces on a 4×4 rotation table,
//!   gravity, line clears, score and level
//! - **Input**: six button lines delivered as press/release [`Event`]s
//! - **Timers**: gravity and auto-repeat, armed through a [`TickSource`]
//! - **Output**: a [`Scene`] snapshot handed to a [`SceneSink`] whenever the
//!   picture changes, plus an embedded-graphics [`Renderer`] for it
//!
//! With the `badge` feature the [`board`] module wires all of it to the
//! ESP32-S3 badge: ST7789 display, buttons and the WS2812 LED strip.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! static EVENTS: EventChannel = EventChannel::new();
//! static TIMERS: TimerControl = TimerControl::new();
//!
//! let game = Game::new(Config::default(), &TIMERS, UptimeCounter);
//! let arbiter = Arbiter::new(game, EVENTS.receiver(), sink);
//! // spawn timer_task(&TIMERS, TimerId::Gravity, ..) and friends, then:
//! arbiter.run().await
//! ```

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod active;
pub mod collision;
pub mod config;
pub mod entropy;
pub mod game;
pub mod input;
pub mod piece;
pub mod playfield;
pub mod render;
pub mod runtime;
pub mod scene;
pub mod scheduler;
pub mod scoring;

#[cfg(feature = "badge")]
pub mod board;

pub use active::ActivePiece;
pub use config::{
    Config,
    TimerConfig,
};
pub use entropy::{
    EntropySource,
    UptimeCounter,
};
pub use game::{
    Game,
    GameState,
    MenuItem,
};
pub use input::{
    Button,
    ButtonSet,
    Event,
};
pub use piece::{
    PieceKind,
    Rotation,
};
pub use playfield::{
    Cell,
    Playfield,
};
pub use render::Renderer;
pub use runtime::{
    Arbiter,
    EventChannel,
    EventSender,
    TimerControl,
    timer_task,
};
pub use scene::{
    Scene,
    SceneSink,
};
pub use scheduler::{
    Scheduler,
    TickSource,
    TimerId,
    TimerMode,
};

/// Move a value into a `static` `StaticCell` and return the `&'static mut`.
#[cfg(feature = "badge")]
#[macro_export]
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        #[deny(unused_attributes)]
        let x = STATIC_CELL.uninit().write($val);
        x
    }};
}
