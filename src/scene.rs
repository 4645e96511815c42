//! Read-only snapshot handed to whatever draws the game.

use crate::{
    active::ActivePiece,
    game::{
        GameState,
        MenuItem,
    },
    playfield::Playfield,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Scene {
    pub state: GameState,
    pub menu: MenuItem,
    pub field: Playfield,
    pub piece: ActivePiece,
    pub score: u32,
    pub level: u8,
    /// Heartbeat that flips on every gravity firing.
    pub indicator: bool,
}

impl Scene {
    /// Whether the active piece is part of the picture.
    pub const fn shows_piece(&self) -> bool {
        matches!(self.state, GameState::InGame | GameState::Paused)
    }
}

/// Destination for scenes: draws them and pushes them to the hardware.
///
/// Called at most once per batch of handled events, and only when something
/// visible changed.
#[allow(async_fn_in_trait)]
pub trait SceneSink {
    async fn present(&mut self, scene: &Scene);
}

impl<S: SceneSink + ?Sized> SceneSink for &mut S {
    async fn present(&mut self, scene: &Scene) {
        (**self).present(scene).await;
    }
}
