//! The falling piece. Every mutation goes through [`collides`] first.

use crate::{
    collision::collides,
    piece::{
        PieceKind,
        Rotation,
        mask_cells,
    },
    playfield::Playfield,
};

/// Spawn column of the 4×4 window's left edge.
pub const SPAWN_X: i8 = 4;
/// Spawn row of the window's top edge, one row above the field.
pub const SPAWN_Y: i8 = -1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActivePiece {
    pub kind: PieceKind,
    /// Grid column of the window's left edge.
    pub x: i8,
    /// Grid row of the window's top edge; negative while above the field.
    pub y: i8,
    pub rotation: Rotation,
}

impl ActivePiece {
    pub const fn spawn(kind: PieceKind) -> Self {
        Self {
            kind,
            x: SPAWN_X,
            y: SPAWN_Y,
            rotation: Rotation::SPAWN,
        }
    }

    /// Absolute grid coordinates of the occupied cells.
    pub fn cells(&self) -> impl Iterator<Item = (i16, i16)> {
        let (x, y) = (i16::from(self.x), i16::from(self.y));
        mask_cells(self.kind.mask(self.rotation))
            .map(move |(dx, dy)| (x + i16::from(dx), y + i16::from(dy)))
    }

    /// Whether the current placement overlaps anything.
    pub fn collides(&self, field: &Playfield) -> bool {
        collides(field, self.kind, self.rotation, self.x, self.y)
    }

    /// Move one column left (`-1`) or right (`+1`) if the target is free.
    pub fn try_shift(&mut self, field: &Playfield, dx: i8) -> bool {
        let x = self.x + dx;
        if collides(field, self.kind, self.rotation, x, self.y) {
            return false;
        }
        self.x = x;
        true
    }

    /// Switch to `rotation` in place if the target is free. No kicks.
    pub fn try_rotate(&mut self, field: &Playfield, rotation: Rotation) -> bool {
        if collides(field, self.kind, rotation, self.x, self.y) {
            return false;
        }
        self.rotation = rotation;
        true
    }

    /// Drop one row if the target is free.
    pub fn try_fall(&mut self, field: &Playfield) -> bool {
        let y = self.y + 1;
        if collides(field, self.kind, self.rotation, self.x, y) {
            return false;
        }
        self.y = y;
        true
    }
}
