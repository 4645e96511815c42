//! The 10×20 grid of locked cells.

use crate::{
    active::ActivePiece,
    piece::PieceKind,
};

pub const WIDTH: usize = 10;
pub const HEIGHT: usize = 20;

/// One playfield cell: empty, or the kind of the brick locked there.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceKind),
}

impl Cell {
    pub const fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }
}

type Row = [Cell; WIDTH];

const EMPTY_ROW: Row = [Cell::Empty; WIDTH];

/// Outcome of writing a piece into the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lock {
    /// Every occupied cell landed inside the visible field.
    Placed,
    /// At least one occupied cell was above row 0 and was not written.
    ToppedOut,
}

/// Row-major grid, row 0 at the top.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Playfield {
    rows: [Row; HEIGHT],
}

impl Default for Playfield {
    fn default() -> Self {
        Self::new()
    }
}

impl Playfield {
    pub const fn new() -> Self {
        Self {
            rows: [EMPTY_ROW; HEIGHT],
        }
    }

    pub fn reset(&mut self) {
        self.rows = [EMPTY_ROW; HEIGHT];
    }

    /// Cell at column `x`, row `y`.
    ///
    /// # Panics
    /// If the coordinates are outside the grid.
    pub fn cell(&self, x: usize, y: usize) -> Cell {
        self.rows[y][x]
    }

    /// Cell at signed grid coordinates, `None` when out of bounds.
    pub fn get(&self, x: i16, y: i16) -> Option<Cell> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        self.rows.get(y)?.get(x).copied()
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        self.rows[y][x] = cell;
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell; WIDTH]> {
        self.rows.iter()
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows[y].iter().all(|c| !c.is_empty())
    }

    /// Remove row `y`, shifting every row above it down by one and leaving an
    /// empty row 0.
    pub fn clear_row(&mut self, y: usize) {
        for r in (1..=y).rev() {
            self.rows[r] = self.rows[r - 1];
        }
        self.rows[0] = EMPTY_ROW;
    }

    /// Bottom-up sweep clearing every full row; returns how many went.
    ///
    /// A cleared index is examined again, since the row above has just moved
    /// into it, so stacked full rows all go in one sweep.
    pub fn sweep(&mut self) -> u8 {
        let mut cleared = 0;
        let mut y = HEIGHT;
        while y > 0 {
            if self.is_row_full(y - 1) {
                self.clear_row(y - 1);
                cleared += 1;
            } else {
                y -= 1;
            }
        }
        cleared
    }

    /// Write `piece`'s kind into every occupied cell at its current position.
    ///
    /// Cells above the field are skipped and reported as a top-out; the
    /// cells that are inside are still written.
    pub fn lock(&mut self, piece: &ActivePiece) -> Lock {
        let mut lock = Lock::Placed;
        for (x, y) in piece.cells() {
            let Ok(y) = usize::try_from(y) else {
                lock = Lock::ToppedOut;
                continue;
            };
            // the piece only ever rests on collision-free positions
            let slot = usize::try_from(x)
                .ok()
                .and_then(|x| self.rows.get_mut(y)?.get_mut(x));
            if let Some(cell) = slot {
                *cell = Cell::Filled(piece.kind);
            }
        }
        lock
    }

    pub fn filled_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::Rotation;

    fn fill_row(field: &mut Playfield, y: usize, kind: PieceKind) {
        for x in 0..WIDTH {
            field.set(x, y, Cell::Filled(kind));
        }
    }

    #[test]
    fn sweep_is_a_no_op_without_full_rows() {
        let mut field = Playfield::new();
        for x in 0..WIDTH - 1 {
            field.set(x, 19, Cell::Filled(PieceKind::T));
        }
        field.set(3, 12, Cell::Filled(PieceKind::I));
        let before = field;

        assert_eq!(field.sweep(), 0);
        assert_eq!(field, before);
    }

    #[test]
    fn sweep_clears_stacked_rows_and_shifts_the_rest() {
        let mut field = Playfield::new();
        field.set(0, 15, Cell::Filled(PieceKind::S));
        field.set(9, 16, Cell::Filled(PieceKind::Z));
        fill_row(&mut field, 17, PieceKind::I);
        fill_row(&mut field, 18, PieceKind::O);
        fill_row(&mut field, 19, PieceKind::L);

        assert_eq!(field.sweep(), 3);
        assert_eq!(field.cell(0, 18), Cell::Filled(PieceKind::S));
        assert_eq!(field.cell(9, 19), Cell::Filled(PieceKind::Z));
        assert_eq!(field.filled_count(), 2);
        for y in 0..3 {
            assert!(field.rows().nth(y).unwrap().iter().all(|c| c.is_empty()));
        }
    }

    #[test]
    fn sweep_handles_gaps_between_full_rows() {
        let mut field = Playfield::new();
        fill_row(&mut field, 19, PieceKind::J);
        field.set(4, 18, Cell::Filled(PieceKind::T));
        fill_row(&mut field, 17, PieceKind::J);

        assert_eq!(field.sweep(), 2);
        assert_eq!(field.cell(4, 19), Cell::Filled(PieceKind::T));
        assert_eq!(field.filled_count(), 1);
    }

    #[test]
    fn clear_top_row_only_empties_it() {
        let mut field = Playfield::new();
        fill_row(&mut field, 0, PieceKind::I);
        field.set(2, 1, Cell::Filled(PieceKind::O));
        field.clear_row(0);
        assert_eq!(field.filled_count(), 1);
        assert_eq!(field.cell(2, 1), Cell::Filled(PieceKind::O));
    }

    #[test]
    fn lock_skips_and_reports_cells_above_the_field() {
        let mut field = Playfield::new();
        // upright I at y = -2 covers rows -2..=1
        let piece = ActivePiece {
            kind: PieceKind::I,
            x: 0,
            y: -2,
            rotation: Rotation::SPAWN,
        };
        assert_eq!(field.lock(&piece), Lock::ToppedOut);
        assert_eq!(field.filled_count(), 2);
        assert_eq!(field.cell(1, 0), Cell::Filled(PieceKind::I));
        assert_eq!(field.cell(1, 1), Cell::Filled(PieceKind::I));
    }

    #[test]
    fn get_is_bounds_checked() {
        let field = Playfield::new();
        assert_eq!(field.get(0, 0), Some(Cell::Empty));
        assert_eq!(field.get(-1, 0), None);
        assert_eq!(field.get(10, 0), None);
        assert_eq!(field.get(0, 20), None);
    }
}
