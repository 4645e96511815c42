//! Collision predicate: the single authority on where a piece may be.

use crate::{
    piece::{
        PieceKind,
        Rotation,
        mask_cells,
    },
    playfield::Playfield,
};

/// Does `kind` in `rotation`, with its 4×4 window's top-left at `(x, y)`,
/// overlap a locked cell or leave the field?
///
/// Cells above row 0 are never tested, which is what lets a piece spawn
/// partly above the visible field.
pub fn collides(field: &Playfield, kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> bool {
    mask_cells(kind.mask(rotation)).any(|(dx, dy)| {
        let gx = i16::from(x) + i16::from(dx);
        let gy = i16::from(y) + i16::from(dy);
        // `get` is None below the floor and past either wall
        gy >= 0 && !matches!(field.get(gx, gy), Some(c) if c.is_empty())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::playfield::{
        Cell,
        HEIGHT,
        WIDTH,
    };

    /// Reference check straight from the rule: every occupied cell is either
    /// above the field or an in-bounds empty cell.
    fn allowed(field: &Playfield, kind: PieceKind, rotation: Rotation, x: i8, y: i8) -> bool {
        mask_cells(kind.mask(rotation)).all(|(dx, dy)| {
            let gx = i32::from(x) + i32::from(dx);
            let gy = i32::from(y) + i32::from(dy);
            gy < 0
                || (gx >= 0
                    && gx < WIDTH as i32
                    && gy < HEIGHT as i32
                    && field.cell(gx as usize, gy as usize) == Cell::Empty)
        })
    }

    fn cluttered() -> Playfield {
        let mut field = Playfield::new();
        for (x, y) in [(0, 19), (1, 19), (5, 10), (9, 0), (4, 15), (4, 16), (7, 3)] {
            field.set(x, y, Cell::Filled(PieceKind::Z));
        }
        field
    }

    #[test]
    fn matches_the_rule_everywhere() {
        for field in [Playfield::new(), cluttered()] {
            for kind in PieceKind::ALL {
                for r in 0..4 {
                    let rotation = Rotation::new(r);
                    for x in -4..=12 {
                        for y in -5..=22 {
                            assert_eq!(
                                collides(&field, kind, rotation, x, y),
                                !allowed(&field, kind, rotation, x, y),
                                "{kind:?} r{r} at ({x},{y})"
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn spawn_position_is_free_on_an_empty_field() {
        let field = Playfield::new();
        for kind in PieceKind::ALL {
            assert!(!collides(&field, kind, Rotation::SPAWN, 4, -1));
        }
    }

    #[test]
    fn rows_above_the_field_ignore_walls() {
        let field = Playfield::new();
        // I in rotation 3 lies along window row 2; at y = -3 it is all above row 0
        assert!(!collides(&field, PieceKind::I, Rotation::new(3), -4, -3));
        assert!(collides(&field, PieceKind::I, Rotation::new(3), -4, -2));
    }

    #[test]
    fn floor_and_walls() {
        let field = Playfield::new();
        // O occupies window rows 1..=2, columns 1..=2
        assert!(!collides(&field, PieceKind::O, Rotation::SPAWN, 4, 17));
        assert!(collides(&field, PieceKind::O, Rotation::SPAWN, 4, 18));
        assert!(!collides(&field, PieceKind::O, Rotation::SPAWN, -1, 0));
        assert!(collides(&field, PieceKind::O, Rotation::SPAWN, -2, 0));
        assert!(!collides(&field, PieceKind::O, Rotation::SPAWN, 7, 0));
        assert!(collides(&field, PieceKind::O, Rotation::SPAWN, 8, 0));
    }
}
