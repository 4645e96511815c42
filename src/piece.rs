//! Piece kinds, rotation states and the 4×4 occupancy geometry table.

/// The seven brick kinds.
///
/// Discriminants index the columns of [`BRICKS`] and are the tags stored in
/// the playfield.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PieceKind {
    I = 0,
    O = 1,
    L = 2,
    J = 3,
    T = 4,
    Z = 5,
    S = 6,
}

impl PieceKind {
    pub const ALL: [Self; 7] = [
        Self::I,
        Self::O,
        Self::L,
        Self::J,
        Self::T,
        Self::Z,
        Self::S,
    ];

    /// Map a raw tag back to a kind. `7` is the "empty" sentinel and, like
    /// anything larger, yields `None`.
    pub const fn from_index(i: u8) -> Option<Self> {
        match i {
            0 => Some(Self::I),
            1 => Some(Self::O),
            2 => Some(Self::L),
            3 => Some(Self::J),
            4 => Some(Self::T),
            5 => Some(Self::Z),
            6 => Some(Self::S),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Occupancy mask of this kind in the given rotation state.
    pub const fn mask(self, rotation: Rotation) -> u16 {
        BRICKS[rotation.index()][self.index()]
    }
}

/// Occupancy masks indexed by `[rotation][kind]`.
///
/// Each hex digit is one row of a 4×4 window, top row in the most
/// significant nibble; within a nibble the most significant bit is the
/// leftmost column. Rotation is about cell (1,1).
pub const BRICKS: [[u16; 7]; 4] = [
    // I       O       L       J       T       Z       S
    [0x4444, 0x0660, 0xC440, 0x6440, 0x4E00, 0x4C80, 0x8C40],
    [0x0F00, 0x0660, 0x2E00, 0x0E20, 0x4640, 0xC600, 0x6C00],
    [0x2222, 0x0660, 0x4460, 0x44C0, 0x0E40, 0x2640, 0x4620],
    [0x00F0, 0x0660, 0x0E80, 0x8E00, 0x4C40, 0x0C60, 0x06C0],
];

/// Window-relative `(dx, dy)` of every set bit in `mask`, row by row.
pub fn mask_cells(mask: u16) -> impl Iterator<Item = (i8, i8)> {
    (0..16_u8).filter_map(move |i| {
        let dx = (i % 4) as i8;
        let dy = (i / 4) as i8;
        let bit = 1_u16 << (15 - i);
        (mask & bit != 0).then_some((dx, dy))
    })
}

/// One of the four rotation states, `0..=3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rotation(u8);

impl Rotation {
    pub const SPAWN: Self = Self(0);

    /// Wraps any value into `0..=3`.
    pub const fn new(r: u8) -> Self {
        Self(r % 4)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Rotate by `steps` quarter turns in either direction. The result is
    /// always the non-negative representative mod 4.
    pub const fn turned(self, steps: i8) -> Self {
        Self((self.0 as i16 + steps as i16).rem_euclid(4) as u8)
    }

    /// `(r + 3) mod 4`, bound to the B line.
    pub const fn clockwise(self) -> Self {
        self.turned(-1)
    }

    /// `(r + 1) mod 4`, bound to the A line.
    pub const fn counter_clockwise(self) -> Self {
        self.turned(1)
    }
}
