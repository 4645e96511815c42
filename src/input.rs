//! Button lines and the events every producer feeds into the game.

use crate::scheduler::{
    Epoch,
    TimerId,
};

/// The six input lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Button {
    /// Soft drop.
    Down = 0,
    Right = 1,
    Left = 2,
    /// Pause and resume.
    Up = 3,
    /// Start from the menu, rotate counter-clockwise, leave game over.
    A = 4,
    /// Rotate clockwise, leave game over.
    B = 5,
}

impl Button {
    pub const ALL: [Self; 6] = [
        Self::Down,
        Self::Right,
        Self::Left,
        Self::Up,
        Self::A,
        Self::B,
    ];

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Set of buttons, one bit per line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub const EMPTY: Self = Self(0);
    /// Lines that keep the auto-repeat timer alive.
    pub const REPEATING: Self = Self(Button::Down.bit() | Button::Left.bit() | Button::Right.bit());

    pub const fn of(buttons: &[Button]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < buttons.len() {
            bits |= buttons[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(self, button: Button) -> bool {
        self.0 & button.bit() != 0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, button: Button) {
        self.0 |= button.bit();
    }

    pub fn remove(&mut self, button: Button) {
        self.0 &= !button.bit();
    }
}

/// Everything the game reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Debounced falling edge: the line went active.
    Pressed(Button),
    /// Debounced rising edge: the line was let go.
    Released(Button),
    /// A timer fired. `epoch` is the arming it belongs to.
    Tick { timer: TimerId, epoch: Epoch },
}
