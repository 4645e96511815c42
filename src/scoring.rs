//! Score and level bookkeeping.

/// Score counts cleared rows; level follows it in fixed steps up to a cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Progress {
    pub score: u32,
    pub level: u8,
}

impl Progress {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Credit one cleared row. Returns `true` when the level went up.
    pub fn award_row(&mut self, rows_per_level: u32, max_level: u8) -> bool {
        self.score = self.score.saturating_add(1);
        if rows_per_level != 0 && self.score % rows_per_level == 0 && self.level < max_level {
            self.level += 1;
            return true;
        }
        false
    }
}
