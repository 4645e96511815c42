//! Piece selection from a free-running counter.

use crate::piece::PieceKind;

/// Anything that can be sampled for a few unpredictable low bits.
///
/// Only the lowest three bits of each sample are used.
pub trait EntropySource {
    fn sample(&mut self) -> u8;
}

/// Draw a piece kind: sample mod 8, and sample again on the `7` sentinel.
///
/// A source stuck on `7` never returns; free-running counters always move.
pub fn next_piece_kind<E: EntropySource + ?Sized>(source: &mut E) -> PieceKind {
    loop {
        if let Some(kind) = PieceKind::from_index(source.sample() & 0x7) {
            return kind;
        }
        trace!("entropy draw hit the empty sentinel, resampling");
    }
}

/// Low bits of the embassy tick counter.
///
/// The counter runs at the time driver's tick rate, far faster than button
/// presses and gravity ticks, which is what makes its low bits usable.
#[derive(Clone, Copy, Debug, Default)]
pub struct UptimeCounter;

impl EntropySource for UptimeCounter {
    fn sample(&mut self) -> u8 {
        embassy_time::Instant::now().as_ticks() as u8
    }
}

impl<E: EntropySource + ?Sized> EntropySource for &mut E {
    fn sample(&mut self) -> u8 {
        (**self).sample()
    }
}
