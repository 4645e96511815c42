//! Heartbeat on the WS2812 LED strip, driven through the RMT peripheral.
//!
//! The strip has two bars of five LEDs; the heartbeat lights the bottom LED
//! of each bar.

extern crate alloc;

use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::{
    Blocking,
    gpio::Level,
    rmt::{
        PulseCode,
        Tx,
    },
};
use palette::Srgb;

pub const LED_COUNT: usize = 10;

/// Hardware indices of the bottom LED of the right and the left bar.
const HEARTBEAT_LEDS: [usize; 2] = [0, LED_COUNT - 1];

const OFF: Srgb<u8> = Srgb::new(0, 0, 0);

pub struct Indicator<'a> {
    channel: Option<esp_hal::rmt::Channel<'a, Blocking, Tx>>,
    color: Srgb<u8>,
    /// What the strip currently shows, `None` before the first update.
    shown: Option<bool>,
}

impl<'a> Indicator<'a> {
    pub const fn new(channel: esp_hal::rmt::Channel<'a, Blocking, Tx>) -> Self {
        Self {
            channel: Some(channel),
            color: Srgb::new(0, 24, 8),
            shown: None,
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: Srgb<u8>) -> Self {
        self.color = color;
        self
    }

    /// Light or darken the heartbeat LEDs. Writes to the strip only when
    /// the state changes.
    pub async fn show(&mut self, lit: bool) {
        if self.shown == Some(lit) {
            return;
        }
        let mut frame = [OFF; LED_COUNT];
        if lit {
            for i in HEARTBEAT_LEDS {
                frame[i] = self.color;
            }
        }
        if self.update(&frame).await {
            self.shown = Some(lit);
        }
    }

    /// Push `frame` to the strip. Returns `false` if the transfer failed.
    async fn update(&mut self, frame: &[Srgb<u8>; LED_COUNT]) -> bool {
        let Some(channel) = self.channel.take() else {
            error!("RMT channel lost during previous transmission");
            return false;
        };

        let pulses = frame
            .iter()
            .flat_map(|c| {
                // WS2812 expects GRB byte order
                [
                    byte_to_pulses(c.green),
                    byte_to_pulses(c.red),
                    byte_to_pulses(c.blue),
                ]
                .into_iter()
                .flatten()
            })
            .chain(core::iter::once(PulseCode::end_marker()))
            .collect::<alloc::vec::Vec<_>>();

        let transaction = match channel.transmit(&pulses) {
            Ok(t) => t,
            Err(e) => {
                error!("RMT transmit failed: {}", e);
                return false;
            }
        };

        let ok = match transaction.wait() {
            Ok(ch) => {
                self.channel = Some(ch);
                true
            }
            Err((err, ch)) => {
                error!("RMT transaction failed: {}", err);
                self.channel = Some(ch);
                false
            }
        };

        // WS2812 reset time
        Timer::after(Duration::from_micros(50)).await;
        ok
    }
}

/// WS2812 bit timing at 40 MHz RMT clock.
const fn bit_to_pulse(bit: bool) -> PulseCode {
    if bit {
        // '1': 0.8 µs high, 0.45 µs low
        PulseCode::new(Level::High, 32, Level::Low, 18)
    } else {
        // '0': 0.4 µs high, 0.85 µs low
        PulseCode::new(Level::High, 16, Level::Low, 34)
    }
}

fn byte_to_pulses(byte: u8) -> [PulseCode; 8] {
    core::array::from_fn(|i| bit_to_pulse((byte >> (7 - i)) & 1 != 0))
}
