//! Badge hardware: pin assignments, bring-up and the scene sink.
//!
//! ```rust,ignore
//! let peripherals = badgetris::board::init();
//! let resources = badgetris::split_resources!(peripherals);
//!
//! let buttons: Buttons = resources.buttons.into();
//! let screen: Screen = Screen::new(resources.display.into(), resources.backlight.into());
//! let indicator: Indicator = resources.leds.into();
//! ```

mod buttons;
mod indicator;
mod screen;

pub use buttons::Buttons;
use esp_hal::{
    Blocking,
    assign_resources,
    clock::{
        Clock,
        CpuClock,
    },
    gpio::{
        Level,
        Output,
        OutputConfig,
    },
    rmt::{
        Rmt,
        Tx,
        TxChannelConfig,
        TxChannelCreator as _,
    },
    rom,
    time::Rate,
};
pub use indicator::{
    Indicator,
    LED_COUNT,
};
pub use screen::{
    Backlight,
    Display,
    Screen,
};

use crate::scene::{
    Scene,
    SceneSink,
};

// ── Pin / peripheral assignments ────────────────────────────────────────────

assign_resources! {
    pub Resources<'d> {
        display: DisplayResources<'d> {
            dc: GPIO15,
            rst: GPIO7,
            sck: GPIO4,
            cs: GPIO6,
            miso: GPIO16,
            mosi: GPIO5,
            spi: SPI2,
            dma: DMA_CH0,
        },
        backlight: BacklightResources<'d> {
            led: GPIO19,
        },
        buttons: ButtonResources<'d> {
            up: GPIO11,
            down: GPIO1,
            left: GPIO21,
            right: GPIO2,
            a: GPIO13,
            b: GPIO38,
        },
        leds: LedResources<'d> {
            power: GPIO17,
            io: GPIO18,
            rmt: RMT,
        }
    }
}

// ── Board initialisation ────────────────────────────────────────────────────

/// The S3 has to pass through an intermediate CPU frequency on the way up.
fn set_cpu_clock(cpu_clock_speed: CpuClock) {
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .sysclk_conf()
        .modify(|_, w| unsafe { w.soc_clk_sel().bits(1) });
    let _ = esp_hal::peripherals::SYSTEM::regs()
        .cpu_per_conf()
        .modify(|_, w| unsafe {
            let _ = w.pll_freq_sel().set_bit();
            w.cpuperiod_sel().bits(match cpu_clock_speed {
                CpuClock::_80MHz => 0,
                CpuClock::_160MHz => 1,
                _ => 2,
            })
        });

    rom::ets_update_cpu_frequency_rom(cpu_clock_speed.frequency().as_mhz());
}

/// Bring the chip up at full clock and return the raw peripheral set.
///
/// Call once at the top of `main`, then split it with
/// [`split_resources!`](crate::split_resources).
#[must_use]
pub fn init() -> esp_hal::peripherals::Peripherals {
    set_cpu_clock(CpuClock::_160MHz);
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    esp_hal::init(config)
}

// ── Resource → peripheral conversions ───────────────────────────────────────

impl<'a> From<LedResources<'a>> for esp_hal::rmt::Channel<'a, Blocking, Tx> {
    fn from(res: LedResources<'a>) -> Self {
        // the strip's supply switch has to stay on for as long as the strip is used
        core::mem::forget(Output::new(res.power, Level::High, OutputConfig::default()));
        let rmt = Rmt::new(res.rmt, Rate::from_mhz(40)).unwrap();
        let tx_config = TxChannelConfig::default().with_clk_divider(1);
        rmt.channel0.configure_tx(res.io, tx_config).unwrap()
    }
}

impl<'a> From<LedResources<'a>> for Indicator<'a> {
    fn from(res: LedResources<'a>) -> Self {
        Indicator::new(res.into())
    }
}

// ── Scene sink ──────────────────────────────────────────────────────────────

/// Everything a scene is shown on: the panel and the heartbeat LEDs.
pub struct Badge {
    pub screen: Screen,
    pub indicator: Indicator<'static>,
}

impl SceneSink for Badge {
    async fn present(&mut self, scene: &Scene) {
        self.screen.draw(scene);
        self.indicator.show(scene.indicator).await;
    }
}
