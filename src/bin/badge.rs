//! Badge firmware: buttons and two timers feed the event queue, one task
//! owns the game and draws it.
//!
//! Controls:
//! - Left/Right: move piece
//! - Down: soft drop
//! - Up: pause / resume
//! - A: start from the menu, rotate counter-clockwise
//! - B: rotate clockwise
//! - A or B on the game over screen: back to the menu

#![no_std]
#![no_main]

#[allow(clippy::wildcard_imports)]
use badgetris::{
    Arbiter,
    Config,
    EventChannel,
    EventSender,
    Game,
    TimerControl,
    TimerId,
    UptimeCounter,
    board::{
        self,
        *,
    },
    mk_static,
    split_resources,
    timer_task,
};
use defmt::info;
use embassy_executor::Spawner;
use embassy_time::{
    Duration,
    Timer,
};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use esp_println as _;
use palette::Srgb;

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

static EVENTS: EventChannel = EventChannel::new();
static TIMERS: TimerControl = TimerControl::new();

type BadgeArbiter = Arbiter<'static, &'static TimerControl, UptimeCounter, Badge>;

#[embassy_executor::task]
async fn input_task(buttons: &'static mut Buttons) {
    info!("input task started");
    buttons.watch(EventSender::new(&EVENTS)).await;
}

#[embassy_executor::task(pool_size = 2)]
async fn timer(id: TimerId) {
    info!("{} timer task started", id);
    timer_task(&TIMERS, id, EventSender::new(&EVENTS)).await
}

#[embassy_executor::task]
async fn game_task(arbiter: BadgeArbiter) {
    info!("game task started");
    arbiter.run().await
}

#[esp_rtos::main]
async fn main(spawner: Spawner) -> ! {
    let peripherals = board::init();
    let resources = split_resources!(peripherals);

    esp_alloc::heap_allocator!(size: 16 * 1024);

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let buttons = mk_static!(Buttons, resources.buttons.into());
    let badge = Badge {
        screen: Screen::new(resources.display.into(), resources.backlight.into()),
        indicator: Indicator::from(resources.leds).with_color(Srgb::new(0, 16, 24)),
    };

    let config = Config::default();
    info!(
        "gravity {} us, repeat {} us",
        config.gravity_period(0).as_micros(),
        config.repeat_period().as_micros()
    );
    let game = Game::new(config, &TIMERS, UptimeCounter);
    let arbiter = Arbiter::new(game, EVENTS.receiver(), badge);

    spawner.must_spawn(timer(TimerId::Gravity));
    spawner.must_spawn(timer(TimerId::Repeat));
    spawner.must_spawn(input_task(buttons));
    spawner.must_spawn(game_task(arbiter));

    loop {
        Timer::after(Duration::from_secs(600)).await;
    }
}
