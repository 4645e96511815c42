//! The six game buttons with async debouncing.
//!
//! All lines are active low with internal pull-ups.

use embassy_futures::join::join_array;
use embassy_time::{
    Duration,
    Timer,
};
use esp_hal::gpio::{
    Input,
    InputConfig,
    Pull,
};

use super::ButtonResources;
use crate::{
    input::{
        Button,
        Event,
    },
    runtime::EventSender,
};

pub struct Buttons {
    pub down: Input<'static>,
    pub right: Input<'static>,
    pub left: Input<'static>,
    pub up: Input<'static>,
    pub a: Input<'static>,
    pub b: Input<'static>,
}

const DEBOUNCE_MS: u64 = 20;

impl From<ButtonResources<'static>> for Buttons {
    fn from(res: ButtonResources<'static>) -> Self {
        let pull_up = InputConfig::default().with_pull(Pull::Up);
        Self {
            down: Input::new(res.down, pull_up),
            right: Input::new(res.right, pull_up),
            left: Input::new(res.left, pull_up),
            up: Input::new(res.up, pull_up),
            a: Input::new(res.a, pull_up),
            b: Input::new(res.b, pull_up),
        }
    }
}

impl Buttons {
    /// Post a debounced press and release event for every line, forever.
    /// Presses may be dropped when the queue is full; releases wait.
    pub async fn watch(&mut self, events: EventSender<'_>) {
        join_array([
            watch_line(Button::Down, &mut self.down, events),
            watch_line(Button::Right, &mut self.right, events),
            watch_line(Button::Left, &mut self.left, events),
            watch_line(Button::Up, &mut self.up, events),
            watch_line(Button::A, &mut self.a, events),
            watch_line(Button::B, &mut self.b, events),
        ])
        .await;
    }

    /// Wait for a debounced button press (falling edge, active low).
    pub async fn debounce_press(button: &mut Input<'_>) {
        loop {
            button.wait_for_falling_edge().await;
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if button.is_low() {
                return;
            }
        }
    }

    /// Wait for a debounced button release (rising edge).
    pub async fn debounce_release(button: &mut Input<'_>) {
        loop {
            button.wait_for_rising_edge().await;
            Timer::after(Duration::from_millis(DEBOUNCE_MS)).await;
            if button.is_high() {
                return;
            }
        }
    }
}

async fn watch_line(button: Button, input: &mut Input<'static>, events: EventSender<'_>) {
    loop {
        Buttons::debounce_press(input).await;
        trace!("{} down", button);
        events.post(Event::Pressed(button));
        Buttons::debounce_release(input).await;
        events.send(Event::Released(button)).await;
    }
}
