//! Whole-game scenarios driven only through the public API.

use badgetris::{
    Arbiter,
    Button,
    Cell,
    Config,
    EntropySource,
    Event,
    EventChannel,
    EventSender,
    Game,
    GameState,
    PieceKind,
    Scene,
    SceneSink,
    TickSource,
    TimerId,
    TimerMode,
    playfield::WIDTH,
    scheduler::Epoch,
};
use embassy_futures::block_on;
use embassy_time::Duration;

#[derive(Default)]
struct Ticks {
    armed: Vec<(TimerId, Duration, Epoch)>,
    disarmed: Vec<TimerId>,
}

impl TickSource for Ticks {
    fn arm(&mut self, timer: TimerId, period: Duration, _mode: TimerMode, epoch: Epoch) {
        self.armed.push((timer, period, epoch));
    }

    fn disarm(&mut self, timer: TimerId) {
        self.disarmed.push(timer);
    }
}

struct Always(PieceKind);

impl EntropySource for Always {
    fn sample(&mut self) -> u8 {
        self.0 as u8
    }
}

type TestGame = Game<Ticks, Always>;

fn new_game(kind: PieceKind) -> TestGame {
    Game::new(Config::default(), Ticks::default(), Always(kind))
}

fn tap(g: &mut TestGame, button: Button) {
    g.handle(Event::Pressed(button));
    g.handle(Event::Released(button));
    g.service();
}

fn fire_gravity(g: &mut TestGame) {
    let epoch = g.scheduler().epoch(TimerId::Gravity);
    g.handle(Event::Tick {
        timer: TimerId::Gravity,
        epoch,
    });
    g.service();
}

/// Shift the fresh piece by `dx` columns and let it fall onto the floor.
fn drop_to_floor(g: &mut TestGame, dx: i8) {
    let button = if dx < 0 { Button::Left } else { Button::Right };
    for _ in 0..dx.unsigned_abs() {
        tap(g, button);
    }
    // 18 rows of fall from the spawn row, then the lock
    for _ in 0..19 {
        fire_gravity(g);
    }
}

/// Five O pieces side by side fill the bottom two rows.
fn fill_two_rows(g: &mut TestGame) {
    for dx in [-5, -3, -1, 1, 3] {
        drop_to_floor(g, dx);
    }
}

#[test]
fn o_piece_lands_on_the_floor_without_scoring() {
    let mut g = new_game(PieceKind::O);
    tap(&mut g, Button::A);

    for _ in 0..18 {
        fire_gravity(&mut g);
    }
    assert_eq!(g.piece().y, 17);
    assert_eq!(g.field().filled_count(), 0);

    fire_gravity(&mut g);
    for (x, y) in [(5, 18), (6, 18), (5, 19), (6, 19)] {
        assert_eq!(g.field().cell(x, y), Cell::Filled(PieceKind::O));
    }
    assert_eq!(g.field().filled_count(), 4);
    assert_eq!(g.score(), 0);
    assert_eq!(g.piece().y, -1);
    assert_eq!(g.state(), GameState::InGame);
}

#[test]
fn two_full_rows_clear_together() {
    let mut g = new_game(PieceKind::O);
    tap(&mut g, Button::A);
    fill_two_rows(&mut g);

    assert_eq!(g.score(), 2);
    assert_eq!(g.level(), 0);
    assert_eq!(g.field().filled_count(), 0);
}

#[test]
fn every_fifth_row_raises_the_level_and_speeds_up_gravity() {
    let config = Config::default();
    let mut g = new_game(PieceKind::O);
    tap(&mut g, Button::A);

    for _ in 0..5 {
        fill_two_rows(&mut g);
    }

    assert_eq!(g.score(), 10);
    assert_eq!(g.level(), 2);
    let (timer, period, epoch) = *g
        .scheduler()
        .source()
        .armed
        .iter()
        .rev()
        .find(|(t, ..)| *t == TimerId::Gravity)
        .unwrap();
    assert_eq!(timer, TimerId::Gravity);
    assert_eq!(period, config.gravity_period(2));
    assert!(period < config.gravity_period(0));
    assert_eq!(epoch, g.scheduler().epoch(TimerId::Gravity));
}

#[test]
fn stacking_to_the_top_ends_the_game() {
    let mut g = new_game(PieceKind::T);
    tap(&mut g, Button::A);

    let mut fires = 0;
    while g.state() == GameState::InGame {
        fire_gravity(&mut g);
        fires += 1;
        assert!(fires < 1000, "never topped out");
    }
    assert_eq!(g.state(), GameState::GameOver);
    assert_eq!(g.score(), 0);
    assert!(!g.scene().indicator);
    assert!(!g.scheduler().is_running(TimerId::Gravity));
    assert_eq!(g.scheduler().source().disarmed.last(), Some(&TimerId::Gravity));

    // column 5 is stacked all the way up
    for y in 0..20 {
        assert!(!g.field().cell(5, y).is_empty(), "row {y}");
    }
    for x in (0..WIDTH).filter(|x| !(4..=6).contains(x)) {
        assert!(g.field().cell(x, 19).is_empty());
    }

    // gravity no longer runs
    fire_gravity(&mut g);
    assert_eq!(g.state(), GameState::GameOver);

    tap(&mut g, Button::B);
    assert_eq!(g.state(), GameState::MainMenu);
    assert_eq!(g.field().filled_count(), 0);

    tap(&mut g, Button::A);
    assert_eq!(g.state(), GameState::InGame);
    assert_eq!((g.score(), g.level()), (0, 0));
}

#[derive(Default)]
struct Collect(Vec<Scene>);

impl SceneSink for Collect {
    async fn present(&mut self, scene: &Scene) {
        self.0.push(*scene);
    }
}

#[test]
fn arbiter_walks_through_a_session() {
    let channel = EventChannel::new();
    let tx = EventSender::new(&channel);
    let mut arbiter = Arbiter::new(new_game(PieceKind::I), channel.receiver(), Collect::default());

    block_on(arbiter.present());

    let press = |b| {
        tx.post(Event::Pressed(b));
        tx.post(Event::Released(b));
    };

    press(Button::A);
    block_on(arbiter.pump());

    let epoch = arbiter.game().scheduler().epoch(TimerId::Gravity);
    tx.post(Event::Tick {
        timer: TimerId::Gravity,
        epoch,
    });
    block_on(arbiter.pump());

    press(Button::Up);
    block_on(arbiter.pump());

    // already queued when the pause landed
    tx.post(Event::Tick {
        timer: TimerId::Gravity,
        epoch,
    });
    press(Button::Left);
    block_on(arbiter.pump());

    press(Button::Up);
    block_on(arbiter.pump());

    let states: Vec<_> = arbiter.sink().0.iter().map(|s| s.state).collect();
    assert_eq!(
        states,
        [
            GameState::MainMenu,
            GameState::InGame,
            GameState::InGame,
            GameState::Paused,
            GameState::InGame,
        ]
    );
    let last = arbiter.sink().0.last().unwrap();
    assert_eq!((last.piece.x, last.piece.y), (4, 0));
    assert!(last.indicator);
}
