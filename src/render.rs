//! Draws a [`Scene`] onto any `Rgb565` [`DrawTarget`].
//!
//! Layout is for the badge's 320×170 panel: the 10×20 board centred with
//! 8 px cells on a 1 px grid, score and level to its left.

use embedded_graphics::{
    mono_font::{
        MonoTextStyle,
        ascii::{
            FONT_6X10,
            FONT_10X20,
        },
    },
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{
        Line,
        PrimitiveStyle,
        PrimitiveStyleBuilder,
        Rectangle,
        Triangle,
    },
    text::Text,
};

use crate::{
    active::ActivePiece,
    game::{
        GameState,
        MenuItem,
    },
    piece::PieceKind,
    playfield::{
        Cell,
        HEIGHT,
        Playfield,
        WIDTH,
    },
    scene::Scene,
};

pub const SCREEN_W: i32 = 320;
pub const SCREEN_H: i32 = 170;

/// Pixel pitch of one cell, grid line included.
pub const CELL: i32 = 8;
const BOARD_PX_W: i32 = WIDTH as i32 * CELL;
const BOARD_PX_H: i32 = HEIGHT as i32 * CELL;
pub const BOARD_X: i32 = (SCREEN_W - BOARD_PX_W) / 2;
pub const BOARD_Y: i32 = (SCREEN_H - BOARD_PX_H) / 2;

const HUD_X: i32 = BOARD_X - 70;
const SCORE_Y: i32 = BOARD_Y + 20;
const LEVEL_Y: i32 = BOARD_Y + 60;

// ── Palette ─────────────────────────────────────────────────────────────────

const fn from_raw(raw: u16) -> Rgb565 {
    Rgb565::new(
        (raw >> 11) as u8,
        ((raw >> 5) & 0x3f) as u8,
        (raw & 0x1f) as u8,
    )
}

pub const BLACK: Rgb565 = Rgb565::BLACK;
pub const WHITE: Rgb565 = from_raw(0xFFFF);
pub const GRID: Rgb565 = from_raw(0x4A69);
pub const FRAME: Rgb565 = from_raw(0x8628);

pub const fn piece_color(kind: PieceKind) -> Rgb565 {
    match kind {
        PieceKind::I => from_raw(0xD208),
        PieceKind::O => from_raw(0xEF64),
        PieceKind::L => from_raw(0xEDC0),
        PieceKind::J => from_raw(0x2779),
        PieceKind::T => from_raw(0xFC7F),
        PieceKind::Z => from_raw(0x141B),
        PieceKind::S => from_raw(0xA118),
    }
}

const fn cell_color(cell: Cell) -> Rgb565 {
    match cell {
        Cell::Empty => BLACK,
        Cell::Filled(kind) => piece_color(kind),
    }
}

// ── Renderer ────────────────────────────────────────────────────────────────

/// Keeps track of what is already on screen.
///
/// Backgrounds, the grid and labels are only drawn when the game state
/// changes; board cells and numbers are redrawn on every call.
#[derive(Debug, Default)]
pub struct Renderer {
    last: Option<GameState>,
}

impl Renderer {
    pub const fn new() -> Self {
        Self { last: None }
    }

    pub fn draw<D>(&mut self, target: &mut D, scene: &Scene) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let fresh = self.last != Some(scene.state);
        // forget the old screen until this one is fully drawn
        self.last = None;

        if fresh {
            clear(target)?;
        }
        if scene.shows_piece() {
            if fresh {
                draw_board_frame(target)?;
            }
            draw_field(target, &scene.field)?;
            draw_piece(target, &scene.piece)?;
            draw_hud(target, scene.score, scene.level)?;
            if scene.state == GameState::Paused {
                draw_pause(target)?;
            }
        } else if fresh {
            match scene.state {
                GameState::GameOver => draw_game_over(target, scene.score, scene.level)?,
                _ => draw_title(target, scene.menu)?,
            }
        }

        self.last = Some(scene.state);
        Ok(())
    }
}

fn clear<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(Point::zero(), Size::new(SCREEN_W as u32, SCREEN_H as u32))
        .into_styled(PrimitiveStyle::with_fill(BLACK))
        .draw(target)
}

fn format_u32(mut n: u32, buf: &mut [u8; 10]) -> &str {
    let mut i = buf.len();
    loop {
        i -= 1;
        buf[i] = b'0' + (n % 10) as u8;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    core::str::from_utf8(&buf[i..]).unwrap_or("")
}

fn draw_title<D>(target: &mut D, menu: MenuItem) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let big = MonoTextStyle::new(&FONT_10X20, FRAME);
    let small = MonoTextStyle::new(&FONT_6X10, WHITE);

    Text::new("TETRIS", Point::new(SCREEN_W / 2 - 30, SCREEN_H / 2 - 20), big).draw(target)?;
    Text::new("Start", Point::new(SCREEN_W / 2 - 12, SCREEN_H / 2 + 20), small).draw(target)?;

    let y = match menu {
        MenuItem::Start => SCREEN_H / 2 + 17,
    };
    let x = SCREEN_W / 2 - 24;
    Triangle::new(Point::new(x, y - 4), Point::new(x, y + 4), Point::new(x + 6, y))
        .into_styled(PrimitiveStyle::with_fill(WHITE))
        .draw(target)?;
    Ok(())
}

fn draw_board_frame<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(
        Point::new(BOARD_X - 2, BOARD_Y - 2),
        Size::new((BOARD_PX_W + 5) as u32, (BOARD_PX_H + 5) as u32),
    )
    .into_styled(PrimitiveStyle::with_stroke(FRAME, 1))
    .draw(target)?;

    let grid = PrimitiveStyle::with_stroke(GRID, 1);
    for col in 0..=WIDTH as i32 {
        let x = BOARD_X + col * CELL;
        Line::new(Point::new(x, BOARD_Y), Point::new(x, BOARD_Y + BOARD_PX_H))
            .into_styled(grid)
            .draw(target)?;
    }
    for row in 0..=HEIGHT as i32 {
        let y = BOARD_Y + row * CELL;
        Line::new(Point::new(BOARD_X, y), Point::new(BOARD_X + BOARD_PX_W, y))
            .into_styled(grid)
            .draw(target)?;
    }

    let dim = MonoTextStyle::new(&FONT_6X10, FRAME);
    Text::new("Pts", Point::new(HUD_X, SCORE_Y), dim).draw(target)?;
    Text::new("Lvl", Point::new(HUD_X, LEVEL_Y), dim).draw(target)?;
    Ok(())
}

/// Fill the inside of cell (`x`, `y`), leaving its grid lines alone.
fn draw_cell<D>(target: &mut D, x: i32, y: i32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(
        Point::new(BOARD_X + x * CELL + 1, BOARD_Y + y * CELL + 1),
        Size::new((CELL - 1) as u32, (CELL - 1) as u32),
    )
    .into_styled(PrimitiveStyle::with_fill(color))
    .draw(target)
}

fn draw_field<D>(target: &mut D, field: &Playfield) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    for (y, row) in field.rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            draw_cell(target, x as i32, y as i32, cell_color(*cell))?;
        }
    }
    Ok(())
}

fn draw_piece<D>(target: &mut D, piece: &ActivePiece) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let color = piece_color(piece.kind);
    for (x, y) in piece.cells() {
        // rows above the field are not shown
        if (0..HEIGHT as i16).contains(&y) && (0..WIDTH as i16).contains(&x) {
            draw_cell(target, i32::from(x), i32::from(y), color)?;
        }
    }
    Ok(())
}

fn draw_number<D>(target: &mut D, n: u32, at: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    Rectangle::new(at - Point::new(0, 9), Size::new(60, 12))
        .into_styled(PrimitiveStyle::with_fill(BLACK))
        .draw(target)?;
    let mut buf = [0u8; 10];
    Text::new(format_u32(n, &mut buf), at, MonoTextStyle::new(&FONT_6X10, WHITE)).draw(target)?;
    Ok(())
}

fn draw_hud<D>(target: &mut D, score: u32, level: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    draw_number(target, score, Point::new(HUD_X, SCORE_Y + 14))?;
    draw_number(target, u32::from(level), Point::new(HUD_X, LEVEL_Y + 14))
}

fn draw_pause<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let style = PrimitiveStyleBuilder::new()
        .fill_color(BLACK)
        .stroke_color(WHITE)
        .stroke_width(1)
        .build();
    Rectangle::new(Point::new(BOARD_X + 10, BOARD_Y + 65), Size::new(60, 20))
        .into_styled(style)
        .draw(target)?;
    Text::new(
        "PAUSED",
        Point::new(BOARD_X + 22, BOARD_Y + 78),
        MonoTextStyle::new(&FONT_6X10, WHITE),
    )
    .draw(target)?;
    Ok(())
}

fn draw_game_over<D>(target: &mut D, score: u32, level: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let big = MonoTextStyle::new(&FONT_10X20, WHITE);
    let small = MonoTextStyle::new(&FONT_6X10, WHITE);

    Text::new("GAME", Point::new(SCREEN_W / 2 - 20, SCREEN_H / 2 - 24), big).draw(target)?;
    Text::new("OVER", Point::new(SCREEN_W / 2 - 20, SCREEN_H / 2 - 4), big).draw(target)?;

    let mut buf = [0u8; 10];
    Text::new("Pts", Point::new(SCREEN_W / 2 - 30, SCREEN_H / 2 + 20), small).draw(target)?;
    Text::new(
        format_u32(score, &mut buf),
        Point::new(SCREEN_W / 2, SCREEN_H / 2 + 20),
        small,
    )
    .draw(target)?;
    Text::new("Lvl", Point::new(SCREEN_W / 2 - 30, SCREEN_H / 2 + 34), small).draw(target)?;
    Text::new(
        format_u32(u32::from(level), &mut buf),
        Point::new(SCREEN_W / 2, SCREEN_H / 2 + 34),
        small,
    )
    .draw(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use core::convert::Infallible;

    use super::*;

    /// In-memory 320×170 panel.
    struct Frame(Vec<Rgb565>);

    impl Frame {
        fn new() -> Self {
            Self(vec![from_raw(0x1234); (SCREEN_W * SCREEN_H) as usize])
        }

        fn at(&self, x: i32, y: i32) -> Rgb565 {
            self.0[(y * SCREEN_W + x) as usize]
        }

        /// Centre pixel of board cell (`x`, `y`).
        fn cell(&self, x: i32, y: i32) -> Rgb565 {
            self.at(BOARD_X + x * CELL + CELL / 2, BOARD_Y + y * CELL + CELL / 2)
        }

        fn count(&self, color: Rgb565) -> usize {
            self.0.iter().filter(|&&c| c == color).count()
        }
    }

    impl OriginDimensions for Frame {
        fn size(&self) -> Size {
            Size::new(SCREEN_W as u32, SCREEN_H as u32)
        }
    }

    impl DrawTarget for Frame {
        type Color = Rgb565;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(p, color) in pixels {
                if (0..SCREEN_W).contains(&p.x) && (0..SCREEN_H).contains(&p.y) {
                    self.0[(p.y * SCREEN_W + p.x) as usize] = color;
                }
            }
            Ok(())
        }
    }

    /// Rejects every draw.
    struct Broken;

    impl OriginDimensions for Broken {
        fn size(&self) -> Size {
            Size::new(SCREEN_W as u32, SCREEN_H as u32)
        }
    }

    impl DrawTarget for Broken {
        type Color = Rgb565;
        type Error = &'static str;

        fn draw_iter<I>(&mut self, _: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            Err("bus error")
        }
    }

    fn scene(state: GameState) -> Scene {
        Scene {
            state,
            menu: MenuItem::Start,
            field: Playfield::new(),
            piece: ActivePiece::spawn(PieceKind::T),
            score: 0,
            level: 0,
            indicator: false,
        }
    }

    #[test]
    fn palette_matches_rgb565_raw_values() {
        assert_eq!(piece_color(PieceKind::O).into_storage(), 0xEF64);
        assert_eq!(piece_color(PieceKind::S).into_storage(), 0xA118);
        assert_eq!(GRID.into_storage(), 0x4A69);
        assert_eq!(WHITE, Rgb565::WHITE);
    }

    #[test]
    fn numbers_format_without_padding() {
        let mut buf = [0u8; 10];
        assert_eq!(format_u32(0, &mut buf), "0");
        assert_eq!(format_u32(305, &mut buf), "305");
        assert_eq!(format_u32(u32::MAX, &mut buf), "4294967295");
    }

    #[test]
    fn title_screen_has_text_and_pointer() {
        let mut frame = Frame::new();
        Renderer::new()
            .draw(&mut frame, &scene(GameState::MainMenu))
            .unwrap();
        assert!(frame.count(FRAME) > 0);
        assert!(frame.count(WHITE) > 0);
        // pointer tip
        assert_eq!(frame.at(SCREEN_W / 2 - 22, SCREEN_H / 2 + 17), WHITE);
    }

    #[test]
    fn board_shows_locked_cells_piece_and_grid() {
        let mut s = scene(GameState::InGame);
        s.field.set(0, 19, Cell::Filled(PieceKind::J));
        s.piece.y = 3;

        let mut frame = Frame::new();
        Renderer::new().draw(&mut frame, &s).unwrap();

        assert_eq!(frame.cell(0, 19), piece_color(PieceKind::J));
        assert_eq!(frame.cell(9, 19), BLACK);
        // T at (4, 3): cells (5,3) (4,4) (5,4) (6,4)
        assert_eq!(frame.cell(5, 3), piece_color(PieceKind::T));
        assert_eq!(frame.cell(6, 4), piece_color(PieceKind::T));
        assert_eq!(frame.cell(6, 3), BLACK);
        assert_eq!(frame.at(BOARD_X, BOARD_Y + 3), GRID);
        assert_eq!(frame.at(BOARD_X - 2, BOARD_Y), FRAME);
    }

    #[test]
    fn piece_rows_above_the_field_are_clipped() {
        let mut frame = Frame::new();
        Renderer::new()
            .draw(&mut frame, &scene(GameState::InGame))
            .unwrap();
        // spawn T: only the three cells in row 0 are visible
        assert_eq!(frame.cell(4, 0), piece_color(PieceKind::T));
        assert_eq!(frame.cell(6, 0), piece_color(PieceKind::T));
        assert_eq!(frame.cell(5, 1), BLACK);
    }

    #[test]
    fn moving_piece_leaves_no_trail() {
        let mut renderer = Renderer::new();
        let mut frame = Frame::new();
        let mut s = scene(GameState::InGame);
        s.piece.y = 3;
        renderer.draw(&mut frame, &s).unwrap();
        s.piece.y = 4;
        renderer.draw(&mut frame, &s).unwrap();
        assert_eq!(frame.cell(5, 3), BLACK);
        assert_eq!(frame.cell(5, 4), piece_color(PieceKind::T));
    }

    #[test]
    fn pause_overlay_comes_and_goes() {
        let mut renderer = Renderer::new();
        let mut frame = Frame::new();
        let corner = (BOARD_X + 10, BOARD_Y + 65);

        renderer
            .draw(&mut frame, &scene(GameState::Paused))
            .unwrap();
        assert_eq!(frame.at(corner.0, corner.1), WHITE);

        renderer
            .draw(&mut frame, &scene(GameState::InGame))
            .unwrap();
        assert_ne!(frame.at(corner.0, corner.1), WHITE);
    }

    #[test]
    fn game_over_replaces_the_board() {
        let mut renderer = Renderer::new();
        let mut frame = Frame::new();
        let mut s = scene(GameState::InGame);
        s.field.set(0, 19, Cell::Filled(PieceKind::Z));
        renderer.draw(&mut frame, &s).unwrap();

        s.state = GameState::GameOver;
        s.score = 42;
        renderer.draw(&mut frame, &s).unwrap();
        assert_eq!(frame.cell(0, 19), BLACK);
        assert_eq!(frame.count(GRID), 0);
        assert!(frame.count(WHITE) > 0);
    }

    #[test]
    fn draw_errors_propagate_and_force_a_full_redraw() {
        let mut renderer = Renderer::new();
        assert_eq!(
            renderer.draw(&mut Broken, &scene(GameState::MainMenu)),
            Err("bus error")
        );

        let mut frame = Frame::new();
        renderer
            .draw(&mut frame, &scene(GameState::MainMenu))
            .unwrap();
        assert!(frame.count(WHITE) > 0);
    }
}
