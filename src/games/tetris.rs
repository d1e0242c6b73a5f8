/// Falling-block puzzle on a 10×20 grid.
///
/// Logical layout: grid cells at `0..width × 0..height`, two HUD rows above,
/// and a side panel to the right for the next piece and the stats.

use std::io;

use rand::Rng;
use tracing::debug;

use super::tetromino::{color_of, Tetromino};
use crate::collision::Rect;
use crate::config::TetrisConfig;
use crate::display::{Canvas, Color, TextSize, TextStyle, Theme};
use crate::game::{Game, Outcome};
use crate::input::{HeldKeys, Key};
use crate::spawner::Cadence;

const C_WELL: Color = Color::AnsiValue(236);
const C_LABEL: Color = Color::White;
const C_VALUE: Color = Color::Yellow;
const C_GHOST: Color = Color::DarkGrey;

const HUD_ROWS: f32 = 2.0;
const PANEL_WIDTH: f32 = 8.0;

/// Rotation fallbacks tried in order when the plain rotation collides.
const WALL_KICKS: [(i32, i32); 3] = [(1, 0), (-1, 0), (0, -1)];

// ── Grid ──────────────────────────────────────────────────────────────────────

/// `0` is empty; `1..=7` is a locked cell of that shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<u8>>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Grid {
            width,
            height,
            cells: vec![vec![0; width]; height],
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u8> {
        if x < 0 || y < 0 {
            return None;
        }
        self.cells.get(y as usize)?.get(x as usize).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|row| row.iter().all(|&c| c == 0))
    }

    /// `true` when every cell of `piece` is inside the grid and free.
    pub fn fits(&self, piece: &Tetromino) -> bool {
        piece
            .cells()
            .iter()
            .all(|&(x, y)| self.get(x, y) == Some(0))
    }

    pub fn lock(&mut self, piece: &Tetromino) {
        for (x, y) in piece.cells() {
            if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
                self.cells[y as usize][x as usize] = piece.value();
            }
        }
    }

    /// Remove every full row, pushing empty rows in at the top.  Returns the
    /// number of rows removed.
    pub fn clear_lines(&mut self) -> usize {
        let width = self.width;
        self.cells.retain(|row| row.iter().any(|&c| c == 0));
        let cleared = self.height - self.cells.len();
        for _ in 0..cleared {
            self.cells.insert(0, vec![0; width]);
        }
        cleared
    }
}

// ── Game ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Tetris {
    config: TetrisConfig,
    pub grid: Grid,
    /// `None` until the first tick deals a piece.
    pub current: Option<Tetromino>,
    pub next: Option<Tetromino>,
    pub score: u32,
    pub level: u32,
    pub lines: u32,
    gravity: Cadence,
    /// Set when a freshly dealt piece does not fit.
    topped_out: bool,
    /// Loop rate, used to turn played ticks into a clock.
    fps: u32,
    /// Ticks spent playing; frozen while paused.
    played: u64,
}

impl Tetris {
    pub fn new(config: TetrisConfig, fps: u32) -> Self {
        Tetris {
            grid: Grid::new(config.grid_width as usize, config.grid_height as usize),
            current: None,
            next: None,
            score: 0,
            level: 1,
            lines: 0,
            gravity: Cadence::new(config.base_gravity),
            topped_out: false,
            fps,
            played: 0,
            config,
        }
    }

    pub fn config(&self) -> &TetrisConfig {
        &self.config
    }

    pub fn is_topped_out(&self) -> bool {
        self.topped_out
    }

    /// Whole seconds of play.
    pub fn elapsed_secs(&self) -> u64 {
        self.played / u64::from(self.fps.max(1))
    }

    /// Where the current piece would land on a hard drop.
    pub fn ghost(&self) -> Option<Tetromino> {
        let mut ghost = self.current?;
        while self.grid.fits(&ghost.shifted(0, 1)) {
            ghost = ghost.shifted(0, 1);
        }
        Some(ghost)
    }

    /// Ticks per gravity step at the current level.
    pub fn gravity_interval(&self) -> u32 {
        self.gravity.threshold()
    }

    fn interval_for(&self, level: u32) -> u32 {
        let c = &self.config;
        c.base_gravity
            .saturating_sub(c.gravity_step * level.saturating_sub(1))
            .max(c.min_gravity)
    }

    /// Promote `next` to `current` and draw a new `next`.
    fn deal<R: Rng>(&mut self, rng: &mut R) {
        let width = self.config.grid_width;
        let piece = match self.next.take() {
            Some(next) => Tetromino::new(next.shape, width),
            None => Tetromino::random(rng, width),
        };
        self.next = Some(Tetromino::random(rng, width));
        if !self.grid.fits(&piece) {
            self.topped_out = true;
            debug!(shape = piece.shape, "spawned piece does not fit");
        }
        self.current = Some(piece);
    }

    /// Move the current piece if the target is free.
    pub fn try_move(&mut self, dx: i32, dy: i32) -> bool {
        let Some(piece) = self.current else {
            return false;
        };
        let moved = piece.shifted(dx, dy);
        if self.grid.fits(&moved) {
            self.current = Some(moved);
            true
        } else {
            false
        }
    }

    /// Rotate clockwise, nudging right, left, then up when blocked.
    pub fn rotate(&mut self) -> bool {
        let Some(piece) = self.current else {
            return false;
        };
        let rotated = piece.rotated();
        let candidate = std::iter::once((0, 0))
            .chain(WALL_KICKS)
            .map(|(dx, dy)| rotated.shifted(dx, dy))
            .find(|candidate| self.grid.fits(candidate));
        match candidate {
            Some(candidate) => {
                self.current = Some(candidate);
                true
            }
            None => false,
        }
    }

    /// Drop straight to the floor and lock.
    pub fn hard_drop<R: Rng>(&mut self, rng: &mut R) {
        if self.current.is_none() || self.topped_out {
            return;
        }
        while self.try_move(0, 1) {}
        self.lock_and_deal(rng);
    }

    fn lock_and_deal<R: Rng>(&mut self, rng: &mut R) {
        if let Some(piece) = self.current.take() {
            self.grid.lock(&piece);
        }
        let cleared = self.grid.clear_lines() as u32;
        if cleared > 0 {
            self.score_lines(cleared);
        }
        self.deal(rng);
    }

    fn score_lines(&mut self, cleared: u32) {
        let c = &self.config;
        self.score += if cleared == 4 {
            c.score_tetris
        } else {
            cleared * c.score_per_line * self.level
        };
        self.lines += cleared;

        let level = self.lines / self.config.lines_per_level + 1;
        if level > self.level {
            self.level = level;
            let interval = self.interval_for(level);
            self.gravity.set_threshold(interval);
            debug!(level, interval, "level up");
        }
    }

    fn draw_cell<C: Canvas>(canvas: &mut C, x: i32, y: i32, color: Color) -> io::Result<()> {
        canvas.draw_rect(&Rect::new(x as f32, y as f32, 1.0, 1.0), color)
    }

    fn draw_panel<C: Canvas>(&self, canvas: &mut C) -> io::Result<()> {
        let left = self.config.grid_width as f32 + 1.0;
        canvas.draw_text("Next", left, 0.0, TextStyle::new(C_LABEL).size(TextSize::Medium))?;
        if let Some(next) = self.next {
            let preview = Tetromino {
                rotation: 0,
                x: left as i32,
                y: 1,
                ..next
            };
            for (x, y) in preview.cells() {
                Self::draw_cell(canvas, x, y, preview.color())?;
            }
        }

        let secs = self.elapsed_secs();
        let stats = [
            ("Score", self.score.to_string()),
            ("Level", self.level.to_string()),
            ("Lines", self.lines.to_string()),
            ("Time", format!("{:02}:{:02}", secs / 60, secs % 60)),
        ];
        let mut y = 6.0;
        for (label, value) in stats {
            canvas.draw_text(label, left, y, TextStyle::new(C_LABEL))?;
            canvas.draw_text(&value, left, y + 1.0, TextStyle::new(C_VALUE))?;
            y += 3.0;
        }
        Ok(())
    }
}

impl Game for Tetris {
    fn title(&self) -> &'static str {
        "TETRIS"
    }

    fn hint(&self) -> &'static str {
        "← → : Move  ↑ : Rotate  ↓ : Soft drop  SPACE : Drop  P : Pause  Esc : Menu"
    }

    fn field(&self) -> Rect {
        Rect::new(
            0.0,
            -HUD_ROWS,
            self.config.grid_width as f32 + PANEL_WIDTH,
            self.config.grid_height as f32 + HUD_ROWS,
        )
    }

    fn pausable(&self) -> bool {
        true
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn reset(&mut self) {
        *self = Tetris::new(self.config.clone(), self.fps);
    }

    fn on_key<R: Rng>(&mut self, key: Key, rng: &mut R) {
        if self.topped_out {
            return;
        }
        match key {
            Key::Left => {
                self.try_move(-1, 0);
            }
            Key::Right => {
                self.try_move(1, 0);
            }
            Key::Down => {
                self.try_move(0, 1);
            }
            Key::Up => {
                self.rotate();
            }
            Key::Fire => self.hard_drop(rng),
            _ => {}
        }
    }

    fn update<R: Rng>(&mut self, _held: &HeldKeys, rng: &mut R) -> Outcome {
        self.played += 1;
        if self.current.is_none() && !self.topped_out {
            self.deal(rng);
        }
        if !self.topped_out && self.gravity.advance() && !self.try_move(0, 1) {
            self.lock_and_deal(rng);
        }
        if self.topped_out {
            Outcome::Lost
        } else {
            Outcome::Continue
        }
    }

    fn render<C: Canvas>(&self, canvas: &mut C, _theme: &Theme) -> io::Result<()> {
        let (w, h) = (self.config.grid_width as f32, self.config.grid_height as f32);
        canvas.draw_rect(&Rect::new(0.0, 0.0, w, h), C_WELL)?;

        for (y, row) in self.grid.cells.iter().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if value != 0 {
                    Self::draw_cell(canvas, x as i32, y as i32, color_of(value))?;
                }
            }
        }
        if !self.topped_out {
            let landing = self.ghost().filter(|g| Some(g.y) != self.current.map(|p| p.y));
            if let Some(ghost) = landing {
                for (x, y) in ghost.cells() {
                    Self::draw_cell(canvas, x, y, C_GHOST)?;
                }
            }
            if let Some(piece) = self.current {
                for (x, y) in piece.cells() {
                    Self::draw_cell(canvas, x, y, piece.color())?;
                }
            }
        }

        canvas.draw_text(
            &format!("Score: {}", self.score),
            0.0,
            -HUD_ROWS,
            TextStyle::new(C_VALUE),
        )?;
        self.draw_panel(canvas)
    }
}
