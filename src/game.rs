/// Per-game rules plug into the shared loop through `Game`; `Session`
/// pairs one game with the state machine and owns the transitions.

use std::io;

use rand::Rng;
use tracing::{debug, info};

use crate::collision::Rect;
use crate::display::{Align, Canvas, Color, TextSize, TextStyle, Theme};
use crate::input::{HeldKeys, Key};
use crate::state::{GameStatus, StateMachine, Transition};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Lost,
}

pub trait Game {
    fn title(&self) -> &'static str;

    /// Controls line shown under the field.
    fn hint(&self) -> &'static str;

    /// Logical extent of everything the game draws.
    fn field(&self) -> Rect;

    fn pausable(&self) -> bool {
        false
    }

    fn score(&self) -> u32;

    /// Back to a fresh run: empty collections, zero score, spawners reset.
    fn reset(&mut self);

    /// Discrete key press while playing.  Held-key movement belongs in
    /// `update`.
    fn on_key<R: Rng>(&mut self, _key: Key, _rng: &mut R) {}

    /// One PLAYING tick.
    fn update<R: Rng>(&mut self, held: &HeldKeys, rng: &mut R) -> Outcome;

    /// Draw the field and HUD.  Inactive entities must not be drawn.
    fn render<C: Canvas>(&self, canvas: &mut C, theme: &Theme) -> io::Result<()>;
}

pub struct Session<G> {
    game: G,
    machine: StateMachine,
    high_score: u32,
    ticks: u64,
}

impl<G: Game> Session<G> {
    pub fn new(game: G) -> Self {
        let machine = StateMachine::new(game.pausable());
        Session {
            game,
            machine,
            high_score: 0,
            ticks: 0,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.machine.status()
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut G {
        &mut self.game
    }

    /// Best score seen by this session (not persisted).
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// PLAYING ticks since the session began.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn handle_key<R: Rng>(&mut self, key: Key, rng: &mut R) -> Transition {
        let transition = self.machine.on_key(key);
        match transition {
            Transition::Started => info!(game = self.game.title(), "game started"),
            Transition::Restarted => {
                self.game.reset();
                info!(game = self.game.title(), "game restarted");
            }
            Transition::Paused => debug!("paused"),
            Transition::Resumed => debug!("resumed"),
            Transition::None => {
                if self.machine.is_playing() {
                    self.game.on_key(key, rng);
                }
            }
        }
        transition
    }

    /// Advance one tick.  Does nothing unless PLAYING.
    pub fn tick<R: Rng>(&mut self, held: &HeldKeys, rng: &mut R) {
        if !self.machine.is_playing() {
            return;
        }
        self.ticks += 1;
        if self.game.update(held, rng) == Outcome::Lost {
            self.machine.finish();
            let score = self.game.score();
            self.high_score = self.high_score.max(score);
            info!(game = self.game.title(), score, "game over");
        }
    }

    pub fn render<C: Canvas>(&self, canvas: &mut C, theme: &Theme) -> io::Result<()> {
        self.game.render(canvas, theme)?;
        match self.machine.status() {
            GameStatus::Start => self.draw_start(canvas, theme),
            GameStatus::Paused => self.draw_paused(canvas),
            GameStatus::GameOver => self.draw_game_over(canvas, theme),
            GameStatus::Playing => Ok(()),
        }
    }

    // ── Overlays ──────────────────────────────────────────────────────────────

    fn line_height(&self) -> f32 {
        self.game.field().h / 16.0
    }

    fn draw_start<C: Canvas>(&self, canvas: &mut C, theme: &Theme) -> io::Result<()> {
        let field = self.game.field();
        let (cx, cy) = (field.center_x(), field.center_y());
        let line = self.line_height();

        let title = format!("{star} {} {star}", self.game.title(), star = theme.glyphs.star);
        canvas.draw_text(
            &title,
            cx,
            cy - line,
            TextStyle::new(Color::Cyan)
                .size(TextSize::Large)
                .align(Align::Center),
        )?;
        canvas.draw_text(
            "Press any key to start",
            cx,
            cy + line,
            TextStyle::new(Color::White).align(Align::Center),
        )
    }

    fn draw_paused<C: Canvas>(&self, canvas: &mut C) -> io::Result<()> {
        let field = self.game.field();
        let (cx, cy) = (field.center_x(), field.center_y());
        canvas.draw_text(
            "PAUSED",
            cx,
            cy,
            TextStyle::new(Color::Yellow)
                .size(TextSize::Large)
                .align(Align::Center),
        )?;
        canvas.draw_text(
            "P - Resume",
            cx,
            cy + self.line_height(),
            TextStyle::new(Color::White).align(Align::Center),
        )
    }

    fn draw_game_over<C: Canvas>(&self, canvas: &mut C, theme: &Theme) -> io::Result<()> {
        let field = self.game.field();
        let (cx, cy) = (field.center_x(), field.center_y());
        let line = self.line_height();

        let score = self.game.score();
        let new_best = score >= self.high_score && score > 0;
        let score_line = format!("Final Score: {:>6}", score);
        let best_line = if new_best {
            format!("{star} NEW BEST: {:>6} {star}", self.high_score, star = theme.glyphs.star)
        } else {
            format!("Best Score:  {:>6}", self.high_score)
        };

        let [tl, tr, bl, br, hz, vt] = theme.glyphs.frame;
        let bar: String = std::iter::repeat(hz).take(20).collect();
        let boxed: [String; 3] = [
            format!("{}{}{}", tl, bar, tr),
            format!("{}    GAME  OVER      {}", vt, vt),
            format!("{}{}{}", bl, bar, br),
        ];

        let mut y = cy - 3.0 * line;
        for row in &boxed {
            canvas.draw_text(row, cx, y, TextStyle::new(Color::Red).align(Align::Center))?;
            y += line;
        }
        canvas.draw_text(
            &score_line,
            cx,
            y,
            TextStyle::new(Color::Yellow).align(Align::Center),
        )?;
        y += line;
        canvas.draw_text(
            &best_line,
            cx,
            y,
            TextStyle::new(if new_best { Color::Yellow } else { Color::DarkGrey })
                .align(Align::Center),
        )?;
        y += line;
        canvas.draw_text(
            "R - Play Again  Esc - Menu  Q - Quit",
            cx,
            y,
            TextStyle::new(Color::White).align(Align::Center),
        )
    }
}
