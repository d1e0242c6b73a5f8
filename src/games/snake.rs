/// Grid snake.  One logical unit per cell; the two rows above the grid
/// hold the HUD.

use std::collections::VecDeque;
use std::io;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::collision::{collides, Rect};
use crate::config::SnakeConfig;
use crate::display::{Canvas, Color, TextStyle, Theme};
use crate::entities::{Body, Entity};
use crate::game::{Game, Outcome};
use crate::input::{HeldKeys, Key};
use crate::spawner::Cadence;

const C_HEAD: Color = Color::Green;
const C_BODY: Color = Color::DarkGreen;
const C_FOOD: Color = Color::Red;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_INFO: Color = Color::White;

/// Rows reserved above the grid for the HUD.
const HUD_ROWS: f32 = 2.0;

pub type Cell = (i32, i32);

pub const LEFT: Cell = (-1, 0);
pub const RIGHT: Cell = (1, 0);
pub const UP: Cell = (0, -1);
pub const DOWN: Cell = (0, 1);

fn cell_rect((x, y): Cell) -> Rect {
    Rect::new(x as f32, y as f32, 1.0, 1.0)
}

// ── Snake ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Snake {
    /// Head first.
    pub segments: VecDeque<Cell>,
    /// Direction of the next step.
    pub heading: Cell,
    /// Direction of the last step taken; the snake may not reverse onto it.
    pub moved: Cell,
    pub grow_pending: u32,
}

impl Snake {
    pub fn new(head: Cell) -> Self {
        Snake {
            segments: VecDeque::from([head]),
            heading: RIGHT,
            moved: RIGHT,
            grow_pending: 0,
        }
    }

    pub fn head(&self) -> Cell {
        self.segments[0]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Pick a heading from held keys.  Precedence is left, right, up, down;
    /// a key that would reverse the last step is ignored.
    pub fn steer(&mut self, held: &HeldKeys) {
        let wanted = [
            (Key::Left, LEFT),
            (Key::Right, RIGHT),
            (Key::Up, UP),
            (Key::Down, DOWN),
        ];
        let reverse = (-self.moved.0, -self.moved.1);
        if let Some(&(_, dir)) = wanted
            .iter()
            .find(|(key, dir)| held.is_held(*key) && *dir != reverse)
        {
            self.heading = dir;
        }
    }

    /// Advance one cell.  The tail stays put while growth is pending.
    pub fn step(&mut self) {
        let (x, y) = self.head();
        let (dx, dy) = self.heading;
        self.segments.push_front((x + dx, y + dy));
        self.moved = self.heading;
        if self.grow_pending > 0 {
            self.grow_pending -= 1;
        } else {
            self.segments.pop_back();
        }
    }

    pub fn grow(&mut self, amount: u32) {
        self.grow_pending += amount;
    }

    pub fn hits_wall(&self, width: i32, height: i32) -> bool {
        let (x, y) = self.head();
        x < 0 || x >= width || y < 0 || y >= height
    }

    pub fn hits_self(&self) -> bool {
        let head = self.head();
        self.segments.iter().skip(1).any(|&cell| cell == head)
    }

    pub fn occupies(&self, cell: Cell) -> bool {
        self.segments.contains(&cell)
    }
}

// ── Food ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Food {
    pub body: Body,
}

impl Food {
    pub fn at(cell: Cell) -> Self {
        let rect = cell_rect(cell);
        Food {
            body: Body::new(rect.x, rect.y, rect.w, rect.h),
        }
    }

    pub fn cell(&self) -> Cell {
        (self.body.x as i32, self.body.y as i32)
    }

    /// A random cell the snake does not cover, or `None` when the board is
    /// full.
    pub fn spawn<R: Rng>(width: i32, height: i32, snake: &Snake, rng: &mut R) -> Option<Food> {
        let free: Vec<Cell> = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .filter(|&cell| !snake.occupies(cell))
            .collect();
        free.choose(rng).map(|&cell| Food::at(cell))
    }
}

impl Entity for Food {
    fn body(&self) -> &Body {
        &self.body
    }
    fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

// ── Game ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SnakeGame {
    config: SnakeConfig,
    /// Loop rate, used to turn moves-per-second into ticks.
    fps: u32,
    pub snake: Snake,
    /// `None` until the first tick places it, and after the board fills.
    pub food: Option<Food>,
    pub score: u32,
    /// Moves per second.
    pub speed: u32,
    stepper: Cadence,
}

impl SnakeGame {
    pub fn new(config: SnakeConfig, fps: u32) -> Self {
        let head = (config.grid_width as i32 / 2, config.grid_height as i32 / 2);
        let speed = config.start_speed;
        SnakeGame {
            snake: Snake::new(head),
            food: None,
            score: 0,
            speed,
            stepper: Cadence::new(ticks_per_step(fps, speed)),
            config,
            fps,
        }
    }

    pub fn config(&self) -> &SnakeConfig {
        &self.config
    }

    pub fn ticks_per_step(&self) -> u32 {
        self.stepper.threshold()
    }

    fn size(&self) -> (i32, i32) {
        (self.config.grid_width as i32, self.config.grid_height as i32)
    }

    fn eat<R: Rng>(&mut self, rng: &mut R) -> Outcome {
        self.snake.grow(1);
        let every = self.config.speed_up_every;
        let before = self.score;
        self.score += self.config.food_score;
        if before / every < self.score / every && self.speed < self.config.max_speed {
            self.speed += 1;
            self.stepper.set_threshold(ticks_per_step(self.fps, self.speed));
            debug!(speed = self.speed, "snake sped up");
        }
        let (w, h) = self.size();
        self.food = Food::spawn(w, h, &self.snake, rng);
        if self.food.is_none() {
            // Board full: nowhere left to go.
            return Outcome::Lost;
        }
        Outcome::Continue
    }
}

fn ticks_per_step(fps: u32, speed: u32) -> u32 {
    (fps / speed.max(1)).max(1)
}

impl Game for SnakeGame {
    fn title(&self) -> &'static str {
        "SNAKE"
    }

    fn hint(&self) -> &'static str {
        "Arrows / WASD : Steer   Esc : Menu   Q : Quit"
    }

    fn field(&self) -> Rect {
        let (w, h) = self.size();
        Rect::new(0.0, -HUD_ROWS, w as f32, h as f32 + HUD_ROWS)
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn reset(&mut self) {
        *self = SnakeGame::new(self.config.clone(), self.fps);
    }

    fn update<R: Rng>(&mut self, held: &HeldKeys, rng: &mut R) -> Outcome {
        let (w, h) = self.size();
        if self.food.is_none() {
            self.food = Food::spawn(w, h, &self.snake, rng);
        }

        self.snake.steer(held);
        if !self.stepper.advance() {
            return Outcome::Continue;
        }
        self.snake.step();

        if self.snake.hits_wall(w, h) || self.snake.hits_self() {
            return Outcome::Lost;
        }

        let head = cell_rect(self.snake.head());
        let ate = self
            .food
            .as_ref()
            .map_or(false, |food| food.is_active() && collides(&head, &food.rect()));
        if ate {
            return self.eat(rng);
        }
        Outcome::Continue
    }

    fn render<C: Canvas>(&self, canvas: &mut C, _theme: &Theme) -> io::Result<()> {
        if let Some(food) = self.food.as_ref().filter(|f| f.is_active()) {
            canvas.draw_rect(&food.rect(), C_FOOD)?;
        }
        let (w, h) = self.size();
        for (i, &(x, y)) in self.snake.segments.iter().enumerate() {
            // A head that just crashed through the wall stays undrawn.
            if x < 0 || x >= w || y < 0 || y >= h {
                continue;
            }
            let color = if i == 0 { C_HEAD } else { C_BODY };
            canvas.draw_rect(&cell_rect((x, y)), color)?;
        }

        canvas.draw_text(
            &format!("Score: {}", self.score),
            0.0,
            -HUD_ROWS,
            TextStyle::new(C_HUD_SCORE),
        )?;
        canvas.draw_text(
            &format!("Length: {}  Speed: {}", self.snake.len(), self.speed),
            0.0,
            -HUD_ROWS + 1.0,
            TextStyle::new(C_HUD_INFO),
        )
    }
}
