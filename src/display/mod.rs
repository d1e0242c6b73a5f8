/// Rendering/input capability set consumed by the game loop.
///
/// Games only ever see `Canvas`; the loop drives the rest of `Backend`.
/// Coordinates are logical field units; each backend decides how they map
/// onto its own surface.

pub mod headless;
pub mod terminal;

use std::io;

pub use crossterm::style::Color;
use tracing::warn;

use crate::collision::Rect;
use crate::config::{DisplayConfig, GlyphMode};
use crate::input::{HeldKeys, InputEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Medium,
    Large,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextStyle {
    pub color: Color,
    pub size: TextSize,
    pub align: Align,
}

impl TextStyle {
    pub fn new(color: Color) -> Self {
        TextStyle {
            color,
            size: TextSize::Small,
            align: Align::Left,
        }
    }

    pub fn size(mut self, size: TextSize) -> Self {
        self.size = size;
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

pub trait Canvas {
    fn draw_rect(&mut self, rect: &Rect, color: Color) -> io::Result<()>;

    /// `x`/`y` anchor the text according to `style.align`.
    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) -> io::Result<()>;
}

/// Per-frame chrome around the play field.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame<'a> {
    pub field: Rect,
    pub title: &'a str,
    pub hint: &'a str,
}

pub trait Backend: Canvas {
    fn begin_frame(&mut self, frame: &Frame<'_>) -> io::Result<()>;

    /// Drain every pending event without blocking.
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>>;

    /// Keys held as of the last `poll_events`.
    fn held_keys(&self) -> &HeldKeys;

    fn present(&mut self) -> io::Result<()>;
}

// ── Theme ─────────────────────────────────────────────────────────────────────

/// Characters used for drawing.  The ASCII set is the fallback for
/// terminals whose locale cannot show the Unicode one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Glyphs {
    pub fill: char,
    pub heart: &'static str,
    pub star: &'static str,
    /// top-left, top-right, bottom-left, bottom-right, horizontal, vertical
    pub frame: [char; 6],
}

impl Glyphs {
    pub const UNICODE: Glyphs = Glyphs {
        fill: '█',
        heart: "♥",
        star: "★",
        frame: ['┌', '┐', '└', '┘', '─', '│'],
    };

    pub const ASCII: Glyphs = Glyphs {
        fill: '#',
        heart: "<3",
        star: "*",
        frame: ['+', '+', '+', '+', '-', '|'],
    };
}

/// Rendering configuration built once at startup and passed by reference
/// to whoever draws.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub glyphs: Glyphs,
    /// Render `TextSize::Large` in bold.
    pub bold_large: bool,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            glyphs: Glyphs::UNICODE,
            bold_large: true,
        }
    }
}

impl Theme {
    pub fn from_config(config: &DisplayConfig) -> Self {
        let unicode = match config.glyphs {
            GlyphMode::Unicode => true,
            GlyphMode::Ascii => false,
            GlyphMode::Auto => {
                let supported = locale_is_utf8();
                if !supported {
                    warn!("locale does not advertise UTF-8, falling back to ASCII glyphs");
                }
                supported
            }
        };
        Theme {
            glyphs: if unicode { Glyphs::UNICODE } else { Glyphs::ASCII },
            bold_large: true,
        }
    }

    pub fn ascii() -> Self {
        Theme {
            glyphs: Glyphs::ASCII,
            bold_large: true,
        }
    }
}

/// First of LC_ALL / LC_CTYPE / LANG that is set decides, as in POSIX.
fn locale_is_utf8() -> bool {
    ["LC_ALL", "LC_CTYPE", "LANG"]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.is_empty())
        .map(|value| {
            let value = value.to_ascii_lowercase();
            value.contains("utf-8") || value.contains("utf8")
        })
        .unwrap_or(false)
}
