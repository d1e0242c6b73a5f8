/// crossterm backend.  All terminal I/O lives here.
///
/// Screen layout (rows):
///   0        title
///   1        top border
///   2..h-2   play field, scaled from logical units to cells
///   h-2      bottom border
///   h-1      controls hint

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::mpsc;

use crossterm::{
    cursor,
    event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    style::{self, Attribute, Color, Print},
    terminal, QueueableCommand,
};

use super::{Align, Backend, Canvas, Frame, TextSize, TextStyle, Theme};
use crate::collision::Rect;
use crate::input::{HeldKeys, InputEvent, Key};

const C_BORDER: Color = Color::DarkBlue;
const C_TITLE: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;

/// A key counts as held if its last press/repeat arrived within this many
/// frames.  Covers terminals that never send key-release events: OS key
/// repeat is at least 15 Hz, so an 8-frame window at 60 FPS (≈133 ms) is
/// refreshed before it expires.
const HOLD_WINDOW: u64 = 8;

/// Translate a crossterm key into the cabinet's vocabulary.  Returns `None`
/// for keys nothing listens to.
pub fn map_key(code: KeyCode, modifiers: KeyModifiers) -> Option<InputEvent> {
    let key = match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
            return Some(InputEvent::Quit);
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => return Some(InputEvent::Quit),
        KeyCode::Esc => return Some(InputEvent::Back),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Key::Left,
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Key::Right,
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Key::Up,
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Key::Down,
        KeyCode::Char(' ') => Key::Fire,
        KeyCode::Char('p') | KeyCode::Char('P') => Key::Pause,
        KeyCode::Char('r') | KeyCode::Char('R') => Key::Restart,
        KeyCode::Enter => Key::Char('\n'),
        KeyCode::Char(c) => Key::Char(c),
        _ => return None,
    };
    Some(InputEvent::KeyDown(key))
}

// ── Viewport ──────────────────────────────────────────────────────────────────

/// Maps logical field coordinates onto the cell grid inside the border.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub field: Rect,
    pub col0: u16,
    pub row0: u16,
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn new(field: Rect, width: u16, height: u16) -> Self {
        Viewport {
            field,
            col0: 1,
            row0: 2,
            cols: width.saturating_sub(2).max(1),
            rows: height.saturating_sub(4).max(1),
        }
    }

    fn scale_x(&self, x: f32) -> f32 {
        (x - self.field.x) * self.cols as f32 / self.field.w
    }

    fn scale_y(&self, y: f32) -> f32 {
        (y - self.field.y) * self.rows as f32 / self.field.h
    }

    /// Cell span covered by `rect`, clipped to the viewport.  Every visible
    /// rectangle covers at least one cell.
    pub fn cells(&self, rect: &Rect) -> Option<(u16, u16, u16, u16)> {
        let left = self.scale_x(rect.x).floor();
        let top = self.scale_y(rect.y).floor();
        let right = self.scale_x(rect.right()).ceil().max(left + 1.0);
        let bottom = self.scale_y(rect.bottom()).ceil().max(top + 1.0);

        let left = left.max(0.0);
        let top = top.max(0.0);
        let right = right.min(self.cols as f32);
        let bottom = bottom.min(self.rows as f32);
        if left >= right || top >= bottom {
            return None;
        }
        Some((
            self.col0 + left as u16,
            self.row0 + top as u16,
            (right - left) as u16,
            (bottom - top) as u16,
        ))
    }

    /// Cell holding a logical point, if it lies inside the viewport.
    pub fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let col = self.scale_x(x).floor();
        let row = self.scale_y(y).floor();
        if col < 0.0 || row < 0.0 || col >= self.cols as f32 || row >= self.rows as f32 {
            return None;
        }
        Some((self.col0 + col as u16, self.row0 + row as u16))
    }
}

// ── Backend ───────────────────────────────────────────────────────────────────

pub struct TerminalBackend<W: Write> {
    out: W,
    rx: mpsc::Receiver<Event>,
    theme: Theme,
    width: u16,
    height: u16,
    viewport: Viewport,
    /// Frame number at which each held key was last seen.
    key_frame: HashMap<Key, u64>,
    held: HeldKeys,
    frame: u64,
}

impl<W: Write> TerminalBackend<W> {
    /// `rx` carries raw terminal events from a dedicated reader thread.
    pub fn new(out: W, rx: mpsc::Receiver<Event>, theme: Theme) -> io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(TerminalBackend {
            out,
            rx,
            theme,
            width,
            height,
            viewport: Viewport::new(Rect::new(0.0, 0.0, 1.0, 1.0), width, height),
            key_frame: HashMap::new(),
            held: HeldKeys::new(),
            frame: 0,
        })
    }

    pub fn writer(&mut self) -> &mut W {
        &mut self.out
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Block until the next mapped key press.  `None` once the reader
    /// thread has gone away.
    pub fn wait_event(&mut self) -> Option<InputEvent> {
        loop {
            match self.rx.recv() {
                Ok(Event::Key(KeyEvent {
                    code,
                    kind: KeyEventKind::Press,
                    modifiers,
                    ..
                })) => {
                    if let Some(event) = map_key(code, modifiers) {
                        return Some(event);
                    }
                }
                Ok(Event::Resize(width, height)) => {
                    self.width = width;
                    self.height = height;
                }
                Ok(_) => {}
                Err(_) => return None,
            }
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn draw_border(&mut self) -> io::Result<()> {
        let [tl, tr, bl, br, hz, vt] = self.theme.glyphs.frame;
        let w = self.width as usize;
        let h = self.height;
        let bar: String = std::iter::repeat(hz).take(w.saturating_sub(2)).collect();

        self.out.queue(style::SetForegroundColor(C_BORDER))?;
        self.out.queue(cursor::MoveTo(0, 1))?;
        self.out.queue(Print(format!("{}{}{}", tl, bar, tr)))?;
        self.out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
        self.out.queue(Print(format!("{}{}{}", bl, bar, br)))?;
        for row in 2..h.saturating_sub(2) {
            self.out.queue(cursor::MoveTo(0, row))?;
            self.out.queue(Print(vt))?;
            self.out.queue(cursor::MoveTo(self.width.saturating_sub(1), row))?;
            self.out.queue(Print(vt))?;
        }
        Ok(())
    }
}

impl<W: Write> Canvas for TerminalBackend<W> {
    fn draw_rect(&mut self, rect: &Rect, color: Color) -> io::Result<()> {
        let Some((col, row, cols, rows)) = self.viewport.cells(rect) else {
            return Ok(());
        };
        let line: String = std::iter::repeat(self.theme.glyphs.fill)
            .take(cols as usize)
            .collect();
        self.out.queue(style::SetForegroundColor(color))?;
        for r in row..row + rows {
            self.out.queue(cursor::MoveTo(col, r))?;
            self.out.queue(Print(&line))?;
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, text_style: TextStyle) -> io::Result<()> {
        let Some((col, row)) = self.viewport.cell(x, y) else {
            return Ok(());
        };
        let len = text.chars().count() as u16;
        let col = match text_style.align {
            Align::Left => col,
            Align::Center => col.saturating_sub(len / 2),
            Align::Right => col.saturating_sub(len),
        }
        .max(self.viewport.col0);
        // Clip at the right border.
        let room = (self.viewport.col0 + self.viewport.cols).saturating_sub(col) as usize;
        let visible: String = text.chars().take(room).collect();

        self.out.queue(cursor::MoveTo(col, row))?;
        self.out.queue(style::SetForegroundColor(text_style.color))?;
        let bold = text_style.size == TextSize::Large && self.theme.bold_large;
        if bold {
            self.out.queue(style::SetAttribute(Attribute::Bold))?;
        }
        self.out.queue(Print(visible))?;
        if bold {
            self.out.queue(style::SetAttribute(Attribute::NormalIntensity))?;
        }
        Ok(())
    }
}

impl<W: Write> Backend for TerminalBackend<W> {
    fn begin_frame(&mut self, frame: &Frame<'_>) -> io::Result<()> {
        self.viewport = Viewport::new(frame.field, self.width, self.height);
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;

        self.draw_border()?;

        let title_col = (self.width / 2).saturating_sub(frame.title.chars().count() as u16 / 2);
        self.out.queue(cursor::MoveTo(title_col, 0))?;
        self.out.queue(style::SetForegroundColor(C_TITLE))?;
        self.out.queue(Print(frame.title))?;

        self.out.queue(cursor::MoveTo(1, self.height.saturating_sub(1)))?;
        self.out.queue(style::SetForegroundColor(C_HINT))?;
        self.out.queue(Print(frame.hint))?;
        Ok(())
    }

    /// Input model: rather than acting on each key event alone, remember the
    /// frame of the last press/repeat per key and treat every key seen within
    /// `HOLD_WINDOW` frames as held.  Terminals with keyboard enhancement
    /// report releases and drop keys at once; classic terminals only send
    /// repeated presses and let keys expire.
    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
        self.frame += 1;
        let mut events = Vec::new();

        while let Ok(event) = self.rx.try_recv() {
            match event {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => {
                    let Some(mapped) = map_key(code, modifiers) else {
                        continue;
                    };
                    match (kind, mapped) {
                        (KeyEventKind::Press, InputEvent::KeyDown(key)) => {
                            self.key_frame.insert(key, self.frame);
                            events.push(mapped);
                        }
                        (KeyEventKind::Press, other) => events.push(other),
                        (KeyEventKind::Repeat, InputEvent::KeyDown(key)) => {
                            self.key_frame.insert(key, self.frame);
                        }
                        (KeyEventKind::Release, InputEvent::KeyDown(key)) => {
                            self.key_frame.remove(&key);
                            events.push(InputEvent::KeyUp(key));
                        }
                        _ => {}
                    }
                }
                Event::Resize(width, height) => {
                    self.width = width;
                    self.height = height;
                }
                _ => {}
            }
        }

        let frame = self.frame;
        self.key_frame
            .retain(|_, last| frame.saturating_sub(*last) <= HOLD_WINDOW);
        self.held = self.key_frame.keys().copied().collect();
        Ok(events)
    }

    fn held_keys(&self) -> &HeldKeys {
        &self.held
    }

    fn present(&mut self) -> io::Result<()> {
        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, self.height.saturating_sub(1)))?;
        self.out.flush()
    }
}
