/// Scripted backend: replays canned input one frame at a time and records
/// what gets drawn.  Once the script runs out it reports `Quit`.

use std::collections::VecDeque;
use std::io;

use super::{Backend, Canvas, Color, Frame, TextStyle};
use crate::collision::Rect;
use crate::input::{HeldKeys, InputEvent};

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCall {
    Rect { rect: Rect, color: Color },
    Text { text: String, x: f32, y: f32, style: TextStyle },
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    script: VecDeque<Vec<InputEvent>>,
    held: HeldKeys,
    current: Vec<DrawCall>,
    last_frame: Vec<DrawCall>,
    frames: u64,
    polls: u64,
}

impl HeadlessBackend {
    /// Each inner vec is delivered by one `poll_events` call.
    pub fn new(script: Vec<Vec<InputEvent>>) -> Self {
        HeadlessBackend {
            script: script.into(),
            ..Self::default()
        }
    }

    /// `frames` empty polls (no input, keys still held).
    pub fn idle(frames: usize) -> Vec<Vec<InputEvent>> {
        vec![Vec::new(); frames]
    }

    /// Frames presented so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn polls(&self) -> u64 {
        self.polls
    }

    /// Draw calls of the most recently presented frame.
    pub fn last_frame(&self) -> &[DrawCall] {
        &self.last_frame
    }

    pub fn texts(&self) -> Vec<&str> {
        self.last_frame
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn rects(&self) -> Vec<Rect> {
        self.last_frame
            .iter()
            .filter_map(|call| match call {
                DrawCall::Rect { rect, .. } => Some(*rect),
                _ => None,
            })
            .collect()
    }
}

impl Canvas for HeadlessBackend {
    fn draw_rect(&mut self, rect: &Rect, color: Color) -> io::Result<()> {
        self.current.push(DrawCall::Rect { rect: *rect, color });
        Ok(())
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, style: TextStyle) -> io::Result<()> {
        self.current.push(DrawCall::Text {
            text: text.to_string(),
            x,
            y,
            style,
        });
        Ok(())
    }
}

impl Backend for HeadlessBackend {
    fn begin_frame(&mut self, _frame: &Frame<'_>) -> io::Result<()> {
        self.current.clear();
        Ok(())
    }

    fn poll_events(&mut self) -> io::Result<Vec<InputEvent>> {
        self.polls += 1;
        let Some(events) = self.script.pop_front() else {
            return Ok(vec![InputEvent::Quit]);
        };
        for event in &events {
            match *event {
                InputEvent::KeyDown(key) => self.held.press(key),
                InputEvent::KeyUp(key) => self.held.release(key),
                _ => {}
            }
        }
        Ok(events)
    }

    fn held_keys(&self) -> &HeldKeys {
        &self.held
    }

    fn present(&mut self) -> io::Result<()> {
        self.last_frame = std::mem::take(&mut self.current);
        self.frames += 1;
        Ok(())
    }
}
