/// The seven tetrominoes and their four rotation states.

use rand::Rng;

use crate::display::Color;

pub type Offsets = [(i32, i32); 4];

/// Cells of each rotation, as (column, row) offsets inside a 4×4 box.
/// Order: I, J, L, O, S, T, Z.
pub const SHAPES: [[Offsets; 4]; 7] = [
    // I
    [
        [(0, 1), (1, 1), (2, 1), (3, 1)],
        [(2, 0), (2, 1), (2, 2), (2, 3)],
        [(0, 2), (1, 2), (2, 2), (3, 2)],
        [(1, 0), (1, 1), (1, 2), (1, 3)],
    ],
    // J
    [
        [(0, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (2, 2)],
        [(1, 0), (1, 1), (0, 2), (1, 2)],
    ],
    // L
    [
        [(2, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (1, 2), (2, 2)],
        [(0, 1), (1, 1), (2, 1), (0, 2)],
        [(0, 0), (1, 0), (1, 1), (1, 2)],
    ],
    // O
    [
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
        [(1, 0), (2, 0), (1, 1), (2, 1)],
    ],
    // S
    [
        [(1, 0), (2, 0), (0, 1), (1, 1)],
        [(1, 0), (1, 1), (2, 1), (2, 2)],
        [(1, 1), (2, 1), (0, 2), (1, 2)],
        [(0, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // T
    [
        [(1, 0), (0, 1), (1, 1), (2, 1)],
        [(1, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (2, 1), (1, 2)],
        [(1, 0), (0, 1), (1, 1), (1, 2)],
    ],
    // Z
    [
        [(0, 0), (1, 0), (1, 1), (2, 1)],
        [(2, 0), (1, 1), (2, 1), (1, 2)],
        [(0, 1), (1, 1), (1, 2), (2, 2)],
        [(1, 0), (0, 1), (1, 1), (0, 2)],
    ],
];

/// Colour for a grid value (`1..=7`); anything else is empty.
pub fn color_of(value: u8) -> Color {
    match value {
        1 => Color::Cyan,
        2 => Color::Blue,
        3 => Color::DarkYellow,
        4 => Color::Yellow,
        5 => Color::Green,
        6 => Color::Magenta,
        7 => Color::Red,
        _ => Color::Black,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tetromino {
    /// Index into `SHAPES`.
    pub shape: usize,
    pub rotation: usize,
    pub x: i32,
    pub y: i32,
}

impl Tetromino {
    /// Anchored two columns left of centre on the top row.
    pub fn new(shape: usize, grid_width: u32) -> Self {
        Tetromino {
            shape: shape % SHAPES.len(),
            rotation: 0,
            x: grid_width as i32 / 2 - 2,
            y: 0,
        }
    }

    pub fn random<R: Rng>(rng: &mut R, grid_width: u32) -> Self {
        Tetromino::new(rng.gen_range(0..SHAPES.len()), grid_width)
    }

    /// Grid value written when this piece locks.
    pub fn value(&self) -> u8 {
        self.shape as u8 + 1
    }

    pub fn color(&self) -> Color {
        color_of(self.value())
    }

    /// Absolute grid cells covered in the current rotation.
    pub fn cells(&self) -> [(i32, i32); 4] {
        SHAPES[self.shape][self.rotation].map(|(dx, dy)| (self.x + dx, self.y + dy))
    }

    pub fn rotated(&self) -> Self {
        Tetromino {
            rotation: (self.rotation + 1) % 4,
            ..*self
        }
    }

    pub fn shifted(&self, dx: i32, dy: i32) -> Self {
        Tetromino {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}
