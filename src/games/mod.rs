/// The three cabinet games.

pub mod shooter;
pub mod snake;
pub mod tetris;
pub mod tetromino;

pub use shooter::Shooter;
pub use snake::SnakeGame;
pub use tetris::Tetris;
