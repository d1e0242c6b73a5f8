pub mod collision;
pub mod config;
pub mod display;
pub mod entities;
pub mod error;
pub mod game;
pub mod game_loop;
pub mod games;
pub mod input;
pub mod spawner;
pub mod state;
