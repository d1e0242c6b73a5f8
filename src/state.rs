/// The START → PLAYING → GAME_OVER machine shared by every game.

use crate::input::Key;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Start,
    Playing,
    Paused,
    GameOver,
}

/// What a key press did to the machine.  The session resets the game on
/// `Restarted`; `None` means the key belongs to the game (or is ignored).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    None,
    Started,
    Paused,
    Resumed,
    Restarted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StateMachine {
    status: GameStatus,
    pausable: bool,
}

impl StateMachine {
    pub fn new(pausable: bool) -> Self {
        StateMachine {
            status: GameStatus::Start,
            pausable,
        }
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_playing(&self) -> bool {
        self.status == GameStatus::Playing
    }

    pub fn on_key(&mut self, key: Key) -> Transition {
        match (self.status, key) {
            (GameStatus::Start, _) => {
                self.status = GameStatus::Playing;
                Transition::Started
            }
            (GameStatus::Playing, Key::Pause) if self.pausable => {
                self.status = GameStatus::Paused;
                Transition::Paused
            }
            (GameStatus::Paused, Key::Pause) => {
                self.status = GameStatus::Playing;
                Transition::Resumed
            }
            (GameStatus::GameOver, Key::Restart) => {
                self.status = GameStatus::Playing;
                Transition::Restarted
            }
            _ => Transition::None,
        }
    }

    /// PLAYING → GAME_OVER.  No effect in any other state.
    pub fn finish(&mut self) -> bool {
        if self.status == GameStatus::Playing {
            self.status = GameStatus::GameOver;
            true
        } else {
            false
        }
    }
}
