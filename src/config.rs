/// Tunables for the cabinet and each game, loaded once at startup from TOML.
///
/// Every section carries `#[serde(default)]`, so a config file only has to
/// name the values it changes.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ArcadeError, Result};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "ARCADE_CONFIG";
/// File looked up in the working directory when `ARCADE_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "arcade.toml";
/// Largest accepted width or height for the grid games.
pub const MAX_GRID_SIDE: u32 = 256;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub shooter: ShooterConfig,
    pub snake: SnakeConfig,
    pub tetris: TetrisConfig,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphMode {
    /// Unicode when the locale advertises UTF-8, ASCII otherwise.
    Auto,
    Unicode,
    Ascii,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Target loop rate in ticks per second.
    pub fps: u32,
    pub glyphs: GlyphMode,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            fps: 60,
            glyphs: GlyphMode::Auto,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShooterConfig {
    pub field_width: f32,
    pub field_height: f32,

    pub player_width: f32,
    pub player_height: f32,
    pub player_speed: f32,
    pub player_health: u32,
    pub max_health: u32,
    /// Ticks between player shots.
    pub fire_cooldown: u32,

    pub bullet_width: f32,
    pub bullet_height: f32,
    pub bullet_speed: f32,

    pub enemy_width: f32,
    pub enemy_height: f32,
    pub enemy_speed_min: f32,
    pub enemy_speed_max: f32,
    /// Ticks between enemy spawns at difficulty 1.0.
    pub enemy_spawn_rate: u32,
    pub enemy_bullet_speed: f32,
    /// Per-tick chance that a ready enemy fires.
    pub enemy_fire_chance: f64,

    /// Difficulty gained per tick, capped at `max_difficulty`.
    pub difficulty_step: f32,
    pub max_difficulty: f32,

    pub powerup_spawn_rate: u32,
    /// Ticks a timed power-up stays in effect.
    pub powerup_duration: u32,
    pub powerup_size: f32,
    pub powerup_speed: f32,

    pub explosion_frames: u32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        ShooterConfig {
            field_width: 800.0,
            field_height: 600.0,
            player_width: 50.0,
            player_height: 40.0,
            player_speed: 5.0,
            player_health: 3,
            max_health: 5,
            fire_cooldown: 12,
            bullet_width: 5.0,
            bullet_height: 15.0,
            bullet_speed: 8.0,
            enemy_width: 40.0,
            enemy_height: 40.0,
            enemy_speed_min: 1.0,
            enemy_speed_max: 3.0,
            enemy_spawn_rate: 60,
            enemy_bullet_speed: 4.0,
            enemy_fire_chance: 0.01,
            difficulty_step: 0.001,
            max_difficulty: 5.0,
            powerup_spawn_rate: 300,
            powerup_duration: 300,
            powerup_size: 20.0,
            powerup_speed: 2.0,
            explosion_frames: 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnakeConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    /// Moves per second at the start of a run.
    pub start_speed: u32,
    pub max_speed: u32,
    pub food_score: u32,
    /// Speed goes up by one every time the score crosses a multiple of this.
    pub speed_up_every: u32,
}

impl Default for SnakeConfig {
    fn default() -> Self {
        SnakeConfig {
            grid_width: 30,
            grid_height: 20,
            start_speed: 4,
            max_speed: 20,
            food_score: 10,
            speed_up_every: 100,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetrisConfig {
    pub grid_width: u32,
    pub grid_height: u32,
    /// Ticks per gravity step at level 1.
    pub base_gravity: u32,
    /// Ticks shaved off the gravity interval per level.
    pub gravity_step: u32,
    pub min_gravity: u32,
    pub score_per_line: u32,
    pub score_tetris: u32,
    pub lines_per_level: u32,
}

impl Default for TetrisConfig {
    fn default() -> Self {
        TetrisConfig {
            grid_width: 10,
            grid_height: 20,
            base_gravity: 30,
            gravity_step: 3,
            min_gravity: 6,
            score_per_line: 100,
            score_tetris: 800,
            lines_per_level: 10,
        }
    }
}

impl Config {
    /// Parse a TOML document and validate it.
    pub fn from_toml_str(text: &str) -> Result<Config> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path)?;
        Config::from_toml_str(&text)
    }

    /// Load from `ARCADE_CONFIG` (or `arcade.toml`), falling back to the
    /// defaults when the file is missing or broken.  Never fails.
    pub fn load_or_default() -> Config {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Config::load_or_default_from(&path)
    }

    pub fn load_or_default_from(path: &Path) -> Config {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Config::default();
        }
        match Config::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded config");
                config
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "bad config, using defaults");
                Config::default()
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        positive("display.fps", self.display.fps)?;

        let s = &self.shooter;
        positive_f("shooter.field_width", s.field_width)?;
        positive_f("shooter.field_height", s.field_height)?;
        positive_f("shooter.player_width", s.player_width)?;
        positive_f("shooter.player_height", s.player_height)?;
        positive_f("shooter.enemy_width", s.enemy_width)?;
        positive_f("shooter.enemy_height", s.enemy_height)?;
        positive_f("shooter.bullet_width", s.bullet_width)?;
        positive_f("shooter.bullet_height", s.bullet_height)?;
        positive_f("shooter.powerup_size", s.powerup_size)?;
        positive_f("shooter.player_speed", s.player_speed)?;
        positive_f("shooter.bullet_speed", s.bullet_speed)?;
        positive_f("shooter.enemy_bullet_speed", s.enemy_bullet_speed)?;
        positive_f("shooter.powerup_speed", s.powerup_speed)?;
        positive_f("shooter.enemy_speed_min", s.enemy_speed_min)?;
        positive_f("shooter.enemy_speed_max", s.enemy_speed_max)?;
        positive("shooter.player_health", s.player_health)?;
        positive("shooter.enemy_spawn_rate", s.enemy_spawn_rate)?;
        positive("shooter.powerup_spawn_rate", s.powerup_spawn_rate)?;
        if s.enemy_speed_min >= s.enemy_speed_max {
            return Err(ArcadeError::InvalidConfig {
                key: "shooter.enemy_speed_min",
                reason: format!(
                    "must be below enemy_speed_max ({} >= {})",
                    s.enemy_speed_min, s.enemy_speed_max
                ),
            });
        }
        if !(0.0..=1.0).contains(&s.enemy_fire_chance) {
            return Err(ArcadeError::InvalidConfig {
                key: "shooter.enemy_fire_chance",
                reason: format!("must be within 0..=1, got {}", s.enemy_fire_chance),
            });
        }
        if !(s.difficulty_step.is_finite() && s.difficulty_step >= 0.0) {
            return Err(ArcadeError::InvalidConfig {
                key: "shooter.difficulty_step",
                reason: format!("must be finite and at least 0, got {}", s.difficulty_step),
            });
        }
        if !(s.max_difficulty.is_finite() && s.max_difficulty >= 1.0) {
            return Err(ArcadeError::InvalidConfig {
                key: "shooter.max_difficulty",
                reason: format!("must be finite and at least 1.0, got {}", s.max_difficulty),
            });
        }

        let n = &self.snake;
        grid_side("snake.grid_width", n.grid_width)?;
        grid_side("snake.grid_height", n.grid_height)?;
        // Food needs at least one free cell next to a length-1 snake.
        if n.grid_width.checked_mul(n.grid_height).map_or(true, |cells| cells < 2) {
            return Err(ArcadeError::InvalidConfig {
                key: "snake.grid_width",
                reason: "grid must have at least two cells".to_string(),
            });
        }
        positive("snake.start_speed", n.start_speed)?;
        positive("snake.speed_up_every", n.speed_up_every)?;
        if n.max_speed < n.start_speed {
            return Err(ArcadeError::InvalidConfig {
                key: "snake.max_speed",
                reason: format!("must be at least start_speed ({})", n.start_speed),
            });
        }

        let t = &self.tetris;
        // Pieces spawn inside a 4x4 box anchored two columns left of centre.
        if t.grid_width < 4 || t.grid_height < 4 {
            return Err(ArcadeError::InvalidConfig {
                key: "tetris.grid_width",
                reason: "grid must be at least 4x4".to_string(),
            });
        }
        grid_side("tetris.grid_width", t.grid_width)?;
        grid_side("tetris.grid_height", t.grid_height)?;
        positive("tetris.min_gravity", t.min_gravity)?;
        positive("tetris.lines_per_level", t.lines_per_level)?;

        Ok(())
    }
}

fn positive(key: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(ArcadeError::InvalidConfig {
            key,
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

fn positive_f(key: &'static str, value: f32) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ArcadeError::InvalidConfig {
            key,
            reason: format!("must be finite and greater than zero, got {}", value),
        });
    }
    Ok(())
}

fn grid_side(key: &'static str, value: u32) -> Result<()> {
    if value > MAX_GRID_SIDE {
        return Err(ArcadeError::InvalidConfig {
            key,
            reason: format!("must be at most {}, got {}", MAX_GRID_SIDE, value),
        });
    }
    Ok(())
}
