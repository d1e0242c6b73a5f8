/// Vertical plane shooter.
///
/// Tick order: player (move, fire) → spawners → every entity advances →
/// collisions → prune.

use std::io;

use rand::Rng;
use tracing::debug;

use crate::collision::{collides, first_hit, Rect};
use crate::config::ShooterConfig;
use crate::display::{Align, Canvas, Color, TextStyle, Theme};
use crate::entities::{
    prune, Bullet, BulletOwner, Enemy, EnemyKind, EnemyTable, Entity, Explosion, Player, PowerUp,
    PowerUpKind, PowerUpTable,
};
use crate::game::{Game, Outcome};
use crate::input::{HeldKeys, Key};
use crate::spawner::Spawner;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_PLAYER: Color = Color::White;
const C_PLAYER_SHIELDED: Color = Color::Cyan;
const C_ENEMY_BASIC: Color = Color::Red;
const C_ENEMY_FAST: Color = Color::DarkYellow;
const C_ENEMY_TOUGH: Color = Color::Magenta;
const C_BULLET_PLAYER: Color = Color::Green;
const C_BULLET_ENEMY: Color = Color::Red;
const C_EXPLOSION_HOT: Color = Color::Yellow;
const C_EXPLOSION_COOL: Color = Color::DarkRed;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HEALTH: Color = Color::Red;
const C_HUD_BOOST: Color = Color::Cyan;

/// Score for picking up a health pack.
const HEALTH_PICKUP_SCORE: u32 = 50;

#[derive(Clone, Debug)]
pub struct Shooter {
    config: ShooterConfig,
    field: Rect,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    /// Player and enemy bullets together; `owner` tells them apart.
    pub bullets: Vec<Bullet>,
    pub powerups: Vec<PowerUp>,
    pub explosions: Vec<Explosion>,
    enemy_spawner: Spawner<EnemyTable>,
    powerup_spawner: Spawner<PowerUpTable>,
    pub score: u32,
    pub difficulty: f32,
    pub frame: u64,
}

impl Shooter {
    pub fn new(config: ShooterConfig) -> Self {
        let field = Rect::new(0.0, 0.0, config.field_width, config.field_height);
        let enemy_spawner = Spawner::new(config.enemy_spawn_rate, EnemyTable::from_config(&config));
        let powerup_spawner = Spawner::new(
            config.powerup_spawn_rate,
            PowerUpTable {
                size: config.powerup_size,
                speed: config.powerup_speed,
            },
        );
        Shooter {
            player: Player::spawn(&config, &field),
            enemies: Vec::new(),
            bullets: Vec::new(),
            powerups: Vec::new(),
            explosions: Vec::new(),
            enemy_spawner,
            powerup_spawner,
            score: 0,
            difficulty: 1.0,
            frame: 0,
            config,
            field,
        }
    }

    pub fn config(&self) -> &ShooterConfig {
        &self.config
    }

    pub fn enemy_spawner(&self) -> &Spawner<EnemyTable> {
        &self.enemy_spawner
    }

    pub fn powerup_spawner(&self) -> &Spawner<PowerUpTable> {
        &self.powerup_spawner
    }

    /// Whole difficulty steps completed, counted from 1.
    pub fn level(&self) -> u32 {
        self.difficulty as u32 + 1
    }

    /// Difficulty grows linearly with time and speeds up enemy spawning.
    fn ramp_difficulty(&mut self) {
        let c = &self.config;
        self.difficulty = (1.0 + self.frame as f32 * c.difficulty_step).min(c.max_difficulty);
        let threshold = (c.enemy_spawn_rate as f32 / self.difficulty).round() as u32;
        self.enemy_spawner.set_threshold(threshold.max(1));
        self.enemy_spawner.table_mut().difficulty = self.difficulty;
    }

    fn spawn<R: Rng>(&mut self, rng: &mut R) {
        if let Some(enemy) = self.enemy_spawner.tick(&self.field, rng) {
            debug!(kind = ?enemy.kind, x = enemy.body.x, "enemy spawned");
            self.enemies.push(enemy);
        }
        if let Some(powerup) = self.powerup_spawner.tick(&self.field, rng) {
            debug!(kind = ?powerup.kind, "power-up spawned");
            self.powerups.push(powerup);
        }
    }

    fn advance<R: Rng>(&mut self, rng: &mut R) {
        let field = self.field;
        for bullet in &mut self.bullets {
            bullet.update(&field);
        }

        let chance = self.config.enemy_fire_chance * f64::from(self.difficulty);
        let mut fired = Vec::new();
        for enemy in &mut self.enemies {
            enemy.update(&field);
            if enemy.is_active() {
                if let Some(bullet) = enemy.try_fire(&self.config, chance, rng) {
                    fired.push(bullet);
                }
            }
        }
        self.bullets.extend(fired);

        for powerup in &mut self.powerups {
            powerup.update(&field);
        }
        for explosion in &mut self.explosions {
            explosion.update();
        }
    }

    /// Resolve every collision pair for this tick.  Returns `true` when the
    /// player ran out of health.
    fn resolve_collisions(&mut self) -> bool {
        let explosion_frames = self.config.explosion_frames;
        let mut dead = false;

        // ── Player bullets ↔ enemies ─────────────────────────────────────────
        for bullet in self
            .bullets
            .iter_mut()
            .filter(|b| b.is_active() && b.owner == BulletOwner::Player)
        {
            let Some(index) = first_hit(&bullet.rect(), &self.enemies) else {
                continue;
            };
            bullet.deactivate();
            let enemy = &mut self.enemies[index];
            if enemy.take_damage(bullet.damage) {
                self.score += enemy.kind.score();
                self.explosions
                    .push(Explosion::at(&enemy.rect(), explosion_frames));
            }
        }

        // ── Enemy bullets ↔ player ───────────────────────────────────────────
        let player_rect = self.player.rect();
        for bullet in self
            .bullets
            .iter_mut()
            .filter(|b| b.is_active() && b.owner == BulletOwner::Enemy)
        {
            if collides(&bullet.rect(), &player_rect) {
                bullet.deactivate();
                dead |= self.player.take_hit();
            }
        }

        // ── Enemies ↔ player ─────────────────────────────────────────────────
        for enemy in self.enemies.iter_mut().filter(|e| e.is_active()) {
            if collides(&enemy.rect(), &player_rect) {
                enemy.deactivate();
                self.score += enemy.kind.score();
                self.explosions
                    .push(Explosion::at(&enemy.rect(), explosion_frames));
                dead |= self.player.take_hit();
            }
        }

        // ── Power-ups ↔ player ───────────────────────────────────────────────
        for i in 0..self.powerups.len() {
            if self.powerups[i].is_active() && collides(&self.powerups[i].rect(), &player_rect) {
                self.powerups[i].deactivate();
                let kind = self.powerups[i].kind;
                self.apply_powerup(kind);
            }
        }

        if dead {
            self.explosions
                .push(Explosion::at(&player_rect, explosion_frames * 2));
        }
        dead
    }

    pub fn apply_powerup(&mut self, kind: PowerUpKind) {
        let duration = self.config.powerup_duration;
        match kind {
            PowerUpKind::Health => {
                self.player.heal(1);
                self.score += HEALTH_PICKUP_SCORE;
            }
            PowerUpKind::Speed => self.player.speed_boost = duration,
            PowerUpKind::FireRate => self.player.rapid_fire = duration,
            PowerUpKind::Shield => self.player.shield = duration,
        }
        debug!(?kind, "power-up collected");
    }

    fn prune_all(&mut self) {
        prune(&mut self.bullets);
        prune(&mut self.enemies);
        prune(&mut self.powerups);
        prune(&mut self.explosions);
    }

    fn draw_hud<C: Canvas>(&self, canvas: &mut C, theme: &Theme) -> io::Result<()> {
        let margin = 10.0;
        canvas.draw_text(
            &format!("Score:{:>6}", self.score),
            margin,
            margin,
            TextStyle::new(C_HUD_SCORE),
        )?;
        canvas.draw_text(
            &format!("Level {}", self.level()),
            self.field.center_x(),
            margin,
            TextStyle::new(Color::Green).align(Align::Center),
        )?;
        let hearts = theme.glyphs.heart.repeat(self.player.health as usize);
        canvas.draw_text(
            &format!("Health:{}", hearts),
            self.field.right() - margin,
            margin,
            TextStyle::new(C_HUD_HEALTH).align(Align::Right),
        )?;

        let boosts: Vec<&str> = [
            (self.player.shield, "SHIELD"),
            (self.player.speed_boost, "SPEED"),
            (self.player.rapid_fire, "RAPID"),
        ]
        .iter()
        .filter(|(ticks, _)| *ticks > 0)
        .map(|(_, name)| *name)
        .collect();
        if !boosts.is_empty() {
            canvas.draw_text(
                &format!("[{}]", boosts.join(" ")),
                self.field.right() - margin,
                margin + self.field.h / 20.0,
                TextStyle::new(C_HUD_BOOST).align(Align::Right),
            )?;
        }
        Ok(())
    }
}

fn enemy_color(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Basic => C_ENEMY_BASIC,
        EnemyKind::Fast => C_ENEMY_FAST,
        EnemyKind::Tough => C_ENEMY_TOUGH,
    }
}

fn powerup_color(kind: PowerUpKind) -> Color {
    match kind {
        PowerUpKind::Health => Color::Green,
        PowerUpKind::Speed => Color::Yellow,
        PowerUpKind::FireRate => Color::Blue,
        PowerUpKind::Shield => Color::Cyan,
    }
}

impl Game for Shooter {
    fn title(&self) -> &'static str {
        "PLANE  SHOOTER"
    }

    fn hint(&self) -> &'static str {
        "Arrows / WASD : Move   SPACE : Shoot   Esc : Menu   Q : Quit"
    }

    fn field(&self) -> Rect {
        self.field
    }

    fn score(&self) -> u32 {
        self.score
    }

    fn reset(&mut self) {
        *self = Shooter::new(self.config.clone());
    }

    fn update<R: Rng>(&mut self, held: &HeldKeys, rng: &mut R) -> Outcome {
        self.frame += 1;
        self.ramp_difficulty();

        // ── 1. Player ────────────────────────────────────────────────────────
        self.player.update(held, &self.field);
        if held.is_held(Key::Fire) {
            if let Some(bullet) = self.player.try_fire(&self.config) {
                self.bullets.push(bullet);
            }
        }

        // ── 2. Spawners ──────────────────────────────────────────────────────
        self.spawn(rng);

        // ── 3. Movement ──────────────────────────────────────────────────────
        self.advance(rng);

        // ── 4. Collisions ────────────────────────────────────────────────────
        let dead = self.resolve_collisions();

        // ── 5. Prune ─────────────────────────────────────────────────────────
        self.prune_all();

        if dead {
            Outcome::Lost
        } else {
            Outcome::Continue
        }
    }

    fn render<C: Canvas>(&self, canvas: &mut C, theme: &Theme) -> io::Result<()> {
        for explosion in self.explosions.iter().filter(|e| e.is_active()) {
            let color = if explosion.remaining() > 0.5 {
                C_EXPLOSION_HOT
            } else {
                C_EXPLOSION_COOL
            };
            canvas.draw_rect(&explosion.rect(), color)?;
        }
        for powerup in self.powerups.iter().filter(|p| p.is_active()) {
            canvas.draw_rect(&powerup.rect(), powerup_color(powerup.kind))?;
        }
        for enemy in self.enemies.iter().filter(|e| e.is_active()) {
            canvas.draw_rect(&enemy.rect(), enemy_color(enemy.kind))?;
        }
        for bullet in self.bullets.iter().filter(|b| b.is_active()) {
            let color = match bullet.owner {
                BulletOwner::Player => C_BULLET_PLAYER,
                BulletOwner::Enemy => C_BULLET_ENEMY,
            };
            canvas.draw_rect(&bullet.rect(), color)?;
        }
        if self.player.health > 0 {
            let color = if self.player.shield > 0 {
                C_PLAYER_SHIELDED
            } else {
                C_PLAYER
            };
            canvas.draw_rect(&self.player.rect(), color)?;
        }
        self.draw_hud(canvas, theme)
    }
}
