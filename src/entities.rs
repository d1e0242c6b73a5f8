/// Entity core shared by every game, plus the shooter's cast.
///
/// Positions are logical pixels (`f32`).  Every moving entity advances by its
/// own velocity and deactivates itself once it no longer overlaps the play
/// field; only the player is clamped instead.

use rand::Rng;

use crate::collision::{collides, Rect};
use crate::config::ShooterConfig;
use crate::input::HeldKeys;
use crate::spawner::SpawnTable;

// ── Body ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vx: f32,
    pub vy: f32,
    pub active: bool,
}

impl Body {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Body {
            x,
            y,
            w,
            h,
            vx: 0.0,
            vy: 0.0,
            active: true,
        }
    }

    pub fn with_velocity(mut self, vx: f32, vy: f32) -> Self {
        self.vx = vx;
        self.vy = vy;
        self
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Move by one tick of velocity; deactivate when fully outside `field`.
    pub fn advance(&mut self, field: &Rect) {
        self.x += self.vx;
        self.y += self.vy;
        if !collides(&self.rect(), field) {
            self.active = false;
        }
    }

    /// Keep the whole rectangle inside `field`.
    pub fn clamp_to(&mut self, field: &Rect) {
        self.x = self.x.clamp(field.x, (field.right() - self.w).max(field.x));
        self.y = self.y.clamp(field.y, (field.bottom() - self.h).max(field.y));
    }
}

/// Anything that owns a `Body`.
pub trait Entity {
    fn body(&self) -> &Body;
    fn body_mut(&mut self) -> &mut Body;

    fn rect(&self) -> Rect {
        self.body().rect()
    }

    fn is_active(&self) -> bool {
        self.body().active
    }

    fn deactivate(&mut self) {
        self.body_mut().active = false;
    }
}

/// Drop inactive entities; returns how many were removed.
pub fn prune<E: Entity>(items: &mut Vec<E>) -> usize {
    let before = items.len();
    items.retain(|e| e.is_active());
    before - items.len()
}

macro_rules! impl_entity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Entity for $ty {
                fn body(&self) -> &Body {
                    &self.body
                }
                fn body_mut(&mut self) -> &mut Body {
                    &mut self.body
                }
            }
        )*
    };
}

impl_entity!(Player, Bullet, Enemy, PowerUp, Explosion);

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BulletOwner {
    Player,
    Enemy,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bullet {
    pub body: Body,
    pub owner: BulletOwner,
    pub damage: u32,
}

impl Bullet {
    pub fn new(body: Body, owner: BulletOwner) -> Self {
        Bullet {
            body,
            owner,
            damage: 1,
        }
    }

    pub fn update(&mut self, field: &Rect) {
        self.body.advance(field);
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub body: Body,
    pub speed: f32,
    pub health: u32,
    pub max_health: u32,
    /// Ticks between shots without power-ups.
    pub fire_cooldown: u32,
    /// Ticks until the next shot is allowed.
    pub cooldown: u32,
    /// Remaining ticks of each timed power-up.
    pub speed_boost: u32,
    pub rapid_fire: u32,
    pub shield: u32,
}

impl Player {
    /// Centred horizontally, 20 px above the bottom of the field.
    pub fn spawn(config: &ShooterConfig, field: &Rect) -> Self {
        let x = field.center_x() - config.player_width / 2.0;
        let y = field.bottom() - config.player_height - 20.0;
        Player {
            body: Body::new(x, y, config.player_width, config.player_height),
            speed: config.player_speed,
            health: config.player_health,
            max_health: config.max_health,
            fire_cooldown: config.fire_cooldown,
            cooldown: 0,
            speed_boost: 0,
            rapid_fire: 0,
            shield: 0,
        }
    }

    pub fn effective_speed(&self) -> f32 {
        if self.speed_boost > 0 {
            self.speed * 1.5
        } else {
            self.speed
        }
    }

    /// Move from held keys and clamp to the field; count down timers.
    pub fn update(&mut self, held: &HeldKeys, field: &Rect) {
        let speed = self.effective_speed();
        self.body.vx = f32::from(held.horizontal()) * speed;
        self.body.vy = f32::from(held.vertical()) * speed;
        self.body.x += self.body.vx;
        self.body.y += self.body.vy;
        self.body.clamp_to(field);

        self.cooldown = self.cooldown.saturating_sub(1);
        self.speed_boost = self.speed_boost.saturating_sub(1);
        self.rapid_fire = self.rapid_fire.saturating_sub(1);
        self.shield = self.shield.saturating_sub(1);
    }

    /// Fire from the nose if the cooldown allows.
    pub fn try_fire(&mut self, config: &ShooterConfig) -> Option<Bullet> {
        if self.cooldown > 0 {
            return None;
        }
        self.cooldown = if self.rapid_fire > 0 {
            (self.fire_cooldown / 2).max(1)
        } else {
            self.fire_cooldown
        };
        let x = self.body.rect().center_x() - config.bullet_width / 2.0;
        let y = self.body.y - config.bullet_height;
        let body = Body::new(x, y, config.bullet_width, config.bullet_height)
            .with_velocity(0.0, -config.bullet_speed);
        Some(Bullet::new(body, BulletOwner::Player))
    }

    /// Apply one hit.  Returns `true` when health reaches zero.
    pub fn take_hit(&mut self) -> bool {
        if self.shield == 0 {
            self.health = self.health.saturating_sub(1);
        }
        self.health == 0
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(self.max_health);
    }
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnemyKind {
    Basic,
    /// 1.5× speed.
    Fast,
    /// Takes two hits.
    Tough,
}

impl EnemyKind {
    pub fn score(self) -> u32 {
        match self {
            EnemyKind::Basic => 100,
            EnemyKind::Fast => 200,
            EnemyKind::Tough => 300,
        }
    }

    pub fn health(self) -> u32 {
        match self {
            EnemyKind::Tough => 2,
            _ => 1,
        }
    }

    pub fn speed_multiplier(self) -> f32 {
        match self {
            EnemyKind::Fast => 1.5,
            _ => 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub body: Body,
    pub kind: EnemyKind,
    pub health: u32,
    /// Ticks since the last shot.
    pub fire_timer: u32,
    /// Minimum ticks between shots, re-rolled after each one.
    pub fire_delay: u32,
}

impl Enemy {
    pub fn new(body: Body, kind: EnemyKind) -> Self {
        Enemy {
            body,
            kind,
            health: kind.health(),
            fire_timer: 0,
            fire_delay: 120,
        }
    }

    pub fn update(&mut self, field: &Rect) {
        self.body.advance(field);
        self.fire_timer += 1;
    }

    /// Returns `true` when this hit destroyed the enemy.
    pub fn take_damage(&mut self, damage: u32) -> bool {
        self.health = self.health.saturating_sub(damage);
        if self.health == 0 {
            self.body.active = false;
            true
        } else {
            false
        }
    }

    /// Roll for a shot straight down from the belly.
    pub fn try_fire<R: Rng>(&mut self, config: &ShooterConfig, chance: f64, rng: &mut R) -> Option<Bullet> {
        if self.fire_timer < self.fire_delay || !rng.gen_bool(chance.clamp(0.0, 1.0)) {
            return None;
        }
        self.fire_timer = 0;
        self.fire_delay = rng.gen_range(60..=180);
        let rect = self.body.rect();
        let body = Body::new(
            rect.center_x() - config.bullet_width / 2.0,
            rect.bottom(),
            config.bullet_width,
            config.bullet_height,
        )
        .with_velocity(0.0, config.enemy_bullet_speed);
        Some(Bullet::new(body, BulletOwner::Enemy))
    }
}

/// Random enemy just above the top edge, heading down.
#[derive(Clone, Debug)]
pub struct EnemyTable {
    pub width: f32,
    pub height: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    /// Scales the sampled speed; raised as the run gets harder.
    pub difficulty: f32,
}

impl EnemyTable {
    pub fn from_config(config: &ShooterConfig) -> Self {
        EnemyTable {
            width: config.enemy_width,
            height: config.enemy_height,
            speed_min: config.enemy_speed_min,
            speed_max: config.enemy_speed_max,
            difficulty: 1.0,
        }
    }
}

impl SpawnTable for EnemyTable {
    type Output = Enemy;

    fn spawn<R: Rng>(&self, field: &Rect, rng: &mut R) -> Enemy {
        let max_x = (field.right() - self.width).max(field.x);
        let x = if max_x > field.x {
            rng.gen_range(field.x..max_x)
        } else {
            field.x
        };
        let kind = match rng.gen_range(0..3) {
            0 => EnemyKind::Basic,
            1 => EnemyKind::Fast,
            _ => EnemyKind::Tough,
        };
        let speed = rng.gen_range(self.speed_min..self.speed_max)
            * kind.speed_multiplier()
            * self.difficulty;
        let body = Body::new(x, field.y - self.height, self.width, self.height)
            .with_velocity(0.0, speed);
        let mut enemy = Enemy::new(body, kind);
        enemy.fire_delay = rng.gen_range(60..=180);
        enemy
    }
}

// ── Power-ups ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    /// +1 health (up to the cap) and a small score bonus.
    Health,
    /// 1.5× movement speed for a while.
    Speed,
    /// Halved fire cooldown for a while.
    FireRate,
    /// Hits are ignored for a while.
    Shield,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PowerUp {
    pub body: Body,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn update(&mut self, field: &Rect) {
        self.body.advance(field);
    }
}

#[derive(Clone, Debug)]
pub struct PowerUpTable {
    pub size: f32,
    pub speed: f32,
}

impl SpawnTable for PowerUpTable {
    type Output = PowerUp;

    fn spawn<R: Rng>(&self, field: &Rect, rng: &mut R) -> PowerUp {
        let max_x = (field.right() - self.size).max(field.x);
        let x = if max_x > field.x {
            rng.gen_range(field.x..max_x)
        } else {
            field.x
        };
        let kind = match rng.gen_range(0..4) {
            0 => PowerUpKind::Health,
            1 => PowerUpKind::Speed,
            2 => PowerUpKind::FireRate,
            _ => PowerUpKind::Shield,
        };
        PowerUp {
            body: Body::new(x, field.y - self.size, self.size, self.size)
                .with_velocity(0.0, self.speed),
            kind,
        }
    }
}

// ── Explosions ────────────────────────────────────────────────────────────────

/// Purely visual; never takes part in collisions.
#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub body: Body,
    pub frames: u32,
    pub total: u32,
}

impl Explosion {
    /// Centred on `around`.
    pub fn at(around: &Rect, frames: u32) -> Self {
        let size = around.w.max(around.h);
        Explosion {
            body: Body::new(around.center_x() - size / 2.0, around.center_y() - size / 2.0, size, size),
            frames,
            total: frames.max(1),
        }
    }

    pub fn update(&mut self) {
        self.frames = self.frames.saturating_sub(1);
        if self.frames == 0 {
            self.body.active = false;
        }
    }

    /// 1.0 when fresh, approaching 0.0 as it fades.
    pub fn remaining(&self) -> f32 {
        self.frames as f32 / self.total as f32
    }
}
