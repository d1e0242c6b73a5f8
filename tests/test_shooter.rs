use arcade::config::ShooterConfig;
use arcade::entities::*;
use arcade::game::{Game, Outcome};
use arcade::games::Shooter;
use arcade::input::{HeldKeys, Key};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Nothing spawns, nothing ramps, enemies never shoot.
fn quiet_config() -> ShooterConfig {
    ShooterConfig {
        enemy_spawn_rate: 100_000,
        powerup_spawn_rate: 100_000,
        difficulty_step: 0.0,
        enemy_fire_chance: 0.0,
        ..ShooterConfig::default()
    }
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn idle() -> HeldKeys {
    HeldKeys::new()
}

fn still_enemy(x: f32, y: f32, kind: EnemyKind) -> Enemy {
    Enemy::new(Body::new(x, y, 40.0, 40.0), kind)
}

fn player_bullet(x: f32, y: f32) -> Bullet {
    Bullet::new(
        Body::new(x, y, 5.0, 15.0).with_velocity(0.0, -8.0),
        BulletOwner::Player,
    )
}

#[test]
fn new_game_is_empty() {
    let game = Shooter::new(ShooterConfig::default());
    assert!(game.enemies.is_empty());
    assert!(game.bullets.is_empty());
    assert!(game.powerups.is_empty());
    assert!(game.explosions.is_empty());
    assert_eq!(game.score, 0);
    assert_eq!(game.difficulty, 1.0);
}

#[test]
fn holding_fire_shoots_once_per_cooldown() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    let fire: HeldKeys = [Key::Fire].into_iter().collect();

    game.update(&fire, &mut rng);
    assert_eq!(game.bullets.len(), 1);
    game.update(&fire, &mut rng);
    assert_eq!(game.bullets.len(), 1);
}

#[test]
fn bullet_destroys_enemy_and_scores() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    game.enemies.push(still_enemy(100.0, 100.0, EnemyKind::Fast));
    game.bullets.push(player_bullet(110.0, 145.0));

    assert_eq!(game.update(&idle(), &mut rng), Outcome::Continue);
    assert_eq!(game.score, 200);
    assert!(game.enemies.is_empty());
    assert!(game.bullets.is_empty());
    assert_eq!(game.explosions.len(), 1);
}

#[test]
fn bullet_hits_only_the_first_overlapping_enemy() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    game.enemies.push(still_enemy(100.0, 100.0, EnemyKind::Basic));
    game.enemies.push(still_enemy(105.0, 100.0, EnemyKind::Basic));
    game.bullets.push(player_bullet(110.0, 145.0));

    game.update(&idle(), &mut rng);
    assert_eq!(game.score, 100);
    assert_eq!(game.enemies.len(), 1);
    assert_eq!(game.enemies[0].body.x, 105.0);
}

#[test]
fn tough_enemy_survives_one_bullet() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    game.enemies.push(still_enemy(100.0, 100.0, EnemyKind::Tough));
    game.bullets.push(player_bullet(110.0, 145.0));

    game.update(&idle(), &mut rng);
    assert_eq!(game.score, 0);
    assert_eq!(game.enemies.len(), 1);
    assert_eq!(game.enemies[0].health, 1);
    assert!(game.explosions.is_empty());
}

#[test]
fn enemy_contact_costs_health_and_destroys_enemy() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    let (x, y) = (game.player.body.x, game.player.body.y);
    game.enemies.push(still_enemy(x, y, EnemyKind::Basic));

    assert_eq!(game.update(&idle(), &mut rng), Outcome::Continue);
    assert_eq!(game.player.health, 2);
    assert!(game.enemies.is_empty());
    // Ramming still pays out the enemy's value.
    assert_eq!(game.score, EnemyKind::Basic.score());
}

#[test]
fn shield_ignores_enemy_bullets() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    game.player.shield = 10;
    let (x, y) = (game.player.body.x, game.player.body.y);
    game.bullets.push(Bullet::new(
        Body::new(x + 10.0, y, 5.0, 15.0).with_velocity(0.0, 4.0),
        BulletOwner::Enemy,
    ));

    game.update(&idle(), &mut rng);
    assert_eq!(game.player.health, 3);
    assert!(game.bullets.is_empty());
}

#[test]
fn last_hit_ends_the_game() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    game.player.health = 1;
    let (x, y) = (game.player.body.x, game.player.body.y);
    game.enemies.push(still_enemy(x, y, EnemyKind::Basic));

    assert_eq!(game.update(&idle(), &mut rng), Outcome::Lost);
    assert_eq!(game.player.health, 0);
    // Enemy explosion plus the player's.
    assert_eq!(game.explosions.len(), 2);
}

#[test]
fn health_powerup_heals_and_scores() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    game.player.health = 2;
    let (x, y) = (game.player.body.x, game.player.body.y);
    game.powerups.push(PowerUp {
        body: Body::new(x + 5.0, y + 5.0, 20.0, 20.0),
        kind: PowerUpKind::Health,
    });

    game.update(&idle(), &mut rng);
    assert_eq!(game.player.health, 3);
    assert_eq!(game.score, 50);
    assert!(game.powerups.is_empty());
}

#[test]
fn timed_powerups_set_their_timers() {
    let mut game = Shooter::new(quiet_config());
    let duration = game.config().powerup_duration;
    game.apply_powerup(PowerUpKind::Speed);
    game.apply_powerup(PowerUpKind::FireRate);
    game.apply_powerup(PowerUpKind::Shield);
    assert_eq!(game.player.speed_boost, duration);
    assert_eq!(game.player.rapid_fire, duration);
    assert_eq!(game.player.shield, duration);
    assert_eq!(game.score, 0);
}

#[test]
fn health_powerup_respects_cap() {
    let mut game = Shooter::new(quiet_config());
    game.player.health = game.player.max_health;
    game.apply_powerup(PowerUpKind::Health);
    assert_eq!(game.player.health, game.player.max_health);
}

#[test]
fn offscreen_entities_are_pruned() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    game.bullets.push(player_bullet(300.0, -10.0));
    game.enemies.push(Enemy::new(
        Body::new(300.0, 599.0, 40.0, 40.0).with_velocity(0.0, 2.0),
        EnemyKind::Basic,
    ));

    game.update(&idle(), &mut rng);
    assert!(game.bullets.is_empty());
    assert!(game.enemies.is_empty());
}

#[test]
fn enemies_spawn_on_schedule() {
    let config = ShooterConfig {
        enemy_spawn_rate: 60,
        ..quiet_config()
    };
    let mut game = Shooter::new(config);
    let mut rng = seeded_rng();
    for _ in 0..179 {
        game.update(&idle(), &mut rng);
    }
    assert_eq!(game.enemy_spawner().spawned(), 2);
    game.update(&idle(), &mut rng);
    assert_eq!(game.enemy_spawner().spawned(), 3);
}

#[test]
fn difficulty_ramps_and_caps() {
    let config = ShooterConfig {
        enemy_spawn_rate: 60,
        difficulty_step: 0.5,
        max_difficulty: 5.0,
        ..quiet_config()
    };
    let mut game = Shooter::new(config);
    let mut rng = seeded_rng();

    game.update(&idle(), &mut rng);
    assert_eq!(game.difficulty, 1.5);
    assert_eq!(game.level(), 2);
    assert_eq!(game.enemy_spawner().threshold(), 40);

    for _ in 0..20 {
        game.update(&idle(), &mut rng);
    }
    assert_eq!(game.difficulty, 5.0);
    assert_eq!(game.level(), 6);
    assert_eq!(game.enemy_spawner().threshold(), 12);
    assert_eq!(game.enemy_spawner().table().difficulty, 5.0);
}

#[test]
fn reset_clears_everything() {
    let mut game = Shooter::new(quiet_config());
    let mut rng = seeded_rng();
    game.enemies.push(still_enemy(100.0, 100.0, EnemyKind::Basic));
    game.score = 1234;
    game.player.health = 1;
    game.update(&idle(), &mut rng);

    game.reset();
    assert!(game.enemies.is_empty());
    assert!(game.bullets.is_empty());
    assert!(game.explosions.is_empty());
    assert_eq!(game.score, 0);
    assert_eq!(game.frame, 0);
    assert_eq!(game.player.health, 3);
    assert_eq!(game.enemy_spawner().spawned(), 0);
}
