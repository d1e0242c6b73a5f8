use arcade::collision::Rect;
use arcade::config::ShooterConfig;
use arcade::entities::*;
use arcade::input::{HeldKeys, Key};
use arcade::spawner::SpawnTable;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn field() -> Rect {
    Rect::new(0.0, 0.0, 800.0, 600.0)
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn held(keys: &[Key]) -> HeldKeys {
    keys.iter().copied().collect()
}

// ── Body ──────────────────────────────────────────────────────────────────────

#[test]
fn body_deactivates_on_the_tick_it_leaves() {
    let mut body = Body::new(100.0, 10.0, 5.0, 15.0).with_velocity(0.0, -8.0);
    body.advance(&field()); // y = 2, still overlapping
    assert!(body.active);
    body.advance(&field()); // y = -6, bottom 9
    assert!(body.active);
    body.advance(&field()); // y = -14, bottom 1
    assert!(body.active);
    body.advance(&field()); // y = -22, bottom -7
    assert!(!body.active);
}

#[test]
fn entering_entity_stays_active_while_overlapping() {
    let mut body = Body::new(100.0, -40.0, 40.0, 40.0).with_velocity(0.0, 2.0);
    body.advance(&field());
    assert!(body.active);
    assert_eq!(body.y, -38.0);
}

#[test]
fn clamp_keeps_rect_inside() {
    let mut body = Body::new(790.0, -5.0, 50.0, 40.0);
    body.clamp_to(&field());
    assert_eq!(body.x, 750.0);
    assert_eq!(body.y, 0.0);
}

#[test]
fn prune_removes_inactive_only() {
    let mut bullets: Vec<Bullet> = (0..4)
        .map(|i| Bullet::new(Body::new(i as f32, 0.0, 1.0, 1.0), BulletOwner::Player))
        .collect();
    bullets[1].deactivate();
    bullets[3].deactivate();
    assert_eq!(prune(&mut bullets), 2);
    assert_eq!(bullets.len(), 2);
    assert!(bullets.iter().all(|b| b.is_active()));
}

// ── Player ────────────────────────────────────────────────────────────────────

#[test]
fn player_spawns_centred_near_bottom() {
    let player = Player::spawn(&ShooterConfig::default(), &field());
    assert_eq!(player.body.x, 375.0);
    assert_eq!(player.body.y, 540.0);
    assert_eq!(player.health, 3);
}

#[test]
fn player_is_clamped_not_deactivated() {
    let config = ShooterConfig::default();
    let mut player = Player::spawn(&config, &field());
    let left = held(&[Key::Left]);
    for _ in 0..500 {
        player.update(&left, &field());
    }
    assert!(player.is_active());
    assert_eq!(player.body.x, 0.0);
}

#[test]
fn opposite_keys_resolve_by_precedence() {
    let config = ShooterConfig::default();
    let mut player = Player::spawn(&config, &field());
    let x0 = player.body.x;
    player.update(&held(&[Key::Left, Key::Right]), &field());
    assert_eq!(player.body.x, x0 - config.player_speed);
}

#[test]
fn speed_boost_multiplies_movement() {
    let config = ShooterConfig::default();
    let mut player = Player::spawn(&config, &field());
    player.speed_boost = 10;
    let x0 = player.body.x;
    player.update(&held(&[Key::Right]), &field());
    assert_eq!(player.body.x, x0 + config.player_speed * 1.5);
}

#[test]
fn fire_respects_cooldown() {
    let config = ShooterConfig::default();
    let mut player = Player::spawn(&config, &field());
    let bullet = player.try_fire(&config).expect("first shot");
    assert_eq!(bullet.owner, BulletOwner::Player);
    assert_eq!(bullet.body.vy, -config.bullet_speed);
    assert_eq!(bullet.body.y, player.body.y - config.bullet_height);
    assert!(player.try_fire(&config).is_none());

    for _ in 0..config.fire_cooldown {
        player.update(&HeldKeys::new(), &field());
    }
    assert!(player.try_fire(&config).is_some());
}

#[test]
fn rapid_fire_halves_cooldown() {
    let config = ShooterConfig::default();
    let mut player = Player::spawn(&config, &field());
    player.rapid_fire = 100;
    player.try_fire(&config).expect("first shot");
    assert_eq!(player.cooldown, config.fire_cooldown / 2);
}

#[test]
fn shield_absorbs_hits() {
    let mut player = Player::spawn(&ShooterConfig::default(), &field());
    player.shield = 5;
    assert!(!player.take_hit());
    assert_eq!(player.health, 3);
    player.shield = 0;
    assert!(!player.take_hit());
    assert!(!player.take_hit());
    assert!(player.take_hit());
    assert_eq!(player.health, 0);
}

#[test]
fn heal_caps_at_max() {
    let mut player = Player::spawn(&ShooterConfig::default(), &field());
    player.heal(10);
    assert_eq!(player.health, player.max_health);
}

// ── Enemies ───────────────────────────────────────────────────────────────────

#[test]
fn tough_enemy_takes_two_hits() {
    let mut enemy = Enemy::new(Body::new(0.0, 0.0, 40.0, 40.0), EnemyKind::Tough);
    assert!(!enemy.take_damage(1));
    assert!(enemy.is_active());
    assert!(enemy.take_damage(1));
    assert!(!enemy.is_active());
}

#[test]
fn enemy_kinds_score_and_speed() {
    assert_eq!(EnemyKind::Basic.score(), 100);
    assert_eq!(EnemyKind::Fast.score(), 200);
    assert_eq!(EnemyKind::Tough.score(), 300);
    assert_eq!(EnemyKind::Fast.speed_multiplier(), 1.5);
    assert_eq!(EnemyKind::Basic.health(), 1);
}

#[test]
fn enemy_does_not_fire_before_delay() {
    let config = ShooterConfig::default();
    let mut rng = seeded_rng();
    let mut enemy = Enemy::new(Body::new(0.0, 0.0, 40.0, 40.0), EnemyKind::Basic);
    enemy.fire_delay = 10;
    for _ in 0..9 {
        enemy.update(&field());
        assert!(enemy.try_fire(&config, 1.0, &mut rng).is_none());
    }
    enemy.update(&field());
    let bullet = enemy.try_fire(&config, 1.0, &mut rng).expect("ready to fire");
    assert_eq!(bullet.owner, BulletOwner::Enemy);
    assert_eq!(bullet.body.y, 40.0);
    assert_eq!(enemy.fire_timer, 0);
    assert!((60..=180).contains(&enemy.fire_delay));
}

#[test]
fn enemy_table_spawns_above_field_within_bounds() {
    let table = EnemyTable::from_config(&ShooterConfig::default());
    let mut rng = seeded_rng();
    for _ in 0..100 {
        let enemy = table.spawn(&field(), &mut rng);
        assert_eq!(enemy.body.y, -40.0);
        assert!(enemy.body.x >= 0.0 && enemy.body.x + 40.0 <= 800.0);
        let base = enemy.body.vy / enemy.kind.speed_multiplier();
        assert!((1.0..=3.0).contains(&base));
        assert_eq!(enemy.health, enemy.kind.health());
    }
}

// ── Explosions ────────────────────────────────────────────────────────────────

#[test]
fn explosion_expires_after_its_frames() {
    let mut explosion = Explosion::at(&Rect::new(0.0, 0.0, 40.0, 20.0), 3);
    assert_eq!(explosion.body.w, 40.0);
    assert_eq!(explosion.body.y, -10.0);
    explosion.update();
    explosion.update();
    assert!(explosion.is_active());
    explosion.update();
    assert!(!explosion.is_active());
    assert_eq!(explosion.remaining(), 0.0);
}
