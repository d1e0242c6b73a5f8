use std::time::Duration;

use arcade::collision::Rect;
use arcade::config::{ShooterConfig, TetrisConfig};
use arcade::display::headless::HeadlessBackend;
use arcade::display::{Backend, Frame, Theme};
use arcade::entities::{Body, Enemy, EnemyKind};
use arcade::game::{Game, Session};
use arcade::game_loop::{frame_duration, run, LoopExit};
use arcade::games::{Shooter, Tetris};
use arcade::input::{HeldKeys, InputEvent, Key};
use arcade::state::{GameStatus, Transition};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn steady_config() -> ShooterConfig {
    ShooterConfig {
        difficulty_step: 0.0,
        enemy_fire_chance: 0.0,
        ..ShooterConfig::default()
    }
}

fn press(key: Key) -> Vec<InputEvent> {
    vec![InputEvent::KeyDown(key)]
}

fn render_once<G: Game>(session: &Session<G>, backend: &mut HeadlessBackend) {
    let game = session.game();
    backend
        .begin_frame(&Frame {
            field: game.field(),
            title: game.title(),
            hint: game.hint(),
        })
        .unwrap();
    session.render(backend, &Theme::ascii()).unwrap();
    backend.present().unwrap();
}

// ── Loop ──────────────────────────────────────────────────────────────────────

#[test]
fn frame_duration_from_fps() {
    assert_eq!(frame_duration(0), Duration::ZERO);
    assert_eq!(frame_duration(50), Duration::from_millis(20));
}

#[test]
fn nothing_happens_before_the_first_key() {
    let mut backend = HeadlessBackend::new(HeadlessBackend::idle(120));
    let mut session = Session::new(Shooter::new(steady_config()));
    let mut rng = seeded_rng();

    let exit = run(&mut backend, &mut session, &Theme::ascii(), Duration::ZERO, &mut rng).unwrap();
    assert_eq!(exit, LoopExit::Quit);
    assert_eq!(session.status(), GameStatus::Start);
    assert_eq!(session.ticks(), 0);
    assert_eq!(session.game().enemy_spawner().spawned(), 0);
    assert_eq!(backend.frames(), 120);
    assert!(backend.texts().contains(&"Press any key to start"));
}

#[test]
fn scripted_start_plays_until_quit() {
    let mut script = vec![press(Key::Char('x'))];
    script.extend(HeadlessBackend::idle(59));
    let mut backend = HeadlessBackend::new(script);
    let mut session = Session::new(Shooter::new(steady_config()));
    let mut rng = seeded_rng();

    let exit = run(&mut backend, &mut session, &Theme::ascii(), Duration::ZERO, &mut rng).unwrap();
    assert_eq!(exit, LoopExit::Quit);
    assert_eq!(session.status(), GameStatus::Playing);
    assert_eq!(session.ticks(), 60);
    assert_eq!(session.game().enemy_spawner().spawned(), 1);
    // The final poll returned Quit before a 61st frame.
    assert_eq!(backend.polls(), 61);
    assert_eq!(backend.frames(), 60);
}

#[test]
fn back_returns_to_menu() {
    let script = vec![press(Key::Char('x')), vec![InputEvent::Back]];
    let mut backend = HeadlessBackend::new(script);
    let mut session = Session::new(Shooter::new(steady_config()));
    let mut rng = seeded_rng();

    let exit = run(&mut backend, &mut session, &Theme::ascii(), Duration::ZERO, &mut rng).unwrap();
    assert_eq!(exit, LoopExit::Menu);
    assert_eq!(session.ticks(), 1);
}

#[test]
fn held_keys_move_the_player() {
    let mut script = vec![press(Key::Char('x')), press(Key::Right)];
    script.extend(HeadlessBackend::idle(3));
    script.push(vec![InputEvent::KeyUp(Key::Right)]);
    script.extend(HeadlessBackend::idle(3));
    let mut backend = HeadlessBackend::new(script);
    let mut session = Session::new(Shooter::new(steady_config()));
    let x0 = session.game().player.body.x;
    let mut rng = seeded_rng();

    run(&mut backend, &mut session, &Theme::ascii(), Duration::ZERO, &mut rng).unwrap();
    // Held for four ticks at speed 5.
    assert_eq!(session.game().player.body.x, x0 + 20.0);
}

// ── Session ───────────────────────────────────────────────────────────────────

#[test]
fn game_over_freezes_spawning_until_restart() {
    let mut session = Session::new(Shooter::new(steady_config()));
    let mut rng = seeded_rng();
    let idle = HeldKeys::new();

    assert_eq!(session.handle_key(Key::Char('x'), &mut rng), Transition::Started);
    for _ in 0..60 {
        session.tick(&idle, &mut rng);
    }
    assert_eq!(session.game().enemy_spawner().spawned(), 1);

    let game = session.game_mut();
    game.score = 600;
    game.player.health = 1;
    let (x, y) = (game.player.body.x, game.player.body.y);
    game.enemies
        .push(Enemy::new(Body::new(x, y, 40.0, 40.0), EnemyKind::Basic));
    session.tick(&idle, &mut rng);
    assert_eq!(session.status(), GameStatus::GameOver);
    assert_eq!(session.high_score(), 700);

    let ticks = session.ticks();
    for _ in 0..200 {
        session.tick(&idle, &mut rng);
    }
    assert_eq!(session.ticks(), ticks);
    assert_eq!(session.game().enemy_spawner().spawned(), 1);

    assert_eq!(session.handle_key(Key::Fire, &mut rng), Transition::None);
    assert_eq!(session.status(), GameStatus::GameOver);

    assert_eq!(session.handle_key(Key::Restart, &mut rng), Transition::Restarted);
    let game = session.game();
    assert_eq!(session.status(), GameStatus::Playing);
    assert!(game.enemies.is_empty());
    assert!(game.bullets.is_empty());
    assert!(game.powerups.is_empty());
    assert!(game.explosions.is_empty());
    assert_eq!(game.score, 0);
    assert_eq!(session.high_score(), 700);
}

#[test]
fn inactive_entities_are_not_drawn() {
    let mut session = Session::new(Shooter::new(steady_config()));
    let mut backend = HeadlessBackend::new(Vec::new());
    let alive = Rect::new(100.0, 100.0, 40.0, 40.0);
    let dead = Rect::new(300.0, 300.0, 40.0, 40.0);
    let game = session.game_mut();
    game.enemies.push(Enemy::new(
        Body::new(alive.x, alive.y, alive.w, alive.h),
        EnemyKind::Basic,
    ));
    let mut gone = Enemy::new(Body::new(dead.x, dead.y, dead.w, dead.h), EnemyKind::Basic);
    gone.body.active = false;
    game.enemies.push(gone);

    render_once(&session, &mut backend);
    let rects = backend.rects();
    assert!(rects.contains(&alive));
    assert!(!rects.contains(&dead));
}

#[test]
fn game_over_overlay_reports_scores() {
    let mut session = Session::new(Shooter::new(steady_config()));
    let mut backend = HeadlessBackend::new(Vec::new());
    let mut rng = seeded_rng();
    session.handle_key(Key::Char('x'), &mut rng);
    let game = session.game_mut();
    game.score = 200;
    game.player.health = 1;
    let (x, y) = (game.player.body.x, game.player.body.y);
    game.enemies
        .push(Enemy::new(Body::new(x, y, 40.0, 40.0), EnemyKind::Basic));
    session.tick(&HeldKeys::new(), &mut rng);

    render_once(&session, &mut backend);
    let texts = backend.texts();
    assert!(texts.iter().any(|t| t.contains("GAME  OVER")));
    assert!(texts.iter().any(|t| t.contains("Final Score:    300")));
    assert!(texts.iter().any(|t| t.contains("NEW BEST")));
    assert!(texts.contains(&"R - Play Again  Esc - Menu  Q - Quit"));
}

#[test]
fn pause_freezes_tetris_gravity() {
    let mut session = Session::new(Tetris::new(TetrisConfig::default(), 60));
    let mut rng = seeded_rng();
    let idle = HeldKeys::new();
    session.handle_key(Key::Char('x'), &mut rng);
    session.tick(&idle, &mut rng);
    let y0 = session.game().current.map(|p| p.y);

    assert_eq!(session.handle_key(Key::Pause, &mut rng), Transition::Paused);
    for _ in 0..100 {
        session.tick(&idle, &mut rng);
    }
    assert_eq!(session.game().current.map(|p| p.y), y0);
    // Game keys are swallowed while paused.
    assert_eq!(session.handle_key(Key::Fire, &mut rng), Transition::None);
    assert!(session.game().grid.is_empty());

    assert_eq!(session.handle_key(Key::Pause, &mut rng), Transition::Resumed);
    assert_eq!(session.status(), GameStatus::Playing);
}

#[test]
fn tetris_clock_stops_while_paused() {
    let mut session = Session::new(Tetris::new(TetrisConfig::default(), 60));
    let mut backend = HeadlessBackend::new(Vec::new());
    let mut rng = seeded_rng();
    let idle = HeldKeys::new();
    session.handle_key(Key::Char('x'), &mut rng);
    for _ in 0..120 {
        session.tick(&idle, &mut rng);
    }
    assert_eq!(session.game().elapsed_secs(), 2);

    session.handle_key(Key::Pause, &mut rng);
    for _ in 0..600 {
        session.tick(&idle, &mut rng);
    }
    assert_eq!(session.game().elapsed_secs(), 2);

    render_once(&session, &mut backend);
    let texts = backend.texts();
    assert!(texts.contains(&"Time"));
    assert!(texts.contains(&"00:02"));
}

#[test]
fn shooter_hud_shows_whole_levels() {
    let mut session = Session::new(Shooter::new(steady_config()));
    let mut backend = HeadlessBackend::new(Vec::new());
    let mut rng = seeded_rng();
    session.handle_key(Key::Char('x'), &mut rng);
    session.game_mut().difficulty = 2.7;

    render_once(&session, &mut backend);
    assert!(backend.texts().contains(&"Level 3"));
}

#[test]
fn shooter_cannot_pause() {
    let mut session = Session::new(Shooter::new(steady_config()));
    let mut rng = seeded_rng();
    session.handle_key(Key::Char('x'), &mut rng);
    assert_eq!(session.handle_key(Key::Pause, &mut rng), Transition::None);
    assert_eq!(session.status(), GameStatus::Playing);
}
