use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::Duration;

use crossterm::{
    cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal, ExecutableCommand, QueueableCommand,
};
use rand::{thread_rng, Rng};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use arcade::config::Config;
use arcade::display::terminal::TerminalBackend;
use arcade::display::Theme;
use arcade::error::Result;
use arcade::game::{Game, Session};
use arcade::game_loop::{self, frame_duration, LoopExit};
use arcade::games::{Shooter, SnakeGame, Tetris};
use arcade::input::{InputEvent, Key};

/// Environment variable naming the log file.
const LOG_ENV: &str = "ARCADE_LOG";
const DEFAULT_LOG_FILE: &str = "arcade.log";

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal belongs to the game, so logs go to a file.  If the file
/// cannot be opened they are discarded.
fn init_logging() {
    let path = std::env::var_os(LOG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_LOG_FILE));
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arcade=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_ansi(false);
    match File::create(&path) {
        Ok(file) => builder.with_writer(Mutex::new(file)).init(),
        Err(_) => builder.with_writer(std::io::sink).init(),
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
enum MenuChoice {
    Shooter,
    Snake,
    Tetris,
    Quit,
}

fn show_menu<W: Write>(backend: &mut TerminalBackend<W>) -> Result<MenuChoice> {
    let (width, height) = backend.size();
    let star = backend.theme().glyphs.star;
    let out = backend.writer();
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let cx = width / 2;
    let cy = height / 2;

    let title = format!("{star}  ARCADE  {star}");
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(5),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(&title))?;

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select a game:"))?;

    let options: &[(&str, &str, Color, &str)] = &[
        ("1", "Shooter", Color::Red, "Shoot down the waves"),
        ("2", "Snake  ", Color::Green, "Eat, grow, don't bite"),
        ("3", "Tetris ", Color::Yellow, "Clear the lines"),
    ];
    for (i, (key, label, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("[{}] ", key)))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<8}", label)))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" - {}", desc)))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 4))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Q : Quit"))?;
    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        match backend.wait_event() {
            None | Some(InputEvent::Quit) | Some(InputEvent::Back) => {
                return Ok(MenuChoice::Quit);
            }
            Some(InputEvent::KeyDown(Key::Char('1'))) => return Ok(MenuChoice::Shooter),
            Some(InputEvent::KeyDown(Key::Char('2'))) => return Ok(MenuChoice::Snake),
            Some(InputEvent::KeyDown(Key::Char('3'))) => return Ok(MenuChoice::Tetris),
            Some(_) => {}
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    init_logging();
    let config = Config::load_or_default();
    let theme = Theme::from_config(&config.display);

    let mut out = BufWriter::new(stdout());
    let result = match setup_terminal(&mut out) {
        Ok(keyboard_enhanced) => {
            // Dedicate a thread exclusively to blocking event reads, sending
            // them through a channel so the game loop never blocks on I/O.
            let (tx, rx) = mpsc::channel::<Event>();
            thread::spawn(move || loop {
                match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break; // receiver dropped → program exiting
                        }
                    }
                    Err(_) => break,
                }
            });

            let result = run(&mut out, rx, &config, theme);
            restore_terminal(&mut out, keyboard_enhanced);
            result
        }
        Err(err) => {
            restore_terminal(&mut out, false);
            Err(err)
        }
    };

    if let Err(err) = result {
        error!(error = %err, "arcade exited with an error");
        eprintln!("arcade: {err}");
        std::process::exit(1);
    }
}

/// Returns whether keyboard enhancement was enabled.
fn setup_terminal<W: Write>(out: &mut W) -> Result<bool> {
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Terminals without the kitty protocol ignore this.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();
    Ok(keyboard_enhanced)
}

fn restore_terminal<W: Write>(out: &mut W, keyboard_enhanced: bool) {
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

fn run<W: Write>(out: W, rx: mpsc::Receiver<Event>, config: &Config, theme: Theme) -> Result<()> {
    let mut backend = TerminalBackend::new(out, rx, theme.clone())?;
    let frame = frame_duration(config.display.fps);
    let mut rng = thread_rng();

    loop {
        let choice = show_menu(&mut backend)?;
        info!(?choice, "menu selection");
        let exit = match choice {
            MenuChoice::Quit => break,
            MenuChoice::Shooter => play(
                &mut backend,
                Shooter::new(config.shooter.clone()),
                &theme,
                frame,
                &mut rng,
            )?,
            MenuChoice::Snake => play(
                &mut backend,
                SnakeGame::new(config.snake.clone(), config.display.fps),
                &theme,
                frame,
                &mut rng,
            )?,
            MenuChoice::Tetris => play(
                &mut backend,
                Tetris::new(config.tetris.clone(), config.display.fps),
                &theme,
                frame,
                &mut rng,
            )?,
        };
        if exit == LoopExit::Quit {
            break;
        }
        // Otherwise loop back to the menu
    }
    Ok(())
}

fn play<W: Write, G: Game, R: Rng>(
    backend: &mut TerminalBackend<W>,
    game: G,
    theme: &Theme,
    frame: Duration,
    rng: &mut R,
) -> Result<LoopExit> {
    let mut session = Session::new(game);
    let exit = game_loop::run(backend, &mut session, theme, frame, rng)?;
    info!(
        game = session.game().title(),
        high_score = session.high_score(),
        "left game"
    );
    Ok(exit)
}
