/// The fixed-tick loop: input → update → render → wait.

use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use crate::display::{Backend, Frame, Theme};
use crate::error::Result;
use crate::game::{Game, Session};
use crate::input::InputEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// Close the program.
    Quit,
    /// Return to the game menu.
    Menu,
}

/// Frame budget for a target rate.  Zero means "don't wait".
pub fn frame_duration(fps: u32) -> Duration {
    if fps == 0 {
        Duration::ZERO
    } else {
        Duration::from_secs_f64(1.0 / f64::from(fps))
    }
}

/// Run `session` until a quit or back event.
///
/// Each iteration is strictly ordered: every pending event is dispatched
/// before the tick, the tick is fully applied before rendering, and the
/// frame is presented before the loop sleeps off the rest of its budget.
pub fn run<B, G, R>(
    backend: &mut B,
    session: &mut Session<G>,
    theme: &Theme,
    frame: Duration,
    rng: &mut R,
) -> Result<LoopExit>
where
    B: Backend,
    G: Game,
    R: Rng,
{
    loop {
        let frame_start = Instant::now();

        // ── 1. Input ──────────────────────────────────────────────────────────
        for event in backend.poll_events()? {
            match event {
                InputEvent::Quit => {
                    debug!(ticks = session.ticks(), "quit");
                    return Ok(LoopExit::Quit);
                }
                InputEvent::Back => return Ok(LoopExit::Menu),
                InputEvent::KeyDown(key) => {
                    session.handle_key(key, rng);
                }
                InputEvent::KeyUp(_) => {}
            }
        }

        // ── 2. Update ─────────────────────────────────────────────────────────
        session.tick(backend.held_keys(), rng);

        // ── 3. Render ─────────────────────────────────────────────────────────
        let game = session.game();
        backend.begin_frame(&Frame {
            field: game.field(),
            title: game.title(),
            hint: game.hint(),
        })?;
        session.render(backend, theme)?;
        backend.present()?;

        // ── 4. Wait ───────────────────────────────────────────────────────────
        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            std::thread::sleep(frame - elapsed);
        }
    }
}
