mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Stdout, Write};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::style::{self, Color, Print};
use crossterm::{cursor, terminal, ExecutableCommand, QueueableCommand};
use rand::thread_rng;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use arcade_core::config::GameConfig;
use arcade_core::entities::{GameMode, GameStatus, InputSnapshot};
use arcade_core::session::Session;
use arcade_core::stub::{detect_overlaps, HitBoxes};
use display::Scene;

/// Target frame time, about 30 frames per second.
const FRAME: Duration = Duration::from_millis(33);

const LOG_FILE: &str = "arcade.log";

/// Frames a key counts as held after its last press or repeat event.
/// Terminals without release events repeat at 15 Hz or faster, so four
/// frames bridge the gap between repeats.
const HOLD_WINDOW: u64 = 4;

const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const UP_KEYS: [KeyCode; 3] = [KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const SHOOT_KEYS: [KeyCode; 1] = [KeyCode::Char(' ')];

// ── Held keys ─────────────────────────────────────────────────────────────────

/// Frame stamp of the last press/repeat per key, turned into one
/// `InputSnapshot` per frame so several keys can be held together.
#[derive(Default)]
struct HeldKeys {
    last_seen: HashMap<KeyCode, u64>,
    frame: u64,
}

impl HeldKeys {
    fn next_frame(&mut self) {
        self.frame += 1;
    }

    fn seen(&mut self, code: KeyCode) {
        self.last_seen.insert(code, self.frame);
    }

    fn released(&mut self, code: KeyCode) {
        self.last_seen.remove(&code);
    }

    fn clear(&mut self) {
        self.last_seen.clear();
    }

    fn any(&self, keys: &[KeyCode]) -> bool {
        keys.iter().any(|k| {
            self.last_seen
                .get(k)
                .is_some_and(|&at| self.frame.saturating_sub(at) <= HOLD_WINDOW)
        })
    }

    fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            left: self.any(&LEFT_KEYS),
            right: self.any(&RIGHT_KEYS),
            up: self.any(&UP_KEYS),
            shoot: self.any(&SHOOT_KEYS),
        }
    }
}

// ── Terminal setup ────────────────────────────────────────────────────────────

/// Raw mode + alternate screen for as long as it lives.
struct TerminalGuard {
    enhanced: bool,
}

impl TerminalGuard {
    fn enter(out: &mut BufWriter<Stdout>) -> anyhow::Result<Self> {
        terminal::enable_raw_mode()?;
        out.execute(terminal::EnterAlternateScreen)?;
        out.execute(cursor::Hide)?;
        // Kitty-protocol terminals report releases and repeats; the rest
        // reject the flags and fall back to the hold window.
        let enhanced = out
            .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
            .is_ok();
        debug!(enhanced, "terminal ready");
        Ok(TerminalGuard { enhanced })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.enhanced {
            let _ = out.execute(PopKeyboardEnhancementFlags);
        }
        let _ = out.execute(cursor::Show);
        let _ = out.execute(terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

/// Blocking event reads live on their own thread; the frame loop only polls
/// the channel.
fn spawn_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break;
            }
        }
    });
    rx
}

// ── Menu ──────────────────────────────────────────────────────────────────────

fn put<W: Write>(
    out: &mut W,
    col: u16,
    row: u16,
    colour: Color,
    text: &str,
) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(Print(text))?;
    Ok(())
}

fn draw_menu<W: Write>(out: &mut W) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    let (width, height) = terminal::size()?;
    let (cx, cy) = (width / 2, height / 2);
    let left = cx.saturating_sub(12);

    let title = "★  ARCADE  ★";
    let title_col = cx.saturating_sub(title.chars().count() as u16 / 2);
    put(out, title_col, cy.saturating_sub(6), Color::Cyan, title)?;
    put(out, left, cy.saturating_sub(3), Color::White, "Choose a game:")?;

    let modes = [
        ("[1] ", "Shooter", Color::Green, "enemy waves, power-ups, a boss"),
        ("[2] ", "Runner ", Color::Yellow, "jump the incoming obstacles"),
    ];
    for (row, (key, name, colour, blurb)) in (cy.saturating_sub(1)..).zip(modes) {
        put(out, left, row, Color::DarkGrey, key)?;
        out.queue(style::SetForegroundColor(colour))?;
        out.queue(Print(name))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("  {blurb}")))?;
    }

    let legend = [
        (Color::Cyan, "★ multi-shot: three-way fire for 10s"),
        (Color::Yellow, "$ bonus: extra points"),
    ];
    for (row, (colour, line)) in (cy + 3..).zip(legend) {
        put(out, left, row, colour, line)?;
    }
    put(out, left, cy + 6, Color::DarkGrey, "Q quits")?;

    out.queue(style::ResetColor)?;
    out.flush()
}

/// Wait for a mode choice; `None` means quit.
fn choose_mode<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<Option<GameMode>> {
    draw_menu(out)?;
    for ev in rx.iter() {
        let Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) = ev else {
            continue;
        };
        match code {
            KeyCode::Char('1') => return Ok(Some(GameMode::Shooter)),
            KeyCode::Char('2') => return Ok(Some(GameMode::Runner)),
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => return Ok(None),
            _ => {}
        }
    }
    // Reader thread is gone; nothing more will arrive.
    Ok(None)
}

// ── Play ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Quit,
    Menu,
    Restart,
}

/// Keys that act on a press regardless of the hold window.
fn command_for(code: KeyCode, modifiers: KeyModifiers, game_over: bool) -> Option<Command> {
    match code {
        KeyCode::Char('q' | 'Q') | KeyCode::Esc => Some(Command::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
        KeyCode::Char('r' | 'R') if game_over => Some(Command::Restart),
        KeyCode::Char('m' | 'M') if game_over => Some(Command::Menu),
        _ => None,
    }
}

/// Run one mode until the player quits (`Command::Quit`) or asks for the
/// menu (`Command::Menu`).
fn play<W: Write>(
    out: &mut W,
    session: &mut Session,
    rx: &mpsc::Receiver<Event>,
) -> anyhow::Result<Command> {
    let mut rng = thread_rng();
    let boxes = HitBoxes::default();
    let mut scene = Scene::new();
    let mut keys = HeldKeys::default();
    let mut last_frame = Instant::now();
    let mut reported = false;

    loop {
        let started = Instant::now();
        keys.next_frame();

        while let Ok(ev) = rx.try_recv() {
            let Event::Key(KeyEvent { code, kind, modifiers, .. }) = ev else {
                continue;
            };
            match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => keys.seen(code),
                KeyEventKind::Release => {
                    keys.released(code);
                    continue;
                }
            }
            if kind != KeyEventKind::Press {
                continue;
            }
            match command_for(code, modifiers, session.status() == GameStatus::GameOver) {
                Some(Command::Restart) => {
                    session.restart(&mut rng)?;
                    scene = Scene::new();
                    keys.clear();
                    reported = false;
                    info!(mode = ?session.mode(), "restart");
                }
                Some(command) => return Ok(command),
                None => {}
            }
        }

        let dt_ms = last_frame.elapsed().as_secs_f64() * 1000.0;
        last_frame = Instant::now();

        let overlaps = detect_overlaps(session, &boxes);
        let intents = session.update(dt_ms, keys.snapshot(), &overlaps, &mut rng)?;
        scene.apply(intents);
        if let (Some(score), false) = (scene.final_score(), reported) {
            info!(score, "final score shown");
            reported = true;
        }
        display::render(out, session, &scene)?;

        if let Some(rest) = FRAME.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Log to a file: the terminal is busy with the game.
fn init_logging() -> anyhow::Result<()> {
    let file = File::create(LOG_FILE).with_context(|| format!("creating {LOG_FILE}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    init_logging()?;
    let config = GameConfig::load();

    let mut out = BufWriter::new(stdout());
    let _guard = TerminalGuard::enter(&mut out)?;
    let rx = spawn_reader();

    while let Some(mode) = choose_mode(&mut out, &rx)? {
        let mut session = Session::new(config.clone(), mode, &mut thread_rng())?;
        if play(&mut out, &mut session, &rx)? == Command::Quit {
            break;
        }
    }
    info!("bye");
    Ok(())
}
