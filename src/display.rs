/// Terminal renderer for the demo binary.
///
/// The core never draws.  `Scene` plays the engine's part: it executes the
/// intents the session emits (sprites appear and vanish, labels change,
/// effects play) and `render` turns it into terminal commands, reading
/// positions from the session's registry.

use std::collections::HashMap;
use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use arcade_core::entities::{
    EnemyVariant, EntityId, EntityKind, GameMode, ObstacleShape, PickupKind, Vec2,
};
use arcade_core::intent::{EffectKind, Intent, Label};
use arcade_core::session::Session;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_PLAYER: Color = Color::White;
const C_PLAYER_HIT: Color = Color::Red;
const C_ENEMY_BASIC: Color = Color::Green;
const C_ENEMY_FAST: Color = Color::Red;
const C_ENEMY_HEAVY: Color = Color::DarkYellow;
const C_ENEMY_SWAYER: Color = Color::Magenta;
const C_BOSS: Color = Color::DarkMagenta;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_BOSS: Color = Color::Magenta;
const C_PICKUP_SCORE: Color = Color::Yellow;
const C_PICKUP_MULTI: Color = Color::Cyan;
const C_OBSTACLE: Color = Color::Grey;
const C_EFFECT: Color = Color::White;
const C_BANNER: Color = Color::Red;
const C_POWERUP_ACTIVE: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

/// Frames a one-shot effect stays on screen.
const EFFECT_FRAMES: u32 = 6;

// ── Scene ─────────────────────────────────────────────────────────────────────

/// What the front-end currently shows, built purely from intents.
#[derive(Default)]
pub struct Scene {
    visuals: HashMap<EntityId, EntityKind>,
    labels: HashMap<Label, String>,
    /// (symbol position, frames left)
    sparks: Vec<(Vec2, u32)>,
    player_tinted: bool,
    player_shake: f64,
    player_recoil: f64,
    flash_frames: u32,
    final_score: Option<u32>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn final_score(&self) -> Option<u32> {
        self.final_score
    }

    /// Execute one frame's intents, in order.
    pub fn apply(&mut self, intents: Vec<Intent>) {
        self.sparks.retain_mut(|(_, frames)| {
            *frames -= 1;
            *frames > 0
        });
        self.flash_frames = self.flash_frames.saturating_sub(1);

        for intent in intents {
            match intent {
                Intent::SpawnVisual { id, kind, .. } => {
                    self.visuals.insert(id, kind);
                }
                Intent::DestroyVisual { id } => {
                    self.visuals.remove(&id);
                }
                Intent::SetText { label, value } => {
                    self.labels.insert(label, value);
                }
                // Sprites are drawn at registry positions; velocity is the
                // core's business in a headless front-end.
                Intent::SetVelocity { .. } => {}
                Intent::PlayEffect { kind, position } => self.play(kind, position),
                Intent::GameOverSignal { final_score } => self.final_score = Some(final_score),
            }
        }
    }

    fn play(&mut self, kind: EffectKind, position: Vec2) {
        match kind {
            EffectKind::Explosion
            | EffectKind::BossDefeat
            | EffectKind::BossHit
            | EffectKind::Collect => {
                self.sparks.push((position, EFFECT_FRAMES));
            }
            EffectKind::DamageFlash | EffectKind::BossWarning => self.flash_frames = EFFECT_FRAMES,
            EffectKind::Hit => self.sparks.push((position, 2)),
            EffectKind::Flicker { tinted } => self.player_tinted = tinted,
            EffectKind::Shake { offset } => self.player_shake = offset,
            EffectKind::Recoil { offset } => self.player_recoil = offset,
            EffectKind::MultiShotOn | EffectKind::MultiShotOff => {}
        }
    }
}

// ── Coordinate mapping ────────────────────────────────────────────────────────

/// Maps world pixels onto the terminal's play area (inside the border).
struct Viewport {
    width: u16,
    height: u16,
    world_w: f64,
    world_h: f64,
}

impl Viewport {
    fn cell(&self, p: Vec2) -> Option<(u16, u16)> {
        let cols = self.width.saturating_sub(2) as f64;
        let rows = self.height.saturating_sub(5) as f64;
        let cx = 1.0 + p.x / self.world_w * cols;
        let cy = 2.0 + p.y / self.world_h * rows;
        if cx < 1.0 || cx >= 1.0 + cols || cy < 2.0 || cy >= 2.0 + rows {
            return None;
        }
        Some((cx as u16, cy as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, session: &Session, scene: &Scene) -> std::io::Result<()> {
    let (width, height) = terminal::size()?;
    let view = Viewport {
        width,
        height,
        world_w: session.config().world.width,
        world_h: session.config().world.height,
    };

    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &view, scene)?;
    draw_hud(out, &view, scene)?;

    for (id, kind) in &scene.visuals {
        if let Some(entity) = session.registry().get(*id) {
            draw_entity(out, &view, *kind, entity.position)?;
        }
    }
    for (position, _) in &scene.sparks {
        draw_spark(out, &view, *position)?;
    }

    draw_player(out, &view, session, scene)?;
    draw_controls_hint(out, &view, session.mode())?;

    if let Some(score) = scene.final_score {
        draw_game_over(out, &view, score)?;
    }

    // Cursor to the hint row so stray output lands there.
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport, scene: &Scene) -> std::io::Result<()> {
    let w = view.width as usize;
    let h = view.height;

    let colour = if scene.flash_frames > 0 { C_BANNER } else { C_BORDER };
    out.queue(style::SetForegroundColor(colour))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(3) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    out.queue(cursor::MoveTo(0, h.saturating_sub(3)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, view: &Viewport, scene: &Scene) -> std::io::Result<()> {
    let text = move |label: Label| scene.labels.get(&label).map(String::as_str).unwrap_or("");

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(text(Label::Score)))?;

    let boss = text(Label::BossHealth);
    if !boss.is_empty() {
        centered(out, view, 0, C_BOSS, boss)?;
    }

    let power = text(Label::PowerUp);
    let health = text(Label::Health);
    let right = format!("{power} {health}");
    let rx = view.width.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    if !power.is_empty() {
        out.queue(style::SetForegroundColor(C_POWERUP_ACTIVE))?;
        out.queue(Print(power))?;
    }
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(format!(" {health}")))?;

    let banner = text(Label::Banner);
    if !banner.is_empty() {
        centered(out, view, view.height / 3, C_BANNER, banner)?;
    }
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_player<W: Write>(
    out: &mut W,
    view: &Viewport,
    session: &Session,
    scene: &Scene,
) -> std::io::Result<()> {
    //   ▲       ← tip
    //  /█\      ← fuselage + wings
    let at = session.player().position.offset(scene.player_shake, scene.player_recoil);
    let Some((col, row)) = view.cell(at) else {
        return Ok(());
    };
    let colour = if scene.player_tinted { C_PLAYER_HIT } else { C_PLAYER };
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print("▲"))?;
    if row + 1 < view.height.saturating_sub(3) {
        out.queue(cursor::MoveTo(col.saturating_sub(1).max(1), row + 1))?;
        out.queue(Print("/█\\"))?;
    }
    Ok(())
}

fn draw_entity<W: Write>(
    out: &mut W,
    view: &Viewport,
    kind: EntityKind,
    at: Vec2,
) -> std::io::Result<()> {
    let Some((col, row)) = view.cell(at) else {
        return Ok(());
    };
    let (colour, sprite) = match kind {
        EntityKind::PlayerProjectile => (C_BULLET_PLAYER, "║"),
        EntityKind::BossProjectile => (C_BULLET_BOSS, "↓"),
        EntityKind::Enemy(EnemyVariant::Basic) => (C_ENEMY_BASIC, "«▼»"),
        EntityKind::Enemy(EnemyVariant::Fast) => (C_ENEMY_FAST, "(◎)"),
        EntityKind::Enemy(EnemyVariant::Heavy) => (C_ENEMY_HEAVY, "[█]"),
        EntityKind::Enemy(EnemyVariant::Swayer) => (C_ENEMY_SWAYER, "~▼~"),
        EntityKind::Pickup(PickupKind::Score) => (C_PICKUP_SCORE, "$"),
        EntityKind::Pickup(PickupKind::MultiShot) => (C_PICKUP_MULTI, "★"),
        EntityKind::Boss => (C_BOSS, "<═◎═>"),
        EntityKind::Obstacle(ObstacleShape::Crate) => (C_OBSTACLE, "▣"),
        EntityKind::Obstacle(ObstacleShape::Spike) => (C_OBSTACLE, "▲"),
        EntityKind::Obstacle(ObstacleShape::Pillar) => (C_OBSTACLE, "█"),
        EntityKind::Obstacle(ObstacleShape::Barrier) => (C_OBSTACLE, "╫"),
    };
    let half = sprite.chars().count() as u16 / 2;
    out.queue(cursor::MoveTo(col.saturating_sub(half).max(1), row))?;
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(Print(sprite))?;
    Ok(())
}

fn draw_spark<W: Write>(out: &mut W, view: &Viewport, at: Vec2) -> std::io::Result<()> {
    if let Some((col, row)) = view.cell(at) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(C_EFFECT))?;
        out.queue(Print("✶"))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(
    out: &mut W,
    view: &Viewport,
    mode: GameMode,
) -> std::io::Result<()> {
    let hint = match mode {
        GameMode::Shooter => "← → / A D : Move   ↑ / SPACE : Shoot   Q : Quit",
        GameMode::Runner => "↑ / SPACE : Jump   Q : Quit",
    };
    out.queue(cursor::MoveTo(1, view.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

// ── Game-over overlay ─────────────────────────────────────────────────────────

fn draw_game_over<W: Write>(out: &mut W, view: &Viewport, score: u32) -> std::io::Result<()> {
    let score_line = format!("Final Score: {score:>6}");
    let rows = [
        ("╔════════════════════╗", Color::Red),
        ("║     GAME  OVER     ║", Color::Red),
        ("╚════════════════════╝", Color::Red),
        (score_line.as_str(), Color::Yellow),
        ("R - Play Again  M - Menu  Q - Quit", Color::White),
    ];
    let top = (view.height / 2).saturating_sub(rows.len() as u16 / 2);
    for (row, (text, colour)) in (top..).zip(rows) {
        centered(out, view, row, colour, text)?;
    }
    Ok(())
}

fn centered<W: Write>(
    out: &mut W,
    view: &Viewport,
    row: u16,
    colour: Color,
    text: &str,
) -> std::io::Result<()> {
    let col = (view.width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(colour))?;
    out.queue(Print(text))?;
    Ok(())
}
