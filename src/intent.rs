/// Render/audio intents emitted by the core once per frame.
///
/// The front-end executes these in order; the core never draws or plays
/// anything itself.
use crate::entities::{EntityId, EntityKind, Vec2};

/// HUD labels the front-end keeps on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Label {
    Score,
    Health,
    PowerUp,
    BossHealth,
    Banner,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectKind {
    /// Sparkle burst where something blew up.
    Explosion,
    /// Flash on the entity that got hit.
    Hit,
    /// Screen-edge damage flash.
    DamageFlash,
    /// Pickup collected.
    Collect,
    BossHit,
    BossDefeat,
    BossWarning,
    /// Player sprite pushed down after firing (`offset` px, 0 = back in place).
    Recoil { offset: f64 },
    /// Recovery tint toggle.
    Flicker { tinted: bool },
    /// Recovery horizontal shake (`offset` px from rest).
    Shake { offset: f64 },
    MultiShotOn,
    MultiShotOff,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    SpawnVisual { id: EntityId, kind: EntityKind, position: Vec2 },
    DestroyVisual { id: EntityId },
    SetText { label: Label, value: String },
    PlayEffect { kind: EffectKind, position: Vec2 },
    SetVelocity { id: EntityId, vx: f64, vy: f64 },
    GameOverSignal { final_score: u32 },
}
