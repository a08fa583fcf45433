/// Game data model — pure data, no logic beyond small accessors.

use serde::Deserialize;

// ── Identity & geometry ──────────────────────────────────────────────────────

/// Registry-issued entity id.  Ids are never reused within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u64);

/// The player is not a registry member; overlaps name it with this id.
pub const PLAYER_ID: EntityId = EntityId(0);

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Vec2 { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Vec2 { x: self.x + dx, y: self.y + dy }
    }
}

// ── Kinds ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyVariant {
    /// Straight diver.
    Basic,
    /// Faster diver with a flap animation.
    Fast,
    /// Takes several hits before it goes down.
    Heavy,
    /// Sways side to side on a sine path while descending.
    Swayer,
}

impl EnemyVariant {
    pub const ALL: [EnemyVariant; 4] = [
        EnemyVariant::Basic,
        EnemyVariant::Fast,
        EnemyVariant::Heavy,
        EnemyVariant::Swayer,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PickupKind {
    /// Adds a fixed amount of points.
    Score,
    /// Time-boxed three-way spread fire.
    MultiShot,
}

/// Runner-mode obstacle silhouettes; all four behave identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ObstacleShape {
    Crate,
    Spike,
    Pillar,
    Barrier,
}

impl ObstacleShape {
    pub const ALL: [ObstacleShape; 4] = [
        ObstacleShape::Crate,
        ObstacleShape::Spike,
        ObstacleShape::Pillar,
        ObstacleShape::Barrier,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    PlayerProjectile,
    BossProjectile,
    Enemy(EnemyVariant),
    Pickup(PickupKind),
    Boss,
    Obstacle(ObstacleShape),
}

impl EntityKind {
    pub fn category(&self) -> Category {
        match self {
            EntityKind::PlayerProjectile => Category::PlayerProjectile,
            EntityKind::BossProjectile => Category::BossProjectile,
            EntityKind::Enemy(_) => Category::Enemy,
            EntityKind::Pickup(_) => Category::Pickup,
            EntityKind::Boss => Category::Boss,
            EntityKind::Obstacle(_) => Category::Obstacle,
        }
    }
}

/// Coarse grouping used for overlap dispatch, culling and iteration filters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Player,
    PlayerProjectile,
    BossProjectile,
    Enemy,
    Pickup,
    Boss,
    Obstacle,
}

// ── Entities ─────────────────────────────────────────────────────────────────

/// Optional per-kind fields supplied at spawn time.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Attrs {
    pub health: Option<u32>,
    pub swing_phase: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub alive: bool,
    /// Session time (ms) at which the entity was spawned.
    pub born_at: f64,
    /// Only the boss and heavy enemies carry health.
    pub health: Option<u32>,
    /// Phase accumulator for swaying movers.
    pub swing_phase: f64,
}

// ── Session-level state ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScoreState {
    pub points: u32,
    pub enemies_killed: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameMode {
    /// Vertical shooter: enemy waves, pickups, boss.
    Shooter,
    /// Side-scroller: jump over obstacles arriving from the right.
    Runner,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Input state sampled by the front-end once per frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub shoot: bool,
}

/// One overlap reported by the physics collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Overlap {
    pub category_a: Category,
    pub id_a: EntityId,
    pub category_b: Category,
    pub id_b: EntityId,
}

impl Overlap {
    pub fn new(category_a: Category, id_a: EntityId, category_b: Category, id_b: EntityId) -> Self {
        Overlap { category_a, id_a, category_b, id_b }
    }
}
