/// Headless stand-in for the engine's overlap detection.
///
/// Real front-ends get overlap pairs from their physics engine.  This one
/// treats every object as an axis-aligned box around its position, which is
/// enough to drive the core from a terminal or a test.
use crate::entities::{Category, Entity, EntityKind, Overlap, Vec2, PLAYER_ID};
use crate::session::Session;

/// Half extents (px) per kind of object.
#[derive(Clone, Debug, PartialEq)]
pub struct HitBoxes {
    pub player: Vec2,
    pub projectile: Vec2,
    pub enemy: Vec2,
    pub pickup: Vec2,
    pub boss: Vec2,
    pub obstacle: Vec2,
}

impl Default for HitBoxes {
    fn default() -> Self {
        HitBoxes {
            player: Vec2::new(16.0, 16.0),
            projectile: Vec2::new(3.0, 6.0),
            enemy: Vec2::new(14.0, 16.0),
            pickup: Vec2::new(10.0, 10.0),
            boss: Vec2::new(32.0, 28.0),
            obstacle: Vec2::new(14.0, 18.0),
        }
    }
}

impl HitBoxes {
    fn half_extent(&self, kind: EntityKind) -> Vec2 {
        match kind {
            EntityKind::PlayerProjectile | EntityKind::BossProjectile => self.projectile,
            EntityKind::Enemy(_) => self.enemy,
            EntityKind::Pickup(_) => self.pickup,
            EntityKind::Boss => self.boss,
            EntityKind::Obstacle(_) => self.obstacle,
        }
    }
}

fn touching(a: Vec2, ha: Vec2, b: Vec2, hb: Vec2) -> bool {
    (a.x - b.x).abs() <= ha.x + hb.x && (a.y - b.y).abs() <= ha.y + hb.y
}

/// Every overlapping pair the core has a rule for, in a stable order:
/// player projectiles first (by id), then the player's contacts.
pub fn detect_overlaps(session: &Session, boxes: &HitBoxes) -> Vec<Overlap> {
    let registry = session.registry();
    let mut pairs = Vec::new();

    let targets: Vec<&Entity> = registry
        .iter_alive(None)
        .filter(|e| matches!(e.kind.category(), Category::Enemy | Category::Boss))
        .collect();
    for shot in registry.iter_alive(Some(Category::PlayerProjectile)) {
        let hs = boxes.half_extent(shot.kind);
        for target in &targets {
            if touching(shot.position, hs, target.position, boxes.half_extent(target.kind)) {
                let category = target.kind.category();
                pairs.push(Overlap::new(Category::PlayerProjectile, shot.id, category, target.id));
            }
        }
    }

    let player = session.player().position;
    for other in registry.iter_alive(None) {
        let category = other.kind.category();
        let hits_player = matches!(
            category,
            Category::Enemy | Category::BossProjectile | Category::Pickup | Category::Obstacle
        );
        let other_half = boxes.half_extent(other.kind);
        if hits_player && touching(player, boxes.player, other.position, other_half) {
            pairs.push(Overlap::new(Category::Player, PLAYER_ID, category, other.id));
        }
    }
    pairs
}
