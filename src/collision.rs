/// Overlap reactions.
///
/// The physics collaborator reports which pairs touched this frame; this
/// module decides what that means.  Every unordered category pair maps to
/// exactly one rule, and a pair naming an entity that is already dead is
/// dropped before any rule runs, so no kill is scored twice.
use rand::Rng;
use tracing::{debug, info};

use crate::entities::{Attrs, Category, EntityId, EntityKind, Overlap, PickupKind, Vec2, PLAYER_ID};
use crate::error::{CoreError, InvalidArgument, InvariantViolation};
use crate::intent::{EffectKind, Intent, Label};
use crate::session::Session;
use crate::status::HitOutcome;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rule {
    ProjectileEnemy,
    ProjectileBoss,
    PlayerEnemy,
    PlayerBossProjectile,
    PlayerPickup,
    PlayerObstacle,
}

/// Look up the rule for an unordered category pair.  The returned flag is
/// `true` when the pair has to be swapped into the rule's (actor, target)
/// order.
pub fn rule_for(a: Category, b: Category) -> Result<(Rule, bool), CoreError> {
    use Category::*;
    let rule = |a: Category, b: Category| match (a, b) {
        (PlayerProjectile, Enemy) => Some(Rule::ProjectileEnemy),
        (PlayerProjectile, Boss) => Some(Rule::ProjectileBoss),
        (Player, Enemy) => Some(Rule::PlayerEnemy),
        (Player, BossProjectile) => Some(Rule::PlayerBossProjectile),
        (Player, Pickup) => Some(Rule::PlayerPickup),
        (Player, Obstacle) => Some(Rule::PlayerObstacle),
        _ => None,
    };
    if let Some(found) = rule(a, b) {
        Ok((found, false))
    } else if let Some(found) = rule(b, a) {
        Ok((found, true))
    } else {
        Err(InvalidArgument::UnknownCategoryPair { a, b }.into())
    }
}

/// Run the reaction for one reported overlap.  Returns `false` when the pair
/// was stale (one side already destroyed) and nothing happened.
pub fn resolve<R: Rng>(
    session: &mut Session,
    overlap: Overlap,
    rng: &mut R,
) -> Result<bool, CoreError> {
    let (rule, swap) = rule_for(overlap.category_a, overlap.category_b)?;
    let (actor, target) = if swap {
        ((overlap.category_b, overlap.id_b), (overlap.category_a, overlap.id_a))
    } else {
        ((overlap.category_a, overlap.id_a), (overlap.category_b, overlap.id_b))
    };
    if !is_live(session, actor)? || !is_live(session, target)? {
        debug!(?rule, a = overlap.id_a.0, b = overlap.id_b.0, "stale overlap skipped");
        return Ok(false);
    }

    match rule {
        Rule::ProjectileEnemy => projectile_enemy(session, actor.1, target.1, rng)?,
        Rule::ProjectileBoss => projectile_boss(session, actor.1, target.1, rng)?,
        Rule::PlayerEnemy | Rule::PlayerObstacle => player_rammed(session, target.1)?,
        Rule::PlayerBossProjectile => player_shot(session, target.1)?,
        Rule::PlayerPickup => player_pickup(session, target.1)?,
    }
    Ok(true)
}

/// Validate one side of a pair and report whether it may still be matched.
fn is_live(session: &Session, (category, id): (Category, EntityId)) -> Result<bool, CoreError> {
    if category == Category::Player {
        if id != PLAYER_ID {
            let actual = session
                .registry
                .get(id)
                .map(|e| e.kind.category())
                .ok_or(InvariantViolation::UnknownEntity { id })?;
            return Err(InvalidArgument::CategoryMismatch { id, reported: category, actual }.into());
        }
        return Ok(session.player_status.health > 0);
    }
    if !session.registry.was_issued(id) {
        return Err(InvariantViolation::UnknownEntity { id }.into());
    }
    match session.registry.get(id) {
        Some(entity) if entity.kind.category() != category => {
            Err(InvalidArgument::CategoryMismatch {
                id,
                reported: category,
                actual: entity.kind.category(),
            }
            .into())
        }
        Some(entity) => Ok(entity.alive),
        // Removed at an earlier frame boundary.
        None => Ok(false),
    }
}

fn position_of(session: &Session, id: EntityId) -> Vec2 {
    session.registry.get(id).map(|e| e.position).unwrap_or(session.player.position)
}

fn destroy(session: &mut Session, id: EntityId) -> Result<(), CoreError> {
    session.registry.kill(id)?;
    session.intents.push(Intent::DestroyVisual { id });
    Ok(())
}

fn effect(session: &mut Session, kind: EffectKind, position: Vec2) {
    session.intents.push(Intent::PlayEffect { kind, position });
}

fn add_points(session: &mut Session, points: u32) {
    session.score.points = session.score.points.saturating_add(points);
}

fn spawn_pickup(session: &mut Session, kind: PickupKind, position: Vec2) -> EntityId {
    let velocity = Vec2::new(0.0, session.config.enemies.pickup_speed);
    session.spawn(EntityKind::Pickup(kind), position, velocity, Attrs::default())
}

// ── Rules ────────────────────────────────────────────────────────────────────

fn projectile_enemy<R: Rng>(
    session: &mut Session,
    projectile: EntityId,
    enemy: EntityId,
    rng: &mut R,
) -> Result<(), CoreError> {
    destroy(session, projectile)?;
    let at = position_of(session, enemy);

    let Some(entity) = session.registry.get_mut(enemy) else {
        return Err(InvariantViolation::UnknownEntity { id: enemy }.into());
    };
    let EntityKind::Enemy(variant) = entity.kind else {
        return Err(InvalidArgument::CategoryMismatch {
            id: enemy,
            reported: Category::Enemy,
            actual: entity.kind.category(),
        }
        .into());
    };
    // Armoured enemies soak hits until their health runs out.
    if let Some(health) = entity.health.as_mut() {
        *health = health.saturating_sub(1);
        if *health > 0 {
            effect(session, EffectKind::Hit, at);
            return Ok(());
        }
    }

    destroy(session, enemy)?;
    let per_kill = session.config.scoring.per_kill;
    add_points(session, per_kill);
    session.score.enemies_killed = session.score.enemies_killed.saturating_add(1);
    effect(session, EffectKind::Explosion, at);

    let drops = session.config.drops_for(variant);
    if rng.gen::<f64>() < drops.drop_chance {
        let kind = if rng.gen::<f64>() < drops.power_up_chance {
            PickupKind::MultiShot
        } else {
            PickupKind::Score
        };
        spawn_pickup(session, kind, at);
    }

    if session.boss.should_wake(session.score.enemies_killed, &session.config) {
        session.boss.begin_warning(&mut session.scheduler, &session.config, &mut session.intents)?;
    }
    Ok(())
}

fn projectile_boss<R: Rng>(
    session: &mut Session,
    projectile: EntityId,
    boss: EntityId,
    rng: &mut R,
) -> Result<(), CoreError> {
    if session.boss.entity != Some(boss) {
        return Err(InvariantViolation::SecondBoss.into());
    }
    destroy(session, projectile)?;
    let at = position_of(session, boss);

    let defeated = session.boss.damage(session.config.boss.damage_per_hit, &mut session.registry)?;
    effect(session, EffectKind::BossHit, at);
    if !defeated {
        let text = session.boss.health_text();
        session.intents.push(Intent::SetText { label: Label::BossHealth, value: text });
        return Ok(());
    }

    session.boss.defeat(&mut session.registry, &mut session.scheduler, &mut session.intents)?;
    let bonus = session.config.scoring.boss_bonus;
    add_points(session, bonus);
    let scatter = session.config.boss.pickup_scatter;
    for _ in 0..session.config.boss.defeat_pickups {
        let dx = rng.gen_range(-scatter..=scatter);
        let dy = rng.gen_range(-scatter..=scatter);
        spawn_pickup(session, PickupKind::Score, at.offset(dx, dy));
    }
    effect(session, EffectKind::BossDefeat, at);
    info!(score = session.score.points, "boss defeated");
    Ok(())
}

/// Player ran into an enemy or an obstacle.
fn player_rammed(session: &mut Session, other: EntityId) -> Result<(), CoreError> {
    let at = position_of(session, other);
    destroy(session, other)?;
    let player_at = session.player.position;
    effect(session, EffectKind::Hit, player_at);
    effect(session, EffectKind::DamageFlash, player_at);
    let outcome = hurt_player(session)?;
    effect(session, EffectKind::Explosion, at);
    if outcome == HitOutcome::Dead {
        session.enter_game_over();
    }
    Ok(())
}

fn player_shot(session: &mut Session, projectile: EntityId) -> Result<(), CoreError> {
    destroy(session, projectile)?;
    let player_at = session.player.position;
    effect(session, EffectKind::DamageFlash, player_at);
    if hurt_player(session)? == HitOutcome::Dead {
        session.enter_game_over();
    }
    Ok(())
}

fn hurt_player(session: &mut Session) -> Result<HitOutcome, CoreError> {
    session.player_status.take_hit(session.now, &mut session.scheduler, &session.config)
}

fn player_pickup(session: &mut Session, pickup: EntityId) -> Result<(), CoreError> {
    let Some(EntityKind::Pickup(kind)) = session.registry.get(pickup).map(|e| e.kind) else {
        return Err(InvariantViolation::UnknownEntity { id: pickup }.into());
    };
    let at = position_of(session, pickup);
    destroy(session, pickup)?;

    match kind {
        PickupKind::Score => {
            let points = session.config.scoring.score_pickup;
            add_points(session, points);
        }
        PickupKind::MultiShot => {
            let duration = session.config.status.multi_shot_ms;
            if session.player_status.activate_multi_shot(session.now, duration) {
                let player_at = session.player.position;
                effect(session, EffectKind::MultiShotOn, player_at);
            }
        }
    }
    effect(session, EffectKind::Collect, at);
    Ok(())
}
