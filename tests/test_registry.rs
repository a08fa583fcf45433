use arcade_core::entities::*;
use arcade_core::error::{CoreError, InvariantViolation};
use arcade_core::registry::*;

fn enemy(r: &mut Registry, x: f64) -> EntityId {
    let kind = EntityKind::Enemy(EnemyVariant::Basic);
    r.spawn(kind, Vec2::new(x, 0.0), Vec2::ZERO, Attrs::default(), 0.0)
}

// ── spawn / destroy ───────────────────────────────────────────────────────────

#[test]
fn ids_start_after_player_and_never_repeat() {
    let mut r = Registry::new();
    let a = enemy(&mut r, 0.0);
    let b = enemy(&mut r, 0.0);
    assert_eq!(a, EntityId(1));
    assert_eq!(b, EntityId(2));
    r.destroy(a);
    r.end_frame();
    let c = enemy(&mut r, 0.0);
    assert_eq!(c, EntityId(3));
    assert!(!r.was_issued(PLAYER_ID));
}

#[test]
fn spawn_records_attrs() {
    let mut r = Registry::new();
    let attrs = Attrs { health: Some(3), swing_phase: 0.5 };
    let id = r.spawn(EntityKind::Boss, Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0), attrs, 250.0);
    let e = r.get(id).unwrap();
    assert_eq!(e.health, Some(3));
    assert_eq!(e.swing_phase, 0.5);
    assert_eq!(e.born_at, 250.0);
    assert!(e.alive);
}

#[test]
fn destroy_is_visible_immediately_but_removed_at_frame_end() {
    let mut r = Registry::new();
    let id = enemy(&mut r, 0.0);
    assert!(r.destroy(id));
    assert!(!r.is_alive(id));
    assert!(r.get(id).is_some());
    assert_eq!(r.count(None), 0);

    assert_eq!(r.end_frame(), vec![id]);
    assert!(r.get(id).is_none());
    assert!(r.was_issued(id));
    assert!(r.end_frame().is_empty());
}

#[test]
fn destroy_twice_is_a_no_op() {
    let mut r = Registry::new();
    let id = enemy(&mut r, 0.0);
    assert!(r.destroy(id));
    assert!(!r.destroy(id));
    assert_eq!(r.end_frame().len(), 1);
}

#[test]
fn kill_reports_dead_and_unknown_ids() {
    let mut r = Registry::new();
    let id = enemy(&mut r, 0.0);
    r.kill(id).unwrap();
    assert_eq!(
        r.kill(id),
        Err(CoreError::InvariantViolation(InvariantViolation::DeadEntity { id }))
    );
    let never = EntityId(99);
    assert_eq!(
        r.kill(never),
        Err(CoreError::InvariantViolation(InvariantViolation::UnknownEntity { id: never }))
    );
}

// ── iteration ─────────────────────────────────────────────────────────────────

#[test]
fn iteration_filters_by_category_in_spawn_order() {
    let mut r = Registry::new();
    let a = enemy(&mut r, 1.0);
    let coin = EntityKind::Pickup(PickupKind::Score);
    let p = r.spawn(coin, Vec2::ZERO, Vec2::ZERO, Attrs::default(), 0.0);
    let b = enemy(&mut r, 2.0);

    assert_eq!(r.alive_ids(Some(Category::Enemy)), vec![a, b]);
    assert_eq!(r.alive_ids(Some(Category::Pickup)), vec![p]);
    assert_eq!(r.alive_ids(None), vec![a, p, b]);
    assert_eq!(r.count(Some(Category::Boss)), 0);
}

#[test]
fn iter_alive_can_be_walked_twice() {
    let mut r = Registry::new();
    enemy(&mut r, 1.0);
    enemy(&mut r, 2.0);
    let view = r.iter_alive(Some(Category::Enemy));
    let first: Vec<EntityId> = view.clone().map(|e| e.id).collect();
    let second: Vec<EntityId> = view.map(|e| e.id).collect();
    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[test]
fn for_each_alive_skips_destroyed_and_ignores_new_spawns() {
    let mut r = Registry::new();
    let a = enemy(&mut r, 1.0);
    let b = enemy(&mut r, 2.0);
    let c = enemy(&mut r, 3.0);

    let mut visited = Vec::new();
    let mut spawned = Vec::new();
    r.for_each_alive(Some(Category::Enemy), |r, id| {
        visited.push(id);
        if id == a {
            r.destroy(c);
            spawned.push(enemy(r, 4.0));
        }
    });

    assert_eq!(visited, vec![a, b]);
    assert_eq!(spawned.len(), 1);
    assert!(r.is_alive(spawned[0]));
    assert_eq!(r.end_frame(), vec![c]);
    assert_eq!(r.count(Some(Category::Enemy)), 3);
}

#[test]
fn for_each_alive_self_destroy_round_trip() {
    let mut r = Registry::new();
    for x in 0..5 {
        enemy(&mut r, x as f64);
    }
    r.for_each_alive(None, |r, id| {
        r.destroy(id);
        let coin = EntityKind::Pickup(PickupKind::Score);
        r.spawn(coin, Vec2::ZERO, Vec2::ZERO, Attrs::default(), 0.0);
    });
    assert_eq!(r.end_frame().len(), 5);
    assert_eq!(r.count(Some(Category::Enemy)), 0);
    assert_eq!(r.count(Some(Category::Pickup)), 5);
}

// ── cull / integrate ──────────────────────────────────────────────────────────

#[test]
fn cull_destroys_matching_only() {
    let mut r = Registry::new();
    let near = enemy(&mut r, 10.0);
    let far = enemy(&mut r, 900.0);
    let gone = r.cull(Some(Category::Enemy), |e| e.position.x > 500.0);
    assert_eq!(gone, vec![far]);
    assert!(r.is_alive(near));
    assert!(!r.is_alive(far));
}

#[test]
fn integrate_moves_alive_entities_in_pixels_per_second() {
    let mut r = Registry::new();
    let bolt = EntityKind::BossProjectile;
    let moving = r.spawn(bolt, Vec2::ZERO, Vec2::new(100.0, -50.0), Attrs::default(), 0.0);
    let dead = r.spawn(bolt, Vec2::ZERO, Vec2::new(100.0, 0.0), Attrs::default(), 0.0);
    r.destroy(dead);
    r.integrate(500.0);
    assert_eq!(r.get(moving).unwrap().position, Vec2::new(50.0, -25.0));
    assert_eq!(r.get(dead).unwrap().position, Vec2::ZERO);
}
