use arcade_core::boss::*;
use arcade_core::config::GameConfig;
use arcade_core::entities::*;
use arcade_core::error::{CoreError, InvariantViolation};
use arcade_core::intent::{Intent, Label};
use arcade_core::registry::Registry;
use arcade_core::session::TimerEvent;
use arcade_core::timer::Scheduler;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

struct Rig {
    cfg: GameConfig,
    boss: BossState,
    registry: Registry,
    sched: Scheduler<TimerEvent>,
    out: Vec<Intent>,
    rng: StdRng,
}

fn rig() -> Rig {
    let cfg = GameConfig::default();
    Rig {
        boss: BossState::new(&cfg),
        cfg,
        registry: Registry::new(),
        sched: Scheduler::new(),
        out: Vec::new(),
        rng: seeded_rng(),
    }
}

fn active_rig() -> Rig {
    let mut r = rig();
    r.boss.begin_warning(&mut r.sched, &r.cfg, &mut r.out).unwrap();
    r.boss
        .activate(&mut r.registry, &mut r.sched, &r.cfg, 0.0, &mut r.rng, &mut r.out)
        .unwrap();
    r.out.clear();
    r
}

// ── Wake-up ───────────────────────────────────────────────────────────────────

#[test]
fn wakes_only_from_inactive_at_threshold() {
    let mut r = rig();
    assert!(!r.boss.should_wake(9, &r.cfg));
    assert!(r.boss.should_wake(10, &r.cfg));
    r.boss.begin_warning(&mut r.sched, &r.cfg, &mut r.out).unwrap();
    assert_eq!(r.boss.phase, BossPhase::Warning);
    assert!(!r.boss.should_wake(11, &r.cfg));
}

#[test]
fn warning_announces_and_arms_timer() {
    let mut r = rig();
    r.boss.begin_warning(&mut r.sched, &r.cfg, &mut r.out).unwrap();
    assert!(r.out.contains(&Intent::SetText { label: Label::Banner, value: "WARNING".into() }));
    let handle = r.boss.warning_timer.unwrap();
    assert!(r.sched.is_pending(handle));
    assert!(r.boss.is_engaged());
    assert_eq!(r.registry.count(Some(Category::Boss)), 0);
}

#[test]
fn second_warning_is_an_invariant_violation() {
    let mut r = rig();
    r.boss.begin_warning(&mut r.sched, &r.cfg, &mut r.out).unwrap();
    assert_eq!(
        r.boss.begin_warning(&mut r.sched, &r.cfg, &mut r.out),
        Err(CoreError::InvariantViolation(InvariantViolation::BossTransition {
            from: "Warning",
            to: "Warning"
        }))
    );
}

#[test]
fn activate_without_warning_is_rejected() {
    let mut r = rig();
    let result =
        r.boss.activate(&mut r.registry, &mut r.sched, &r.cfg, 0.0, &mut r.rng, &mut r.out);
    assert!(matches!(
        result,
        Err(CoreError::InvariantViolation(InvariantViolation::BossTransition {
            from: "Inactive",
            to: "Active"
        }))
    ));
    assert_eq!(r.registry.count(None), 0);
}

#[test]
fn activate_with_live_boss_is_rejected() {
    let mut r = rig();
    r.registry.spawn(EntityKind::Boss, Vec2::ZERO, Vec2::ZERO, Attrs::default(), 0.0);
    r.boss.begin_warning(&mut r.sched, &r.cfg, &mut r.out).unwrap();
    let result =
        r.boss.activate(&mut r.registry, &mut r.sched, &r.cfg, 0.0, &mut r.rng, &mut r.out);
    assert_eq!(result, Err(CoreError::InvariantViolation(InvariantViolation::SecondBoss)));
}

// ── Active ────────────────────────────────────────────────────────────────────

#[test]
fn activation_spawns_boss_with_full_health() {
    let r = active_rig();
    assert_eq!(r.boss.phase, BossPhase::Active);
    assert_eq!(r.boss.warning_timer, None);
    let id = r.boss.entity.unwrap();
    let entity = r.registry.get(id).unwrap();
    assert_eq!(entity.kind, EntityKind::Boss);
    assert_eq!(entity.health, Some(30));
    assert_eq!(entity.position, Vec2::new(r.cfg.world.width / 2.0, r.cfg.boss.spawn_y));
    assert!(r.sched.is_pending(r.boss.attack_timer.unwrap()));
    assert_eq!(r.boss.health_text(), "BOSS 30/30");
}

#[test]
fn attack_fires_down_into_cone() {
    let mut r = active_rig();
    for _ in 0..50 {
        r.boss
            .attack(&mut r.registry, &mut r.sched, &r.cfg, 0.0, &mut r.rng, &mut r.out)
            .unwrap();
    }
    let limit = r.cfg.boss.cone_deg.to_radians().tan() + 1e-9;
    let shots: Vec<&Entity> = r.registry.iter_alive(Some(Category::BossProjectile)).collect();
    assert_eq!(shots.len(), 50);
    for shot in shots {
        assert!(shot.velocity.y > 0.0);
        assert!((shot.velocity.x / shot.velocity.y).abs() <= limit);
        let speed = shot.velocity.x.hypot(shot.velocity.y);
        assert!((speed - r.cfg.boss.projectile_speed).abs() < 1e-6);
    }
}

#[test]
fn attack_interval_is_redrawn_inside_band() {
    let mut r = active_rig();
    let handle = r.boss.attack_timer.unwrap();
    let mut fired = 0;
    // Worst case the band's upper edge; one firing per 1600 ms at least.
    for _ in 0..20 {
        let boss = &mut r.boss;
        let (registry, cfg, rng, out) = (&mut r.registry, &r.cfg, &mut r.rng, &mut r.out);
        r.sched
            .tick(1600.0, |sched, _, event| {
                assert_eq!(event, TimerEvent::BossAttack);
                fired += 1;
                boss.attack(registry, sched, cfg, 0.0, rng, out)
            })
            .unwrap();
    }
    assert_eq!(fired, 20);
    assert!(r.sched.is_pending(handle));
}

#[test]
fn sway_phase_only_grows() {
    let mut r = active_rig();
    let mut last = r.boss.swing_phase;
    for _ in 0..100 {
        r.boss.sway(&mut r.registry, &r.cfg, 16.0, &mut r.out);
        assert!(r.boss.swing_phase > last);
        last = r.boss.swing_phase;
        let entity = r.registry.get(r.boss.entity.unwrap()).unwrap();
        assert!(entity.velocity.x.abs() <= r.cfg.boss.swing_amplitude);
        assert_eq!(entity.velocity.y, 0.0);
    }
}

// ── Damage & defeat ───────────────────────────────────────────────────────────

#[test]
fn damage_counts_down_to_defeat() {
    let mut r = active_rig();
    for expected in (1..30).rev() {
        assert_eq!(r.boss.damage(1, &mut r.registry), Ok(false));
        assert_eq!(r.boss.health, expected);
    }
    assert_eq!(r.boss.damage(1, &mut r.registry), Ok(true));
    assert_eq!(r.boss.health, 0);
}

#[test]
fn damage_before_activation_is_rejected() {
    let mut r = rig();
    assert!(r.boss.damage(1, &mut r.registry).is_err());
    assert_eq!(r.boss.health, 30);
}

#[test]
fn defeat_tears_down_once() {
    let mut r = active_rig();
    let id = r.boss.entity.unwrap();
    let attack = r.boss.attack_timer.unwrap();
    r.boss.damage(30, &mut r.registry).unwrap();
    r.boss.defeat(&mut r.registry, &mut r.sched, &mut r.out).unwrap();

    assert_eq!(r.boss.phase, BossPhase::Defeated);
    assert!(!r.registry.is_alive(id));
    assert!(!r.sched.is_pending(attack));
    assert!(r.out.contains(&Intent::DestroyVisual { id }));
    assert!(r.out.contains(&Intent::SetText { label: Label::BossHealth, value: String::new() }));

    assert!(r.boss.defeat(&mut r.registry, &mut r.sched, &mut r.out).is_err());
    assert!(r.boss.damage(1, &mut r.registry).is_err());
    assert!(!r.boss.should_wake(100, &r.cfg));
}
