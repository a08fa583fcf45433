use arcade_core::config::GameConfig;
use arcade_core::entities::Vec2;
use arcade_core::intent::{EffectKind, Intent};
use arcade_core::session::TimerEvent;
use arcade_core::status::*;
use arcade_core::timer::Scheduler;

fn effects(out: &[Intent]) -> Vec<EffectKind> {
    out.iter()
        .filter_map(|i| match i {
            Intent::PlayEffect { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect()
}

/// Feed timer events back into the status the way the session does.
fn run_timers(
    status: &mut PlayerStatus,
    sched: &mut Scheduler<TimerEvent>,
    cfg: &GameConfig,
    dt: f64,
    out: &mut Vec<Intent>,
) {
    sched
        .tick(dt, |sched, _, event| {
            match event {
                TimerEvent::Flicker => status.on_flicker(sched, cfg, Vec2::ZERO, out),
                TimerEvent::Shake => status.on_shake(sched, cfg, Vec2::ZERO, out),
                TimerEvent::RecoveryOver => status.on_recovery_over(sched, Vec2::ZERO, out),
                TimerEvent::RecoilReturn => status.on_recoil_return(sched, cfg, Vec2::ZERO, out)?,
                TimerEvent::RecoilDone => status.on_recoil_done(),
                TimerEvent::BossWarningOver | TimerEvent::BossAttack => {}
            }
            Ok(())
        })
        .unwrap();
}

// ── Multi-shot ────────────────────────────────────────────────────────────────

#[test]
fn multi_shot_refresh_replaces_expiry() {
    let cfg = GameConfig::default();
    let mut s = PlayerStatus::new(&cfg);
    assert!(s.activate_multi_shot(1000.0, 10_000.0));
    assert!(!s.activate_multi_shot(2000.0, 10_000.0));
    assert_eq!(s.power_up().unwrap().expires_at, 12_000.0);
    assert!(s.multi_shot_active());
}

#[test]
fn multi_shot_expiry_reported_once() {
    let cfg = GameConfig::default();
    let mut s = PlayerStatus::new(&cfg);
    s.activate_multi_shot(0.0, 10_000.0);
    assert_eq!(s.tick(9_999.0), None);
    assert_eq!(s.tick(10_000.0), Some(PowerUpKind::MultiShot));
    assert_eq!(s.tick(10_001.0), None);
    assert!(!s.multi_shot_active());
    assert!(s.power_up().is_none());
}

#[test]
fn seconds_left_rounds_up() {
    let cfg = GameConfig::default();
    let mut s = PlayerStatus::new(&cfg);
    assert_eq!(s.power_up_seconds_left(0.0), None);
    s.activate_multi_shot(0.0, 10_000.0);
    assert_eq!(s.power_up_seconds_left(0.0), Some(10));
    assert_eq!(s.power_up_seconds_left(8_500.0), Some(2));
    assert_eq!(s.power_up_seconds_left(20_000.0), Some(0));
}

// ── Damage & recovery ─────────────────────────────────────────────────────────

#[test]
fn hits_count_down_to_dead_and_stop_at_zero() {
    let cfg = GameConfig::default();
    let mut s = PlayerStatus::new(&cfg);
    let mut sched = Scheduler::new();
    assert_eq!(s.take_hit(0.0, &mut sched, &cfg), Ok(HitOutcome::Damaged { health: 2 }));
    assert_eq!(s.take_hit(0.0, &mut sched, &cfg), Ok(HitOutcome::Damaged { health: 1 }));
    assert_eq!(s.take_hit(0.0, &mut sched, &cfg), Ok(HitOutcome::Dead));
    assert_eq!(s.take_hit(0.0, &mut sched, &cfg), Ok(HitOutcome::Dead));
    assert_eq!(s.health, 0);
}

#[test]
fn recovery_effects_start_once_per_window() {
    let cfg = GameConfig::default();
    let mut s = PlayerStatus::new(&cfg);
    let mut sched = Scheduler::new();
    s.take_hit(0.0, &mut sched, &cfg).unwrap();
    assert_eq!(sched.len(), 3);
    assert!(s.recovering);

    // Second hit during recovery: damage applies, no new effect timers.
    s.take_hit(10.0, &mut sched, &cfg).unwrap();
    assert_eq!(s.health, 1);
    assert_eq!(sched.len(), 3);
}

#[test]
fn recovery_runs_its_course() {
    let cfg = GameConfig::default();
    let mut s = PlayerStatus::new(&cfg);
    let mut sched = Scheduler::new();
    let mut out = Vec::new();
    s.take_hit(0.0, &mut sched, &cfg).unwrap();

    for _ in 0..12 {
        run_timers(&mut s, &mut sched, &cfg, 50.0, &mut out);
    }
    assert!(!s.recovering);
    assert!(sched.is_empty());

    let fx = effects(&out);
    let flickers = fx.iter().filter(|k| matches!(k, EffectKind::Flicker { tinted: true })).count();
    let shakes =
        fx.iter().filter(|k| matches!(k, EffectKind::Shake { offset } if *offset < 0.0)).count();
    assert_eq!(flickers, 3);
    assert_eq!(shakes, 4);
    // Recovery ends back at rest.
    let at_rest = [EffectKind::Flicker { tinted: false }, EffectKind::Shake { offset: 0.0 }];
    assert!(fx.ends_with(&at_rest));
}

#[test]
fn new_hit_after_recovery_restarts_effects() {
    let cfg = GameConfig::default();
    let mut s = PlayerStatus::new(&cfg);
    let mut sched = Scheduler::new();
    let mut out = Vec::new();
    s.take_hit(0.0, &mut sched, &cfg).unwrap();
    run_timers(&mut s, &mut sched, &cfg, 600.0, &mut out);
    run_timers(&mut s, &mut sched, &cfg, 600.0, &mut out);
    assert!(!s.recovering);

    s.take_hit(1200.0, &mut sched, &cfg).unwrap();
    assert!(s.recovering);
    assert_eq!(sched.len(), 3);
}

#[test]
fn invulnerability_window_ignores_hits() {
    let mut cfg = GameConfig::default();
    cfg.status.invulnerability_ms = 500.0;
    let mut s = PlayerStatus::new(&cfg);
    let mut sched = Scheduler::new();
    s.take_hit(0.0, &mut sched, &cfg).unwrap();
    assert_eq!(s.take_hit(499.0, &mut sched, &cfg), Ok(HitOutcome::Ignored));
    assert_eq!(s.health, 2);
    assert_eq!(s.take_hit(500.0, &mut sched, &cfg), Ok(HitOutcome::Damaged { health: 1 }));
}

// ── Recoil ────────────────────────────────────────────────────────────────────

#[test]
fn recoil_is_not_reentrant() {
    let cfg = GameConfig::default();
    let mut s = PlayerStatus::new(&cfg);
    let mut sched = Scheduler::new();
    let mut out = Vec::new();
    assert_eq!(s.begin_recoil(&mut sched, &cfg, Vec2::ZERO, &mut out), Ok(true));
    assert_eq!(s.begin_recoil(&mut sched, &cfg, Vec2::ZERO, &mut out), Ok(false));
    assert_eq!(sched.len(), 1);

    run_timers(&mut s, &mut sched, &cfg, cfg.player.recoil_ms, &mut out);
    assert!(s.recoil_in_progress);
    run_timers(&mut s, &mut sched, &cfg, cfg.player.recoil_ms, &mut out);
    assert!(!s.recoil_in_progress);
    assert_eq!(
        effects(&out),
        vec![
            EffectKind::Recoil { offset: cfg.player.recoil_distance },
            EffectKind::Recoil { offset: 0.0 }
        ]
    );
    assert_eq!(s.begin_recoil(&mut sched, &cfg, Vec2::ZERO, &mut out), Ok(true));
}
