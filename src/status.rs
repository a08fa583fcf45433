/// Player status: health, multi-shot power-up, hit recovery and recoil.
///
/// Timed visual effects are driven by scheduler events the session routes
/// back here (`on_flicker`, `on_shake`, `on_recovery_over`, `on_recoil_*`).
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::entities::Vec2;
use crate::error::CoreError;
use crate::intent::{EffectKind, Intent};
use crate::session::TimerEvent;
use crate::timer::{Scheduler, TimerHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerUpKind {
    MultiShot,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub expires_at: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitOutcome {
    /// Inside an invulnerability window; nothing changed.
    Ignored,
    Damaged { health: u32 },
    Dead,
}

#[derive(Clone, Debug)]
pub struct PlayerStatus {
    pub health: u32,
    pub max_health: u32,
    pub invulnerable_until: Option<f64>,
    power_up: Option<PowerUp>,
    pub recoil_in_progress: bool,
    pub recovering: bool,
    flicker_count: u32,
    shake_count: u32,
    flicker_timer: Option<TimerHandle>,
    shake_timer: Option<TimerHandle>,
}

impl PlayerStatus {
    pub fn new(cfg: &GameConfig) -> Self {
        PlayerStatus {
            health: cfg.player.max_health,
            max_health: cfg.player.max_health,
            invulnerable_until: None,
            power_up: None,
            recoil_in_progress: false,
            recovering: false,
            flicker_count: 0,
            shake_count: 0,
            flicker_timer: None,
            shake_timer: None,
        }
    }

    // ── Power-up ─────────────────────────────────────────────────────────────

    pub fn power_up(&self) -> Option<PowerUp> {
        self.power_up
    }

    pub fn multi_shot_active(&self) -> bool {
        self.power_up.is_some_and(|p| p.kind == PowerUpKind::MultiShot)
    }

    /// Start or refresh multi-shot so it ends at `now + duration_ms`.
    /// Returns `true` if it was not active before.
    pub fn activate_multi_shot(&mut self, now: f64, duration_ms: f64) -> bool {
        let fresh = self.power_up.is_none();
        let expires_at = now + duration_ms;
        self.power_up = Some(PowerUp { kind: PowerUpKind::MultiShot, expires_at });
        debug!(expires_at = now + duration_ms, fresh, "multi-shot");
        fresh
    }

    /// Clear an expired power-up.  Reports the kind only on the frame it ends.
    pub fn tick(&mut self, now: f64) -> Option<PowerUpKind> {
        match self.power_up {
            Some(p) if now >= p.expires_at => {
                self.power_up = None;
                info!(kind = ?p.kind, "power-up expired");
                Some(p.kind)
            }
            _ => None,
        }
    }

    /// Seconds left on the active power-up, rounded up.
    pub fn power_up_seconds_left(&self, now: f64) -> Option<u32> {
        self.power_up.map(|p| ((p.expires_at - now).max(0.0) / 1000.0).ceil() as u32)
    }

    // ── Damage & recovery ────────────────────────────────────────────────────

    /// Take one point of damage.  The recovery flicker/shake starts only if
    /// it is not already running; health always drops.
    pub fn take_hit(
        &mut self,
        now: f64,
        scheduler: &mut Scheduler<TimerEvent>,
        cfg: &GameConfig,
    ) -> Result<HitOutcome, CoreError> {
        if self.invulnerable_until.is_some_and(|until| now < until) {
            return Ok(HitOutcome::Ignored);
        }
        self.health = self.health.saturating_sub(1);
        if cfg.status.invulnerability_ms > 0.0 {
            self.invulnerable_until = Some(now + cfg.status.invulnerability_ms);
        }

        if !self.recovering {
            self.recovering = true;
            self.flicker_count = 0;
            self.shake_count = 0;
            let flicker =
                scheduler.schedule(cfg.status.flicker_interval_ms, true, TimerEvent::Flicker)?;
            self.flicker_timer = Some(flicker);
            let shake = scheduler.schedule(cfg.status.shake_interval_ms, true, TimerEvent::Shake)?;
            self.shake_timer = Some(shake);
            scheduler.schedule(cfg.status.recovery_ms, false, TimerEvent::RecoveryOver)?;
        }

        info!(health = self.health, "player hit");
        Ok(if self.health == 0 {
            HitOutcome::Dead
        } else {
            HitOutcome::Damaged { health: self.health }
        })
    }

    /// Alternate tinted/untinted until the configured toggle count is spent.
    pub fn on_flicker(
        &mut self,
        scheduler: &mut Scheduler<TimerEvent>,
        cfg: &GameConfig,
        at: Vec2,
        out: &mut Vec<Intent>,
    ) {
        self.flicker_count += 1;
        let tinted = self.flicker_count % 2 == 1;
        out.push(Intent::PlayEffect { kind: EffectKind::Flicker { tinted }, position: at });
        if self.flicker_count >= cfg.status.flicker_toggles {
            if let Some(handle) = self.flicker_timer.take() {
                scheduler.cancel(handle);
            }
        }
    }

    /// Yo-yo between rest and `-shake_distance`.
    pub fn on_shake(
        &mut self,
        scheduler: &mut Scheduler<TimerEvent>,
        cfg: &GameConfig,
        at: Vec2,
        out: &mut Vec<Intent>,
    ) {
        self.shake_count += 1;
        let offset = if self.shake_count % 2 == 1 { -cfg.status.shake_distance } else { 0.0 };
        out.push(Intent::PlayEffect { kind: EffectKind::Shake { offset }, position: at });
        if self.shake_count >= cfg.status.shake_steps {
            if let Some(handle) = self.shake_timer.take() {
                scheduler.cancel(handle);
            }
        }
    }

    pub fn on_recovery_over(
        &mut self,
        scheduler: &mut Scheduler<TimerEvent>,
        at: Vec2,
        out: &mut Vec<Intent>,
    ) {
        self.recovering = false;
        for handle in [self.flicker_timer.take(), self.shake_timer.take()].into_iter().flatten() {
            scheduler.cancel(handle);
        }
        out.push(Intent::PlayEffect { kind: EffectKind::Flicker { tinted: false }, position: at });
        out.push(Intent::PlayEffect { kind: EffectKind::Shake { offset: 0.0 }, position: at });
    }

    // ── Recoil ───────────────────────────────────────────────────────────────

    /// Kick the sprite down after a shot.  Returns `false` while a recoil is
    /// already playing.
    pub fn begin_recoil(
        &mut self,
        scheduler: &mut Scheduler<TimerEvent>,
        cfg: &GameConfig,
        at: Vec2,
        out: &mut Vec<Intent>,
    ) -> Result<bool, CoreError> {
        if self.recoil_in_progress {
            return Ok(false);
        }
        self.recoil_in_progress = true;
        scheduler.schedule(cfg.player.recoil_ms, false, TimerEvent::RecoilReturn)?;
        let kind = EffectKind::Recoil { offset: cfg.player.recoil_distance };
        out.push(Intent::PlayEffect { kind, position: at });
        Ok(true)
    }

    pub fn on_recoil_return(
        &mut self,
        scheduler: &mut Scheduler<TimerEvent>,
        cfg: &GameConfig,
        at: Vec2,
        out: &mut Vec<Intent>,
    ) -> Result<(), CoreError> {
        scheduler.schedule(cfg.player.recoil_ms, false, TimerEvent::RecoilDone)?;
        out.push(Intent::PlayEffect { kind: EffectKind::Recoil { offset: 0.0 }, position: at });
        Ok(())
    }

    pub fn on_recoil_done(&mut self) {
        self.recoil_in_progress = false;
    }
}
