/// Boss lifecycle: Inactive → Warning → Active → Defeated.
///
/// The boss wakes once per session, when the kill counter reaches the
/// configured threshold.  While Active it sways on a sine path and fires
/// into a downward cone on a randomized interval.
use rand::Rng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::entities::{Attrs, Category, EntityId, EntityKind, Vec2};
use crate::error::{CoreError, InvariantViolation};
use crate::intent::{EffectKind, Intent, Label};
use crate::registry::Registry;
use crate::session::TimerEvent;
use crate::spawner::DelayBand;
use crate::timer::{Scheduler, TimerHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossPhase {
    Inactive,
    Warning,
    Active,
    Defeated,
}

impl BossPhase {
    pub fn name(&self) -> &'static str {
        match self {
            BossPhase::Inactive => "Inactive",
            BossPhase::Warning => "Warning",
            BossPhase::Active => "Active",
            BossPhase::Defeated => "Defeated",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BossState {
    pub phase: BossPhase,
    pub health: u32,
    pub max_health: u32,
    pub attack_timer: Option<TimerHandle>,
    pub warning_timer: Option<TimerHandle>,
    /// Only ever grows; feeds the horizontal sine velocity.
    pub swing_phase: f64,
    pub entity: Option<EntityId>,
}

impl BossState {
    pub fn new(cfg: &GameConfig) -> Self {
        BossState {
            phase: BossPhase::Inactive,
            health: cfg.boss.max_health,
            max_health: cfg.boss.max_health,
            attack_timer: None,
            warning_timer: None,
            swing_phase: 0.0,
            entity: None,
        }
    }

    pub fn is_engaged(&self) -> bool {
        matches!(self.phase, BossPhase::Warning | BossPhase::Active)
    }

    fn transition(&mut self, to: BossPhase) -> Result<(), CoreError> {
        let legal = matches!(
            (self.phase, to),
            (BossPhase::Inactive, BossPhase::Warning)
                | (BossPhase::Warning, BossPhase::Active)
                | (BossPhase::Active, BossPhase::Defeated)
        );
        if !legal {
            let from = self.phase.name();
            return Err(InvariantViolation::BossTransition { from, to: to.name() }.into());
        }
        info!(from = self.phase.name(), to = to.name(), "boss phase");
        self.phase = to;
        Ok(())
    }

    /// True exactly while the boss is still asleep and the threshold is met.
    pub fn should_wake(&self, enemies_killed: u32, cfg: &GameConfig) -> bool {
        self.phase == BossPhase::Inactive && enemies_killed >= cfg.boss.kill_threshold
    }

    /// Inactive → Warning: announce, no attacks yet.
    pub fn begin_warning(
        &mut self,
        scheduler: &mut Scheduler<TimerEvent>,
        cfg: &GameConfig,
        out: &mut Vec<Intent>,
    ) -> Result<(), CoreError> {
        self.transition(BossPhase::Warning)?;
        let handle = scheduler.schedule(cfg.boss.warning_ms, false, TimerEvent::BossWarningOver)?;
        self.warning_timer = Some(handle);
        out.push(Intent::SetText { label: Label::Banner, value: "WARNING".into() });
        out.push(Intent::PlayEffect {
            kind: EffectKind::BossWarning,
            position: Vec2::new(cfg.world.width / 2.0, cfg.world.height / 2.0),
        });
        Ok(())
    }

    /// Warning → Active: put the boss in play and arm its attack timer.
    pub fn activate(
        &mut self,
        registry: &mut Registry,
        scheduler: &mut Scheduler<TimerEvent>,
        cfg: &GameConfig,
        now: f64,
        rng: &mut impl Rng,
        out: &mut Vec<Intent>,
    ) -> Result<(), CoreError> {
        if registry.count(Some(Category::Boss)) > 0 {
            return Err(InvariantViolation::SecondBoss.into());
        }
        self.transition(BossPhase::Active)?;
        self.warning_timer = None;

        let position = Vec2::new(cfg.world.width / 2.0, cfg.boss.spawn_y);
        let attrs = Attrs { health: Some(self.max_health), swing_phase: self.swing_phase };
        let id = registry.spawn(EntityKind::Boss, position, Vec2::ZERO, attrs, now);
        self.entity = Some(id);

        let band = attack_band(cfg)?;
        self.attack_timer = Some(scheduler.schedule(band.draw(rng), true, TimerEvent::BossAttack)?);

        out.push(Intent::SpawnVisual { id, kind: EntityKind::Boss, position });
        out.push(Intent::SetText { label: Label::Banner, value: String::new() });
        out.push(Intent::SetText { label: Label::BossHealth, value: self.health_text() });
        Ok(())
    }

    /// Fire one projectile into the downward cone and redraw the interval.
    pub fn attack(
        &mut self,
        registry: &mut Registry,
        scheduler: &mut Scheduler<TimerEvent>,
        cfg: &GameConfig,
        now: f64,
        rng: &mut impl Rng,
        out: &mut Vec<Intent>,
    ) -> Result<(), CoreError> {
        if self.phase != BossPhase::Active {
            let from = self.phase.name();
            return Err(InvariantViolation::BossTransition { from, to: "attack" }.into());
        }
        let Some(origin) = self.entity.and_then(|id| registry.get(id)).map(|e| e.position) else {
            return Ok(());
        };

        let half_cone = cfg.boss.cone_deg.to_radians();
        let angle = rng.gen_range(-half_cone..=half_cone);
        let speed = cfg.boss.projectile_speed;
        let velocity = Vec2::new(angle.sin() * speed, angle.cos() * speed);
        let id =
            registry.spawn(EntityKind::BossProjectile, origin, velocity, Attrs::default(), now);
        out.push(Intent::SpawnVisual { id, kind: EntityKind::BossProjectile, position: origin });

        if let Some(handle) = self.attack_timer {
            let next = attack_band(cfg)?.draw(rng);
            scheduler.set_delay(handle, next)?;
            debug!(next_ms = next, "boss attack");
        }
        Ok(())
    }

    /// Advance the swing phase and steer the boss sideways.
    pub fn sway(
        &mut self,
        registry: &mut Registry,
        cfg: &GameConfig,
        dt_ms: f64,
        out: &mut Vec<Intent>,
    ) {
        if self.phase != BossPhase::Active {
            return;
        }
        let Some(entity) = self.entity.and_then(|id| registry.get_mut(id)) else {
            return;
        };
        self.swing_phase += cfg.boss.swing_rate * dt_ms / 1000.0;
        entity.swing_phase = self.swing_phase;
        entity.velocity = Vec2::new(self.swing_phase.sin() * cfg.boss.swing_amplitude, 0.0);
        out.push(Intent::SetVelocity { id: entity.id, vx: entity.velocity.x, vy: 0.0 });
    }

    /// Subtract `amount` health.  Returns `true` when health hit zero.
    pub fn damage(&mut self, amount: u32, registry: &mut Registry) -> Result<bool, CoreError> {
        if self.phase != BossPhase::Active {
            let from = self.phase.name();
            return Err(InvariantViolation::BossTransition { from, to: "damage" }.into());
        }
        self.health = self.health.saturating_sub(amount);
        if let Some(entity) = self.entity.and_then(|id| registry.get_mut(id)) {
            entity.health = Some(self.health);
        }
        Ok(self.health == 0)
    }

    /// Active → Defeated: tear down the entity, label and attack timer.
    pub fn defeat(
        &mut self,
        registry: &mut Registry,
        scheduler: &mut Scheduler<TimerEvent>,
        out: &mut Vec<Intent>,
    ) -> Result<(), CoreError> {
        self.transition(BossPhase::Defeated)?;
        if let Some(handle) = self.attack_timer.take() {
            scheduler.cancel(handle);
        }
        if let Some(id) = self.entity.take() {
            registry.kill(id)?;
            out.push(Intent::DestroyVisual { id });
        }
        out.push(Intent::SetText { label: Label::BossHealth, value: String::new() });
        Ok(())
    }

    pub fn health_text(&self) -> String {
        format!("BOSS {}/{}", self.health, self.max_health)
    }
}

fn attack_band(cfg: &GameConfig) -> Result<DelayBand, CoreError> {
    DelayBand::new(cfg.boss.attack_min_ms, cfg.boss.attack_max_ms)
}
