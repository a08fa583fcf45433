/// One play session: owns every piece of mutable game state and advances it
/// one frame at a time.
///
/// Frame order inside `update`:
///   1. Timers (boss warning/attacks, recovery effects, recoil)
///   2. Power-up expiry
///   3. Player input (move, jump, fire)
///   4. Spawns
///   5. Steering (boss sway, swaying enemies) and integration
///   6. Overlap reactions, in reported order
///   7. Culling of out-of-bounds entities
///   8. HUD text
///   9. Frame boundary: destroyed entities leave the registry
use rand::Rng;
use tracing::{debug, info};

use crate::boss::BossState;
use crate::collision;
use crate::config::GameConfig;
use crate::entities::{
    Attrs, Category, EnemyVariant, EntityId, EntityKind, GameMode, GameStatus, InputSnapshot,
    Overlap, ScoreState, Vec2, PLAYER_ID,
};
use crate::error::{CoreError, InvalidArgument};
use crate::intent::{EffectKind, Intent, Label};
use crate::registry::Registry;
use crate::spawner::{SpawnRequest, Spawner};
use crate::status::PlayerStatus;
use crate::timer::Scheduler;

// ── Timer events ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    BossWarningOver,
    BossAttack,
    Flicker,
    Shake,
    RecoveryOver,
    RecoilReturn,
    RecoilDone,
}

impl TimerEvent {
    /// Cosmetic timers keep running after game over; the rest are cancelled.
    pub fn is_effect(&self) -> bool {
        matches!(
            self,
            TimerEvent::Flicker
                | TimerEvent::Shake
                | TimerEvent::RecoveryOver
                | TimerEvent::RecoilReturn
                | TimerEvent::RecoilDone
        )
    }
}

// ── Player body ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerBody {
    pub position: Vec2,
    pub velocity: Vec2,
    pub last_fire_at: Option<f64>,
    /// Runner mode: standing on the ground line.
    pub grounded: bool,
}

#[derive(Clone, Debug, Default)]
struct HudCache {
    score: Option<u32>,
    health: Option<u32>,
    power_up: Option<Option<u32>>,
}

// ── Session ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Session {
    pub(crate) config: GameConfig,
    pub(crate) mode: GameMode,
    pub(crate) now: f64,
    pub(crate) status: GameStatus,
    pub(crate) registry: Registry,
    pub(crate) scheduler: Scheduler<TimerEvent>,
    pub(crate) spawner: Spawner,
    pub(crate) boss: BossState,
    pub(crate) player: PlayerBody,
    pub(crate) player_status: PlayerStatus,
    pub(crate) score: ScoreState,
    pub(crate) intents: Vec<Intent>,
    hud: HudCache,
}

impl Session {
    /// Fresh session at time 0.  The first `update` also carries the initial
    /// HUD text.
    pub fn new(config: GameConfig, mode: GameMode, rng: &mut impl Rng) -> Result<Self, CoreError> {
        config.validate()?;
        let spawner = Spawner::new(&config, mode, 0.0, rng)?;
        info!(?mode, "session start");
        Ok(Session {
            boss: BossState::new(&config),
            player: PlayerBody {
                position: Vec2::new(config.player.start_x, config.player.start_y),
                velocity: Vec2::ZERO,
                last_fire_at: None,
                grounded: true,
            },
            player_status: PlayerStatus::new(&config),
            config,
            mode,
            now: 0.0,
            status: GameStatus::Playing,
            registry: Registry::new(),
            scheduler: Scheduler::new(),
            spawner,
            score: ScoreState::default(),
            intents: Vec::new(),
            hud: HudCache::default(),
        })
    }

    /// Throw everything away and start over with the same config and mode.
    pub fn restart(&mut self, rng: &mut impl Rng) -> Result<(), CoreError> {
        *self = Session::new(self.config.clone(), self.mode, rng)?;
        Ok(())
    }

    // ── Read access ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn scheduler(&self) -> &Scheduler<TimerEvent> {
        &self.scheduler
    }

    pub fn spawner(&self) -> &Spawner {
        &self.spawner
    }

    pub fn boss(&self) -> &BossState {
        &self.boss
    }

    pub fn player(&self) -> &PlayerBody {
        &self.player
    }

    pub fn player_status(&self) -> &PlayerStatus {
        &self.player_status
    }

    pub fn score(&self) -> ScoreState {
        self.score
    }

    /// Place an entity directly. Test setup only: during play every entity
    /// comes from the spawner, input or collision reactions, and the host
    /// only reports overlaps. The visual is announced with the next batch
    /// of intents.
    #[doc(hidden)]
    pub fn spawn(
        &mut self,
        kind: EntityKind,
        position: Vec2,
        velocity: Vec2,
        attrs: Attrs,
    ) -> EntityId {
        let id = self.registry.spawn(kind, position, velocity, attrs, self.now);
        self.intents.push(Intent::SpawnVisual { id, kind, position });
        id
    }

    // ── Frame ────────────────────────────────────────────────────────────────

    /// Advance the session by `dt_ms` and return the frame's intents.
    ///
    /// `overlaps` is the physics collaborator's snapshot for this frame.
    /// After game over only cosmetic timers keep running.
    pub fn update<R: Rng>(
        &mut self,
        dt_ms: f64,
        input: InputSnapshot,
        overlaps: &[Overlap],
        rng: &mut R,
    ) -> Result<Vec<Intent>, CoreError> {
        if !dt_ms.is_finite() || dt_ms < 0.0 {
            return Err(InvalidArgument::NegativeDelay { delay_ms: dt_ms }.into());
        }
        self.now += dt_ms;
        self.tick_timers(dt_ms, rng)?;

        if self.status == GameStatus::Playing {
            self.expire_power_up();
            self.apply_input(input, dt_ms)?;

            for request in self.spawner.spawn_tick(self.now, &self.score, rng) {
                self.spawn_requested(request);
            }

            self.boss.sway(&mut self.registry, &self.config, dt_ms, &mut self.intents);
            self.steer_swayers(dt_ms);
            self.registry.integrate(dt_ms);

            for overlap in overlaps {
                collision::resolve(self, *overlap, rng)?;
                if self.status == GameStatus::GameOver {
                    break;
                }
            }

            if self.status == GameStatus::Playing {
                self.cull();
            }
            self.sync_hud();
        }

        self.registry.end_frame();
        Ok(std::mem::take(&mut self.intents))
    }

    fn tick_timers<R: Rng>(&mut self, dt_ms: f64, rng: &mut R) -> Result<(), CoreError> {
        // Handlers get the scheduler through the callback argument.
        let mut scheduler = std::mem::take(&mut self.scheduler);
        let result = scheduler.tick(dt_ms, |sched, _, event| self.on_timer(sched, event, rng));
        self.scheduler = scheduler;
        result
    }

    fn on_timer<R: Rng>(
        &mut self,
        sched: &mut Scheduler<TimerEvent>,
        event: TimerEvent,
        rng: &mut R,
    ) -> Result<(), CoreError> {
        let at = self.player.position;
        match event {
            TimerEvent::BossWarningOver => {
                self.boss.activate(
                    &mut self.registry,
                    sched,
                    &self.config,
                    self.now,
                    rng,
                    &mut self.intents,
                )
            }
            TimerEvent::BossAttack => {
                self.boss.attack(
                    &mut self.registry,
                    sched,
                    &self.config,
                    self.now,
                    rng,
                    &mut self.intents,
                )
            }
            TimerEvent::Flicker => {
                self.player_status.on_flicker(sched, &self.config, at, &mut self.intents);
                Ok(())
            }
            TimerEvent::Shake => {
                self.player_status.on_shake(sched, &self.config, at, &mut self.intents);
                Ok(())
            }
            TimerEvent::RecoveryOver => {
                self.player_status.on_recovery_over(sched, at, &mut self.intents);
                Ok(())
            }
            TimerEvent::RecoilReturn => {
                self.player_status.on_recoil_return(sched, &self.config, at, &mut self.intents)
            }
            TimerEvent::RecoilDone => {
                self.player_status.on_recoil_done();
                Ok(())
            }
        }
    }

    fn expire_power_up(&mut self) {
        if self.player_status.tick(self.now).is_some() {
            let position = self.player.position;
            self.intents.push(Intent::PlayEffect { kind: EffectKind::MultiShotOff, position });
        }
    }

    // ── Player ───────────────────────────────────────────────────────────────

    fn apply_input(&mut self, input: InputSnapshot, dt_ms: f64) -> Result<(), CoreError> {
        let secs = dt_ms / 1000.0;
        let before = self.player.velocity;
        let p = &self.config.player;

        match self.mode {
            GameMode::Shooter => {
                let vx = if input.left {
                    -p.speed
                } else if input.right {
                    p.speed
                } else {
                    0.0
                };
                self.player.velocity = Vec2::new(vx, 0.0);
                let max_x = self.config.world.width - p.half_width;
                let x = self.player.position.x + vx * secs;
                self.player.position.x = x.clamp(p.half_width, max_x);

                if input.up || input.shoot {
                    self.fire()?;
                }
            }
            GameMode::Runner => {
                if (input.up || input.shoot) && self.player.grounded {
                    self.player.velocity.y = -p.jump_speed;
                    self.player.grounded = false;
                }
                if !self.player.grounded {
                    self.player.velocity.y += p.gravity * secs;
                    self.player.position.y += self.player.velocity.y * secs;
                    if self.player.position.y >= p.start_y {
                        self.player.position.y = p.start_y;
                        self.player.velocity.y = 0.0;
                        self.player.grounded = true;
                    }
                }
            }
        }

        if self.player.velocity != before {
            self.intents.push(Intent::SetVelocity {
                id: PLAYER_ID,
                vx: self.player.velocity.x,
                vy: self.player.velocity.y,
            });
        }
        Ok(())
    }

    /// Single shot straight up, or a three-way spread under multi-shot.
    fn fire(&mut self) -> Result<(), CoreError> {
        let p = &self.config.player;
        if self.player.last_fire_at.is_some_and(|t| self.now - t < p.fire_cooldown_ms) {
            return Ok(());
        }
        let origin = self.player.position;
        let vy = -p.projectile_speed;

        let mut shots = vec![(origin.offset(0.0, -20.0), Vec2::new(0.0, vy))];
        if self.player_status.multi_shot_active() {
            shots.push((origin.offset(-p.spread_offset_x, -10.0), Vec2::new(-p.spread_vx, vy)));
            shots.push((origin.offset(p.spread_offset_x, -10.0), Vec2::new(p.spread_vx, vy)));
        }
        for (position, velocity) in shots {
            self.spawn(EntityKind::PlayerProjectile, position, velocity, Attrs::default());
        }

        self.player.last_fire_at = Some(self.now);
        self.player_status.begin_recoil(
            &mut self.scheduler,
            &self.config,
            origin,
            &mut self.intents,
        )?;
        Ok(())
    }

    // ── Spawning & steering ──────────────────────────────────────────────────

    fn spawn_requested(&mut self, request: SpawnRequest) {
        let enemies = &self.config.enemies;
        match request {
            SpawnRequest::Enemy { variant, x } => {
                let (speed, attrs) = match variant {
                    EnemyVariant::Basic => (enemies.basic_speed, Attrs::default()),
                    EnemyVariant::Fast => (enemies.fast_speed, Attrs::default()),
                    EnemyVariant::Heavy => {
                        let health = Some(enemies.heavy_health);
                        let attrs = Attrs { health, ..Attrs::default() };
                        (enemies.heavy_speed, attrs)
                    }
                    EnemyVariant::Swayer => (enemies.swayer_speed, Attrs::default()),
                };
                let position = Vec2::new(x, enemies.spawn_y);
                self.spawn(EntityKind::Enemy(variant), position, Vec2::new(0.0, speed), attrs);
            }
            SpawnRequest::Obstacle { shape } => {
                let position = Vec2::new(
                    self.config.world.width + self.config.spawn.obstacle_offset,
                    self.config.player.start_y,
                );
                let velocity = Vec2::new(-self.config.spawn.obstacle_speed, 0.0);
                self.spawn(EntityKind::Obstacle(shape), position, velocity, Attrs::default());
            }
        }
    }

    fn steer_swayers(&mut self, dt_ms: f64) {
        let rate = self.config.enemies.sway_rate;
        let amplitude = self.config.enemies.sway_amplitude;
        let intents = &mut self.intents;
        self.registry.for_each_alive(Some(Category::Enemy), |registry, id| {
            let Some(entity) = registry.get_mut(id) else { return };
            if entity.kind != EntityKind::Enemy(EnemyVariant::Swayer) {
                return;
            }
            entity.swing_phase += rate * dt_ms / 1000.0;
            entity.velocity.x = entity.swing_phase.sin() * amplitude;
            intents.push(Intent::SetVelocity { id, vx: entity.velocity.x, vy: entity.velocity.y });
        });
    }

    // ── Culling ──────────────────────────────────────────────────────────────

    fn cull(&mut self) {
        let margin = self.config.world.cull_margin;
        let width = self.config.world.width;
        let height = self.config.world.height;
        let off_sides = move |x: f64| x < -margin || x > width + margin;

        let mut gone =
            self.registry.cull(Some(Category::PlayerProjectile), |e| e.position.y < -margin);
        gone.extend(self.registry.cull(Some(Category::Enemy), |e| e.position.y > height + margin));
        for category in [Category::BossProjectile, Category::Pickup] {
            let culled = self.registry.cull(Some(category), |e| {
                e.position.y > height + margin || off_sides(e.position.x)
            });
            gone.extend(culled);
        }

        let dodged = self.registry.cull(Some(Category::Obstacle), |e| e.position.x < -margin);
        if !dodged.is_empty() {
            let gain = self.config.scoring.per_dodge.saturating_mul(dodged.len() as u32);
            self.score.points = self.score.points.saturating_add(gain);
            debug!(count = dodged.len(), "obstacles dodged");
        }
        gone.extend(dodged);

        for id in gone {
            self.intents.push(Intent::DestroyVisual { id });
        }
    }

    // ── HUD ──────────────────────────────────────────────────────────────────

    fn sync_hud(&mut self) {
        if self.hud.score != Some(self.score.points) {
            self.hud.score = Some(self.score.points);
            let value = format!("Score: {}", self.score.points);
            self.intents.push(Intent::SetText { label: Label::Score, value });
        }
        if self.hud.health != Some(self.player_status.health) {
            self.hud.health = Some(self.player_status.health);
            let value = format!("HP: {}", self.player_status.health);
            self.intents.push(Intent::SetText { label: Label::Health, value });
        }
        let left = self.player_status.power_up_seconds_left(self.now);
        if self.hud.power_up != Some(left) {
            self.hud.power_up = Some(left);
            let value = left.map(|s| format!("x3 {s:>2}s")).unwrap_or_default();
            self.intents.push(Intent::SetText { label: Label::PowerUp, value });
        }
    }

    // ── Game over ────────────────────────────────────────────────────────────

    /// Freeze gameplay: cancel gameplay timers, leave cosmetic ones running.
    pub(crate) fn enter_game_over(&mut self) {
        if self.status == GameStatus::GameOver {
            return;
        }
        self.status = GameStatus::GameOver;
        let cancelled = self.scheduler.cancel_where(|e| !e.is_effect());
        self.boss.attack_timer = None;
        self.boss.warning_timer = None;
        info!(score = self.score.points, cancelled, "game over");
        let position = self.player.position;
        self.intents.push(Intent::PlayEffect { kind: EffectKind::Explosion, position });
        self.intents.push(Intent::GameOverSignal { final_score: self.score.points });
    }
}
