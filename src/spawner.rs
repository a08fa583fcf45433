/// Randomized spawn schedules with a score-driven difficulty ramp.
///
/// Each schedule waits a random delay drawn from its current band, fires,
/// then draws a fresh delay.  Crossing a score threshold moves the schedule
/// to a narrower band; it never moves back.
use rand::Rng;
use tracing::{debug, info};

use crate::config::{BandConfig, GameConfig};
use crate::entities::{EnemyVariant, GameMode, ObstacleShape, ScoreState};
use crate::error::{CoreError, InvalidArgument};

// ── Delay bands ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DelayBand {
    pub min_ms: f64,
    pub max_ms: f64,
}

impl DelayBand {
    pub fn new(min_ms: f64, max_ms: f64) -> Result<Self, CoreError> {
        if !(min_ms.is_finite() && max_ms.is_finite()) || min_ms < 0.0 || min_ms > max_ms {
            return Err(InvalidArgument::EmptyDelayBand { min_ms, max_ms }.into());
        }
        Ok(DelayBand { min_ms, max_ms })
    }

    pub fn contains(&self, delay_ms: f64) -> bool {
        delay_ms >= self.min_ms && delay_ms <= self.max_ms
    }

    /// Uniform draw from `[min_ms, max_ms]`.
    pub fn draw(&self, rng: &mut impl Rng) -> f64 {
        rng.gen_range(self.min_ms..=self.max_ms)
    }

    fn within(&self, wider: &DelayBand) -> bool {
        self.min_ms <= wider.min_ms && self.max_ms <= wider.max_ms
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tier {
    /// Band applies once the score reaches this.
    pub score: u32,
    pub band: DelayBand,
}

// ── Schedule ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct SpawnSchedule {
    base: DelayBand,
    tiers: Vec<Tier>,
    /// 0 = base band, n = `tiers[n - 1]`.
    pub tier: usize,
    pub last_spawn_at: f64,
    pub current_delay_ms: f64,
}

impl SpawnSchedule {
    /// Build a schedule starting at `now` with a first delay already drawn.
    /// Tier thresholds must rise and every tier band must sit inside the
    /// previous one.
    pub fn new(
        base: DelayBand,
        tiers: Vec<Tier>,
        now: f64,
        rng: &mut impl Rng,
    ) -> Result<Self, CoreError> {
        let mut previous = (0u32, base);
        for (i, tier) in tiers.iter().enumerate() {
            let rises = i == 0 || tier.score > previous.0;
            if !rises || !tier.band.within(&previous.1) {
                return Err(InvalidArgument::WideningTier { tier: i + 1 }.into());
            }
            previous = (tier.score, tier.band);
        }
        let current_delay_ms = base.draw(rng);
        Ok(SpawnSchedule { base, tiers, tier: 0, last_spawn_at: now, current_delay_ms })
    }

    pub fn from_config(cfg: &BandConfig, now: f64, rng: &mut impl Rng) -> Result<Self, CoreError> {
        let base = DelayBand::new(cfg.min_ms, cfg.max_ms)?;
        let tiers = cfg
            .tiers
            .iter()
            .map(|t| Ok(Tier { score: t.score, band: DelayBand::new(t.min_ms, t.max_ms)? }))
            .collect::<Result<Vec<_>, CoreError>>()?;
        Self::new(base, tiers, now, rng)
    }

    /// Band for the current tier.
    pub fn band(&self) -> DelayBand {
        match self.tier {
            0 => self.base,
            n => self.tiers[n - 1].band,
        }
    }

    /// Move up to the highest tier whose threshold `points` has reached.
    /// Returns `true` if the tier changed.
    pub fn advance_tier(&mut self, points: u32) -> bool {
        let reached = self.tiers.iter().take_while(|t| points >= t.score).count();
        if reached > self.tier {
            self.tier = reached;
            true
        } else {
            false
        }
    }

    pub fn is_due(&self, now: f64) -> bool {
        now - self.last_spawn_at >= self.current_delay_ms
    }

    pub fn redraw(&mut self, now: f64, rng: &mut impl Rng) {
        self.last_spawn_at = now;
        self.current_delay_ms = self.band().draw(rng);
    }
}

// ── Spawner ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnRequest {
    Enemy { variant: EnemyVariant, x: f64 },
    /// Obstacles always enter at the same off-screen-right spot.
    Obstacle { shape: ObstacleShape },
}

#[derive(Clone, Debug)]
pub struct Spawner {
    pub enemy: Option<SpawnSchedule>,
    pub obstacle: Option<SpawnSchedule>,
    variants: Vec<EnemyVariant>,
    min_x: f64,
    max_x: f64,
}

impl Spawner {
    /// Shooter mode spawns enemies, Runner mode spawns obstacles.
    pub fn new(
        cfg: &GameConfig,
        mode: GameMode,
        now: f64,
        rng: &mut impl Rng,
    ) -> Result<Self, CoreError> {
        if cfg.enemies.enabled.is_empty() {
            return Err(InvalidArgument::NoEnabledVariants.into());
        }
        let (enemy, obstacle) = match mode {
            GameMode::Shooter => {
                (Some(SpawnSchedule::from_config(&cfg.spawn.enemy, now, rng)?), None)
            }
            GameMode::Runner => {
                (None, Some(SpawnSchedule::from_config(&cfg.spawn.obstacle, now, rng)?))
            }
        };
        Ok(Spawner {
            enemy,
            obstacle,
            variants: cfg.enemies.enabled.clone(),
            min_x: cfg.world.spawn_margin,
            max_x: cfg.world.width - cfg.world.spawn_margin,
        })
    }

    /// Emit at most one request per due schedule.
    pub fn spawn_tick(
        &mut self,
        now: f64,
        score: &ScoreState,
        rng: &mut impl Rng,
    ) -> Vec<SpawnRequest> {
        let mut requests = Vec::new();

        if let Some(schedule) = self.enemy.as_mut() {
            if schedule.advance_tier(score.points) {
                info!(tier = schedule.tier, "enemy spawn rate up");
            }
            if schedule.is_due(now) {
                let variant = self.variants[rng.gen_range(0..self.variants.len())];
                let x = rng.gen_range(self.min_x..=self.max_x);
                schedule.redraw(now, rng);
                debug!(?variant, x, next_ms = schedule.current_delay_ms, "enemy due");
                requests.push(SpawnRequest::Enemy { variant, x });
            }
        }

        if let Some(schedule) = self.obstacle.as_mut() {
            if schedule.advance_tier(score.points) {
                info!(tier = schedule.tier, "obstacle spawn rate up");
            }
            if schedule.is_due(now) {
                let shape = ObstacleShape::ALL[rng.gen_range(0..ObstacleShape::ALL.len())];
                schedule.redraw(now, rng);
                debug!(?shape, next_ms = schedule.current_delay_ms, "obstacle due");
                requests.push(SpawnRequest::Obstacle { shape });
            }
        }

        requests
    }
}
