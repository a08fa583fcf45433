/// Tuning constants and their TOML overrides.
///
/// Every value has a built-in default; `arcade.toml` (next to the executable
/// or in the working directory) may override any subset of keys.  A missing
/// file is normal, a malformed one falls back to defaults with a warning.
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{info, warn};

use crate::entities::EnemyVariant;
use crate::error::{CoreError, InvalidArgument};

pub const CONFIG_FILE: &str = "arcade.toml";

// ── Sections ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub world: WorldConfig,
    pub player: PlayerConfig,
    pub status: StatusConfig,
    pub scoring: ScoringConfig,
    pub enemies: EnemyConfig,
    pub spawn: SpawnConfig,
    pub boss: BossConfig,
}

/// Play-field geometry in pixels.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: f64,
    pub height: f64,
    /// Entities further than this outside the field are culled.
    pub cull_margin: f64,
    /// Enemies never spawn closer than this to a side edge.
    pub spawn_margin: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub max_health: u32,
    pub start_x: f64,
    pub start_y: f64,
    pub speed: f64,
    pub half_width: f64,
    pub fire_cooldown_ms: f64,
    pub projectile_speed: f64,
    /// Side shots of the spread start this far left/right of the nose.
    pub spread_offset_x: f64,
    pub spread_vx: f64,
    pub recoil_distance: f64,
    pub recoil_ms: f64,
    /// Runner mode only.
    pub jump_speed: f64,
    pub gravity: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    pub multi_shot_ms: f64,
    pub recovery_ms: f64,
    pub flicker_interval_ms: f64,
    pub flicker_toggles: u32,
    pub shake_interval_ms: f64,
    pub shake_steps: u32,
    pub shake_distance: f64,
    /// Hits inside this window after a hit are ignored. 0 disables it.
    pub invulnerability_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub per_kill: u32,
    pub score_pickup: u32,
    pub boss_bonus: u32,
    /// Runner mode: points for every obstacle that scrolls off unharmed.
    pub per_dodge: u32,
}

/// Pickup roll after a kill: first `drop_chance`, then `power_up_chance`
/// decides between a multi-shot and a score pickup.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DropTable {
    pub drop_chance: f64,
    pub power_up_chance: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub enabled: Vec<EnemyVariant>,
    pub spawn_y: f64,
    pub basic_speed: f64,
    pub fast_speed: f64,
    pub heavy_speed: f64,
    pub heavy_health: u32,
    pub swayer_speed: f64,
    pub sway_amplitude: f64,
    /// Radians per second.
    pub sway_rate: f64,
    pub pickup_speed: f64,
    pub basic_drops: DropTable,
    pub fast_drops: DropTable,
    pub heavy_drops: DropTable,
    pub swayer_drops: DropTable,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Tier applies once the score is at or above this.
    pub score: u32,
    pub min_ms: f64,
    pub max_ms: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub min_ms: f64,
    pub max_ms: f64,
    pub tiers: Vec<TierConfig>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpawnConfig {
    pub enemy: BandConfig,
    pub obstacle: BandConfig,
    pub obstacle_speed: f64,
    /// Obstacles appear this far past the right edge.
    pub obstacle_offset: f64,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub kill_threshold: u32,
    pub max_health: u32,
    pub damage_per_hit: u32,
    pub warning_ms: f64,
    pub attack_min_ms: f64,
    pub attack_max_ms: f64,
    /// Half-angle of the downward firing cone, degrees.
    pub cone_deg: f64,
    pub projectile_speed: f64,
    pub spawn_y: f64,
    /// Radians per second.
    pub swing_rate: f64,
    pub swing_amplitude: f64,
    pub defeat_pickups: u32,
    pub pickup_scatter: f64,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

impl Default for WorldConfig {
    fn default() -> Self {
        WorldConfig { width: 300.0, height: 500.0, cull_margin: 50.0, spawn_margin: 30.0 }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            max_health: 3,
            start_x: 150.0,
            start_y: 460.0,
            speed: 400.0,
            half_width: 16.0,
            fire_cooldown_ms: 200.0,
            projectile_speed: 400.0,
            spread_offset_x: 20.0,
            spread_vx: 50.0,
            recoil_distance: 5.0,
            recoil_ms: 50.0,
            jump_speed: 650.0,
            gravity: 1500.0,
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        StatusConfig {
            multi_shot_ms: 10_000.0,
            recovery_ms: 600.0,
            flicker_interval_ms: 100.0,
            flicker_toggles: 6,
            shake_interval_ms: 50.0,
            shake_steps: 8,
            shake_distance: 5.0,
            invulnerability_ms: 0.0,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig { per_kill: 10, score_pickup: 50, boss_bonus: 500, per_dodge: 5 }
    }
}

impl Default for DropTable {
    fn default() -> Self {
        DropTable { drop_chance: 0.25, power_up_chance: 0.10 }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            enabled: vec![EnemyVariant::Basic, EnemyVariant::Fast],
            spawn_y: -50.0,
            basic_speed: 300.0,
            fast_speed: 350.0,
            heavy_speed: 150.0,
            heavy_health: 3,
            swayer_speed: 200.0,
            sway_amplitude: 120.0,
            sway_rate: 3.0,
            pickup_speed: 150.0,
            basic_drops: DropTable::default(),
            fast_drops: DropTable { drop_chance: 0.25, power_up_chance: 0.05 },
            heavy_drops: DropTable::default(),
            swayer_drops: DropTable { drop_chance: 0.25, power_up_chance: 0.05 },
        }
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        TierConfig { score: 0, min_ms: 200.0, max_ms: 700.0 }
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        BandConfig { min_ms: 200.0, max_ms: 700.0, tiers: Vec::new() }
    }
}

impl Default for SpawnConfig {
    fn default() -> Self {
        SpawnConfig {
            enemy: BandConfig {
                min_ms: 200.0,
                max_ms: 700.0,
                tiers: vec![
                    TierConfig { score: 200, min_ms: 180.0, max_ms: 550.0 },
                    TierConfig { score: 500, min_ms: 150.0, max_ms: 400.0 },
                    TierConfig { score: 1000, min_ms: 120.0, max_ms: 300.0 },
                ],
            },
            obstacle: BandConfig {
                min_ms: 1200.0,
                max_ms: 2200.0,
                tiers: vec![
                    TierConfig { score: 50, min_ms: 1000.0, max_ms: 1800.0 },
                    TierConfig { score: 150, min_ms: 800.0, max_ms: 1500.0 },
                ],
            },
            obstacle_speed: 300.0,
            obstacle_offset: 40.0,
        }
    }
}

impl Default for BossConfig {
    fn default() -> Self {
        BossConfig {
            kill_threshold: 10,
            max_health: 30,
            damage_per_hit: 1,
            warning_ms: 2000.0,
            attack_min_ms: 800.0,
            attack_max_ms: 1600.0,
            cone_deg: 30.0,
            projectile_speed: 250.0,
            spawn_y: 80.0,
            swing_rate: 1.5,
            swing_amplitude: 100.0,
            defeat_pickups: 5,
            pickup_scatter: 30.0,
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

impl GameConfig {
    /// Load `arcade.toml` from the executable directory or the CWD.
    /// Missing file, unreadable file, bad TOML or invalid values all fall
    /// back to the defaults.
    pub fn load() -> Self {
        for dir in candidate_dirs() {
            let path = dir.join(CONFIG_FILE);
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(text) => match Self::from_toml_str(&text) {
                    Ok(cfg) => {
                        info!(path = %path.display(), "loaded config");
                        return cfg;
                    }
                    Err(e) => {
                        warn!(path = %path.display(), "bad config, using defaults: {e}");
                        return Self::default();
                    }
                },
                Err(e) => warn!("could not read {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    /// Parse a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, CoreError> {
        let cfg: GameConfig = toml::from_str(text).map_err(|e| InvalidArgument::Config {
            key: "<document>",
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), CoreError> {
        fn bad(key: &'static str, reason: &str) -> CoreError {
            InvalidArgument::Config { key, reason: reason.to_string() }.into()
        }

        if let Some((key, _)) = self.float_keys().into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(bad(key, "must be a finite number"));
        }
        if self.world.width <= 2.0 * self.world.spawn_margin || self.world.height <= 0.0 {
            return Err(bad("world", "play field is smaller than its spawn margins"));
        }
        if self.player.half_width < 0.0 || self.world.width < 2.0 * self.player.half_width {
            return Err(bad("player.half_width", "player does not fit the play field"));
        }
        if self.player.max_health == 0 {
            return Err(bad("player.max_health", "must be at least 1"));
        }
        if self.enemies.enabled.is_empty() {
            return Err(InvalidArgument::NoEnabledVariants.into());
        }
        for (key, table) in [
            ("enemies.basic_drops", self.enemies.basic_drops),
            ("enemies.fast_drops", self.enemies.fast_drops),
            ("enemies.heavy_drops", self.enemies.heavy_drops),
            ("enemies.swayer_drops", self.enemies.swayer_drops),
        ] {
            let in_unit = |p: f64| (0.0..=1.0).contains(&p);
            if !in_unit(table.drop_chance) || !in_unit(table.power_up_chance) {
                return Err(bad(key, "probabilities must lie in [0, 1]"));
            }
        }
        if self.enemies.heavy_health == 0 {
            return Err(bad("enemies.heavy_health", "must be at least 1"));
        }
        if self.boss.max_health == 0 || self.boss.damage_per_hit == 0 {
            return Err(bad("boss", "health and damage per hit must be positive"));
        }
        if self.boss.kill_threshold == 0 {
            return Err(bad("boss.kill_threshold", "must be at least 1"));
        }
        if self.boss.attack_min_ms < 0.0 || self.boss.attack_min_ms > self.boss.attack_max_ms {
            return Err(bad("boss.attack_min_ms", "attack band is empty or negative"));
        }
        if self.boss.cone_deg < 0.0 {
            return Err(bad("boss.cone_deg", "must not be negative"));
        }
        if self.boss.pickup_scatter < 0.0 {
            return Err(bad("boss.pickup_scatter", "must not be negative"));
        }
        let bands = [("spawn.enemy", &self.spawn.enemy), ("spawn.obstacle", &self.spawn.obstacle)];
        for (key, band) in bands {
            let within = |min: f64, max: f64| min >= 0.0 && min <= max;
            let tiers_ok = band.tiers.iter().all(|t| within(t.min_ms, t.max_ms));
            if !within(band.min_ms, band.max_ms) || !tiers_ok {
                return Err(bad(key, "delay band is empty or negative"));
            }
        }
        if self.status.flicker_interval_ms <= 0.0 || self.status.shake_interval_ms <= 0.0 {
            return Err(bad("status", "effect intervals must be positive"));
        }
        Ok(())
    }

    /// Every float setting with its TOML key.
    fn float_keys(&self) -> Vec<(&'static str, f64)> {
        let (w, p, s, e, sp, b) =
            (&self.world, &self.player, &self.status, &self.enemies, &self.spawn, &self.boss);
        let mut keys = vec![
            ("world.width", w.width),
            ("world.height", w.height),
            ("world.cull_margin", w.cull_margin),
            ("world.spawn_margin", w.spawn_margin),
            ("player.start_x", p.start_x),
            ("player.start_y", p.start_y),
            ("player.speed", p.speed),
            ("player.half_width", p.half_width),
            ("player.fire_cooldown_ms", p.fire_cooldown_ms),
            ("player.projectile_speed", p.projectile_speed),
            ("player.spread_offset_x", p.spread_offset_x),
            ("player.spread_vx", p.spread_vx),
            ("player.recoil_distance", p.recoil_distance),
            ("player.recoil_ms", p.recoil_ms),
            ("player.jump_speed", p.jump_speed),
            ("player.gravity", p.gravity),
            ("status.multi_shot_ms", s.multi_shot_ms),
            ("status.recovery_ms", s.recovery_ms),
            ("status.flicker_interval_ms", s.flicker_interval_ms),
            ("status.shake_interval_ms", s.shake_interval_ms),
            ("status.shake_distance", s.shake_distance),
            ("status.invulnerability_ms", s.invulnerability_ms),
            ("enemies.spawn_y", e.spawn_y),
            ("enemies.basic_speed", e.basic_speed),
            ("enemies.fast_speed", e.fast_speed),
            ("enemies.heavy_speed", e.heavy_speed),
            ("enemies.swayer_speed", e.swayer_speed),
            ("enemies.sway_amplitude", e.sway_amplitude),
            ("enemies.sway_rate", e.sway_rate),
            ("enemies.pickup_speed", e.pickup_speed),
            ("spawn.enemy.min_ms", sp.enemy.min_ms),
            ("spawn.enemy.max_ms", sp.enemy.max_ms),
            ("spawn.obstacle.min_ms", sp.obstacle.min_ms),
            ("spawn.obstacle.max_ms", sp.obstacle.max_ms),
            ("spawn.obstacle_speed", sp.obstacle_speed),
            ("spawn.obstacle_offset", sp.obstacle_offset),
            ("boss.warning_ms", b.warning_ms),
            ("boss.attack_min_ms", b.attack_min_ms),
            ("boss.attack_max_ms", b.attack_max_ms),
            ("boss.cone_deg", b.cone_deg),
            ("boss.projectile_speed", b.projectile_speed),
            ("boss.spawn_y", b.spawn_y),
            ("boss.swing_rate", b.swing_rate),
            ("boss.swing_amplitude", b.swing_amplitude),
            ("boss.pickup_scatter", b.pickup_scatter),
        ];
        for tier in sp.enemy.tiers.iter().chain(&sp.obstacle.tiers) {
            keys.push(("spawn.tiers.min_ms", tier.min_ms));
            keys.push(("spawn.tiers.max_ms", tier.max_ms));
        }
        keys
    }

    /// Drop table for a given enemy variant.
    pub fn drops_for(&self, variant: EnemyVariant) -> DropTable {
        match variant {
            EnemyVariant::Basic => self.enemies.basic_drops,
            EnemyVariant::Fast => self.enemies.fast_drops,
            EnemyVariant::Heavy => self.enemies.heavy_drops,
            EnemyVariant::Swayer => self.enemies.swayer_drops,
        }
    }
}

/// Executable directory first, then the CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }
    dirs
}
