//! Wave/level director
//!
//! Produces a deterministic difficulty profile per level and drives spawn
//! pacing and the level transition state machine. Every fifth level hosts a
//! single boss instead of a swarm.

use glam::Vec2;
use rand::Rng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::dist_sq;

use super::state::{Hostile, HostileKind, PlayField, World};

/// Levels that are multiples of this host a boss
pub const BOSS_LEVEL_DIVISOR: u32 = 5;

/// Boss-only parameters for a boss level
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BossConfig {
    /// 0-based boss index, grows every `BOSS_LEVEL_DIVISOR` levels
    pub tier: u32,
    pub hp: f32,
    /// Flat damage reduction
    pub armor: f32,
    /// Damage-absorption pool drained after shields, before hp
    pub armor_pool: f32,
    pub shield_layers: u32,
    pub shield_layer_hp: f32,
    pub contact_damage: f32,
    pub shot_damage: f32,
    pub shot_cooldown_min_ms: f32,
    pub shot_cooldown_max_ms: f32,
    pub credits: u32,
}

/// Difficulty profile for one level
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    pub level: u32,
    pub spawn_count: u32,
    pub spawn_interval_ms: f32,
    pub speed_min: f32,
    pub speed_max: f32,
    pub radius_min: f32,
    pub radius_max: f32,
    pub hp_min: f32,
    pub hp_max: f32,
    /// Flat damage reduction on normal hostiles
    pub armor: f32,
    pub contact_damage: f32,
    /// Probability that a normal hostile can shoot
    pub shooter_chance: f32,
    pub shot_cooldown_min_ms: f32,
    pub shot_cooldown_max_ms: f32,
    pub shot_damage: f32,
    pub shot_speed: f32,
    /// Age at which a normal hostile expires and rewards the player
    pub dodge_lifetime_ms: f32,
    pub kill_credits: u32,
    /// Pause before the next level starts (longer after bosses)
    pub transition_ms: f32,
    pub boss: Option<BossConfig>,
}

/// True when `level` hosts a boss
pub fn is_boss_level(level: u32) -> bool {
    level > 0 && level % BOSS_LEVEL_DIVISOR == 0
}

/// Boss difficulty group for a level (monotone in level)
pub fn boss_tier(level: u32) -> u32 {
    level.saturating_sub(1) / BOSS_LEVEL_DIVISOR
}

impl LevelConfig {
    /// Deterministic difficulty profile for a level (1-based).
    ///
    /// Non-boss scaling is monotone in `level` and clamped so difficulty
    /// stays bounded.
    pub fn for_level(level: u32) -> Self {
        let level = level.max(1);
        let l = level as f32;

        let boss = if is_boss_level(level) {
            let tier = boss_tier(level);
            Some(BossConfig {
                tier,
                hp: 320.0 + 160.0 * tier as f32,
                armor: 3.0 + tier as f32,
                armor_pool: 120.0 + 80.0 * tier as f32,
                // Layer count doubles per boss index, capped
                shield_layers: (1u32 << tier.min(3)).min(8),
                shield_layer_hp: 40.0,
                contact_damage: 26.0,
                shot_damage: 14.0,
                shot_cooldown_min_ms: 900.0,
                shot_cooldown_max_ms: 1_800.0,
                credits: 25 * (tier + 1),
            })
        } else {
            None
        };

        Self {
            level,
            spawn_count: if boss.is_some() {
                1
            } else {
                (4 + level).min(14)
            },
            spawn_interval_ms: (900.0 - 55.0 * l).max(300.0),
            speed_min: (45.0 + 4.0 * l).min(150.0),
            speed_max: (80.0 + 5.0 * l).min(180.0),
            radius_min: 10.0,
            radius_max: 16.0,
            hp_min: 10.0,
            hp_max: (18.0 + 4.0 * l).min(90.0),
            armor: (l / 4.0).floor().min(6.0),
            contact_damage: 12.0,
            shooter_chance: (0.06 * l).min(0.55),
            shot_cooldown_min_ms: 1_400.0,
            shot_cooldown_max_ms: 2_600.0,
            shot_damage: 8.0,
            shot_speed: (220.0 + 8.0 * l).min(420.0),
            dodge_lifetime_ms: (9_000.0 + 300.0 * l).min(16_000.0),
            kill_credits: 3,
            transition_ms: if boss.is_some() { 4_500.0 } else { 2_500.0 },
            boss,
        }
    }
}

/// Which half of the level lifecycle is active.
///
/// Exactly one of the two holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorPhase {
    /// Filling the spawn quota, then waiting for the field to clear
    Spawning,
    /// Timed non-interactive pause before the next level
    Transition,
}

/// Per-level mutable director state
#[derive(Debug, Clone)]
pub struct LevelState {
    pub level: u32,
    pub config: LevelConfig,
    pub spawned: u32,
    /// Millisecond accumulator; the interval is subtracted repeatedly rather
    /// than reset, so pacing never drifts and a zero delta never double-spawns
    pub spawn_acc_ms: f32,
    pub phase: DirectorPhase,
    pub transition_left_ms: f32,
}

impl LevelState {
    pub fn new() -> Self {
        Self {
            level: 1,
            config: LevelConfig::for_level(1),
            spawned: 0,
            spawn_acc_ms: 0.0,
            phase: DirectorPhase::Spawning,
            transition_left_ms: 0.0,
        }
    }

    pub fn quota_reached(&self) -> bool {
        self.spawned >= self.config.spawn_count
    }

    pub fn in_transition(&self) -> bool {
        self.phase == DirectorPhase::Transition
    }
}

impl Default for LevelState {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance the director by one frame: spawn due hostiles, detect a cleared
/// field, run the transition timer, and roll the level over.
pub fn advance(world: &mut World, dt_ms: f32) {
    match world.level.phase {
        DirectorPhase::Spawning => {
            if !world.level.quota_reached() {
                world.level.spawn_acc_ms += dt_ms;
                while world.level.spawn_acc_ms >= world.level.config.spawn_interval_ms
                    && !world.level.quota_reached()
                {
                    world.level.spawn_acc_ms -= world.level.config.spawn_interval_ms;
                    let id = world.next_entity_id();
                    let hostile = spawn_hostile(
                        id,
                        &world.level.config,
                        &world.bounds,
                        world.player.pos,
                        &mut world.rng,
                    );
                    if hostile.is_boss() {
                        log::info!(
                            "boss spawned: level {} tier {}",
                            world.level.level,
                            boss_tier(world.level.level)
                        );
                    }
                    world.hostiles.push(hostile);
                    world.level.spawned += 1;
                }
            } else if world.hostiles.is_empty() {
                world.level.phase = DirectorPhase::Transition;
                world.level.transition_left_ms = world.level.config.transition_ms;
            }
        }
        DirectorPhase::Transition => {
            world.level.transition_left_ms -= dt_ms;
            if world.level.transition_left_ms <= 0.0 {
                let next = world.level.level + 1;
                log::info!("level {} -> {}", world.level.level, next);
                world.level = LevelState {
                    level: next,
                    config: LevelConfig::for_level(next),
                    spawned: 0,
                    spawn_acc_ms: 0.0,
                    phase: DirectorPhase::Spawning,
                    transition_left_ms: 0.0,
                };
                // Per-level transient lists do not carry across levels
                world.shots.clear();
                world.enemy_shots.clear();
                world.effects.clear();
                world.player.hp = world.player.max_hp;
            }
        }
    }
}

/// Build one hostile from the level profile
fn spawn_hostile(
    id: u32,
    config: &LevelConfig,
    bounds: &PlayField,
    player_pos: Vec2,
    rng: &mut Pcg32,
) -> Hostile {
    if let Some(boss) = config.boss {
        let radius = 34.0;
        let pos = spawn_position(rng, bounds, player_pos, radius);
        return Hostile {
            id,
            pos,
            radius,
            speed: 38.0 + 3.0 * boss.tier as f32,
            hp: boss.hp,
            armor: boss.armor,
            bounty: boss.credits,
            age_ms: 0.0,
            shot_cooldown_ms: Some(
                rng.random_range(boss.shot_cooldown_min_ms..=boss.shot_cooldown_max_ms),
            ),
            kind: HostileKind::Boss {
                tier: boss.tier,
                armor_pool: boss.armor_pool,
                shield_layers: boss.shield_layers,
                shield_hp: if boss.shield_layers > 0 {
                    boss.shield_layer_hp
                } else {
                    0.0
                },
                shield_layer_hp: boss.shield_layer_hp,
            },
        };
    }

    let radius = rng.random_range(config.radius_min..=config.radius_max);
    let pos = spawn_position(rng, bounds, player_pos, radius);
    let shooter = rng.random::<f32>() < config.shooter_chance;
    Hostile {
        id,
        pos,
        radius,
        speed: rng.random_range(config.speed_min..=config.speed_max),
        hp: rng.random_range(config.hp_min..=config.hp_max),
        armor: config.armor,
        bounty: config.kill_credits,
        age_ms: 0.0,
        shot_cooldown_ms: shooter.then(|| {
            rng.random_range(config.shot_cooldown_min_ms..=config.shot_cooldown_max_ms)
        }),
        kind: HostileKind::Normal,
    }
}

/// Pick a spawn position inside the hostile band, at least
/// `SPAWN_MIN_DISTANCE` from the player. After `SPAWN_MAX_ATTEMPTS` failed
/// candidates the last one is accepted so spawning can never loop forever.
pub fn spawn_position(
    rng: &mut Pcg32,
    bounds: &PlayField,
    player_pos: Vec2,
    radius: f32,
) -> Vec2 {
    let min_sq = SPAWN_MIN_DISTANCE * SPAWN_MIN_DISTANCE;
    let mut candidate = Vec2::ZERO;
    for _ in 0..SPAWN_MAX_ATTEMPTS {
        candidate = Vec2::new(
            rng.random_range(radius..=(bounds.width - radius).max(radius)),
            rng.random_range(
                (bounds.top_inset + radius)..=(bounds.height - radius).max(bounds.top_inset + radius),
            ),
        );
        if dist_sq(candidate, player_pos) >= min_sq {
            return candidate;
        }
    }
    candidate
}
