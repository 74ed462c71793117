//! Entity records and the owned world aggregate
//!
//! The entire mutable simulation lives in one `World` value passed explicitly
//! through the tick function. Single writer, serial mutation, no globals.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;

use super::arsenal::Loadout;
use super::director::LevelState;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Simulation frozen; render/UI reads continue
    Paused,
    /// Run ended; only restart is accepted
    GameOver,
}

/// Drawable area minus surrounding UI chrome.
///
/// Hostiles and the player occupy the band below `top_inset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayField {
    pub width: f32,
    pub height: f32,
    pub top_inset: f32,
}

impl PlayField {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            top_inset: CHROME_TOP_INSET,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(
            self.width / 2.0,
            self.top_inset + (self.height - self.top_inset) / 2.0,
        )
    }

    /// Clamp a circle of the given radius fully inside the playable band
    pub fn clamp(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(radius, (self.width - radius).max(radius)),
            pos.y.clamp(
                self.top_inset + radius,
                (self.height - radius).max(self.top_inset + radius),
            ),
        )
    }

    /// True while any part of the circle is still on screen
    pub fn contains(&self, pos: Vec2, radius: f32) -> bool {
        pos.x + radius >= 0.0
            && pos.x - radius <= self.width
            && pos.y + radius >= 0.0
            && pos.y - radius <= self.height
    }
}

/// The player avatar. One instance, lifetime = one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub hp: f32,
    pub max_hp: f32,
    pub credits: u32,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: PLAYER_RADIUS,
            speed: PLAYER_SPEED,
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
            credits: 0,
        }
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_hp > 0.0 {
            (self.hp / self.max_hp).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// What a hostile is; boss-only pools live on the boss variant so a normal
/// hostile with shield layers is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostileKind {
    /// Swarm member; expires at the level's dodge lifetime
    Normal,
    Boss {
        tier: u32,
        /// Depletable pool drained after shields, before hp
        armor_pool: f32,
        shield_layers: u32,
        /// Remaining hp of the outermost shield layer
        shield_hp: f32,
        /// Refill value when the next layer comes up
        shield_layer_hp: f32,
    },
}

/// A pursuing enemy ("red")
#[derive(Debug, Clone, PartialEq)]
pub struct Hostile {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub hp: f32,
    /// Flat damage reduction
    pub armor: f32,
    /// Credits granted when killed
    pub bounty: u32,
    pub age_ms: f32,
    /// Some for shooting-capable hostiles; counts down to the next shot
    pub shot_cooldown_ms: Option<f32>,
    pub kind: HostileKind,
}

impl Hostile {
    pub fn is_boss(&self) -> bool {
        matches!(self.kind, HostileKind::Boss { .. })
    }
}

/// A projectile in flight; the same shape serves player and enemy shots
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub ttl_ms: f32,
}

/// A health pack on the ground
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub ttl_ms: f32,
}

/// Transient visual marker consumed by the renderer only
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Kill,
    BossKill,
    Evade,
    Heal,
    PlayerHit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub kind: EffectKind,
    pub pos: Vec2,
    pub ttl_ms: f32,
}

/// One-shot notifications drained by the loop driver
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Emitted exactly once on the transition into game over
    RunEnded { seconds: f32 },
}

/// Complete game state for one run
#[derive(Debug, Clone)]
pub struct World {
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: GamePhase,
    pub bounds: PlayField,
    pub player: Player,
    pub hostiles: Vec<Hostile>,
    /// Player-fired projectiles
    pub shots: Vec<Projectile>,
    pub enemy_shots: Vec<Projectile>,
    pub pickups: Vec<Pickup>,
    pub effects: Vec<Effect>,
    pub level: LevelState,
    pub loadout: Loadout,
    /// Survival time; accrues only while running
    pub score_ms: f32,
    pub boss_kills: u32,
    /// One-way latch flipped by survival time
    pub weapons_unlocked: bool,
    /// Countdown to the next health pack
    pub pickup_timer_ms: f32,
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl World {
    pub fn new(seed: u64, width: f32, height: f32) -> Self {
        let bounds = PlayField::new(width, height);
        let mut rng = Pcg32::seed_from_u64(seed);
        let pickup_timer_ms = rng.random_range(PICKUP_INTERVAL_MIN_MS..=PICKUP_INTERVAL_MAX_MS);
        Self {
            seed,
            rng,
            phase: GamePhase::Running,
            bounds,
            player: Player::new(bounds.center()),
            hostiles: Vec::new(),
            shots: Vec::new(),
            enemy_shots: Vec::new(),
            pickups: Vec::new(),
            effects: Vec::new(),
            level: LevelState::new(),
            loadout: Loadout::new(),
            score_ms: 0.0,
            boss_kills: 0,
            weapons_unlocked: false,
            pickup_timer_ms,
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Survival time in seconds, rounded to one decimal
    pub fn score_seconds(&self) -> f32 {
        (self.score_ms / 100.0).round() / 10.0
    }

    /// Full reset back to initial values with a fresh seed; re-enters running
    pub fn reset(&mut self, seed: u64) {
        let bounds = self.bounds;
        *self = World::new(seed, bounds.width, bounds.height);
    }

    /// Adopt a new drawable size, keeping the player on screen
    pub fn resize(&mut self, width: f32, height: f32) {
        self.bounds = PlayField::new(width, height);
        self.player.pos = self.bounds.clamp(self.player.pos, self.player.radius);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_world_is_running_and_empty() {
        let world = World::new(1, 800.0, 600.0);
        assert_eq!(world.phase, GamePhase::Running);
        assert!(world.hostiles.is_empty());
        assert!(world.shots.is_empty());
        assert_eq!(world.player.credits, 0);
        assert_eq!(world.level.level, 1);
        assert!(!world.weapons_unlocked);
    }

    #[test]
    fn playfield_clamp_keeps_circle_in_band() {
        let field = PlayField::new(800.0, 600.0);
        let clamped = field.clamp(Vec2::new(-50.0, 10.0), 12.0);
        assert_eq!(clamped.x, 12.0);
        assert_eq!(clamped.y, field.top_inset + 12.0);
        let clamped = field.clamp(Vec2::new(900.0, 700.0), 12.0);
        assert_eq!(clamped, Vec2::new(788.0, 588.0));
    }

    #[test]
    fn score_seconds_rounds_to_one_decimal() {
        let mut world = World::new(1, 800.0, 600.0);
        world.score_ms = 12_345.0;
        assert_eq!(world.score_seconds(), 12.3);
        world.score_ms = 12_360.0;
        assert_eq!(world.score_seconds(), 12.4);
    }

    #[test]
    fn resize_pulls_player_back_on_screen() {
        let mut world = World::new(1, 1280.0, 720.0);
        world.player.pos = Vec2::new(1200.0, 700.0);
        world.resize(640.0, 480.0);
        assert!(world.player.pos.x <= 640.0 - world.player.radius);
        assert!(world.player.pos.y <= 480.0 - world.player.radius);
    }
}
