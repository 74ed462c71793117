//! Red Swarm - a top-down arcade survival game
//!
//! Core modules:
//! - `sim`: Headless simulation (movement, waves, combat, game state)
//! - `renderer`: Canvas2D rendering (wasm only)
//! - `highscores`: Persisted best survival times
//! - `settings`: Display preferences

pub mod highscores;
#[cfg(target_arch = "wasm32")]
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::BestTimes;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Maximum frame delta fed to the simulation (tab-resume protection)
    pub const MAX_FRAME_DELTA_MS: f32 = 48.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 12.0;
    pub const PLAYER_SPEED: f32 = 260.0;
    pub const PLAYER_MAX_HP: f32 = 100.0;

    /// Minimum distance between a fresh spawn and the player
    pub const SPAWN_MIN_DISTANCE: f32 = 180.0;
    /// Placement retries before accepting the last candidate
    pub const SPAWN_MAX_ATTEMPTS: u32 = 30;

    /// Survival time that unlocks the weapon shop (ms)
    pub const WEAPON_UNLOCK_MS: f32 = 30_000.0;

    /// Player projectile time-to-live (ms)
    pub const SHOT_TTL_MS: f32 = 1_500.0;
    /// Enemy projectile time-to-live (ms)
    pub const ENEMY_SHOT_TTL_MS: f32 = 6_000.0;
    pub const SHOT_RADIUS: f32 = 4.0;
    pub const ENEMY_SHOT_RADIUS: f32 = 5.0;

    /// Health pickups
    pub const PICKUP_RADIUS: f32 = 9.0;
    pub const PICKUP_TTL_MS: f32 = 10_000.0;
    pub const PICKUP_HEAL: f32 = 25.0;
    pub const PICKUP_MAX_ALIVE: usize = 2;
    pub const PICKUP_INTERVAL_MIN_MS: f32 = 9_000.0;
    pub const PICKUP_INTERVAL_MAX_MS: f32 = 16_000.0;

    /// Vertical band reserved for HUD chrome at the top of the canvas
    pub const CHROME_TOP_INSET: f32 = 64.0;
}

/// Unit vector from `from` toward `to`.
///
/// The division is guarded with a fallback length of 1, so zero separation
/// yields a zero vector instead of NaN.
#[inline]
pub fn dir_toward(from: Vec2, to: Vec2) -> Vec2 {
    let delta = to - from;
    let len = delta.length();
    delta / if len > 0.0 { len } else { 1.0 }
}

/// Squared distance between two points
#[inline]
pub fn dist_sq(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}

/// True if two circles overlap
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let sum = ra + rb;
    dist_sq(a, b) < sum * sum
}
