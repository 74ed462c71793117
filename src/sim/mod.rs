//! Headless simulation module
//!
//! All gameplay logic lives here. The module is pure and platform-free:
//! - One owned `World` aggregate, mutated serially by `tick`
//! - Seeded RNG only
//! - No rendering or DOM dependencies

pub mod arsenal;
pub mod combat;
pub mod director;
pub mod state;
pub mod tick;

pub use arsenal::{Loadout, WeaponDef, WEAPON_CATALOG};
pub use combat::{apply_damage, nearest_hostile, DamageOutcome};
pub use director::{DirectorPhase, LevelConfig, LevelState, BOSS_LEVEL_DIVISOR};
pub use state::{
    Effect, EffectKind, GameEvent, GamePhase, Hostile, HostileKind, Pickup, PlayField, Player,
    Projectile, World,
};
pub use tick::{tick, TickInput};
