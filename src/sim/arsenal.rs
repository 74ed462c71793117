//! Weapon catalog and loadout
//!
//! The catalog is static for a run. Buying and equipping is one operation
//! keyed by a digit: buy on first select (credits permitting), equip always.

use super::state::Player;

/// Immutable catalog entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponDef {
    /// Digit key that selects this weapon
    pub key: u8,
    pub name: &'static str,
    pub cost: u32,
    pub damage: f32,
    pub shot_speed: f32,
    pub cooldown_ms: f32,
    /// Boss kills required before the weapon is reachable
    pub unlock_tier: u32,
}

pub const WEAPON_CATALOG: [WeaponDef; 4] = [
    WeaponDef {
        key: 1,
        name: "Pulse",
        cost: 10,
        damage: 8.0,
        shot_speed: 520.0,
        cooldown_ms: 260.0,
        unlock_tier: 0,
    },
    WeaponDef {
        key: 2,
        name: "Repeater",
        cost: 25,
        damage: 6.0,
        shot_speed: 600.0,
        cooldown_ms: 140.0,
        unlock_tier: 0,
    },
    WeaponDef {
        key: 3,
        name: "Lance",
        cost: 60,
        damage: 22.0,
        shot_speed: 700.0,
        cooldown_ms: 480.0,
        unlock_tier: 1,
    },
    WeaponDef {
        key: 4,
        name: "Storm",
        cost: 120,
        damage: 14.0,
        shot_speed: 640.0,
        cooldown_ms: 90.0,
        unlock_tier: 2,
    },
];

/// Catalog entry for a digit key (small-N linear scan)
pub fn weapon_for_key(key: u8) -> Option<usize> {
    WEAPON_CATALOG.iter().position(|w| w.key == key)
}

/// What the player owns and holds
#[derive(Debug, Clone, PartialEq)]
pub struct Loadout {
    /// Index into `WEAPON_CATALOG`
    pub equipped: Option<usize>,
    pub purchased: [bool; WEAPON_CATALOG.len()],
    /// Remaining fire cooldown per weapon
    pub cooldown_ms: [f32; WEAPON_CATALOG.len()],
}

impl Loadout {
    pub fn new() -> Self {
        Self {
            equipped: None,
            purchased: [false; WEAPON_CATALOG.len()],
            cooldown_ms: [0.0; WEAPON_CATALOG.len()],
        }
    }

    pub fn equipped_weapon(&self) -> Option<&'static WeaponDef> {
        self.equipped.map(|i| &WEAPON_CATALOG[i])
    }

    /// Buy-and/or-equip the weapon on `key`.
    ///
    /// No-op while weapons are locked, for unknown keys, or when the
    /// player's boss kills are below the weapon's tier. The purchase branch
    /// requires sufficient credits; equipping an owned weapon is always free.
    /// Returns true when the weapon ends up equipped.
    pub fn select(&mut self, key: u8, player: &mut Player, boss_kills: u32, unlocked: bool) -> bool {
        if !unlocked {
            return false;
        }
        let Some(index) = weapon_for_key(key) else {
            return false;
        };
        let def = &WEAPON_CATALOG[index];
        if boss_kills < def.unlock_tier {
            return false;
        }
        if !self.purchased[index] {
            if player.credits < def.cost {
                return false;
            }
            player.credits -= def.cost;
            self.purchased[index] = true;
            log::info!("purchased {} for {} credits", def.name, def.cost);
        }
        self.equipped = Some(index);
        true
    }

    /// Count down fire cooldowns
    pub fn advance(&mut self, dt_ms: f32) {
        for cd in &mut self.cooldown_ms {
            *cd = (*cd - dt_ms).max(0.0);
        }
    }

    /// True when the equipped weapon may fire
    pub fn ready(&self) -> bool {
        self.equipped
            .map(|i| self.cooldown_ms[i] <= 0.0)
            .unwrap_or(false)
    }

    /// Restart the equipped weapon's cooldown after a shot
    pub fn reset_cooldown(&mut self) {
        if let Some(i) = self.equipped {
            self.cooldown_ms[i] = WEAPON_CATALOG[i].cooldown_ms;
        }
    }
}

impl Default for Loadout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn player_with(credits: u32) -> Player {
        let mut p = Player::new(Vec2::new(100.0, 100.0));
        p.credits = credits;
        p
    }

    #[test]
    fn select_is_noop_while_locked() {
        let mut loadout = Loadout::new();
        let mut player = player_with(500);
        assert!(!loadout.select(1, &mut player, 0, false));
        assert_eq!(loadout.equipped, None);
        assert_eq!(player.credits, 500);
    }

    #[test]
    fn purchase_requires_credits() {
        let mut loadout = Loadout::new();
        let mut player = player_with(5);
        assert!(!loadout.select(1, &mut player, 0, true));
        assert_eq!(player.credits, 5);

        player.credits = 10;
        assert!(loadout.select(1, &mut player, 0, true));
        assert_eq!(player.credits, 0);
        assert!(loadout.purchased[0]);
        assert_eq!(loadout.equipped, Some(0));
    }

    #[test]
    fn reequip_of_owned_weapon_is_free() {
        let mut loadout = Loadout::new();
        let mut player = player_with(50);
        assert!(loadout.select(1, &mut player, 0, true));
        assert!(loadout.select(2, &mut player, 0, true));
        let after_both = player.credits;
        assert!(loadout.select(1, &mut player, 0, true));
        assert_eq!(player.credits, after_both);
        assert_eq!(loadout.equipped, Some(0));
    }

    #[test]
    fn tier_gated_weapons_need_boss_kills() {
        let mut loadout = Loadout::new();
        let mut player = player_with(1_000);
        assert!(!loadout.select(3, &mut player, 0, true));
        assert!(loadout.select(3, &mut player, 1, true));
    }

    #[test]
    fn unknown_key_is_noop() {
        let mut loadout = Loadout::new();
        let mut player = player_with(1_000);
        assert!(!loadout.select(9, &mut player, 5, true));
    }

    #[test]
    fn cooldown_gates_fire_and_resets() {
        let mut loadout = Loadout::new();
        let mut player = player_with(100);
        assert!(!loadout.ready());
        loadout.select(1, &mut player, 0, true);
        assert!(loadout.ready());
        loadout.reset_cooldown();
        assert!(!loadout.ready());
        loadout.advance(WEAPON_CATALOG[0].cooldown_ms);
        assert!(loadout.ready());
    }
}
