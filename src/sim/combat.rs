//! Damage resolution and targeting
//!
//! Small pure helpers shared by the tick stages. Damage drains pools in a
//! fixed priority: shield layer, then boss armor pool, then hit points.
//! No pool ever goes negative.

use glam::Vec2;

use crate::dist_sq;

use super::state::{Hostile, HostileKind};

/// Minimum damage a hit always deals, regardless of armor
pub const DAMAGE_FLOOR: f32 = 1.0;
/// Flat armor is worth this much raw damage per point
pub const ARMOR_FACTOR: f32 = 2.0;

/// What a single hit did to a hostile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DamageOutcome {
    /// Effective damage after armor reduction
    pub dealt: f32,
    /// Hostile dropped to 0 hp on this hit
    pub killed: bool,
}

/// Effective damage after flat armor reduction, never below the floor
#[inline]
pub fn effective_damage(raw: f32, armor: f32) -> f32 {
    (raw - armor * ARMOR_FACTOR).max(DAMAGE_FLOOR)
}

/// Apply one projectile hit to a hostile.
///
/// The hit is absorbed entirely by the highest-priority non-empty pool; a
/// shield layer that empties decrements the layer count and the next layer's
/// pool refills.
pub fn apply_damage(hostile: &mut Hostile, raw: f32) -> DamageOutcome {
    let dealt = effective_damage(raw, hostile.armor);

    match &mut hostile.kind {
        HostileKind::Boss {
            armor_pool,
            shield_layers,
            shield_hp,
            shield_layer_hp,
            ..
        } => {
            if *shield_layers > 0 && *shield_hp > 0.0 {
                *shield_hp -= dealt;
                if *shield_hp <= 0.0 {
                    *shield_layers -= 1;
                    *shield_hp = if *shield_layers > 0 {
                        *shield_layer_hp
                    } else {
                        0.0
                    };
                }
                return DamageOutcome {
                    dealt,
                    killed: false,
                };
            }
            if *armor_pool > 0.0 {
                *armor_pool = (*armor_pool - dealt).max(0.0);
                return DamageOutcome {
                    dealt,
                    killed: false,
                };
            }
        }
        HostileKind::Normal => {}
    }

    hostile.hp = (hostile.hp - dealt).max(0.0);
    DamageOutcome {
        dealt,
        killed: hostile.hp <= 0.0,
    }
}

/// Index of the hostile closest to `pos`.
///
/// Small-N linear scan; first match wins on ties.
pub fn nearest_hostile(hostiles: &[Hostile], pos: Vec2) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, hostile) in hostiles.iter().enumerate() {
        let d = dist_sq(pos, hostile.pos);
        if best.map(|(_, bd)| d < bd).unwrap_or(true) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn normal(hp: f32, armor: f32) -> Hostile {
        Hostile {
            id: 1,
            pos: Vec2::ZERO,
            radius: 12.0,
            speed: 60.0,
            hp,
            armor,
            bounty: 3,
            age_ms: 0.0,
            shot_cooldown_ms: None,
            kind: HostileKind::Normal,
        }
    }

    fn boss(hp: f32, armor_pool: f32, layers: u32, layer_hp: f32) -> Hostile {
        Hostile {
            id: 2,
            pos: Vec2::ZERO,
            radius: 34.0,
            speed: 40.0,
            hp,
            armor: 0.0,
            bounty: 25,
            age_ms: 0.0,
            shot_cooldown_ms: Some(1_000.0),
            kind: HostileKind::Boss {
                tier: 0,
                armor_pool,
                shield_layers: layers,
                shield_hp: if layers > 0 { layer_hp } else { 0.0 },
                shield_layer_hp: layer_hp,
            },
        }
    }

    #[test]
    fn armor_reduces_but_never_below_floor() {
        assert_eq!(effective_damage(10.0, 2.0), 6.0);
        assert_eq!(effective_damage(10.0, 100.0), DAMAGE_FLOOR);
    }

    #[test]
    fn damage_hits_hp_on_normal_hostile() {
        let mut h = normal(20.0, 0.0);
        let out = apply_damage(&mut h, 8.0);
        assert_eq!(h.hp, 12.0);
        assert!(!out.killed);
    }

    #[test]
    fn hp_clamps_at_zero_and_reports_kill() {
        let mut h = normal(5.0, 0.0);
        let out = apply_damage(&mut h, 50.0);
        assert_eq!(h.hp, 0.0);
        assert!(out.killed);
    }

    #[test]
    fn shield_absorbs_before_armor_pool_and_hp() {
        let mut h = boss(100.0, 50.0, 2, 40.0);
        apply_damage(&mut h, 10.0);
        match h.kind {
            HostileKind::Boss {
                shield_layers,
                shield_hp,
                armor_pool,
                ..
            } => {
                assert_eq!(shield_layers, 2);
                assert_eq!(shield_hp, 30.0);
                assert_eq!(armor_pool, 50.0);
            }
            _ => unreachable!(),
        }
        assert_eq!(h.hp, 100.0);
    }

    #[test]
    fn depleted_shield_layer_refills_the_next() {
        let mut h = boss(100.0, 50.0, 2, 40.0);
        apply_damage(&mut h, 60.0);
        match h.kind {
            HostileKind::Boss {
                shield_layers,
                shield_hp,
                ..
            } => {
                assert_eq!(shield_layers, 1);
                assert_eq!(shield_hp, 40.0);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn last_shield_layer_leaves_no_pool_behind() {
        let mut h = boss(100.0, 50.0, 1, 40.0);
        apply_damage(&mut h, 60.0);
        match h.kind {
            HostileKind::Boss {
                shield_layers,
                shield_hp,
                ..
            } => {
                assert_eq!(shield_layers, 0);
                assert_eq!(shield_hp, 0.0);
            }
            _ => unreachable!(),
        }
        // Next hit drains the armor pool, not hp
        apply_damage(&mut h, 30.0);
        match h.kind {
            HostileKind::Boss { armor_pool, .. } => assert_eq!(armor_pool, 20.0),
            _ => unreachable!(),
        }
        assert_eq!(h.hp, 100.0);
    }

    #[test]
    fn exhausted_pools_expose_boss_hp() {
        let mut h = boss(100.0, 0.0, 0, 40.0);
        let out = apply_damage(&mut h, 30.0);
        assert_eq!(h.hp, 70.0);
        assert!(!out.killed);
    }

    #[test]
    fn nearest_hostile_prefers_first_on_tie() {
        let a = normal(10.0, 0.0);
        let mut b = normal(10.0, 0.0);
        b.id = 9;
        b.pos = Vec2::new(0.0, 0.0);
        let hostiles = vec![a, b];
        assert_eq!(nearest_hostile(&hostiles, Vec2::ZERO), Some(0));
        assert_eq!(nearest_hostile(&[], Vec2::ZERO), None);
    }

    proptest! {
        #[test]
        fn damage_never_increases_pools(raw in 0.0f32..500.0, armor in 0.0f32..20.0,
                                        hp in 1.0f32..400.0) {
            let mut h = normal(hp, armor);
            let out = apply_damage(&mut h, raw);
            prop_assert!(out.dealt >= DAMAGE_FLOOR);
            prop_assert!(h.hp <= hp);
            prop_assert!(h.hp >= 0.0);
        }

        #[test]
        fn boss_pools_stay_non_negative(raw in 0.0f32..500.0,
                                        pool in 0.0f32..300.0,
                                        layers in 0u32..4) {
            let mut h = boss(200.0, pool, layers, 40.0);
            for _ in 0..8 {
                apply_damage(&mut h, raw);
                match h.kind {
                    HostileKind::Boss { armor_pool, shield_hp, .. } => {
                        prop_assert!(armor_pool >= 0.0);
                        // A live layer keeps positive hp; an empty stack keeps zero
                        prop_assert!(shield_hp >= 0.0);
                    }
                    _ => unreachable!(),
                }
                prop_assert!(h.hp >= 0.0);
            }
        }
    }
}
