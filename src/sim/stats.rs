//! Player stat aggregation from owned passives

use serde::Serialize;

use super::inventory::OwnedItem;
use crate::catalog::{Catalog, EffectKind};

/// Derived player stats. Always rebuilt from scratch, never patched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSnapshot {
    pub max_health: f32,
    /// Multiplier on weapon cooldowns; compounds per passive
    pub cooldown_mult: f32,
    pub might: f32,
    pub area: f32,
    pub duration: f32,
    pub projectile_speed: f32,
    pub projectile_count_bonus: u32,
    pub pickup_radius: f32,
    pub luck: f32,
    /// HP per second
    pub health_regen: f32,
    /// Flat reduction applied to contact damage
    pub damage_reduction: f32,
    pub exp_gain: f32,
}

impl Default for StatSnapshot {
    fn default() -> Self {
        Self::with_max_health(100.0)
    }
}

impl StatSnapshot {
    /// Neutral snapshot with the given base health
    pub fn with_max_health(max_health: f32) -> Self {
        Self {
            max_health,
            cooldown_mult: 1.0,
            might: 1.0,
            area: 1.0,
            duration: 1.0,
            projectile_speed: 1.0,
            projectile_count_bonus: 0,
            pickup_radius: 1.0,
            luck: 0.0,
            health_regen: 0.0,
            damage_reduction: 0.0,
            exp_gain: 1.0,
        }
    }

    fn fold(&mut self, effect: EffectKind, value: f32) {
        match effect {
            EffectKind::MaxHealth => self.max_health += value,
            EffectKind::ProjectileSpeed => self.projectile_speed += value,
            EffectKind::Might => self.might += value,
            EffectKind::Area => self.area += value,
            EffectKind::Duration => self.duration += value,
            EffectKind::Luck => self.luck += value,
            EffectKind::HealthRegen => self.health_regen += value,
            EffectKind::PickupRadius => self.pickup_radius += value,
            EffectKind::ProjectileCount => {
                self.projectile_count_bonus += value.max(0.0).round() as u32
            }
            EffectKind::DamageReduction => self.damage_reduction += value,
            EffectKind::ExperienceGain => self.exp_gain += value,
            EffectKind::Cooldown => self.cooldown_mult *= 1.0 - value,
        }
    }
}

/// Rebuild stats on top of the default base
pub fn rebuild(catalog: &Catalog, passives: &[OwnedItem]) -> StatSnapshot {
    rebuild_from(StatSnapshot::default(), catalog, passives)
}

/// Fold every owned passive at its tier into `base`.
/// Unknown ids and out-of-range tiers are skipped.
pub fn rebuild_from(base: StatSnapshot, catalog: &Catalog, passives: &[OwnedItem]) -> StatSnapshot {
    let mut stats = base;
    for owned in passives {
        let Some(def) = catalog.passive(&owned.id) else {
            continue;
        };
        if let Some(value) = def.value(owned.tier) {
            stats.fold(def.effect, value);
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn owned(id: &str, tier: u32) -> OwnedItem {
        OwnedItem {
            id: id.to_string(),
            tier,
        }
    }

    #[test]
    fn test_empty_is_neutral() {
        let catalog = Catalog::builtin();
        assert_eq!(rebuild(&catalog, &[]), StatSnapshot::default());
    }

    #[test]
    fn test_additive_and_multiplicative_folds() {
        let catalog = Catalog::builtin();
        let stats = rebuild(
            &catalog,
            &[
                owned("p_hollowHeart", 2),
                owned("p_spinach", 5),
                owned("p_emptyTome", 2),
                owned("p_duplicator", 4),
            ],
        );
        assert_eq!(stats.max_health, 120.0);
        assert!((stats.might - 1.25).abs() < 1e-6);
        assert!((stats.cooldown_mult - 0.9).abs() < 1e-6);
        assert_eq!(stats.projectile_count_bonus, 2);
    }

    #[test]
    fn test_out_of_range_tiers_are_skipped() {
        let catalog = Catalog::builtin();
        let stats = rebuild(
            &catalog,
            &[owned("p_armor", 0), owned("p_clover", 9), owned("p_unknown", 1)],
        );
        assert_eq!(stats, StatSnapshot::default());
    }

    #[test]
    fn test_cooldown_scenario() {
        let catalog = Catalog::builtin();
        let base = 2.0;
        let tier2 = rebuild(&catalog, &[owned("p_emptyTome", 2)]);
        assert!((base * tier2.cooldown_mult - 1.8).abs() < 1e-5);
        let tier4 = rebuild(&catalog, &[owned("p_emptyTome", 4)]);
        assert!((base * tier4.cooldown_mult - 1.6).abs() < 1e-5);
    }

    fn passive_set() -> impl Strategy<Value = Vec<OwnedItem>> {
        let catalog = Catalog::builtin();
        let ids: Vec<String> = catalog.passives().iter().map(|p| p.id.clone()).collect();
        proptest::sample::subsequence(ids, 0..=6).prop_flat_map(|ids| {
            let n = ids.len();
            proptest::collection::vec(0u32..=6, n).prop_map(move |tiers| {
                ids.iter()
                    .zip(tiers)
                    .map(|(id, tier)| owned(id, tier))
                    .collect()
            })
        })
    }

    proptest! {
        #[test]
        fn prop_rebuild_is_idempotent(passives in passive_set()) {
            let catalog = Catalog::builtin();
            let a = rebuild(&catalog, &passives);
            let b = rebuild(&catalog, &passives);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_cooldown_never_grows_with_tier(tier in 1u32..5, base in 0.1f32..5.0) {
            let catalog = Catalog::builtin();
            let lower = rebuild(&catalog, &[owned("p_emptyTome", tier)]);
            let higher = rebuild(&catalog, &[owned("p_emptyTome", tier + 1)]);
            prop_assert!(base * higher.cooldown_mult <= base * lower.cooldown_mult);
            prop_assert!(lower.cooldown_mult > 0.0 && lower.cooldown_mult <= 1.0);
        }
    }
}
