//! Upgrade choices and weapon evolution
//!
//! Everything here mutates the inventory and run counters only. Callers
//! rebuild stats and resync weapon instances afterwards.

use log::{debug, info};
use rand::Rng;
use serde::Serialize;

use super::inventory::Inventory;
use super::state::GameState;
use crate::catalog::Catalog;
use crate::tuning::Tuning;

/// What an offered option does when picked
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ChoiceKind {
    WeaponAdd { id: String },
    WeaponUpgrade { id: String },
    PassiveAdd { id: String },
    PassiveUpgrade { id: String },
    Gold { amount: u32 },
    /// Restores this fraction of max health
    Heal { fraction: f32 },
    RerollToken { amount: u32 },
}

/// One option on a choice screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpgradeChoice {
    pub kind: ChoiceKind,
    pub weight: f32,
}

impl UpgradeChoice {
    fn new(kind: ChoiceKind, weight: f32) -> Self {
        Self { kind, weight }
    }

    /// Weapon or passive id for item choices
    pub fn item_id(&self) -> Option<&str> {
        match &self.kind {
            ChoiceKind::WeaponAdd { id }
            | ChoiceKind::WeaponUpgrade { id }
            | ChoiceKind::PassiveAdd { id }
            | ChoiceKind::PassiveUpgrade { id } => Some(id),
            _ => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.item_id().is_none()
    }
}

/// Record of a base weapon replaced by its evolved form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionTransition {
    pub weapon_id: String,
    pub evolved_id: String,
    pub recipe_id: String,
    pub weapon_name: String,
    pub evolution_name: String,
}

/// Every option the inventory currently allows, in catalog order
pub fn candidates(catalog: &Catalog, inventory: &Inventory, tuning: &Tuning) -> Vec<UpgradeChoice> {
    let mut out = Vec::new();

    if inventory.has_weapon_slot() {
        for def in catalog.weapons() {
            let evolved_owned = catalog
                .evolution_for_base(&def.id)
                .is_some_and(|e| inventory.weapon(&e.id).is_some());
            if inventory.weapon(&def.id).is_none() && !evolved_owned {
                out.push(UpgradeChoice::new(
                    ChoiceKind::WeaponAdd { id: def.id.clone() },
                    tuning.add_weight,
                ));
            }
        }
    }

    // Evolved weapons are absent from the base table and never offered
    for owned in inventory.weapons() {
        if let Some(def) = catalog.weapon(&owned.id)
            && owned.tier < def.max_tier
        {
            out.push(UpgradeChoice::new(
                ChoiceKind::WeaponUpgrade { id: owned.id.clone() },
                tuning.upgrade_weight,
            ));
        }
    }

    if inventory.has_passive_slot() {
        for def in catalog.passives() {
            if inventory.passive(&def.id).is_none() {
                out.push(UpgradeChoice::new(
                    ChoiceKind::PassiveAdd { id: def.id.clone() },
                    tuning.add_weight,
                ));
            }
        }
    }

    for owned in inventory.passives() {
        if let Some(def) = catalog.passive(&owned.id)
            && owned.tier < def.max_tier
        {
            out.push(UpgradeChoice::new(
                ChoiceKind::PassiveUpgrade { id: owned.id.clone() },
                tuning.upgrade_weight,
            ));
        }
    }

    out
}

/// Weighted draw of `count` entries without replacement.
/// Pools no larger than `count` are returned whole.
pub fn draw_weighted(
    mut pool: Vec<UpgradeChoice>,
    count: usize,
    rng: &mut impl Rng,
) -> Vec<UpgradeChoice> {
    if pool.len() <= count {
        return pool;
    }

    let mut total: f32 = pool.iter().map(|c| c.weight).sum();
    let mut picked = Vec::with_capacity(count);
    while picked.len() < count && !pool.is_empty() && total > 0.0 {
        let mut cursor = rng.random::<f32>() * total;
        // Float error can leave the cursor positive past the end
        let mut selected = pool.len() - 1;
        for (i, c) in pool.iter().enumerate() {
            cursor -= c.weight;
            if cursor <= 0.0 {
                selected = i;
                break;
            }
        }
        let choice = pool.remove(selected);
        total -= choice.weight;
        picked.push(choice);
    }
    picked
}

/// Pad with fallback rewards cycling gold, heal, reroll token
pub fn fill_with_fallbacks(picked: &mut Vec<UpgradeChoice>, count: usize, tuning: &Tuning) {
    while picked.len() < count {
        let kind = match picked.len() % 3 {
            0 => ChoiceKind::Gold {
                amount: tuning.fallback_gold,
            },
            1 => ChoiceKind::Heal {
                fraction: tuning.fallback_heal,
            },
            _ => ChoiceKind::RerollToken {
                amount: tuning.fallback_reroll_tokens,
            },
        };
        picked.push(UpgradeChoice::new(kind, 1.0));
    }
}

/// Build a full choice screen
pub fn generate_choices(
    catalog: &Catalog,
    inventory: &Inventory,
    tuning: &Tuning,
    rng: &mut impl Rng,
) -> Vec<UpgradeChoice> {
    let pool = candidates(catalog, inventory, tuning);
    let pool_len = pool.len();
    let mut picked = draw_weighted(pool, tuning.choice_count, rng);
    fill_with_fallbacks(&mut picked, tuning.choice_count, tuning);
    debug!("Drew {} choices from {pool_len} candidates", picked.len());
    picked
}

/// Apply a picked choice. Returns `false` when it no longer applies.
pub fn apply_choice(catalog: &Catalog, state: &mut GameState, choice: &UpgradeChoice) -> bool {
    match &choice.kind {
        ChoiceKind::WeaponAdd { id } => {
            if catalog.weapon(id).is_none() {
                return false;
            }
            let added = state.inventory.add_weapon(id);
            if added {
                info!("Acquired weapon {id}");
            }
            added
        }
        ChoiceKind::WeaponUpgrade { id } => catalog
            .weapon(id)
            .is_some_and(|def| state.inventory.upgrade_weapon(id, def.max_tier)),
        ChoiceKind::PassiveAdd { id } => {
            catalog.passive(id).is_some() && state.inventory.add_passive(id)
        }
        ChoiceKind::PassiveUpgrade { id } => catalog
            .passive(id)
            .is_some_and(|def| state.inventory.upgrade_passive(id, def.max_tier)),
        ChoiceKind::Gold { amount } => {
            state.run.gold += amount;
            true
        }
        ChoiceKind::Heal { fraction } => {
            let amount = state.player.stats.max_health * fraction;
            state.player.heal(amount);
            true
        }
        ChoiceKind::RerollToken { amount } => {
            state.run.reroll_tokens += amount;
            true
        }
    }
}

/// Whether an owned base weapon may evolve now
pub fn is_evolution_eligible(catalog: &Catalog, inventory: &Inventory, weapon_id: &str) -> bool {
    let Some(owned) = inventory.weapon(weapon_id) else {
        return false;
    };
    let Some(def) = catalog.weapon(weapon_id) else {
        return false;
    };
    let Some(rule) = &def.evolution else {
        return false;
    };
    owned.tier >= def.max_tier
        && catalog.evolution(&rule.result_weapon_id).is_some()
        && inventory
            .passive(&rule.required_passive_id)
            .is_some_and(|p| p.tier >= rule.required_passive_tier)
}

/// Owned weapons that could evolve, in inventory order
pub fn eligible_evolutions<'a>(catalog: &Catalog, inventory: &'a Inventory) -> Vec<&'a str> {
    inventory
        .weapons()
        .iter()
        .filter(|w| is_evolution_eligible(catalog, inventory, &w.id))
        .map(|w| w.id.as_str())
        .collect()
}

/// Evolve the first eligible weapon in inventory order
pub fn resolve_chest(catalog: &Catalog, inventory: &mut Inventory) -> Option<EvolutionTransition> {
    let weapon_id = eligible_evolutions(catalog, inventory).first()?.to_string();
    let def = catalog.weapon(&weapon_id)?;
    let rule = def.evolution.as_ref()?;
    let evolution = catalog.evolution(&rule.result_weapon_id)?;

    if !inventory.replace_weapon(&weapon_id, &evolution.id) {
        return None;
    }
    info!("Evolved {} into {}", def.name, evolution.name);
    Some(EvolutionTransition {
        weapon_id,
        evolved_id: evolution.id.clone(),
        recipe_id: evolution.id.clone(),
        weapon_name: def.name.clone(),
        evolution_name: evolution.name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    fn maxed(inventory: &mut Inventory, weapon: &str, passive: &str, passive_tier: u32) {
        inventory.add_weapon(weapon);
        for _ in 1..5 {
            inventory.upgrade_weapon(weapon, 5);
        }
        inventory.add_passive(passive);
        for _ in 1..passive_tier {
            inventory.upgrade_passive(passive, 5);
        }
    }

    #[test]
    fn test_empty_inventory_offers_only_adds() {
        let catalog = Catalog::builtin();
        let tuning = Tuning::default();
        let inventory = Inventory::new(3, 3);
        let mut rng = Pcg32::seed_from_u64(7);
        let choices = generate_choices(&catalog, &inventory, &tuning, &mut rng);
        assert_eq!(choices.len(), 3);
        assert!(choices.iter().all(|c| matches!(
            c.kind,
            ChoiceKind::WeaponAdd { .. } | ChoiceKind::PassiveAdd { .. }
        )));
    }

    #[test]
    fn test_fallbacks_cycle_in_order() {
        let tuning = Tuning::default();
        let mut picked = Vec::new();
        fill_with_fallbacks(&mut picked, 3, &tuning);
        assert_eq!(picked[0].kind, ChoiceKind::Gold { amount: 25 });
        assert_eq!(picked[1].kind, ChoiceKind::Heal { fraction: 0.2 });
        assert_eq!(picked[2].kind, ChoiceKind::RerollToken { amount: 1 });
    }

    #[test]
    fn test_full_maxed_inventory_pads_with_fallbacks() {
        let catalog = Catalog::builtin();
        let tuning = Tuning::default();
        let mut inventory = Inventory::new(1, 1);
        maxed(&mut inventory, "w_knife", "p_armor", 5);
        let mut rng = Pcg32::seed_from_u64(1);
        let choices = generate_choices(&catalog, &inventory, &tuning, &mut rng);
        assert_eq!(choices.len(), 3);
        assert!(choices.iter().all(UpgradeChoice::is_fallback));
    }

    #[test]
    fn test_short_pool_keeps_candidates_first() {
        let catalog = Catalog::builtin();
        let tuning = Tuning::default();
        let mut inventory = Inventory::new(1, 1);
        maxed(&mut inventory, "w_knife", "p_armor", 4);
        let mut rng = Pcg32::seed_from_u64(3);
        let choices = generate_choices(&catalog, &inventory, &tuning, &mut rng);
        assert_eq!(
            choices[0].kind,
            ChoiceKind::PassiveUpgrade {
                id: "p_armor".into()
            }
        );
        // Fallback index follows the fill position
        assert_eq!(choices[1].kind, ChoiceKind::Heal { fraction: 0.2 });
        assert_eq!(choices[2].kind, ChoiceKind::RerollToken { amount: 1 });
    }

    #[test]
    fn test_evolution_gating() {
        let catalog = Catalog::builtin();
        let mut inventory = Inventory::new(3, 3);
        inventory.add_weapon("w_whip");
        for _ in 0..3 {
            inventory.upgrade_weapon("w_whip", 5);
        }
        inventory.add_passive("p_hollowHeart");
        for _ in 0..4 {
            inventory.upgrade_passive("p_hollowHeart", 5);
        }
        // Weapon 4/5, passive 5/5
        assert!(!is_evolution_eligible(&catalog, &inventory, "w_whip"));

        let mut inventory = Inventory::new(3, 3);
        maxed(&mut inventory, "w_whip", "p_hollowHeart", 2);
        assert!(!is_evolution_eligible(&catalog, &inventory, "w_whip"));

        let mut inventory = Inventory::new(3, 3);
        maxed(&mut inventory, "w_whip", "p_hollowHeart", 3);
        assert!(is_evolution_eligible(&catalog, &inventory, "w_whip"));
    }

    #[test]
    fn test_chest_evolves_first_eligible() {
        let catalog = Catalog::builtin();
        let mut inventory = Inventory::new(3, 3);
        maxed(&mut inventory, "w_whip", "p_hollowHeart", 3);
        maxed(&mut inventory, "w_knife", "p_bracer", 3);

        let transition = resolve_chest(&catalog, &mut inventory).unwrap();
        assert_eq!(transition.weapon_id, "w_whip");
        assert_eq!(transition.evolved_id, "w_bloodyTear");
        assert_eq!(transition.evolution_name, "Bloody Tear");
        let slot = &inventory.weapons()[0];
        assert_eq!((slot.id.as_str(), slot.tier), ("w_bloodyTear", 1));
        assert!(inventory.weapon("w_whip").is_none());

        // Knife is next; then nothing is left
        assert_eq!(resolve_chest(&catalog, &mut inventory).unwrap().weapon_id, "w_knife");
        assert!(resolve_chest(&catalog, &mut inventory).is_none());
    }

    #[test]
    fn test_evolved_weapon_blocks_base_and_upgrades() {
        let catalog = Catalog::builtin();
        let tuning = Tuning::default();
        let mut inventory = Inventory::new(3, 3);
        maxed(&mut inventory, "w_whip", "p_hollowHeart", 3);
        resolve_chest(&catalog, &mut inventory);

        let pool = candidates(&catalog, &inventory, &tuning);
        assert!(pool.iter().all(|c| c.item_id() != Some("w_whip")));
        assert!(pool.iter().all(|c| c.item_id() != Some("w_bloodyTear")));
    }

    #[test]
    fn test_upgrades_carry_higher_weight() {
        let catalog = Catalog::builtin();
        let tuning = Tuning::default();
        let mut inventory = Inventory::new(3, 3);
        inventory.add_weapon("w_garlic");
        let pool = candidates(&catalog, &inventory, &tuning);
        let upgrade = pool
            .iter()
            .find(|c| matches!(c.kind, ChoiceKind::WeaponUpgrade { .. }))
            .unwrap();
        assert_eq!(upgrade.weight, 1.2);
    }

    fn inventory_strategy() -> impl Strategy<Value = Inventory> {
        let catalog = Catalog::builtin();
        let weapons: Vec<String> = catalog.weapons().iter().map(|w| w.id.clone()).collect();
        let passives: Vec<String> = catalog.passives().iter().map(|p| p.id.clone()).collect();
        (
            proptest::sample::subsequence(weapons, 0..=3),
            proptest::sample::subsequence(passives, 0..=3),
            proptest::collection::vec(0u32..5, 6),
        )
            .prop_map(|(weapons, passives, bumps)| {
                let mut inventory = Inventory::new(3, 3);
                for (id, n) in weapons.iter().zip(&bumps) {
                    inventory.add_weapon(id);
                    for _ in 0..*n {
                        inventory.upgrade_weapon(id, 5);
                    }
                }
                for (id, n) in passives.iter().zip(bumps.iter().skip(3)) {
                    inventory.add_passive(id);
                    for _ in 0..*n {
                        inventory.upgrade_passive(id, 5);
                    }
                }
                inventory
            })
    }

    proptest! {
        #[test]
        fn prop_choices_are_unique(inventory in inventory_strategy(), seed in any::<u64>()) {
            let catalog = Catalog::builtin();
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            let choices = generate_choices(&catalog, &inventory, &tuning, &mut rng);
            prop_assert_eq!(choices.len(), 3);

            let mut seen = HashSet::new();
            for choice in choices.iter().filter(|c| !c.is_fallback()) {
                let key = format!("{:?}", choice.kind);
                prop_assert!(seen.insert(key));
            }
        }

        #[test]
        fn prop_choices_respect_capacity(inventory in inventory_strategy(), seed in any::<u64>()) {
            let catalog = Catalog::builtin();
            let tuning = Tuning::default();
            let mut rng = Pcg32::seed_from_u64(seed);
            for choice in generate_choices(&catalog, &inventory, &tuning, &mut rng) {
                match choice.kind {
                    ChoiceKind::WeaponAdd { .. } => prop_assert!(inventory.has_weapon_slot()),
                    ChoiceKind::PassiveAdd { .. } => prop_assert!(inventory.has_passive_slot()),
                    _ => {}
                }
            }
        }
    }
}
