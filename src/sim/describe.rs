//! Human-readable text for choice screens and evolution banners

use serde::Serialize;

use super::inventory::Inventory;
use super::progression::{ChoiceKind, EvolutionTransition, UpgradeChoice};
use crate::catalog::{Catalog, EffectKind, PassiveDefinition, TierStats};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChoiceCategory {
    Weapon,
    Passive,
    Reward,
}

/// Everything a choice card shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceDetails {
    pub name: String,
    pub category: ChoiceCategory,
    /// 0 for items not yet owned; `None` for rewards
    pub current_tier: Option<u32>,
    pub next_tier: Option<u32>,
    pub max_tier: Option<u32>,
    pub text: String,
}

/// One-line summary of a choice
pub fn choice_summary(catalog: &Catalog, choice: &UpgradeChoice) -> String {
    match &choice.kind {
        ChoiceKind::WeaponAdd { id } => catalog
            .weapon(id)
            .map_or_else(String::new, |w| format!("New weapon: {}", w.name)),
        ChoiceKind::WeaponUpgrade { id } => catalog
            .weapon(id)
            .map_or_else(String::new, |w| format!("Weapon upgrade: {}", w.name)),
        ChoiceKind::PassiveAdd { id } => catalog
            .passive(id)
            .map_or_else(String::new, |p| format!("New passive: {}", p.name)),
        ChoiceKind::PassiveUpgrade { id } => catalog
            .passive(id)
            .map_or_else(String::new, |p| format!("Passive upgrade: {}", p.name)),
        ChoiceKind::Gold { .. } | ChoiceKind::Heal { .. } | ChoiceKind::RerollToken { .. } => {
            reward_text(&choice.kind)
        }
    }
}

/// Card contents for a choice. `None` when it names an unknown or unowned item.
pub fn choice_details(
    catalog: &Catalog,
    inventory: &Inventory,
    choice: &UpgradeChoice,
) -> Option<ChoiceDetails> {
    let details = match &choice.kind {
        ChoiceKind::WeaponAdd { id } | ChoiceKind::WeaponUpgrade { id } => {
            let def = catalog.weapon(id)?;
            let current = owned_tier(&choice.kind, inventory.weapon(id).map(|w| w.tier))?;
            ChoiceDetails {
                name: def.name.clone(),
                category: ChoiceCategory::Weapon,
                current_tier: Some(current),
                next_tier: Some(current + 1),
                max_tier: Some(def.max_tier),
                text: def.tier(current + 1).map(weapon_tier_text).unwrap_or_default(),
            }
        }
        ChoiceKind::PassiveAdd { id } | ChoiceKind::PassiveUpgrade { id } => {
            let def = catalog.passive(id)?;
            let current = owned_tier(&choice.kind, inventory.passive(id).map(|p| p.tier))?;
            ChoiceDetails {
                name: def.name.clone(),
                category: ChoiceCategory::Passive,
                current_tier: Some(current),
                next_tier: Some(current + 1),
                max_tier: Some(def.max_tier),
                text: passive_tier_text(def, current + 1),
            }
        }
        ChoiceKind::Gold { .. } | ChoiceKind::Heal { .. } | ChoiceKind::RerollToken { .. } => {
            let name = match choice.kind {
                ChoiceKind::Gold { .. } => "Gold",
                ChoiceKind::Heal { .. } => "Heal",
                _ => "Reroll Token",
            };
            ChoiceDetails {
                name: name.to_string(),
                category: ChoiceCategory::Reward,
                current_tier: None,
                next_tier: None,
                max_tier: None,
                text: reward_text(&choice.kind),
            }
        }
    };
    Some(details)
}

// Adds start from tier 0; upgrades need the item owned
fn owned_tier(kind: &ChoiceKind, owned: Option<u32>) -> Option<u32> {
    match kind {
        ChoiceKind::WeaponAdd { .. } | ChoiceKind::PassiveAdd { .. } => Some(0),
        _ => owned,
    }
}

fn reward_text(kind: &ChoiceKind) -> String {
    match kind {
        ChoiceKind::Gold { amount } => format!("Gold +{amount}"),
        ChoiceKind::Heal { fraction } => format!("Restore {:.0}% HP", fraction * 100.0),
        ChoiceKind::RerollToken { amount } => format!("Reroll token +{amount}"),
        _ => String::new(),
    }
}

/// Stat line for one weapon tier, e.g. "Damage 13, Cooldown 1.0s"
pub fn weapon_tier_text(tier: &TierStats) -> String {
    let mut parts = Vec::new();
    if let Some(damage) = tier.damage {
        parts.push(format!("Damage {}", number(damage)));
    }
    if let Some(dps) = tier.dps {
        parts.push(format!("DPS {}", number(dps)));
    }
    if let Some(cooldown) = tier.cooldown {
        parts.push(format!("Cooldown {cooldown:.1}s"));
    }
    if let Some(range) = tier.range {
        parts.push(format!("Range {}", number(range)));
    }
    if let Some(count) = tier.projectile_count {
        parts.push(format!("Projectiles {count}"));
    }
    if let Some(radius) = tier.radius {
        parts.push(format!("Radius {}", number(radius)));
    }
    if let Some(bolts) = tier.bolt_count {
        parts.push(format!("Bolts {bolts}"));
    }
    if let Some(count) = tier.count {
        parts.push(format!("Count {count}"));
    }
    if let Some(bounces) = tier.bounce_count {
        parts.push(format!("Bounces {bounces}"));
    }
    if let Some(duration) = tier.duration {
        parts.push(format!("Duration {duration:.1}s"));
    }
    parts.join(", ")
}

/// Effect of a passive tier, with a preview of the next one when it exists,
/// e.g. "Cooldown -10% -> -15%"
pub fn passive_tier_text(def: &PassiveDefinition, tier: u32) -> String {
    let Some(value) = def.value(tier) else {
        return String::new();
    };
    let mut text = format!("{} {}", effect_label(def.effect), effect_value(def.effect, value));
    if tier < def.max_tier
        && let Some(next) = def.value(tier + 1)
    {
        text.push_str(&format!(" -> {}", effect_value(def.effect, next)));
    }
    text
}

/// Banner text for an evolution, name line then flavor line
pub fn evolution_text(catalog: &Catalog, transition: &EvolutionTransition) -> String {
    let header = format!("{} -> {}", transition.weapon_name, transition.evolution_name);
    match catalog.evolution(&transition.recipe_id) {
        Some(evolution) => format!("{header}\n{}", evolution.description),
        None => header,
    }
}

pub fn effect_label(effect: EffectKind) -> &'static str {
    match effect {
        EffectKind::MaxHealth => "Max HP",
        EffectKind::ProjectileSpeed => "Projectile speed",
        EffectKind::Might => "Damage",
        EffectKind::Area => "Area",
        EffectKind::Duration => "Duration",
        EffectKind::Luck => "Luck",
        EffectKind::HealthRegen => "HP regen",
        EffectKind::PickupRadius => "Pickup radius",
        EffectKind::ProjectileCount => "Projectiles",
        EffectKind::DamageReduction => "Damage taken",
        EffectKind::ExperienceGain => "Experience",
        EffectKind::Cooldown => "Cooldown",
    }
}

fn effect_value(effect: EffectKind, value: f32) -> String {
    match effect {
        EffectKind::MaxHealth | EffectKind::Luck | EffectKind::ProjectileCount => {
            format!("+{}", number(value))
        }
        EffectKind::HealthRegen => format!("+{value:.1}/s"),
        EffectKind::DamageReduction => format!("-{}", number(value)),
        EffectKind::Cooldown => format!("-{:.0}%", value * 100.0),
        EffectKind::ProjectileSpeed
        | EffectKind::Might
        | EffectKind::Area
        | EffectKind::Duration
        | EffectKind::PickupRadius
        | EffectKind::ExperienceGain => format!("+{:.0}%", value * 100.0),
    }
}

// Whole numbers without a trailing ".0"
fn number(value: f32) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
