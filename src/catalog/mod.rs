//! Content catalog
//!
//! Immutable weapon, passive and evolution tables. The simulation only ever
//! reads from here, by identifier.

mod builtin;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Behavioral category of a weapon, selecting its resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Archetype {
    /// Timed sweep on one or both sides of the player
    MeleeArc,
    /// Fixed-heading projectiles, consumed on hit
    StraightProjectile,
    /// Steering projectiles that pierce
    HomingProjectile,
    /// Fires only when an enemy exists, consumed on hit
    AutoAimProjectile,
    /// Travels, then detonates into a splash
    ExplosiveProjectile,
    /// Continuous damage around the player
    Aura,
    /// Damage zones placed on the ground
    GroundZone,
    /// Bodies circling the player
    Orbital,
    /// Instant strikes, optionally chaining between enemies
    ChainStrike,
    /// Projectile bouncing off the playfield bounds
    BounceProjectile,
}

/// Stat a passive modifies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EffectKind {
    MaxHealth,
    ProjectileSpeed,
    Might,
    Area,
    Duration,
    Luck,
    HealthRegen,
    PickupRadius,
    ProjectileCount,
    DamageReduction,
    ExperienceGain,
    Cooldown,
}

/// One tier's raw stat bundle. Which fields are present depends on the archetype.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TierStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damage: Option<f32>,
    /// Damage per second for continuous archetypes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dps: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projectile_speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projectile_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bolt_count: Option<u32>,
    /// Orbiting body count
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounce_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explosion_radius: Option<f32>,
    /// Homing turn rate, rad/s
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_speed: Option<f32>,
    /// Enemies passed through before an explosive projectile detonates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pierce: Option<u32>,
    /// Fraction of damage dealt returned as player health
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lifesteal: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explosion_on_bounce: Option<bool>,
    /// Multiplier on the re-hit interval of orbital bodies
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooldown_mult: Option<f32>,
}

/// Condition and result of evolving a maxed base weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionRule {
    pub result_weapon_id: String,
    pub required_passive_id: String,
    pub required_passive_tier: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponDefinition {
    pub id: String,
    pub name: String,
    pub max_tier: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    pub archetype: Archetype,
    pub tiers: Vec<TierStats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution: Option<EvolutionRule>,
}

impl WeaponDefinition {
    /// Stats for a 1-based tier, `None` when out of range
    pub fn tier(&self, tier: u32) -> Option<&TierStats> {
        if tier < 1 || tier > self.max_tier {
            return None;
        }
        self.tiers.get(tier as usize - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassiveDefinition {
    pub id: String,
    pub name: String,
    pub max_tier: u32,
    pub effect: EffectKind,
    pub tiers: Vec<f32>,
}

impl PassiveDefinition {
    /// Magnitude at a 1-based tier, `None` when out of range
    pub fn value(&self, tier: u32) -> Option<f32> {
        if tier < 1 || tier > self.max_tier {
            return None;
        }
        self.tiers.get(tier as usize - 1).copied()
    }
}

/// Fixed-stat advanced form of a base weapon. Evolved weapons never level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionDefinition {
    pub id: String,
    pub name: String,
    pub base_weapon: String,
    pub required_passive: String,
    pub required_passive_tier: u32,
    #[serde(default)]
    pub description: String,
    pub stats: TierStats,
}

/// A weapon id resolved against either the base or the evolution table
#[derive(Debug, Clone, Copy)]
pub enum WeaponRef<'a> {
    Base(&'a WeaponDefinition),
    Evolved {
        evolution: &'a EvolutionDefinition,
        base: &'a WeaponDefinition,
    },
}

impl<'a> WeaponRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            WeaponRef::Base(def) => &def.id,
            WeaponRef::Evolved { evolution, .. } => &evolution.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            WeaponRef::Base(def) => &def.name,
            WeaponRef::Evolved { evolution, .. } => &evolution.name,
        }
    }

    /// Evolved weapons share their base weapon's archetype
    pub fn archetype(&self) -> Archetype {
        match self {
            WeaponRef::Base(def) => def.archetype,
            WeaponRef::Evolved { base, .. } => base.archetype,
        }
    }

    pub fn is_evolved(&self) -> bool {
        matches!(self, WeaponRef::Evolved { .. })
    }

    pub fn max_tier(&self) -> u32 {
        match self {
            WeaponRef::Base(def) => def.max_tier,
            WeaponRef::Evolved { .. } => 1,
        }
    }

    /// Stats to project for `tier`. Evolved weapons ignore the tier.
    pub fn stats_for(&self, tier: u32) -> Option<&'a TierStats> {
        match self {
            WeaponRef::Base(def) => def.tier(tier),
            WeaponRef::Evolved { evolution, .. } => Some(&evolution.stats),
        }
    }
}

/// Errors raised while loading external content or tuning data
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("malformed data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate id `{0}`")]
    DuplicateId(String),
    #[error("`{id}` declares {max_tier} tiers but defines {defined}")]
    TierCount {
        id: String,
        max_tier: u32,
        defined: usize,
    },
    #[error("`{id}` has {field} {value} outside its valid range")]
    OutOfRange {
        id: String,
        field: &'static str,
        value: f32,
    },
    #[error("`{id}` references unknown {kind} `{target}`")]
    UnknownReference {
        id: String,
        kind: &'static str,
        target: String,
    },
}

/// Serialized catalog layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
struct CatalogFile {
    weapons: Vec<WeaponDefinition>,
    passives: Vec<PassiveDefinition>,
    evolutions: Vec<EvolutionDefinition>,
}

/// Read-only content tables with id lookup. Iteration follows definition order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    weapons: Vec<WeaponDefinition>,
    passives: Vec<PassiveDefinition>,
    evolutions: Vec<EvolutionDefinition>,
    weapon_index: HashMap<String, usize>,
    passive_index: HashMap<String, usize>,
    evolution_index: HashMap<String, usize>,
}

impl Catalog {
    /// Stock content: 10 weapons, 12 passives, 10 evolutions
    pub fn builtin() -> Self {
        Self::assemble(
            builtin::weapons(),
            builtin::passives(),
            builtin::evolutions(),
        )
    }

    /// Build and validate a catalog from definitions
    pub fn new(
        weapons: Vec<WeaponDefinition>,
        passives: Vec<PassiveDefinition>,
        evolutions: Vec<EvolutionDefinition>,
    ) -> Result<Self, CatalogError> {
        let catalog = Self::assemble(weapons, passives, evolutions);
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from JSON `{ "weapons": [..], "passives": [..], "evolutions": [..] }`
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.weapons, file.passives, file.evolutions)
    }

    /// Serialize back to the JSON layout accepted by [`Catalog::from_json`]
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let file = CatalogFile {
            weapons: self.weapons.clone(),
            passives: self.passives.clone(),
            evolutions: self.evolutions.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    fn assemble(
        weapons: Vec<WeaponDefinition>,
        passives: Vec<PassiveDefinition>,
        evolutions: Vec<EvolutionDefinition>,
    ) -> Self {
        let weapon_index = weapons
            .iter()
            .enumerate()
            .map(|(i, w)| (w.id.clone(), i))
            .collect();
        let passive_index = passives
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id.clone(), i))
            .collect();
        let evolution_index = evolutions
            .iter()
            .enumerate()
            .map(|(i, e)| (e.id.clone(), i))
            .collect();
        Self {
            weapons,
            passives,
            evolutions,
            weapon_index,
            passive_index,
            evolution_index,
        }
    }

    /// Check tier tables, id uniqueness and cross references
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = std::collections::HashSet::new();
        let ids = self
            .weapons
            .iter()
            .map(|w| &w.id)
            .chain(self.passives.iter().map(|p| &p.id))
            .chain(self.evolutions.iter().map(|e| &e.id));
        for id in ids {
            if !seen.insert(id.as_str()) {
                return Err(CatalogError::DuplicateId(id.clone()));
            }
        }

        for weapon in &self.weapons {
            if weapon.max_tier == 0 || weapon.tiers.len() != weapon.max_tier as usize {
                return Err(CatalogError::TierCount {
                    id: weapon.id.clone(),
                    max_tier: weapon.max_tier,
                    defined: weapon.tiers.len(),
                });
            }
            for tier in &weapon.tiers {
                check_cooldown(&weapon.id, tier)?;
            }
            if let Some(rule) = &weapon.evolution {
                if self.evolution(&rule.result_weapon_id).is_none() {
                    return Err(unknown(&weapon.id, "evolution", &rule.result_weapon_id));
                }
                if self.passive(&rule.required_passive_id).is_none() {
                    return Err(unknown(&weapon.id, "passive", &rule.required_passive_id));
                }
            }
        }

        for passive in &self.passives {
            if passive.max_tier == 0 || passive.tiers.len() != passive.max_tier as usize {
                return Err(CatalogError::TierCount {
                    id: passive.id.clone(),
                    max_tier: passive.max_tier,
                    defined: passive.tiers.len(),
                });
            }
            // Each cooldown tier folds in as `1 - value`, which must stay in (0, 1]
            if passive.effect == EffectKind::Cooldown
                && let Some(&value) = passive.tiers.iter().find(|v| !(0.0..1.0).contains(*v))
            {
                return Err(CatalogError::OutOfRange {
                    id: passive.id.clone(),
                    field: "cooldown reduction",
                    value,
                });
            }
        }

        for evolution in &self.evolutions {
            if self.weapon(&evolution.base_weapon).is_none() {
                return Err(unknown(&evolution.id, "weapon", &evolution.base_weapon));
            }
            if self.passive(&evolution.required_passive).is_none() {
                return Err(unknown(&evolution.id, "passive", &evolution.required_passive));
            }
            check_cooldown(&evolution.id, &evolution.stats)?;
        }

        Ok(())
    }

    pub fn weapons(&self) -> &[WeaponDefinition] {
        &self.weapons
    }

    pub fn passives(&self) -> &[PassiveDefinition] {
        &self.passives
    }

    pub fn evolutions(&self) -> &[EvolutionDefinition] {
        &self.evolutions
    }

    pub fn weapon(&self, id: &str) -> Option<&WeaponDefinition> {
        self.weapon_index.get(id).map(|&i| &self.weapons[i])
    }

    pub fn passive(&self, id: &str) -> Option<&PassiveDefinition> {
        self.passive_index.get(id).map(|&i| &self.passives[i])
    }

    pub fn evolution(&self, id: &str) -> Option<&EvolutionDefinition> {
        self.evolution_index.get(id).map(|&i| &self.evolutions[i])
    }

    /// Evolution whose base is `weapon_id`
    pub fn evolution_for_base(&self, weapon_id: &str) -> Option<&EvolutionDefinition> {
        self.evolutions.iter().find(|e| e.base_weapon == weapon_id)
    }

    /// Resolve a base or evolved weapon id. Base table wins on conflict.
    pub fn resolve_weapon(&self, id: &str) -> Option<WeaponRef<'_>> {
        if let Some(def) = self.weapon(id) {
            return Some(WeaponRef::Base(def));
        }
        let evolution = self.evolution(id)?;
        let base = self.weapon(&evolution.base_weapon)?;
        Some(WeaponRef::Evolved { evolution, base })
    }
}

fn check_cooldown(id: &str, tier: &TierStats) -> Result<(), CatalogError> {
    match tier.cooldown {
        Some(value) if !(value.is_finite() && value > 0.0) => Err(CatalogError::OutOfRange {
            id: id.to_string(),
            field: "cooldown",
            value,
        }),
        _ => Ok(()),
    }
}

fn unknown(id: &str, kind: &'static str, target: &str) -> CatalogError {
    CatalogError::UnknownReference {
        id: id.to_string(),
        kind,
        target: target.to_string(),
    }
}
