//! Game balance tuning
//!
//! Every balance number the run logic consults. Loadable from JSON; missing
//! fields keep their defaults so partial files are fine.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogError;
use crate::consts::SIM_DT;

/// Balance values for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tuning {
    // === Playfield ===
    pub playfield_width: f32,
    pub playfield_height: f32,

    // === Inventory ===
    pub weapon_slots: usize,
    pub passive_slots: usize,

    // === Choice generation ===
    /// Number of options offered per choice screen
    pub choice_count: usize,
    pub add_weight: f32,
    pub upgrade_weight: f32,
    pub fallback_gold: u32,
    /// Fraction of max health restored by the heal fallback
    pub fallback_heal: f32,
    pub fallback_reroll_tokens: u32,

    // === Player ===
    pub player_radius: f32,
    /// Movement speed in px/s
    pub player_speed: f32,
    pub base_max_health: f32,

    // === Experience ===
    pub exp_base: f32,
    pub exp_growth: f32,
    /// Distance at which orbs start drifting toward the player (before the pickup stat)
    pub magnet_range: f32,
    /// Orb drift speed in px/s
    pub orb_speed: f32,
    pub orb_radius: f32,
    pub chest_radius: f32,

    // === Enemies ===
    /// Initial spawn interval in seconds
    pub spawn_interval: f32,
    pub min_spawn_interval: f32,
    /// Seconds of run time per one-frame (1/60 s) reduction of the interval
    pub spawn_ramp_secs: f32,
    pub elite_interval: f32,
    pub enemy_base_health: f32,
    /// Health gained per player level, as a fraction of base
    pub enemy_health_per_level: f32,
    pub elite_base_health: f32,
    pub elite_health_per_level: f32,
    pub spawn_margin: f32,
    pub elite_spawn_margin: f32,
    pub enemy_min_radius: f32,
    pub enemy_max_radius: f32,
    /// Enemy chase speed range in px/s
    pub enemy_min_speed: f32,
    pub enemy_max_speed: f32,
    pub elite_min_radius: f32,
    pub elite_max_radius: f32,
    pub elite_min_speed: f32,
    pub elite_max_speed: f32,
    /// Contact damage per second while touching an enemy
    pub contact_dps: f32,
    /// Contact damage per second removed per point of damage reduction
    pub damage_reduction_scale: f32,
    pub min_contact_dps: f32,

    // === Drops ===
    pub orb_base_value: f32,
    pub elite_orb_value: f32,
    pub orb_value_per_level: f32,
    /// Upper bound of the random bonus on an orb, as a fraction of its value
    pub orb_value_jitter: f32,
    pub elite_chest_chance: f32,
    pub chest_chance: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            playfield_width: 1600.0,
            playfield_height: 1000.0,

            weapon_slots: 3,
            passive_slots: 3,

            choice_count: 3,
            add_weight: 1.0,
            upgrade_weight: 1.2,
            fallback_gold: 25,
            fallback_heal: 0.2,
            fallback_reroll_tokens: 1,

            player_radius: 15.0,
            player_speed: 180.0,
            base_max_health: 100.0,

            exp_base: 100.0,
            exp_growth: 1.5,
            magnet_range: 50.0,
            orb_speed: 120.0,
            orb_radius: 5.0,
            chest_radius: 15.0,

            spawn_interval: 1.0,
            min_spawn_interval: 0.5,
            spawn_ramp_secs: 10.0,
            elite_interval: 30.0,
            enemy_base_health: 20.0,
            enemy_health_per_level: 0.3,
            elite_base_health: 100.0,
            elite_health_per_level: 0.5,
            spawn_margin: 20.0,
            elite_spawn_margin: 30.0,
            enemy_min_radius: 10.0,
            enemy_max_radius: 20.0,
            enemy_min_speed: 30.0,
            enemy_max_speed: 78.0,
            elite_min_radius: 20.0,
            elite_max_radius: 30.0,
            elite_min_speed: 48.0,
            elite_max_speed: 78.0,
            contact_dps: 30.0,
            damage_reduction_scale: 3.0,
            min_contact_dps: 6.0,

            orb_base_value: 10.0,
            elite_orb_value: 50.0,
            orb_value_per_level: 0.2,
            orb_value_jitter: 0.5,
            elite_chest_chance: 0.3,
            chest_chance: 0.01,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject spawn cadences the tick loop cannot make progress on
    pub fn validate(&self) -> Result<(), CatalogError> {
        let intervals = [
            ("spawnInterval", self.spawn_interval),
            ("minSpawnInterval", self.min_spawn_interval),
            ("eliteInterval", self.elite_interval),
        ];
        for (field, value) in intervals {
            if !(value.is_finite() && value > 0.0) {
                return Err(CatalogError::OutOfRange {
                    id: "tuning".to_string(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }

    /// Experience required to go from `level` to `level + 1`
    pub fn exp_to_next(&self, level: u32) -> f32 {
        (self.exp_base * self.exp_growth.powi(level.saturating_sub(1) as i32)).floor()
    }

    /// Spawn interval after `run_secs` seconds of play, never shorter than one tick
    pub fn spawn_interval_at(&self, run_secs: f32) -> f32 {
        let steps = (run_secs / self.spawn_ramp_secs.max(f32::EPSILON)).floor();
        (self.spawn_interval - steps / 60.0)
            .max(self.min_spawn_interval)
            .max(SIM_DT)
    }
}
