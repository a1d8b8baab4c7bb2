//! Weapon instances and their transient entities
//!
//! One `WeaponInstance` per owned weapon, kept in sync with the inventory and
//! the player's stat snapshot. Each tick the manager advances every instance's
//! behavior, steps the shared entity pools, then resolves collisions into
//! damage events for the caller to apply.

pub mod behavior;
pub mod collision;
pub mod entities;

use std::collections::HashMap;

use glam::Vec2;
use log::{debug, warn};
use rand::Rng;
use serde::Serialize;

use super::arena::{EnemyId, Enemies};
use super::inventory::Inventory;
use super::sector::SweepSector;
use super::stats::StatSnapshot;
use crate::catalog::{Archetype, Catalog, TierStats, WeaponRef};
use crate::consts::*;

pub use entities::{Effects, GroundEffect, Projectile, ProjectileId, ProjectileKind, StrikeEffect};

/// Combat values after applying the player's stats to a tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveStats {
    pub damage: f32,
    pub dps: f32,
    pub cooldown: f32,
    pub range: f32,
    pub radius: f32,
    pub area: f32,
    /// Lifetime override for zones and runes
    pub duration: Option<f32>,
    pub projectile_speed: f32,
    pub projectile_count: u32,
    pub bolt_count: u32,
    pub count: u32,
    pub chain_count: Option<u32>,
    pub bounce_count: u32,
    pub explosion_radius: f32,
    pub turn_speed: f32,
    pub pierce: u32,
    pub lifesteal: f32,
    pub tracking: bool,
    pub explosion_on_bounce: bool,
    pub cooldown_mult: f32,
}

impl EffectiveStats {
    /// Project raw tier stats through the player's stat snapshot
    pub fn project(tier: &TierStats, stats: &StatSnapshot) -> Self {
        Self {
            damage: tier.damage.unwrap_or(0.0) * stats.might,
            dps: tier.dps.unwrap_or(0.0) * stats.might,
            cooldown: tier
                .cooldown
                .map_or(DEFAULT_COOLDOWN, |c| c * stats.cooldown_mult),
            range: tier.range.unwrap_or(1.0) * stats.area,
            radius: tier.radius.unwrap_or(1.0) * stats.area,
            area: tier.area.unwrap_or(1.0) * stats.area,
            duration: tier.duration.map(|d| d * stats.duration),
            projectile_speed: tier.projectile_speed.unwrap_or(1.0) * stats.projectile_speed,
            projectile_count: tier.projectile_count.unwrap_or(1) + stats.projectile_count_bonus,
            bolt_count: tier.bolt_count.unwrap_or(1),
            count: tier.count.unwrap_or(1),
            chain_count: tier.chain_count,
            bounce_count: tier.bounce_count.unwrap_or(RUNE_BOUNCES),
            explosion_radius: tier.explosion_radius.unwrap_or(1.0),
            turn_speed: tier.turn_speed.unwrap_or(MISSILE_TURN_SPEED),
            pierce: tier.pierce.unwrap_or(0),
            lifesteal: tier.lifesteal.unwrap_or(0.0),
            tracking: tier.tracking.unwrap_or(false),
            explosion_on_bounce: tier.explosion_on_bounce.unwrap_or(false),
            cooldown_mult: tier.cooldown_mult.unwrap_or(1.0),
        }
    }
}

/// Which side(s) a melee swing covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SwingSide {
    Right,
    Left,
    Both,
}

impl SwingSide {
    fn flipped(self) -> Self {
        match self {
            SwingSide::Right => SwingSide::Left,
            _ => SwingSide::Right,
        }
    }

    /// Facing angles covered by this swing
    pub fn angles(self) -> &'static [f32] {
        use std::f32::consts::PI;
        match self {
            SwingSide::Right => &[0.0],
            SwingSide::Left => &[PI],
            SwingSide::Both => &[0.0, PI],
        }
    }
}

/// An in-progress melee sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Swing {
    pub side: SwingSide,
    pub elapsed: f32,
}

impl Swing {
    /// 0 at the start of the swing, 1 at the end
    pub fn progress(&self) -> f32 {
        (self.elapsed / SWING_DURATION).clamp(0.0, 1.0)
    }
}

/// Re-hit throttle key. Projectile keys let two projectiles of one weapon
/// land separate hits on the same enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitKey {
    Enemy(EnemyId),
    Projectile(EnemyId, ProjectileId),
    Blast(EnemyId, ProjectileId),
}

/// Last hit time per key
#[derive(Debug, Clone, Default)]
pub struct HitLog {
    last_hit: HashMap<HitKey, f32>,
}

impl HitLog {
    /// Record a hit at `now` unless one landed less than `interval` ago
    pub fn try_hit(&mut self, key: HitKey, now: f32, interval: f32) -> bool {
        if let Some(&last) = self.last_hit.get(&key)
            && now - last < interval
        {
            return false;
        }
        self.last_hit.insert(key, now);
        true
    }

    /// Forget entries older than `retention`
    pub fn prune(&mut self, now: f32, retention: f32) {
        self.last_hit.retain(|_, &mut t| now - t <= retention);
    }
}

/// Live state of one owned weapon
#[derive(Debug, Clone)]
pub struct WeaponInstance {
    pub weapon_id: String,
    pub name: String,
    pub archetype: Archetype,
    pub evolved: bool,
    /// Recorded tier; always 1 for evolved weapons
    pub tier: u32,
    pub tags: Vec<String>,
    pub stats: EffectiveStats,
    pub cooldown_timer: f32,
    pub swing: Option<Swing>,
    last_side: SwingSide,
    pub orbit_angle: f32,
    pub(crate) hits: HitLog,
}

impl WeaponInstance {
    fn new(
        weapon_id: &str,
        name: &str,
        archetype: Archetype,
        evolved: bool,
        tier: u32,
        tags: Vec<String>,
        stats: EffectiveStats,
    ) -> Self {
        Self {
            weapon_id: weapon_id.to_string(),
            name: name.to_string(),
            archetype,
            evolved,
            tier,
            tags,
            stats,
            cooldown_timer: 0.0,
            swing: None,
            last_side: SwingSide::Left,
            orbit_angle: 0.0,
            hits: HitLog::default(),
        }
    }

    /// Current melee windows, empty when not swinging
    pub fn sweep_sectors(&self) -> Vec<SweepSector> {
        let Some(swing) = self.swing else {
            return Vec::new();
        };
        let (range, half_angle) = if self.evolved {
            (SWING_RANGE_EVOLVED, SWING_HALF_ANGLE_EVOLVED)
        } else {
            (SWING_RANGE, SWING_HALF_ANGLE)
        };
        let window = half_angle * (1.0 - swing.progress());
        swing
            .side
            .angles()
            .iter()
            .map(|&facing| SweepSector::new(facing, window, self.stats.range * range))
            .collect()
    }

    /// Radius of the damage aura around the player
    pub fn aura_radius(&self) -> f32 {
        self.stats.radius * AURA_RADIUS
    }

    /// Orbiting body positions relative to the player
    pub fn orbit_offsets(&self) -> Vec<Vec2> {
        let count = self.stats.count.max(1);
        let step = std::f32::consts::TAU / count as f32;
        let radius = self.stats.range * ORBIT_RADIUS;
        (0..count)
            .map(|i| crate::polar_to_cartesian(radius, self.orbit_angle + step * i as f32))
            .collect()
    }

    /// Minimum delay between orbital hits on one enemy
    pub fn orbit_hit_interval(&self) -> f32 {
        self.stats.cooldown * self.stats.cooldown_mult
    }
}

/// One hit for the caller to apply
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DamageEvent {
    pub enemy: EnemyId,
    pub damage: f32,
    /// Fraction of `damage` returned to the player as health
    pub lifesteal: f32,
}

/// World state a weapon reads while advancing
#[derive(Debug, Clone, Copy)]
pub struct WeaponContext<'a> {
    pub player_pos: Vec2,
    pub player_vel: Vec2,
    pub enemies: &'a Enemies,
    pub playfield: Vec2,
    pub dt: f32,
}

/// Owns every weapon instance and the shared entity pools
#[derive(Debug, Clone, Default)]
pub struct WeaponManager {
    instances: Vec<WeaponInstance>,
    effects: Effects,
    /// Weapon-local clock for hit throttles
    time: f32,
}

impl WeaponManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instances(&self) -> &[WeaponInstance] {
        &self.instances
    }

    pub fn instance(&self, weapon_id: &str) -> Option<&WeaponInstance> {
        self.instances.iter().find(|i| i.weapon_id == weapon_id)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.effects.projectiles
    }

    pub fn zones(&self) -> &[GroundEffect] {
        &self.effects.zones
    }

    pub fn strikes(&self) -> &[StrikeEffect] {
        &self.effects.strikes
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    /// Make instances match the inventory and re-project their stats
    pub fn sync(&mut self, catalog: &Catalog, inventory: &Inventory, stats: &StatSnapshot) {
        self.instances.retain(|inst| {
            let owned = inventory.weapon(&inst.weapon_id).is_some();
            if !owned {
                debug!("Dropping weapon instance {}", inst.weapon_id);
            }
            owned
        });
        self.effects
            .retain_weapons(|id| inventory.weapon(id).is_some());

        for owned in inventory.weapons() {
            let Some(weapon) = catalog.resolve_weapon(&owned.id) else {
                warn!("Owned weapon {} is not in the catalog", owned.id);
                continue;
            };
            let Some(tier) = weapon.stats_for(owned.tier) else {
                warn!("Weapon {} has no tier {}", owned.id, owned.tier);
                continue;
            };
            let effective = EffectiveStats::project(tier, stats);
            let recorded_tier = if weapon.is_evolved() { 1 } else { owned.tier };

            match self.instances.iter_mut().find(|i| i.weapon_id == owned.id) {
                Some(inst) => {
                    inst.tier = recorded_tier;
                    inst.stats = effective;
                }
                None => {
                    let tags = match weapon {
                        WeaponRef::Base(def) => def.tags.clone(),
                        WeaponRef::Evolved { base, .. } => base.tags.clone(),
                    };
                    debug!("Creating weapon instance {} at tier {recorded_tier}", owned.id);
                    self.instances.push(WeaponInstance::new(
                        weapon.id(),
                        weapon.name(),
                        weapon.archetype(),
                        weapon.is_evolved(),
                        recorded_tier,
                        tags,
                        effective,
                    ));
                }
            }
        }
    }

    /// Run every instance's behavior, then move and expire entities
    pub fn advance(&mut self, ctx: &WeaponContext, rng: &mut impl Rng) {
        self.time += ctx.dt;
        for inst in &mut self.instances {
            behavior::advance(inst, &mut self.effects, ctx, rng);
        }
        self.effects.step(ctx.dt, ctx.enemies, ctx.playfield);
    }

    /// Damage events for one instance this tick
    pub fn resolve(&mut self, weapon_id: &str, ctx: &WeaponContext) -> Vec<DamageEvent> {
        let mut events = Vec::new();
        if let Some(inst) = self.instances.iter_mut().find(|i| i.weapon_id == weapon_id) {
            collision::resolve(inst, &mut self.effects, ctx, self.time, &mut events);
            inst.hits.prune(self.time, HIT_LOG_RETENTION);
        }
        self.effects.sweep();
        events
    }

    /// Damage events for every instance, in instance order
    pub fn resolve_all(&mut self, ctx: &WeaponContext) -> Vec<DamageEvent> {
        let mut events = Vec::new();
        for inst in &mut self.instances {
            collision::resolve(inst, &mut self.effects, ctx, self.time, &mut events);
            inst.hits.prune(self.time, HIT_LOG_RETENTION);
        }
        self.effects.sweep();
        events
    }

    /// Forget every instance and entity
    pub fn clear(&mut self) {
        self.instances.clear();
        self.effects.clear();
        self.time = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stats;

    fn owned_inventory(items: &[(&str, u32)]) -> Inventory {
        let mut inventory = Inventory::new(3, 3);
        for &(id, tier) in items {
            inventory.add_weapon(id);
            for _ in 1..tier {
                inventory.upgrade_weapon(id, 5);
            }
        }
        inventory
    }

    #[test]
    fn test_projection_applies_snapshot() {
        let catalog = Catalog::builtin();
        let tier = catalog.weapon("w_knife").unwrap().tier(3).unwrap();
        let snapshot = StatSnapshot {
            might: 1.5,
            cooldown_mult: 0.5,
            projectile_count_bonus: 1,
            projectile_speed: 1.2,
            ..StatSnapshot::default()
        };
        let eff = EffectiveStats::project(tier, &snapshot);
        assert_eq!(eff.damage, 15.0);
        assert!((eff.cooldown - 0.65).abs() < 1e-6);
        assert_eq!(eff.projectile_count, 3);
        assert!((eff.projectile_speed - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_missing_cooldown_uses_default() {
        let catalog = Catalog::builtin();
        let tier = catalog.weapon("w_garlic").unwrap().tier(1).unwrap();
        let eff = EffectiveStats::project(tier, &StatSnapshot::default());
        assert_eq!(eff.cooldown, DEFAULT_COOLDOWN);
        assert_eq!(eff.damage, 0.0);
        assert_eq!(eff.dps, 6.0);
    }

    #[test]
    fn test_sync_tracks_inventory() {
        let catalog = Catalog::builtin();
        let snapshot = StatSnapshot::default();
        let mut manager = WeaponManager::new();

        let mut inventory = owned_inventory(&[("w_whip", 2), ("w_garlic", 1)]);
        manager.sync(&catalog, &inventory, &snapshot);
        assert_eq!(manager.instances().len(), 2);
        assert_eq!(manager.instance("w_whip").unwrap().tier, 2);
        assert_eq!(manager.instance("w_whip").unwrap().stats.damage, 13.0);

        inventory.upgrade_weapon("w_whip", 5);
        manager.sync(&catalog, &inventory, &snapshot);
        assert_eq!(manager.instance("w_whip").unwrap().stats.damage, 16.0);
        assert_eq!(manager.instances().len(), 2);
    }

    #[test]
    fn test_sync_replaces_evolved_instance() {
        let catalog = Catalog::builtin();
        let mut inventory = owned_inventory(&[("w_whip", 5)]);
        inventory.add_passive("p_hollowHeart");
        let snapshot = stats::rebuild(&catalog, inventory.passives());
        let mut manager = WeaponManager::new();
        manager.sync(&catalog, &inventory, &snapshot);

        inventory.replace_weapon("w_whip", "w_bloodyTear");
        manager.sync(&catalog, &inventory, &snapshot);
        assert!(manager.instance("w_whip").is_none());
        let tear = manager.instance("w_bloodyTear").unwrap();
        assert!(tear.evolved);
        assert_eq!(tear.tier, 1);
        assert_eq!(tear.archetype, Archetype::MeleeArc);
        assert_eq!(tear.stats.damage, 30.0);
        assert_eq!(tear.stats.lifesteal, 0.1);
        assert_eq!(tear.tags, vec!["melee".to_string()]);
    }

    #[test]
    fn test_sync_skips_unknown_ids() {
        let catalog = Catalog::builtin();
        let inventory = owned_inventory(&[("w_unknown", 1), ("w_knife", 1)]);
        let mut manager = WeaponManager::new();
        manager.sync(&catalog, &inventory, &StatSnapshot::default());
        assert_eq!(manager.instances().len(), 1);
    }

    #[test]
    fn test_hit_log_throttles_per_key() {
        let enemy = EnemyId {
            index: 0,
            generation: 0,
        };
        let mut log = HitLog::default();
        assert!(log.try_hit(HitKey::Enemy(enemy), 0.0, 0.1));
        assert!(!log.try_hit(HitKey::Enemy(enemy), 0.05, 0.1));
        assert!(log.try_hit(HitKey::Projectile(enemy, ProjectileId(1)), 0.05, 0.1));
        assert!(log.try_hit(HitKey::Projectile(enemy, ProjectileId(2)), 0.05, 0.1));
        assert!(log.try_hit(HitKey::Enemy(enemy), 0.1, 0.1));

        log.prune(10.0, HIT_LOG_RETENTION);
        assert!(log.last_hit.is_empty());
    }

    #[test]
    fn test_single_resolve_prunes_old_hits() {
        let catalog = Catalog::builtin();
        let inventory = owned_inventory(&[("w_whip", 1)]);
        let mut manager = WeaponManager::new();
        manager.sync(&catalog, &inventory, &StatSnapshot::default());
        let enemy = EnemyId {
            index: 0,
            generation: 0,
        };
        manager.instances[0]
            .hits
            .try_hit(HitKey::Enemy(enemy), 0.0, REHIT_INTERVAL);

        let enemies = Enemies::new();
        let ctx = WeaponContext {
            player_pos: Vec2::ZERO,
            player_vel: Vec2::ZERO,
            enemies: &enemies,
            playfield: Vec2::new(800.0, 600.0),
            dt: 0.0,
        };
        manager.time = 1.0;
        manager.resolve("w_whip", &ctx);
        assert!(!manager.instances[0].hits.last_hit.is_empty());

        manager.time = HIT_LOG_RETENTION + 1.0;
        assert!(manager.resolve("w_whip", &ctx).is_empty());
        assert!(manager.instances[0].hits.last_hit.is_empty());
    }

    #[test]
    fn test_orbit_bodies_are_evenly_spaced() {
        let catalog = Catalog::builtin();
        let inventory = owned_inventory(&[("w_kingBible", 4)]);
        let mut manager = WeaponManager::new();
        manager.sync(&catalog, &inventory, &StatSnapshot::default());
        let bible = manager.instance("w_kingBible").unwrap();
        let offsets = bible.orbit_offsets();
        assert_eq!(offsets.len(), 3);
        for offset in &offsets {
            assert!((offset.length() - ORBIT_RADIUS).abs() < 1e-3);
        }
    }
}
