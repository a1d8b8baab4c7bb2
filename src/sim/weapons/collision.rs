//! Collision queries turning weapon geometry into damage events
//!
//! Damage is never applied here. Area archetypes throttle re-hits per enemy;
//! projectiles throttle per (enemy, projectile) so a volley can stack.

use super::entities::{Effects, ProjectileKind};
use super::{DamageEvent, HitKey, WeaponContext, WeaponInstance};
use crate::catalog::Archetype;
use crate::consts::*;
use crate::sim::arena::{Enemy, EnemyId};

/// Append this instance's hits for the current tick to `events`
pub fn resolve(
    inst: &mut WeaponInstance,
    effects: &mut Effects,
    ctx: &WeaponContext,
    now: f32,
    events: &mut Vec<DamageEvent>,
) {
    let lifesteal = inst.stats.lifesteal;
    let mut emit = |enemy: EnemyId, damage: f32| {
        events.push(DamageEvent {
            enemy,
            damage,
            lifesteal,
        })
    };
    let live = || ctx.enemies.iter().filter(|(_, e)| e.is_alive());

    match inst.archetype {
        Archetype::MeleeArc => {
            let sectors = inst.sweep_sectors();
            if !sectors.is_empty() {
                for (id, enemy) in live() {
                    let offset = enemy.pos - ctx.player_pos;
                    if sectors.iter().any(|s| s.touches(offset, enemy.radius))
                        && inst.hits.try_hit(HitKey::Enemy(id), now, REHIT_INTERVAL)
                    {
                        emit(id, inst.stats.damage);
                    }
                }
            }
        }
        Archetype::Aura => {
            let radius = inst.aura_radius();
            for (id, enemy) in live() {
                if overlaps(enemy, ctx.player_pos, radius) {
                    emit(id, inst.stats.dps * ctx.dt);
                }
            }
        }
        Archetype::GroundZone => {
            for zone in effects.zones.iter().filter(|z| z.weapon_id == inst.weapon_id) {
                for (id, enemy) in live() {
                    if overlaps(enemy, zone.pos, zone.radius) {
                        emit(id, zone.dps * ctx.dt);
                    }
                }
            }
        }
        Archetype::Orbital => {
            let interval = inst.orbit_hit_interval();
            let bodies: Vec<_> = inst
                .orbit_offsets()
                .into_iter()
                .map(|o| ctx.player_pos + o)
                .collect();
            for (id, enemy) in live() {
                if bodies.iter().any(|&b| overlaps(enemy, b, ORBIT_BODY_RADIUS))
                    && inst.hits.try_hit(HitKey::Enemy(id), now, interval)
                {
                    emit(id, inst.stats.dps * interval);
                }
            }
        }
        Archetype::ChainStrike => {
            for strike in effects.strikes.iter().filter(|s| s.weapon_id == inst.weapon_id) {
                for (id, enemy) in live() {
                    if overlaps(enemy, strike.pos, strike.radius)
                        && inst.hits.try_hit(HitKey::Enemy(id), now, REHIT_INTERVAL)
                    {
                        emit(id, strike.damage);
                    }
                }
            }
        }
        Archetype::StraightProjectile
        | Archetype::HomingProjectile
        | Archetype::AutoAimProjectile
        | Archetype::ExplosiveProjectile
        | Archetype::BounceProjectile => {}
    }

    let projectiles = effects
        .projectiles
        .iter_mut()
        .filter(|p| p.weapon_id == inst.weapon_id && !p.remove);
    for p in projectiles {
        let pid = p.id;
        match &mut p.kind {
            ProjectileKind::Straight => {
                let hit = live().find(|(_, enemy)| overlaps(enemy, p.pos, p.radius));
                if let Some((id, _)) = hit {
                    emit(id, p.damage);
                    p.remove = true;
                }
            }
            ProjectileKind::Homing { .. } | ProjectileKind::Bounce { .. } => {
                for (id, enemy) in live() {
                    if overlaps(enemy, p.pos, p.radius)
                        && inst.hits.try_hit(HitKey::Projectile(id, pid), now, REHIT_INTERVAL)
                    {
                        emit(id, p.damage);
                    }
                }
            }
            ProjectileKind::Explosive {
                pierce_left,
                detonated: false,
                ..
            } => {
                let mut contact = false;
                for (id, enemy) in live() {
                    // Enemies already passed through are ignored
                    if !overlaps(enemy, p.pos, p.radius)
                        || !inst.hits.try_hit(HitKey::Projectile(id, pid), now, f32::INFINITY)
                    {
                        continue;
                    }
                    if *pierce_left == 0 {
                        contact = true;
                        break;
                    }
                    *pierce_left -= 1;
                    emit(id, p.damage);
                }
                if contact {
                    p.detonate();
                }
            }
            ProjectileKind::Explosive { .. } => {}
        }

        let Some(blast) = p.blast_radius() else {
            continue;
        };
        // Fireball blasts land once per enemy; rune splashes tick like contact
        let (damage, interval) = match p.kind {
            ProjectileKind::Bounce { .. } => (p.damage * RUNE_EXPLOSION_DAMAGE, REHIT_INTERVAL),
            _ => (p.damage, f32::INFINITY),
        };
        for (id, enemy) in live() {
            if overlaps(enemy, p.pos, blast)
                && inst.hits.try_hit(HitKey::Blast(id, pid), now, interval)
            {
                emit(id, damage);
            }
        }
    }
}

/// Circle-circle overlap between an enemy and a shape at `center`
#[inline]
fn overlaps(enemy: &Enemy, center: glam::Vec2, radius: f32) -> bool {
    enemy.pos.distance(center) < radius + enemy.radius
}
