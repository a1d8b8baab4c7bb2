//! Per-archetype behavior: timers, targeting and spawning
//!
//! Each resolver touches only its own instance plus the shared entity pools.
//! Evolved weapons run their base archetype's resolver with different numbers.

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::entities::{Effects, GroundEffect, Projectile, ProjectileKind, StrikeEffect};
use super::{Swing, SwingSide, WeaponContext, WeaponInstance};
use crate::catalog::Archetype;
use crate::consts::*;
use crate::heading_of;
use crate::sim::arena::EnemyId;

/// Advance one instance by `ctx.dt`
pub fn advance(
    inst: &mut WeaponInstance,
    effects: &mut Effects,
    ctx: &WeaponContext,
    rng: &mut impl Rng,
) {
    inst.cooldown_timer += ctx.dt;

    match inst.archetype {
        Archetype::MeleeArc => {
            if let Some(swing) = &mut inst.swing {
                swing.elapsed += ctx.dt;
                if swing.elapsed >= SWING_DURATION {
                    inst.swing = None;
                }
            }
            if ready(inst) {
                start_swing(inst);
            }
        }
        Archetype::StraightProjectile => {
            if ready(inst) {
                let heading = aim_or_wander(ctx, rng);
                fire_spread(inst, effects, ctx, heading, PROJECTILE_SPREAD, |inst| {
                    (
                        KNIFE_SPEED * inst.stats.projectile_speed,
                        KNIFE_RADIUS,
                        KNIFE_LIFETIME,
                        ProjectileKind::Straight,
                    )
                });
            }
        }
        Archetype::HomingProjectile => {
            if ready(inst) {
                let heading = aim_or_wander(ctx, rng);
                let target = ctx.enemies.nearest(ctx.player_pos).map(|(id, _)| id);
                fire_spread(inst, effects, ctx, heading, PROJECTILE_SPREAD, |inst| {
                    (
                        MISSILE_SPEED * inst.stats.projectile_speed,
                        MISSILE_RADIUS,
                        MISSILE_LIFETIME,
                        ProjectileKind::Homing {
                            target,
                            turn_speed: inst.stats.turn_speed,
                        },
                    )
                });
            }
        }
        Archetype::AutoAimProjectile => {
            // Holds fire (and keeps the timer charged) until something is in sight
            let target = ctx.enemies.nearest(ctx.player_pos).map(|(_, e)| e.pos);
            if let Some(target) = target
                && ready(inst)
            {
                let heading = heading_of(target - ctx.player_pos);
                fire_spread(inst, effects, ctx, heading, PROJECTILE_SPREAD, |inst| {
                    (
                        WAND_SPEED * inst.stats.projectile_speed,
                        WAND_RADIUS,
                        WAND_LIFETIME,
                        ProjectileKind::Straight,
                    )
                });
            }
        }
        Archetype::ExplosiveProjectile => {
            if ready(inst) {
                let heading = ctx
                    .enemies
                    .nearest(ctx.player_pos)
                    .map_or(0.0, |(_, e)| heading_of(e.pos - ctx.player_pos));
                fire_spread(inst, effects, ctx, heading, FIREBALL_SPREAD, |inst| {
                    (
                        FIREBALL_SPEED * inst.stats.projectile_speed,
                        FIREBALL_RADIUS,
                        FIREBALL_LIFETIME,
                        ProjectileKind::Explosive {
                            traveled: 0.0,
                            max_distance: FIREBALL_MAX_DISTANCE,
                            pierce_left: inst.stats.pierce,
                            blast_radius: inst.stats.explosion_radius
                                * EXPLOSION_RADIUS
                                * inst.stats.area,
                            detonated: false,
                        },
                    )
                });
            }
        }
        Archetype::BounceProjectile => {
            if ready(inst) {
                let heading = rng.random_range(0.0..std::f32::consts::TAU);
                let speed = RUNE_SPEED * inst.stats.projectile_speed;
                let id = effects.next_projectile_id();
                effects.projectiles.push(Projectile {
                    id,
                    weapon_id: inst.weapon_id.clone(),
                    pos: ctx.player_pos,
                    vel: Vec2::from_angle(heading) * speed,
                    radius: RUNE_RADIUS,
                    damage: inst.stats.damage,
                    lifetime: inst.stats.duration.unwrap_or(RUNE_LIFETIME),
                    kind: ProjectileKind::Bounce {
                        bounces: 0,
                        max_bounces: inst.stats.bounce_count,
                        explode_on_bounce: inst.stats.explosion_on_bounce,
                        blast_timer: 0.0,
                    },
                    remove: false,
                });
            }
        }
        // Continuous damage, nothing to fire
        Archetype::Aura => {}
        Archetype::GroundZone => {
            if ready(inst) {
                drop_zone(inst, effects, ctx, rng);
            }
        }
        Archetype::Orbital => {
            inst.orbit_angle = crate::normalize_angle(inst.orbit_angle + ORBIT_ANGULAR_SPEED * ctx.dt);
        }
        Archetype::ChainStrike => {
            if ready(inst) {
                call_strikes(inst, effects, ctx, rng);
            }
        }
    }
}

/// Consume a full cooldown if one is charged
fn ready(inst: &mut WeaponInstance) -> bool {
    if inst.cooldown_timer >= inst.stats.cooldown {
        inst.cooldown_timer = 0.0;
        true
    } else {
        false
    }
}

fn start_swing(inst: &mut WeaponInstance) {
    let side = if inst.tier >= SWING_BOTH_SIDES_TIER {
        SwingSide::Both
    } else {
        let side = inst.last_side.flipped();
        inst.last_side = side;
        side
    };
    inst.swing = Some(Swing { side, elapsed: 0.0 });
}

/// Nearest enemy, else movement heading, else a random direction
fn aim_or_wander(ctx: &WeaponContext, rng: &mut impl Rng) -> f32 {
    if let Some((_, enemy)) = ctx.enemies.nearest(ctx.player_pos) {
        heading_of(enemy.pos - ctx.player_pos)
    } else if ctx.player_vel != Vec2::ZERO {
        heading_of(ctx.player_vel)
    } else {
        rng.random_range(0.0..std::f32::consts::TAU)
    }
}

/// Spawn `projectile_count` projectiles fanned around `heading`.
/// `make` yields speed, radius, lifetime and kind.
fn fire_spread(
    inst: &WeaponInstance,
    effects: &mut Effects,
    ctx: &WeaponContext,
    heading: f32,
    spread: f32,
    make: impl Fn(&WeaponInstance) -> (f32, f32, f32, ProjectileKind),
) {
    let n = inst.stats.projectile_count;
    for i in 0..n {
        let offset = (i as f32 - (n as f32 - 1.0) / 2.0) * spread;
        let (speed, radius, lifetime, kind) = make(inst);
        let id = effects.next_projectile_id();
        effects.projectiles.push(Projectile {
            id,
            weapon_id: inst.weapon_id.clone(),
            pos: ctx.player_pos,
            vel: Vec2::from_angle(heading + offset) * speed,
            radius,
            damage: inst.stats.damage,
            lifetime,
            kind,
            remove: false,
        });
    }
}

fn drop_zone(
    inst: &WeaponInstance,
    effects: &mut Effects,
    ctx: &WeaponContext,
    rng: &mut impl Rng,
) {
    let tracking = inst.stats.tracking;
    let pos = if tracking {
        ctx.enemies
            .nearest(ctx.player_pos)
            .map_or(ctx.player_pos, |(_, e)| e.pos)
    } else {
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let distance = rng.random_range(ZONE_MIN_OFFSET..ZONE_MAX_OFFSET);
        let raw = ctx.player_pos + Vec2::from_angle(angle) * distance;
        let margin = Vec2::splat(ZONE_EDGE_MARGIN);
        raw.clamp(margin, (ctx.playfield - margin).max(margin))
    };
    let default_lifetime = if inst.evolved {
        ZONE_LIFETIME_EVOLVED
    } else {
        ZONE_LIFETIME
    };
    effects.zones.push(GroundEffect {
        weapon_id: inst.weapon_id.clone(),
        pos,
        radius: inst.stats.area * ZONE_RADIUS,
        dps: inst.stats.dps,
        lifetime: inst.stats.duration.unwrap_or(default_lifetime),
        tracking,
    });
}

fn call_strikes(
    inst: &WeaponInstance,
    effects: &mut Effects,
    ctx: &WeaponContext,
    rng: &mut impl Rng,
) {
    let chains = if inst.evolved {
        inst.stats.chain_count.unwrap_or(DEFAULT_CHAIN_COUNT)
    } else {
        0
    };
    let live: Vec<(EnemyId, Vec2)> = ctx
        .enemies
        .iter()
        .filter(|(_, e)| e.is_alive())
        .map(|(id, e)| (id, e.pos))
        .collect();

    for _ in 0..inst.stats.bolt_count {
        let target = if inst.evolved {
            live.choose(rng).copied()
        } else {
            None
        };
        let pos = match target {
            Some((_, pos)) => pos,
            None => Vec2::new(
                rng.random_range(0.0..ctx.playfield.x.max(1.0)),
                rng.random_range(0.0..ctx.playfield.y.max(1.0)),
            ),
        };
        let radius = if inst.evolved {
            STRIKE_RADIUS_EVOLVED
        } else {
            STRIKE_RADIUS
        };
        effects.strikes.push(StrikeEffect {
            weapon_id: inst.weapon_id.clone(),
            pos,
            radius: inst.stats.area * radius,
            damage: inst.stats.damage,
            lifetime: STRIKE_LIFETIME,
            chain_index: 0,
        });

        if chains == 0 {
            continue;
        }
        let mut visited: Vec<EnemyId> = target.map(|(id, _)| id).into_iter().collect();
        let mut last = pos;
        for hop in 0..chains {
            let next = ctx.enemies.nearest_where(last, |id, e| {
                !visited.contains(&id) && e.pos.distance(last) > CHAIN_MIN_DISTANCE
            });
            let Some((id, enemy)) = next else {
                break;
            };
            visited.push(id);
            last = enemy.pos;
            let falloff = (1.0 - hop as f32 * CHAIN_FALLOFF).max(0.0);
            effects.strikes.push(StrikeEffect {
                weapon_id: inst.weapon_id.clone(),
                pos: last,
                radius: inst.stats.area * STRIKE_RADIUS * falloff,
                damage: inst.stats.damage * falloff,
                lifetime: CHAIN_LIFETIME,
                chain_index: hop + 1,
            });
        }
    }
}
