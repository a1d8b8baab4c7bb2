//! Transient weapon entities: projectiles, ground zones, strikes
//!
//! Owned collectively by the weapon manager, tagged with the weapon id that
//! spawned them, and expired purely by their own motion/lifetime rules.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::sim::arena::{EnemyId, Enemies};
use crate::{angle_delta, heading_of};

/// Identity of one projectile, unique within a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ProjectileId(pub u32);

/// Per-archetype projectile state
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ProjectileKind {
    /// Fixed heading, consumed on hit
    Straight,
    /// Steers toward a live target, pierces
    Homing {
        target: Option<EnemyId>,
        turn_speed: f32,
    },
    /// Flies until contact or max distance, then becomes a stationary blast
    Explosive {
        traveled: f32,
        max_distance: f32,
        /// Enemies it may still pass through before detonating
        pierce_left: u32,
        blast_radius: f32,
        detonated: bool,
    },
    /// Reflects off the playfield bounds, pierces
    Bounce {
        bounces: u32,
        max_bounces: u32,
        explode_on_bounce: bool,
        /// Remaining time of the post-bounce splash
        blast_timer: f32,
    },
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projectile {
    pub id: ProjectileId,
    pub weapon_id: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub lifetime: f32,
    pub kind: ProjectileKind,
    #[serde(skip)]
    pub(crate) remove: bool,
}

impl Projectile {
    /// Radius of the blast currently active around this projectile
    pub fn blast_radius(&self) -> Option<f32> {
        match self.kind {
            ProjectileKind::Explosive {
                detonated: true,
                blast_radius,
                ..
            } => Some(blast_radius),
            ProjectileKind::Bounce { blast_timer, .. } if blast_timer > 0.0 => {
                Some(EXPLOSION_RADIUS)
            }
            _ => None,
        }
    }

    pub fn is_exploding(&self) -> bool {
        self.blast_radius().is_some()
    }

    /// Turn an explosive projectile into its blast
    pub(crate) fn detonate(&mut self) {
        if let ProjectileKind::Explosive { detonated, .. } = &mut self.kind
            && !*detonated
        {
            *detonated = true;
            self.vel = Vec2::ZERO;
            self.lifetime = EXPLOSION_DURATION;
        }
    }

    fn step(&mut self, dt: f32, enemies: &Enemies, playfield: Vec2) {
        match &mut self.kind {
            ProjectileKind::Straight => {
                self.pos += self.vel * dt;
                self.remove |= outside(self.pos, playfield);
            }
            ProjectileKind::Homing { target, turn_speed } => {
                // Keep the target while it lives, otherwise take the nearest
                if !target.is_some_and(|id| enemies.get(id).is_some_and(|e| e.is_alive())) {
                    *target = enemies.nearest(self.pos).map(|(id, _)| id);
                }
                if let Some(enemy) = target.and_then(|id| enemies.get(id)) {
                    let to_target = enemy.pos - self.pos;
                    if to_target.length_squared() > 0.0 {
                        let heading = heading_of(self.vel);
                        let max_turn = *turn_speed * dt;
                        let turn = angle_delta(heading, heading_of(to_target))
                            .clamp(-max_turn, max_turn);
                        self.vel = Vec2::from_angle(heading + turn) * self.vel.length();
                    }
                }
                self.pos += self.vel * dt;
                self.remove |= outside(self.pos, playfield);
            }
            ProjectileKind::Explosive {
                traveled,
                max_distance,
                detonated,
                ..
            } => {
                if !*detonated {
                    let step = self.vel * dt;
                    self.pos += step;
                    *traveled += step.length();
                    if *traveled >= *max_distance {
                        *detonated = true;
                        self.vel = Vec2::ZERO;
                        self.lifetime = EXPLOSION_DURATION;
                    }
                }
            }
            ProjectileKind::Bounce {
                bounces,
                explode_on_bounce,
                blast_timer,
                ..
            } => {
                self.pos += self.vel * dt;
                let mut bounced = false;
                if self.pos.x <= 0.0 || self.pos.x >= playfield.x {
                    self.vel.x = -self.vel.x;
                    self.pos.x = self.pos.x.clamp(0.0, playfield.x);
                    *bounces += 1;
                    bounced = true;
                }
                if self.pos.y <= 0.0 || self.pos.y >= playfield.y {
                    self.vel.y = -self.vel.y;
                    self.pos.y = self.pos.y.clamp(0.0, playfield.y);
                    *bounces += 1;
                    bounced = true;
                }
                *blast_timer = (*blast_timer - dt).max(0.0);
                if bounced && *explode_on_bounce {
                    *blast_timer = EXPLOSION_DURATION;
                }
            }
        }

        self.lifetime -= dt;
        if let ProjectileKind::Bounce {
            bounces,
            max_bounces,
            ..
        } = self.kind
        {
            self.remove |= bounces >= max_bounces;
        }
        self.remove |= self.lifetime <= 0.0;
    }
}

fn outside(pos: Vec2, playfield: Vec2) -> bool {
    pos.x < 0.0 || pos.y < 0.0 || pos.x > playfield.x || pos.y > playfield.y
}

/// A damage pool on the ground
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundEffect {
    pub weapon_id: String,
    pub pos: Vec2,
    pub radius: f32,
    pub dps: f32,
    pub lifetime: f32,
    /// Drifts toward the nearest enemy
    pub tracking: bool,
}

/// An instantaneous strike, live for a short flash
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeEffect {
    pub weapon_id: String,
    pub pos: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub lifetime: f32,
    /// 0 for the initial strike, then 1.. along a chain
    pub chain_index: u32,
}

/// Every live transient entity
#[derive(Debug, Clone, Default)]
pub struct Effects {
    pub projectiles: Vec<Projectile>,
    pub zones: Vec<GroundEffect>,
    pub strikes: Vec<StrikeEffect>,
    next_projectile: u32,
}

impl Effects {
    pub(crate) fn next_projectile_id(&mut self) -> ProjectileId {
        let id = ProjectileId(self.next_projectile);
        self.next_projectile = self.next_projectile.wrapping_add(1);
        id
    }

    /// Move, age and expire everything
    pub fn step(&mut self, dt: f32, enemies: &Enemies, playfield: Vec2) {
        for projectile in &mut self.projectiles {
            projectile.step(dt, enemies, playfield);
        }
        self.sweep();

        for zone in &mut self.zones {
            if zone.tracking
                && let Some((_, enemy)) = enemies.nearest(zone.pos)
            {
                let to_enemy = enemy.pos - zone.pos;
                let reach = ZONE_PURSUIT_SPEED * dt;
                zone.pos += to_enemy.clamp_length_max(reach);
            }
            zone.lifetime -= dt;
        }
        self.zones.retain(|z| z.lifetime > 0.0);

        for strike in &mut self.strikes {
            strike.lifetime -= dt;
        }
        self.strikes.retain(|s| s.lifetime > 0.0);
    }

    /// Drop projectiles flagged for removal
    pub(crate) fn sweep(&mut self) {
        self.projectiles.retain(|p| !p.remove);
    }

    /// Drop entities whose weapon is no longer owned
    pub(crate) fn retain_weapons(&mut self, owned: impl Fn(&str) -> bool) {
        self.projectiles.retain(|p| owned(&p.weapon_id));
        self.zones.retain(|z| owned(&z.weapon_id));
        self.strikes.retain(|s| owned(&s.weapon_id));
    }

    pub fn clear(&mut self) {
        self.projectiles.clear();
        self.zones.clear();
        self.strikes.clear();
        self.next_projectile = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::arena::Enemy;

    const FIELD: Vec2 = Vec2::new(800.0, 600.0);

    fn projectile(kind: ProjectileKind, pos: Vec2, vel: Vec2) -> Projectile {
        Projectile {
            id: ProjectileId(0),
            weapon_id: "w_test".into(),
            pos,
            vel,
            radius: 5.0,
            damage: 10.0,
            lifetime: 3.0,
            kind,
            remove: false,
        }
    }

    #[test]
    fn test_straight_leaves_playfield() {
        let mut p = projectile(ProjectileKind::Straight, Vec2::new(795.0, 300.0), Vec2::X * 400.0);
        p.step(SIM_DT, &Enemies::new(), FIELD);
        assert!(p.remove);
    }

    #[test]
    fn test_homing_turn_is_clamped() {
        let mut enemies = Enemies::new();
        enemies.insert(Enemy::new(Vec2::new(100.0, 300.0), 10.0, 0.0, 10.0, false));
        // Heading right, target straight behind
        let mut p = projectile(
            ProjectileKind::Homing {
                target: None,
                turn_speed: 4.0,
            },
            Vec2::new(400.0, 300.0),
            Vec2::X * 350.0,
        );
        p.step(SIM_DT, &enemies, FIELD);
        let turned = heading_of(p.vel).abs();
        assert!(turned <= 4.0 * SIM_DT + 1e-4);
        assert!((p.vel.length() - 350.0).abs() < 1e-2);
        assert!(matches!(p.kind, ProjectileKind::Homing { target: Some(_), .. }));
    }

    #[test]
    fn test_homing_reacquires_when_target_dies() {
        let mut enemies = Enemies::new();
        let first = enemies.insert(Enemy::new(Vec2::new(500.0, 300.0), 10.0, 0.0, 10.0, false));
        let second = enemies.insert(Enemy::new(Vec2::new(400.0, 500.0), 10.0, 0.0, 10.0, false));
        let mut p = projectile(
            ProjectileKind::Homing {
                target: Some(first),
                turn_speed: 4.0,
            },
            Vec2::new(400.0, 300.0),
            Vec2::X * 350.0,
        );
        enemies.remove(first);
        p.step(SIM_DT, &enemies, FIELD);
        assert!(matches!(p.kind, ProjectileKind::Homing { target: Some(t), .. } if t == second));
    }

    #[test]
    fn test_explosive_detonates_at_max_distance() {
        let mut p = projectile(
            ProjectileKind::Explosive {
                traveled: 395.0,
                max_distance: 400.0,
                pierce_left: 0,
                blast_radius: 40.0,
                detonated: false,
            },
            Vec2::new(100.0, 100.0),
            Vec2::X * 600.0,
        );
        p.step(SIM_DT, &Enemies::new(), FIELD);
        assert_eq!(p.blast_radius(), Some(40.0));
        assert_eq!(p.vel, Vec2::ZERO);
        assert!(!p.remove);

        // Blast runs out
        for _ in 0..20 {
            p.step(SIM_DT, &Enemies::new(), FIELD);
        }
        assert!(p.remove);
    }

    #[test]
    fn test_bounce_reflects_and_counts() {
        let mut p = projectile(
            ProjectileKind::Bounce {
                bounces: 0,
                max_bounces: 2,
                explode_on_bounce: true,
                blast_timer: 0.0,
            },
            Vec2::new(799.0, 300.0),
            Vec2::X * 200.0,
        );
        p.step(SIM_DT, &Enemies::new(), FIELD);
        assert!(p.vel.x < 0.0);
        assert!(p.pos.x <= FIELD.x);
        assert!(p.is_exploding());
        assert!(!p.remove);
        assert!(matches!(p.kind, ProjectileKind::Bounce { bounces: 1, .. }));
    }

    #[test]
    fn test_tracking_zone_pursues_at_fixed_speed() {
        let mut enemies = Enemies::new();
        enemies.insert(Enemy::new(Vec2::new(300.0, 100.0), 10.0, 0.0, 10.0, false));
        let mut effects = Effects::default();
        effects.zones.push(GroundEffect {
            weapon_id: "w_test".into(),
            pos: Vec2::new(100.0, 100.0),
            radius: 60.0,
            dps: 10.0,
            lifetime: 3.0,
            tracking: true,
        });
        effects.step(1.0, &enemies, FIELD);
        assert!((effects.zones[0].pos.x - 150.0).abs() < 1e-3);
        effects.step(2.5, &enemies, FIELD);
        assert!(effects.zones.is_empty());
    }
}
