//! Survivor Core - combat simulation and progression for a top-down survival game
//!
//! Core modules:
//! - `catalog`: Read-only weapon / passive / evolution definitions
//! - `sim`: Simulation (weapons, projectiles, damage, progression, run state)
//! - `tuning`: Data-driven game balance

pub mod catalog;
pub mod sim;
pub mod tuning;

pub use catalog::{Catalog, CatalogError};
pub use tuning::Tuning;

use glam::Vec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Cooldown used when a tier defines none (aura, orbital)
    pub const DEFAULT_COOLDOWN: f32 = 0.1;
    /// Minimum delay between two hits of one source on one enemy
    pub const REHIT_INTERVAL: f32 = 0.1;
    /// Hit-log entries older than this are dropped
    pub const HIT_LOG_RETENTION: f32 = 5.0;

    /// Melee arc
    pub const SWING_DURATION: f32 = 0.3;
    pub const SWING_RANGE: f32 = 100.0;
    pub const SWING_RANGE_EVOLVED: f32 = 120.0;
    /// Half-width of the swing window at the start of the swing (PI / 2.5)
    pub const SWING_HALF_ANGLE: f32 = std::f32::consts::PI / 2.5;
    pub const SWING_HALF_ANGLE_EVOLVED: f32 = std::f32::consts::PI / 2.0;
    /// Tier from which the swing hits both sides at once
    pub const SWING_BOTH_SIDES_TIER: u32 = 3;

    /// Projectiles (speeds in px/s, before the projectile-speed stat)
    pub const PROJECTILE_SPREAD: f32 = 0.1;
    pub const KNIFE_SPEED: f32 = 400.0;
    pub const KNIFE_RADIUS: f32 = 5.0;
    pub const KNIFE_LIFETIME: f32 = 2.0;
    pub const WAND_SPEED: f32 = 300.0;
    pub const WAND_RADIUS: f32 = 4.0;
    pub const WAND_LIFETIME: f32 = 2.0;
    pub const MISSILE_SPEED: f32 = 350.0;
    pub const MISSILE_RADIUS: f32 = 5.0;
    pub const MISSILE_LIFETIME: f32 = 3.0;
    /// Homing turn rate in rad/s when the tier defines none
    pub const MISSILE_TURN_SPEED: f32 = 4.0;
    pub const FIREBALL_SPEED: f32 = 250.0;
    pub const FIREBALL_RADIUS: f32 = 6.0;
    pub const FIREBALL_SPREAD: f32 = 0.15;
    pub const FIREBALL_MAX_DISTANCE: f32 = 400.0;
    pub const FIREBALL_LIFETIME: f32 = 3.0;
    pub const EXPLOSION_RADIUS: f32 = 40.0;
    pub const EXPLOSION_DURATION: f32 = 0.3;
    pub const RUNE_SPEED: f32 = 200.0;
    pub const RUNE_RADIUS: f32 = 5.0;
    pub const RUNE_LIFETIME: f32 = 3.0;
    pub const RUNE_BOUNCES: u32 = 2;
    /// Splash multiplier of the bounce explosion
    pub const RUNE_EXPLOSION_DAMAGE: f32 = 1.5;

    /// Aura / zones (radii in px per unit of tier radius or area)
    pub const AURA_RADIUS: f32 = 50.0;
    pub const ZONE_RADIUS: f32 = 60.0;
    pub const ZONE_MIN_OFFSET: f32 = 50.0;
    pub const ZONE_MAX_OFFSET: f32 = 150.0;
    pub const ZONE_EDGE_MARGIN: f32 = 50.0;
    pub const ZONE_LIFETIME: f32 = 2.0;
    pub const ZONE_LIFETIME_EVOLVED: f32 = 3.0;
    pub const ZONE_PURSUIT_SPEED: f32 = 50.0;

    /// Orbital bodies
    pub const ORBIT_RADIUS: f32 = 50.0;
    /// Angular speed in rad/s (0.1 rad per 60 Hz tick)
    pub const ORBIT_ANGULAR_SPEED: f32 = 6.0;
    pub const ORBIT_BODY_RADIUS: f32 = 8.0;

    /// Lightning strikes
    pub const STRIKE_RADIUS: f32 = 50.0;
    pub const STRIKE_RADIUS_EVOLVED: f32 = 60.0;
    pub const STRIKE_LIFETIME: f32 = 0.2;
    pub const CHAIN_LIFETIME: f32 = 0.15;
    /// Chain hops skip enemies closer than this to the previous strike
    pub const CHAIN_MIN_DISTANCE: f32 = 30.0;
    /// Damage and radius lost per chain hop
    pub const CHAIN_FALLOFF: f32 = 0.2;
    pub const DEFAULT_CHAIN_COUNT: u32 = 3;
}

/// Normalized angle to [-π, π). Non-finite input yields NaN.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if (-PI..PI).contains(&angle) {
        return angle;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    // rem_euclid can round up to TAU for tiny negative inputs
    if wrapped >= PI { wrapped - TAU } else { wrapped }
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Heading of a vector in radians
#[inline]
pub fn heading_of(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Shortest signed angular difference `to - from`, in [-π, π)
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    normalize_angle(to - from)
}
