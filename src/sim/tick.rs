//! Fixed timestep simulation tick
//!
//! One call advances a run by `dt` in a fixed order: player, enemies, weapons,
//! damage, drops, pickups. Paused phases only count frames.

use glam::Vec2;
use log::debug;
use rand::Rng;

use super::arena::{Enemy, EnemyId};
use super::state::{Chest, ExperienceOrb, GameState};
use super::weapons::{DamageEvent, WeaponContext};
use crate::catalog::Catalog;

/// Input commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Desired movement direction; normalized internally, zero to stand still
    pub move_dir: Vec2,
}

/// Advance the run by one fixed timestep
pub fn tick(state: &mut GameState, catalog: &Catalog, input: &TickInput, dt: f32) {
    state.run.frame += 1;
    if !state.phase.is_running() {
        return;
    }
    state.run.time += dt;

    move_player(state, input, dt);

    spawn_enemies(state, dt);
    if chase_player(state, dt) {
        state.defeat();
        return;
    }

    state.sync_weapons(catalog);
    let events = {
        let ctx = WeaponContext {
            player_pos: state.player.pos,
            player_vel: state.player.vel,
            enemies: &state.enemies,
            playfield: state.playfield(),
            dt,
        };
        state.weapons.advance(&ctx, &mut state.rng);
        state.weapons.resolve_all(&ctx)
    };
    apply_damage(state, &events);
    collect_defeated(state);

    collect_pickups(state, catalog, dt);
}

fn move_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let player = &mut state.player;
    player.vel = input.move_dir.normalize_or_zero() * player.speed;
    player.pos += player.vel * dt;

    let margin = Vec2::splat(player.radius);
    let playfield = Vec2::new(state.tuning.playfield_width, state.tuning.playfield_height);
    player.pos = player.pos.clamp(margin, (playfield - margin).max(margin));

    let regen = player.stats.health_regen;
    if regen > 0.0 {
        player.heal(regen * dt);
    }
}

fn spawn_enemies(state: &mut GameState, dt: f32) {
    state.run.spawn_timer += dt;
    let interval = state.tuning.spawn_interval_at(state.run.time);
    while state.run.spawn_timer >= interval {
        state.run.spawn_timer -= interval;
        spawn_enemy(state, false);
    }

    state.run.elite_timer += dt;
    if state.run.elite_timer >= state.tuning.elite_interval {
        state.run.elite_timer -= state.tuning.elite_interval;
        spawn_enemy(state, true);
    }
}

/// Spawn one enemy just outside a random edge of the playfield
pub fn spawn_enemy(state: &mut GameState, elite: bool) -> EnemyId {
    let tuning = &state.tuning;
    let rng = &mut state.rng;
    let (w, h) = (tuning.playfield_width, tuning.playfield_height);
    let margin = if elite {
        tuning.elite_spawn_margin
    } else {
        tuning.spawn_margin
    };
    let pos = match rng.random_range(0..4) {
        0 => Vec2::new(rng.random::<f32>() * w, -margin),
        1 => Vec2::new(w + margin, rng.random::<f32>() * h),
        2 => Vec2::new(rng.random::<f32>() * w, h + margin),
        _ => Vec2::new(-margin, rng.random::<f32>() * h),
    };

    let levels = state.run.level.saturating_sub(1) as f32;
    let (base, per_level, radius, speed) = if elite {
        (
            tuning.elite_base_health,
            tuning.elite_health_per_level,
            (tuning.elite_min_radius, tuning.elite_max_radius),
            (tuning.elite_min_speed, tuning.elite_max_speed),
        )
    } else {
        (
            tuning.enemy_base_health,
            tuning.enemy_health_per_level,
            (tuning.enemy_min_radius, tuning.enemy_max_radius),
            (tuning.enemy_min_speed, tuning.enemy_max_speed),
        )
    };
    let hp = (base * (1.0 + levels * per_level)).floor();
    let radius = lerp(radius, rng.random::<f32>());
    let speed = lerp(speed, rng.random::<f32>());

    let id = state.enemies.insert(Enemy::new(pos, radius, speed, hp, elite));
    if elite {
        debug!("Elite spawned at {pos} with {hp} hp");
    }
    id
}

fn lerp((min, max): (f32, f32), t: f32) -> f32 {
    min + (max - min) * t
}

/// Move enemies toward the player and apply contact damage.
/// Returns `true` when the player goes down.
fn chase_player(state: &mut GameState, dt: f32) -> bool {
    let player_pos = state.player.pos;
    let player_radius = state.player.radius;
    let tuning = &state.tuning;
    let contact = (tuning.contact_dps
        - state.player.stats.damage_reduction * tuning.damage_reduction_scale)
        .max(tuning.min_contact_dps);

    let mut touching = 0;
    for (_, enemy) in state.enemies.iter_mut() {
        let to_player = player_pos - enemy.pos;
        let distance = to_player.length();
        if distance > 0.0 {
            enemy.pos += to_player / distance * enemy.speed * dt;
        }
        if distance < player_radius + enemy.radius {
            touching += 1;
        }
    }
    touching > 0 && state.player.damage(contact * touching as f32 * dt)
}

fn apply_damage(state: &mut GameState, events: &[DamageEvent]) {
    for event in events {
        let Some(enemy) = state.enemies.get_mut(event.enemy) else {
            continue;
        };
        if !enemy.is_alive() {
            continue;
        }
        enemy.hp -= event.damage;
        if event.lifesteal > 0.0 {
            state.player.heal(event.damage * event.lifesteal);
        }
    }
}

/// Remove defeated enemies, dropping orbs and rolling chests
fn collect_defeated(state: &mut GameState) {
    let defeated: Vec<EnemyId> = state
        .enemies
        .iter()
        .filter(|(_, e)| !e.is_alive())
        .map(|(id, _)| id)
        .collect();

    for id in defeated {
        let Some(enemy) = state.enemies.remove(id) else {
            continue;
        };
        state.run.kills += 1;

        let tuning = &state.tuning;
        let base = if enemy.elite {
            tuning.elite_orb_value
        } else {
            tuning.orb_base_value
        };
        let levels = state.run.level.saturating_sub(1) as f32;
        let value = (base * (1.0 + levels * tuning.orb_value_per_level)).floor();
        let bonus = (state.rng.random::<f32>() * value * tuning.orb_value_jitter).floor();
        state.orbs.push(ExperienceOrb {
            pos: enemy.pos,
            value: value + bonus,
        });

        let chance = if enemy.elite {
            tuning.elite_chest_chance
        } else {
            tuning.chest_chance
        } * (1.0 + state.player.stats.luck / 100.0);
        if state.rng.random::<f32>() < chance {
            debug!("Chest dropped at {}", enemy.pos);
            state.chests.push(Chest {
                pos: enemy.pos,
                elite: enemy.elite,
            });
        }
    }
}

fn collect_pickups(state: &mut GameState, catalog: &Catalog, dt: f32) {
    let player_pos = state.player.pos;
    let player_radius = state.player.radius;
    let magnet = state.tuning.magnet_range * state.player.stats.pickup_radius;
    let orb_radius = state.tuning.orb_radius;
    let pull = state.tuning.orb_speed * dt;

    let mut gained = 0.0;
    state.orbs.retain_mut(|orb| {
        let to_player = player_pos - orb.pos;
        let distance = to_player.length();
        if distance < magnet {
            orb.pos += to_player.clamp_length_max(pull);
        }
        if orb.pos.distance(player_pos) < player_radius + orb_radius {
            gained += orb.value;
            false
        } else {
            true
        }
    });
    if gained > 0.0 {
        state.gain_experience(catalog, gained);
    }

    // A level-up screen holds chests on the ground until it closes
    if !state.phase.is_running() {
        return;
    }
    let reach = player_radius + state.tuning.chest_radius;
    if let Some(index) = state
        .chests
        .iter()
        .position(|c| c.pos.distance(player_pos) < reach)
    {
        state.chests.remove(index);
        state.open_chest(catalog);
    }
}
