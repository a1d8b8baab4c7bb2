//! Read-only frame data for a presentation layer
//!
//! Captured after a tick; owns copies so the caller can serialize it freely.

use glam::Vec2;
use serde::Serialize;

use super::arena::EnemyId;
use super::progression::{EvolutionTransition, UpgradeChoice};
use super::sector::SweepSector;
use super::state::{Chest, ExperienceOrb, GameState, RunPhase};
use super::weapons::{GroundEffect, ProjectileId, StrikeEffect, WeaponInstance};
use crate::catalog::Archetype;
use crate::consts::ORBIT_BODY_RADIUS;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub pos: Vec2,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyView {
    pub id: EnemyId,
    pub pos: Vec2,
    pub radius: f32,
    /// Remaining health in [0, 1]
    pub health: f32,
    pub elite: bool,
}

/// Weapon geometry that is drawn around the player rather than as entities
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WeaponVisual {
    Sweep { sectors: Vec<SweepSector> },
    Aura { radius: f32 },
    Orbit { bodies: Vec<Vec2>, body_radius: f32 },
    None,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponView {
    pub weapon_id: String,
    pub name: String,
    pub archetype: Archetype,
    pub tier: u32,
    pub evolved: bool,
    pub visual: WeaponVisual,
}

impl WeaponView {
    fn capture(inst: &WeaponInstance, player_pos: Vec2) -> Self {
        let visual = match inst.archetype {
            Archetype::MeleeArc if inst.swing.is_some() => WeaponVisual::Sweep {
                sectors: inst.sweep_sectors(),
            },
            Archetype::Aura => WeaponVisual::Aura {
                radius: inst.aura_radius(),
            },
            Archetype::Orbital => WeaponVisual::Orbit {
                bodies: inst
                    .orbit_offsets()
                    .into_iter()
                    .map(|o| player_pos + o)
                    .collect(),
                body_radius: ORBIT_BODY_RADIUS,
            },
            _ => WeaponVisual::None,
        };
        Self {
            weapon_id: inst.weapon_id.clone(),
            name: inst.name.clone(),
            archetype: inst.archetype,
            tier: inst.tier,
            evolved: inst.evolved,
            visual,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub weapon_id: String,
    pub pos: Vec2,
    pub radius: f32,
    pub exploding: bool,
    /// Blast radius while exploding
    pub blast_radius: Option<f32>,
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSnapshot {
    pub phase: RunPhase,
    pub frame: u64,
    pub time: f32,
    pub level: u32,
    pub exp: f32,
    pub exp_to_next: f32,
    pub gold: u32,
    pub reroll_tokens: u32,
    pub kills: u32,
    pub playfield: Vec2,
    pub player: PlayerView,
    pub enemies: Vec<EnemyView>,
    pub orbs: Vec<ExperienceOrb>,
    pub chests: Vec<Chest>,
    pub weapons: Vec<WeaponView>,
    pub projectiles: Vec<ProjectileView>,
    pub zones: Vec<GroundEffect>,
    pub strikes: Vec<StrikeEffect>,
    pub pending_choices: Vec<UpgradeChoice>,
    pub pending_evolution: Option<EvolutionTransition>,
}

impl RenderSnapshot {
    pub fn capture(state: &GameState) -> Self {
        let player = &state.player;
        Self {
            phase: state.phase,
            frame: state.run.frame,
            time: state.run.time,
            level: state.run.level,
            exp: state.run.exp,
            exp_to_next: state.run.exp_to_next,
            gold: state.run.gold,
            reroll_tokens: state.run.reroll_tokens,
            kills: state.run.kills,
            playfield: state.playfield(),
            player: PlayerView {
                pos: player.pos,
                radius: player.radius,
                hp: player.hp,
                max_hp: player.stats.max_health,
            },
            enemies: state
                .enemies
                .iter()
                .map(|(id, e)| EnemyView {
                    id,
                    pos: e.pos,
                    radius: e.radius,
                    health: (e.hp / e.max_hp.max(f32::EPSILON)).clamp(0.0, 1.0),
                    elite: e.elite,
                })
                .collect(),
            orbs: state.orbs.clone(),
            chests: state.chests.clone(),
            weapons: state
                .weapons
                .instances()
                .iter()
                .map(|inst| WeaponView::capture(inst, player.pos))
                .collect(),
            projectiles: state
                .weapons
                .projectiles()
                .iter()
                .map(|p| ProjectileView {
                    id: p.id,
                    weapon_id: p.weapon_id.clone(),
                    pos: p.pos,
                    radius: p.radius,
                    exploding: p.is_exploding(),
                    blast_radius: p.blast_radius(),
                })
                .collect(),
            zones: state.weapons.zones().to_vec(),
            strikes: state.weapons.strikes().to_vec(),
            pending_choices: state.pending_choices.clone(),
            pending_evolution: state.pending_evolution.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
