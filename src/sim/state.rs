//! Run state and the phase machine
//!
//! Everything a run owns lives in `GameState`. Choice screens and chest
//! presentations pause gameplay through `RunPhase` rather than a loose flag.

use glam::Vec2;
use log::{debug, info, warn};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::arena::Enemies;
use super::inventory::Inventory;
use super::progression::{self, EvolutionTransition, UpgradeChoice};
use super::stats::{self, StatSnapshot};
use super::weapons::WeaponManager;
use crate::catalog::Catalog;
use crate::tuning::Tuning;

/// What opened the current choice screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChoiceSource {
    LevelUp,
    Chest,
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum RunPhase {
    /// Waiting for the starting weapon pick
    Starting,
    /// Active gameplay
    Running,
    /// Choice screen open
    AwaitingChoice { source: ChoiceSource },
    /// Evolution result on screen
    AwaitingChest,
    /// Run ended
    Defeated,
}

impl RunPhase {
    /// Whether `self -> to` is a legal transition
    pub fn can_transition(self, to: RunPhase) -> bool {
        use RunPhase::*;
        matches!(
            (self, to),
            (Starting, Running)
                | (Running, AwaitingChoice { .. })
                | (Running, AwaitingChest)
                | (Running, Defeated)
                | (AwaitingChoice { .. }, Running)
                | (AwaitingChest, Running)
        )
    }

    pub fn is_running(self) -> bool {
        self == RunPhase::Running
    }
}

/// The player avatar
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Movement speed in px/s
    pub speed: f32,
    pub hp: f32,
    pub stats: StatSnapshot,
}

impl PlayerState {
    fn new(tuning: &Tuning) -> Self {
        let stats = StatSnapshot::with_max_health(tuning.base_max_health);
        Self {
            pos: Vec2::new(tuning.playfield_width, tuning.playfield_height) / 2.0,
            vel: Vec2::ZERO,
            radius: tuning.player_radius,
            speed: tuning.player_speed,
            hp: stats.max_health,
            stats,
        }
    }

    /// Install a rebuilt snapshot. Health is clamped down, never raised.
    pub fn apply_stats(&mut self, stats: StatSnapshot) {
        self.stats = stats;
        self.hp = self.hp.min(stats.max_health);
    }

    /// Restore health up to the maximum. Returns the amount restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        let before = self.hp;
        self.hp = (self.hp + amount.max(0.0)).min(self.stats.max_health);
        self.hp - before
    }

    /// Subtract health. Returns `true` when the player is down.
    pub fn damage(&mut self, amount: f32) -> bool {
        self.hp -= amount.max(0.0);
        !self.is_alive()
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0.0
    }
}

/// Run-level counters
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    /// Seconds of gameplay (paused time excluded)
    pub time: f32,
    /// Ticks processed, paused or not
    pub frame: u64,
    pub level: u32,
    pub exp: f32,
    pub exp_to_next: f32,
    pub gold: u32,
    pub reroll_tokens: u32,
    pub kills: u32,
    pub spawn_timer: f32,
    pub elite_timer: f32,
}

impl RunState {
    fn new(tuning: &Tuning) -> Self {
        Self {
            time: 0.0,
            frame: 0,
            level: 1,
            exp: 0.0,
            exp_to_next: tuning.exp_to_next(1),
            gold: 0,
            reroll_tokens: 0,
            kills: 0,
            spawn_timer: 0.0,
            elite_timer: 0.0,
        }
    }
}

/// Dropped experience
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ExperienceOrb {
    pub pos: Vec2,
    pub value: f32,
}

/// Dropped reward chest
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Chest {
    pub pos: Vec2,
    /// Dropped by an elite
    pub elite: bool,
}

/// Complete run state (deterministic for a given seed and input sequence)
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub phase: RunPhase,
    pub player: PlayerState,
    pub inventory: Inventory,
    pub run: RunState,
    pub enemies: Enemies,
    pub orbs: Vec<ExperienceOrb>,
    pub chests: Vec<Chest>,
    pub weapons: WeaponManager,
    /// Options on the open choice screen
    pub pending_choices: Vec<UpgradeChoice>,
    /// Evolution on display while `AwaitingChest`
    pub pending_evolution: Option<EvolutionTransition>,
    pub tuning: Tuning,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a fresh run waiting for its starting weapon
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            phase: RunPhase::Starting,
            player: PlayerState::new(&tuning),
            inventory: Inventory::new(tuning.weapon_slots, tuning.passive_slots),
            run: RunState::new(&tuning),
            enemies: Enemies::new(),
            orbs: Vec::new(),
            chests: Vec::new(),
            weapons: WeaponManager::new(),
            pending_choices: Vec::new(),
            pending_evolution: None,
            tuning,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Playfield size in px
    pub fn playfield(&self) -> Vec2 {
        Vec2::new(self.tuning.playfield_width, self.tuning.playfield_height)
    }

    /// Move to `to` if the phase machine allows it
    pub fn transition(&mut self, to: RunPhase) -> bool {
        if !self.phase.can_transition(to) {
            warn!("Rejected phase transition {:?} -> {:?}", self.phase, to);
            return false;
        }
        debug!("Phase {:?} -> {:?}", self.phase, to);
        self.phase = to;
        true
    }

    /// Pick the starting weapon and begin the run
    pub fn select_starting_weapon(&mut self, catalog: &Catalog, weapon_id: &str) -> bool {
        if self.phase != RunPhase::Starting {
            warn!("Starting weapon picked outside the starting phase");
            return false;
        }
        if catalog.weapon(weapon_id).is_none() {
            warn!("Unknown starting weapon {weapon_id}");
            return false;
        }
        if !self.inventory.add_weapon(weapon_id) {
            return false;
        }
        self.refresh_stats(catalog);
        info!("Run {} started with {weapon_id}", self.seed);
        self.transition(RunPhase::Running)
    }

    /// Rebuild the stat snapshot and resync weapon instances
    pub fn refresh_stats(&mut self, catalog: &Catalog) {
        let base = StatSnapshot::with_max_health(self.tuning.base_max_health);
        let snapshot = stats::rebuild_from(base, catalog, self.inventory.passives());
        self.player.apply_stats(snapshot);
        self.sync_weapons(catalog);
    }

    /// Make weapon instances match the inventory
    pub fn sync_weapons(&mut self, catalog: &Catalog) {
        self.weapons.sync(catalog, &self.inventory, &self.player.stats);
    }

    /// Add experience (scaled by the experience-gain stat) and check for a level-up
    pub fn gain_experience(&mut self, catalog: &Catalog, amount: f32) -> bool {
        self.run.exp += amount * self.player.stats.exp_gain;
        self.check_level_up(catalog)
    }

    /// Open a level-up screen if the threshold is met. One level per call;
    /// surplus is checked again once the screen resolves.
    pub fn check_level_up(&mut self, catalog: &Catalog) -> bool {
        if !self.phase.is_running() || self.run.exp < self.run.exp_to_next {
            return false;
        }
        self.run.exp -= self.run.exp_to_next;
        self.run.level += 1;
        self.run.exp_to_next = self.tuning.exp_to_next(self.run.level);
        info!("Level up to {}", self.run.level);
        self.open_choices(catalog, ChoiceSource::LevelUp)
    }

    fn open_choices(&mut self, catalog: &Catalog, source: ChoiceSource) -> bool {
        self.pending_choices =
            progression::generate_choices(catalog, &self.inventory, &self.tuning, &mut self.rng);
        self.transition(RunPhase::AwaitingChoice { source })
    }

    /// Apply the pending choice at `index` and resume.
    /// Returns whether the choice changed anything.
    pub fn select_choice(&mut self, catalog: &Catalog, index: usize) -> bool {
        if !matches!(self.phase, RunPhase::AwaitingChoice { .. }) {
            warn!("No choice screen is open");
            return false;
        }
        let Some(choice) = self.pending_choices.get(index).cloned() else {
            warn!("Choice index {index} out of range");
            return false;
        };
        let applied = progression::apply_choice(catalog, self, &choice);
        if !applied {
            warn!("Choice {:?} no longer applies", choice.kind);
        }
        self.refresh_stats(catalog);
        self.pending_choices.clear();
        self.transition(RunPhase::Running);
        self.check_level_up(catalog);
        applied
    }

    /// Spend a reroll token to redraw the open choice screen
    pub fn reroll_choices(&mut self, catalog: &Catalog) -> bool {
        if !matches!(self.phase, RunPhase::AwaitingChoice { .. }) || self.run.reroll_tokens == 0 {
            return false;
        }
        self.run.reroll_tokens -= 1;
        self.pending_choices =
            progression::generate_choices(catalog, &self.inventory, &self.tuning, &mut self.rng);
        debug!("Rerolled choices, {} tokens left", self.run.reroll_tokens);
        true
    }

    /// Open a reward chest: evolve if possible, otherwise offer a normal reward
    pub fn open_chest(&mut self, catalog: &Catalog) -> bool {
        if !self.phase.is_running() {
            return false;
        }
        match progression::resolve_chest(catalog, &mut self.inventory) {
            Some(transition) => {
                self.pending_evolution = Some(transition);
                self.transition(RunPhase::AwaitingChest)
            }
            None => {
                debug!("Chest had no evolution, offering a reward");
                self.open_choices(catalog, ChoiceSource::Chest)
            }
        }
    }

    /// Dismiss the evolution screen and resume
    pub fn acknowledge_chest(&mut self, catalog: &Catalog) -> bool {
        if self.phase != RunPhase::AwaitingChest {
            return false;
        }
        self.pending_evolution = None;
        self.refresh_stats(catalog);
        self.transition(RunPhase::Running);
        self.check_level_up(catalog);
        true
    }

    /// Discard the run and wait for a new starting weapon. The RNG is reseeded,
    /// so the next run replays like a fresh `GameState` with the same seed.
    pub fn reset(&mut self) {
        self.phase = RunPhase::Starting;
        self.player = PlayerState::new(&self.tuning);
        self.inventory.clear();
        self.run = RunState::new(&self.tuning);
        self.enemies.clear();
        self.orbs.clear();
        self.chests.clear();
        self.weapons.clear();
        self.pending_choices.clear();
        self.pending_evolution = None;
        self.rng = Pcg32::seed_from_u64(self.seed);
        info!("Run {} reset", self.seed);
    }

    /// End the run
    pub fn defeat(&mut self) {
        if self.transition(RunPhase::Defeated) {
            info!(
                "Defeated at level {} after {:.1}s with {} kills",
                self.run.level, self.run.time, self.run.kills
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(weapon: &str) -> (Catalog, GameState) {
        let catalog = Catalog::builtin();
        let mut state = GameState::new(11, Tuning::default());
        assert!(state.select_starting_weapon(&catalog, weapon));
        (catalog, state)
    }

    #[test]
    fn test_phase_machine() {
        use RunPhase::*;
        let choice = AwaitingChoice {
            source: ChoiceSource::LevelUp,
        };
        assert!(Starting.can_transition(Running));
        assert!(Running.can_transition(choice));
        assert!(Running.can_transition(AwaitingChest));
        assert!(choice.can_transition(Running));
        assert!(!choice.can_transition(AwaitingChest));
        assert!(!Defeated.can_transition(Running));
        assert!(!Starting.can_transition(choice));
    }

    #[test]
    fn test_rejected_transition_keeps_phase() {
        let mut state = GameState::new(1, Tuning::default());
        assert!(!state.transition(RunPhase::AwaitingChest));
        assert_eq!(state.phase, RunPhase::Starting);
    }

    #[test]
    fn test_starting_weapon() {
        let (_, state) = started("w_whip");
        assert_eq!(state.phase, RunPhase::Running);
        assert_eq!(state.inventory.weapons().len(), 1);
        assert!(state.weapons.instance("w_whip").is_some());
    }

    #[test]
    fn test_unknown_starting_weapon_rejected() {
        let catalog = Catalog::builtin();
        let mut state = GameState::new(1, Tuning::default());
        assert!(!state.select_starting_weapon(&catalog, "w_nope"));
        assert!(!state.select_starting_weapon(&catalog, "w_bloodyTear"));
        assert_eq!(state.phase, RunPhase::Starting);
    }

    #[test]
    fn test_level_up_opens_choices() {
        let (catalog, mut state) = started("w_knife");
        assert!(!state.gain_experience(&catalog, 50.0));
        assert!(state.gain_experience(&catalog, 60.0));
        assert_eq!(state.run.level, 2);
        assert_eq!(state.run.exp_to_next, 150.0);
        assert!((state.run.exp - 10.0).abs() < 1e-4);
        assert_eq!(state.pending_choices.len(), 3);
        assert_eq!(
            state.phase,
            RunPhase::AwaitingChoice {
                source: ChoiceSource::LevelUp
            }
        );
    }

    #[test]
    fn test_surplus_experience_levels_again_after_choice() {
        let (catalog, mut state) = started("w_knife");
        state.gain_experience(&catalog, 300.0);
        assert_eq!(state.run.level, 2);
        assert!(state.select_choice(&catalog, 0));
        // 200 left covers the 150 threshold
        assert_eq!(state.run.level, 3);
        assert!(matches!(state.phase, RunPhase::AwaitingChoice { .. }));
    }

    #[test]
    fn test_select_choice_applies_and_resumes() {
        let (catalog, mut state) = started("w_knife");
        state.gain_experience(&catalog, 100.0);
        let picked = state.pending_choices[1].clone();
        assert!(state.select_choice(&catalog, 1));
        assert_eq!(state.phase, RunPhase::Running);
        assert!(state.pending_choices.is_empty());
        if let Some(id) = picked.item_id() {
            assert!(state.inventory.weapon(id).is_some() || state.inventory.passive(id).is_some());
        }
        assert!(!state.select_choice(&catalog, 0));
    }

    #[test]
    fn test_out_of_range_choice_keeps_screen() {
        let (catalog, mut state) = started("w_knife");
        state.gain_experience(&catalog, 100.0);
        assert!(!state.select_choice(&catalog, 7));
        assert!(matches!(state.phase, RunPhase::AwaitingChoice { .. }));
    }

    #[test]
    fn test_reroll_spends_token() {
        let (catalog, mut state) = started("w_knife");
        state.gain_experience(&catalog, 100.0);
        assert!(!state.reroll_choices(&catalog));
        state.run.reroll_tokens = 1;
        assert!(state.reroll_choices(&catalog));
        assert_eq!(state.run.reroll_tokens, 0);
        assert_eq!(state.pending_choices.len(), 3);
    }

    #[test]
    fn test_chest_without_evolution_offers_reward() {
        let (catalog, mut state) = started("w_knife");
        assert!(state.open_chest(&catalog));
        assert_eq!(
            state.phase,
            RunPhase::AwaitingChoice {
                source: ChoiceSource::Chest
            }
        );
        assert!(state.pending_evolution.is_none());
    }

    #[test]
    fn test_chest_evolution_round_trip() {
        let (catalog, mut state) = started("w_whip");
        for _ in 1..5 {
            state.inventory.upgrade_weapon("w_whip", 5);
        }
        state.inventory.add_passive("p_hollowHeart");
        state.inventory.upgrade_passive("p_hollowHeart", 5);
        state.inventory.upgrade_passive("p_hollowHeart", 5);
        state.refresh_stats(&catalog);

        assert!(state.open_chest(&catalog));
        assert_eq!(state.phase, RunPhase::AwaitingChest);
        let evolution = state.pending_evolution.clone().unwrap();
        assert_eq!(evolution.evolved_id, "w_bloodyTear");

        assert!(state.acknowledge_chest(&catalog));
        assert_eq!(state.phase, RunPhase::Running);
        let inst = state.weapons.instance("w_bloodyTear").unwrap();
        assert!(inst.evolved);
        assert_eq!(inst.tier, 1);
        assert!(state.weapons.instance("w_whip").is_none());
    }

    #[test]
    fn test_losing_max_health_clamps_hp() {
        let (catalog, mut state) = started("w_whip");
        state.inventory.add_passive("p_hollowHeart");
        state.refresh_stats(&catalog);
        state.player.heal(1000.0);
        assert_eq!(state.player.hp, 110.0);

        state.inventory.clear();
        state.refresh_stats(&catalog);
        assert_eq!(state.player.hp, 100.0);
    }

    #[test]
    fn test_heal_and_damage() {
        let mut player = PlayerState::new(&Tuning::default());
        assert!(!player.damage(30.0));
        assert_eq!(player.heal(50.0), 30.0);
        assert!(player.damage(200.0));
        assert!(!player.is_alive());
    }

    #[test]
    fn test_gameplay_mutations_blocked_while_paused() {
        let (catalog, mut state) = started("w_knife");
        state.gain_experience(&catalog, 100.0);
        // Chest pickups wait until the screen closes
        assert!(!state.open_chest(&catalog));
        assert!(!state.check_level_up(&catalog));
    }

    #[test]
    fn test_reset_clears_run() {
        use rand::Rng;

        let (catalog, mut state) = started("w_knife");
        state.inventory.add_passive("p_hollowHeart");
        state.refresh_stats(&catalog);
        state.enemies.insert(crate::sim::arena::Enemy::new(Vec2::ZERO, 10.0, 30.0, 10.0, false));
        state.orbs.push(ExperienceOrb {
            pos: Vec2::ZERO,
            value: 5.0,
        });
        state.chests.push(Chest {
            pos: Vec2::ZERO,
            elite: true,
        });
        state.player.pos = Vec2::new(3.0, 4.0);
        state.player.hp = 1.0;
        state.run.gold = 40;
        state.run.kills = 9;
        let _: u32 = state.rng.random();
        state.gain_experience(&catalog, 100.0);
        assert!(!state.pending_choices.is_empty());

        state.reset();

        let fresh = GameState::new(11, Tuning::default());
        assert_eq!(state.phase, RunPhase::Starting);
        assert!(state.inventory.weapons().is_empty());
        assert!(state.inventory.passives().is_empty());
        assert!(state.weapons.instances().is_empty());
        assert!(state.weapons.projectiles().is_empty());
        assert!(state.enemies.is_empty());
        assert!(state.orbs.is_empty());
        assert!(state.chests.is_empty());
        assert!(state.pending_choices.is_empty());
        assert!(state.pending_evolution.is_none());
        assert_eq!(state.run.level, 1);
        assert_eq!(state.run.exp, 0.0);
        assert_eq!(state.run.gold, 0);
        assert_eq!(state.run.kills, 0);
        assert_eq!(state.player.pos, fresh.player.pos);
        assert_eq!(state.player.hp, fresh.player.hp);
        assert_eq!(state.player.stats, fresh.player.stats);

        let mut fresh_rng = fresh.rng.clone();
        assert_eq!(state.rng.random::<u32>(), fresh_rng.random::<u32>());

        assert!(state.select_starting_weapon(&catalog, "w_whip"));
        assert_eq!(state.phase, RunPhase::Running);
    }
}
