//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (arena slot order, inventory order)
//! - No rendering or platform dependencies

pub mod arena;
pub mod describe;
pub mod inventory;
pub mod progression;
pub mod render;
pub mod sector;
pub mod state;
pub mod stats;
pub mod tick;
pub mod weapons;

pub use arena::{Enemies, Enemy, EnemyId};
pub use describe::{ChoiceCategory, ChoiceDetails, choice_details, choice_summary, evolution_text};
pub use inventory::{Inventory, OwnedItem};
pub use progression::{
    ChoiceKind, EvolutionTransition, UpgradeChoice, apply_choice, eligible_evolutions,
    generate_choices, is_evolution_eligible, resolve_chest,
};
pub use render::RenderSnapshot;
pub use sector::SweepSector;
pub use state::{ChoiceSource, GameState, PlayerState, RunPhase, RunState};
pub use stats::StatSnapshot;
pub use tick::{TickInput, tick};
pub use weapons::{DamageEvent, EffectiveStats, WeaponContext, WeaponInstance, WeaponManager};
