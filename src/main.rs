//! Survivor Core headless runner
//!
//! Plays one run with a simple autopilot and logs how it went.
//! Usage: `survivor-core [seconds] [seed]`

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec2;
    use survivor_core::consts::*;
    use survivor_core::sim::{GameState, RunPhase, TickInput, tick};
    use survivor_core::{Catalog, Tuning};

    /// Autopiloted run driven by a frame clock
    pub struct Runner {
        catalog: Catalog,
        state: GameState,
        accumulator: f32,
    }

    impl Runner {
        pub fn new(seed: u64) -> Option<Self> {
            let catalog = Catalog::builtin();
            let mut state = GameState::new(seed, Tuning::default());
            let first = catalog.weapons().first()?.id.clone();
            if !state.select_starting_weapon(&catalog, &first) {
                return None;
            }
            Some(Self {
                catalog,
                state,
                accumulator: 0.0,
            })
        }

        pub fn is_over(&self) -> bool {
            self.state.phase == RunPhase::Defeated
        }

        /// Run fixed ticks covering `dt` seconds of frame time
        pub fn update(&mut self, dt: f32) {
            self.accumulator += dt.min(0.1);

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.resolve_screens();
                let input = self.steer();
                tick(&mut self.state, &self.catalog, &input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        /// Take the first offered choice and wave evolutions through
        fn resolve_screens(&mut self) {
            // Bounded: each pass either resumes the run or opens another level-up
            for _ in 0..8 {
                match self.state.phase {
                    RunPhase::AwaitingChoice { .. } => {
                        self.state.select_choice(&self.catalog, 0);
                    }
                    RunPhase::AwaitingChest => {
                        if let Some(evolution) = &self.state.pending_evolution {
                            log::info!(
                                "{}",
                                survivor_core::sim::evolution_text(&self.catalog, evolution)
                            );
                        }
                        self.state.acknowledge_chest(&self.catalog);
                    }
                    _ => return,
                }
            }
        }

        /// Move away from the nearest enemy, drifting back toward the center when clear
        fn steer(&self) -> TickInput {
            let player = self.state.player.pos;
            let center = self.state.playfield() / 2.0;
            let move_dir = match self.state.enemies.nearest(player) {
                Some((_, enemy)) if enemy.pos.distance(player) < 200.0 => {
                    (player - enemy.pos).normalize_or_zero() + (center - player) / center.length()
                }
                _ => (center - player) / center.length().max(1.0),
            };
            TickInput {
                move_dir: if move_dir.length() < 0.05 {
                    Vec2::ZERO
                } else {
                    move_dir
                },
            }
        }

        pub fn log_summary(&self) {
            let state = &self.state;
            log::info!(
                "Survived {:.1}s, level {}, {} kills, {} gold, {:.0}/{:.0} hp",
                state.run.time,
                state.run.level,
                state.run.kills,
                state.run.gold,
                state.player.hp.max(0.0),
                state.player.stats.max_health
            );
            for weapon in state.weapons.instances() {
                let evolved = if weapon.evolved { " (evolved)" } else { "" };
                log::info!("  weapon {} tier {}{evolved}", weapon.name, weapon.tier);
            }
            for passive in state.inventory.passives() {
                let name = self
                    .catalog
                    .passive(&passive.id)
                    .map_or(passive.id.as_str(), |p| p.name.as_str());
                log::info!("  passive {name} tier {}", passive.tier);
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);
    let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    log::info!("Survivor Core (headless) running {seconds}s with seed {seed}");

    let Some(mut runner) = headless::Runner::new(seed) else {
        log::error!("Built-in catalog has no starting weapon");
        return;
    };

    // Frames of ~16.7 ms, as a display loop would deliver them
    let frame = 1.0 / 60.0;
    let frames = (seconds / frame).ceil() as u64;
    for _ in 0..frames {
        runner.update(frame);
        if runner.is_over() {
            break;
        }
    }
    runner.log_summary();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is the wasm surface; there is no browser entry point
}
