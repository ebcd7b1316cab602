pub mod difficulty;
pub mod fallback;
pub mod lookahead;
pub mod memory;
pub mod racing_line;
pub mod scoring;

use crate::ai::difficulty::DifficultyParams;
use crate::ai::fallback::emergency_move;
use crate::ai::lookahead::deepen;
use crate::ai::memory::AiMemory;
use crate::ai::scoring::{evaluate, ScoringContext};
use crate::core::motion::{legal_options_for, StepOption};
use crate::core::race::GameState;
use helpers::general::{argsort, SortOrder};
use helpers::geometry::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// * `seed` - Seed of the random number generator used for score jitter
/// * `lookahead_budget_ms` - Soft wall-clock budget of the lookahead search per decision
/// * `discount` - Discount factor applied per lookahead ply
/// * `jitter` - Add random noise to the scores (scaled by difficulty)
#[derive(Debug, Deserialize, Clone)]
pub struct AiPars {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_lookahead_budget_ms")]
    pub lookahead_budget_ms: u64,
    #[serde(default = "default_discount")]
    pub discount: f64,
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_seed() -> u64 {
    42
}

fn default_lookahead_budget_ms() -> u64 {
    40
}

fn default_discount() -> f64 {
    0.7
}

fn default_jitter() -> bool {
    true
}

impl Default for AiPars {
    fn default() -> Self {
        AiPars {
            seed: default_seed(),
            lookahead_budget_ms: default_lookahead_budget_ms(),
            discount: default_discount(),
            jitter: default_jitter(),
        }
    }
}

/// Stage of the decision process that produced a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionSource {
    Scored,
    Lookahead { depth: u32 },
    Emergency,
}

/// Decision is the move chosen for the active car.
/// * `score` - Total score of the move, None for emergency moves
/// * `target_idx` - Racing line waypoint the car was heading for
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub option: StepOption,
    pub score: Option<f64>,
    pub target_idx: usize,
    pub source: DecisionSource,
}

/// AiEngine chooses moves for computer-controlled cars. It owns the per-car memory and the
/// random number generator, so a given seed reproduces a race move by move (as long as the
/// lookahead finishes within its budget).
#[derive(Debug)]
pub struct AiEngine {
    ai_pars: AiPars,
    memory: AiMemory,
    rng: StdRng,
}

impl AiEngine {
    pub fn new(ai_pars: &AiPars) -> AiEngine {
        AiEngine {
            ai_pars: ai_pars.to_owned(),
            memory: AiMemory::new(),
            rng: StdRng::seed_from_u64(ai_pars.seed),
        }
    }

    pub fn get_memory(&self) -> &AiMemory {
        &self.memory
    }

    pub fn get_memory_mut(&mut self) -> &mut AiMemory {
        &mut self.memory
    }

    /// choose_move returns the acceleration for the active car, or None if it cannot move
    /// without crashing (or there is no active car).
    pub fn choose_move(&mut self, state: &GameState) -> Option<Vec2> {
        self.decide(state).map(|decision| decision.option.acc)
    }

    /// decide runs the complete decision process for the active car: target selection,
    /// candidate scoring, optional lookahead, re-validation and, if all of that fails, the
    /// emergency fallback.
    pub fn decide(&mut self, state: &GameState) -> Option<Decision> {
        let car = state.get_active_car()?;
        let difficulty = state
            .get_player(car.player_id)
            .and_then(|player| player.get_ai_difficulty())
            .unwrap_or_default();
        let params = DifficultyParams::for_difficulty(difficulty);

        self.memory.record(car.id, car.pos);
        let loop_info = self.memory.detect_loop(car.id);

        let track = state.track.as_ref();
        let racing_line = state.racing_line.as_ref();
        let target_idx = racing_line.select_target(track, car.pos);

        // candidates: legal moves, standing still only if nothing else is possible
        let legal = legal_options_for(track, car.pos, car.vel);
        let candidates: Vec<StepOption> = if legal.iter().any(|opt| !opt.vel.is_zero()) {
            legal.into_iter().filter(|opt| !opt.vel.is_zero()).collect()
        } else {
            legal
        };

        let ctx = ScoringContext {
            track,
            racing_line,
            car,
            others: state
                .cars_list
                .iter()
                .filter(|other| other.id != car.id && other.is_active())
                .collect(),
            params,
            target: *racing_line.get_point(target_idx),
            loop_info,
        };

        let mut scores: Vec<f64> = candidates
            .iter()
            .map(|cand| evaluate(&ctx, car.pos, cand.pos, cand.vel, true))
            .collect();

        if self.ai_pars.jitter && params.jitter_std > 0.0 {
            if let Ok(noise) = Normal::new(0.0, params.jitter_std) {
                for score in scores.iter_mut() {
                    *score += noise.sample(&mut self.rng);
                }
            }
        }

        let mut source = DecisionSource::Scored;
        if params.lookahead_depth > 0 && !candidates.is_empty() {
            let deadline =
                Instant::now() + Duration::from_millis(self.ai_pars.lookahead_budget_ms);
            if let Some((future, depth)) = deepen(
                &ctx,
                &candidates,
                params.lookahead_depth,
                self.ai_pars.discount,
                deadline,
            ) {
                for (score, value) in scores.iter_mut().zip(future.iter()) {
                    *score += value;
                }
                source = DecisionSource::Lookahead { depth };
            }
        }

        // highest score first, ties keep enumeration order
        for idx in argsort(&scores, SortOrder::Descending) {
            let cand = candidates[idx];
            if track.path_legal(car.pos, cand.pos) {
                debug!(
                    "Car {} picks acc ({}, {}) with score {:.2} via {:?}",
                    car.id, cand.acc.x, cand.acc.y, scores[idx], source
                );
                return Some(Decision {
                    option: cand,
                    score: Some(scores[idx]),
                    target_idx,
                    source,
                });
            }
        }

        warn!("Car {} falls back to an emergency move", car.id);
        emergency_move(track, racing_line, car).map(|option| Decision {
            option,
            score: None,
            target_idx,
            source: DecisionSource::Emergency,
        })
    }
}

/// choose_ai_move returns the acceleration the engine picks for the active car of `state`.
pub fn choose_ai_move(state: &GameState, engine: &mut AiEngine) -> Option<Vec2> {
    engine.choose_move(state)
}
