use crate::ai::racing_line::RacingLine;
use crate::core::car::{Car, CarId};
use crate::core::collision::{detect_collision, resolve_collision, CollisionPars};
use crate::core::lap_validation::{
    checkpoint_crossings, handle_start_crossing, start_line_crossing, CheckpointTransition,
    CrossDirection, LapOutcome,
};
use crate::core::motion::clamp_acceleration;
use crate::core::player::{AiDifficulty, Player, PlayerPars};
use crate::core::scheduler::{all_inactive, next_active_idx};
use crate::core::track::{Track, TrackError};
use helpers::geometry::Vec2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// * `target_laps` - Number of laps a car has to complete to finish
/// * `collisions` - (optional) Car-to-car collision settings, disabled by default
/// * `history_depth` - (optional) Number of previous states kept for undo
#[derive(Debug, Deserialize, Clone)]
pub struct RacePars {
    pub target_laps: u32,
    #[serde(default)]
    pub collisions: CollisionPars,
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
}

fn default_history_depth() -> usize {
    50
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RacePhase {
    Setup,
    Running,
    Finished,
}

/// Things that happened during a single move, recorded for renderers and other observers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum RaceEvent {
    Crash {
        car: CarId,
        at: Vec2,
    },
    Collision {
        car: CarId,
        other: CarId,
    },
    CheckpointPassed {
        car: CarId,
        index: usize,
        transition: CheckpointTransition,
    },
    StartLineCrossed {
        car: CarId,
        direction: CrossDirection,
    },
    LapCompleted {
        car: CarId,
        lap: u32,
    },
    Finished {
        car: CarId,
        turn: u32,
    },
    RaceFinished,
}

/// GameState is a complete snapshot of a race. It is never changed in place during the race:
/// apply_move returns a new state, which makes keeping a history for undo trivial.
/// * `cars_list` - Cars in grid order, car i belongs to player i
/// * `current_player_idx` - Index of the car that moves next
/// * `turn` - Number of moves applied so far
/// * `last_events` - Events produced by the move that led to this state
#[derive(Debug, Clone)]
pub struct GameState {
    pub track: Rc<Track>,
    pub racing_line: Rc<RacingLine>,
    pub cars_list: Vec<Car>,
    pub players_list: Vec<Player>,
    pub current_player_idx: usize,
    pub target_laps: u32,
    pub collisions: CollisionPars,
    pub phase: RacePhase,
    pub race_start_time: Option<Instant>,
    pub turn: u32,
    pub last_events: Vec<RaceEvent>,
}

impl GameState {
    pub fn new(
        race_pars: &RacePars,
        track: Track,
        racing_line: Option<RacingLine>,
        player_pars_all: &[PlayerPars],
    ) -> Result<GameState, TrackError> {
        let racing_line = match racing_line {
            Some(racing_line) => racing_line,
            None => RacingLine::from_track(&track)?,
        };

        // place cars on the grid
        let no_cars = player_pars_all.len();
        let grid = track.grid_positions(no_cars);
        if grid.len() < no_cars {
            return Err(TrackError::NotEnoughGridSlots {
                requested: no_cars,
                available: grid.len(),
            });
        }

        let players_list: Vec<Player> = player_pars_all
            .iter()
            .enumerate()
            .map(|(id, player_pars)| Player::new(id, player_pars))
            .collect();
        let cars_list: Vec<Car> = players_list
            .iter()
            .zip(grid.iter())
            .map(|(player, &start_pos)| Car::new(player.id, player, start_pos))
            .collect();

        Ok(GameState {
            track: Rc::new(track),
            racing_line: Rc::new(racing_line),
            cars_list,
            players_list,
            current_player_idx: 0,
            target_laps: race_pars.target_laps,
            collisions: race_pars.collisions.to_owned(),
            phase: if no_cars == 0 {
                RacePhase::Finished
            } else {
                RacePhase::Setup
            },
            race_start_time: None,
            turn: 0,
            last_events: Vec::new(),
        })
    }

    // ---------------------------------------------------------------------------------------------
    // QUERIES -------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    pub fn game_started(&self) -> bool {
        self.phase != RacePhase::Setup
    }

    pub fn game_finished(&self) -> bool {
        self.phase == RacePhase::Finished
    }

    /// get_active_car returns the car that moves next, or None once the race is over.
    pub fn get_active_car(&self) -> Option<&Car> {
        if self.game_finished() {
            return None;
        }
        self.cars_list
            .get(self.current_player_idx)
            .filter(|car| car.is_active())
    }

    pub fn get_active_player(&self) -> Option<&Player> {
        self.get_active_car()
            .and_then(|car| self.players_list.get(car.player_id))
    }

    pub fn get_player(&self, player_id: usize) -> Option<&Player> {
        self.players_list.get(player_id)
    }

    pub fn get_elapsed_time(&self) -> Option<Duration> {
        self.race_start_time.map(|t| t.elapsed())
    }

    /// get_leaderboard returns the car indices in race order: finished cars by finish time,
    /// then all others by completed laps and trail length.
    pub fn get_leaderboard(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.cars_list.len()).collect();

        order.sort_by(|&a, &b| {
            let car_a = &self.cars_list[a];
            let car_b = &self.cars_list[b];
            match (car_a.finish_time, car_b.finish_time) {
                (Some(t_a), Some(t_b)) => t_a.cmp(&t_b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => car_b
                    .current_lap
                    .cmp(&car_a.current_lap)
                    .then(car_b.trail.len().cmp(&car_a.trail.len())),
            }
        });

        order
    }

    // ---------------------------------------------------------------------------------------------
    // MUTATORS ------------------------------------------------------------------------------------
    // ---------------------------------------------------------------------------------------------

    /// set_ai_difficulty changes the tier of a computer-controlled player during the race.
    pub fn set_ai_difficulty(&mut self, player_id: usize, difficulty: AiDifficulty) -> bool {
        match self.players_list.get_mut(player_id) {
            Some(player) => player.set_ai_difficulty(difficulty),
            None => false,
        }
    }

    /// apply_move is the single transition function of the race. It moves the active car with
    /// acceleration `acc` (clamped to the valid range) and hands the turn to the next active
    /// car. If there is no active car, the unchanged state is returned.
    pub fn apply_move(&self, acc: Vec2) -> GameState {
        let idx = self.current_player_idx;
        let car = match self.get_active_car() {
            Some(car) => car,
            None => return self.clone(),
        };

        let car_id = car.id;
        let from = car.pos;
        let vel_new = car.vel + clamp_acceleration(acc);
        let to = from + vel_new;

        let mut state = self.clone();
        state.last_events.clear();
        state.turn += 1;
        if state.phase == RacePhase::Setup {
            state.phase = RacePhase::Running;
            state.race_start_time = Some(Instant::now());
        }

        if !state.track.path_legal(from, to) {
            warn!("Car {} ({}) crashed moving to {:?}", car_id, car.name, to);
            state.cars_list[idx].crashed = true;
            state.last_events.push(RaceEvent::Crash { car: car_id, at: to });
        } else {
            state.move_car(idx, from, to, vel_new);
        }

        // hand over the turn
        if all_inactive(&state.cars_list) {
            info!("Race finished after {} moves", state.turn);
            state.phase = RacePhase::Finished;
            state.last_events.push(RaceEvent::RaceFinished);
        } else if let Some(next_idx) = next_active_idx(&state.cars_list, idx) {
            state.current_player_idx = next_idx;
        }

        state
    }

    /// move_car applies a legal move: checkpoint progress along the original path, collision
    /// resolution, lap rules along the final path and finally the position update.
    fn move_car(&mut self, idx: usize, from: Vec2, to: Vec2, vel_new: Vec2) {
        let car_id = self.cars_list[idx].id;

        for cp_idx in checkpoint_crossings(&self.track, from, to) {
            let transition = self.cars_list[idx].checkpoint_state.cross_checkpoint(cp_idx);
            debug!("Car {} checkpoint {}: {:?}", car_id, cp_idx, transition);
            self.last_events.push(RaceEvent::CheckpointPassed {
                car: car_id,
                index: cp_idx,
                transition,
            });
        }

        let mut vel_final = vel_new;
        let mut pos_final = to;
        if self.collisions.enabled {
            if let Some(other) =
                detect_collision(car_id, from, to, &self.cars_list, &self.collisions)
            {
                debug!("Car {} collided with car {}", car_id, other);
                let (vel_res, pos_res) = resolve_collision(self.collisions.policy, from);
                vel_final = vel_res;
                pos_final = pos_res;
                self.last_events.push(RaceEvent::Collision { car: car_id, other });
            }
        }

        let crossing = start_line_crossing(&self.track, from, pos_final);
        let target_laps = self.target_laps;
        let turn = self.turn;

        let car = &mut self.cars_list[idx];
        car.trail.push(pos_final);
        car.pos = pos_final;
        car.vel = vel_final;

        if let Some(direction) = crossing {
            self.last_events.push(RaceEvent::StartLineCrossed {
                car: car_id,
                direction,
            });
            match handle_start_crossing(car, direction, target_laps, turn) {
                LapOutcome::Recorded => {}
                LapOutcome::LapCompleted { lap } => {
                    self.last_events
                        .push(RaceEvent::LapCompleted { car: car_id, lap });
                }
                LapOutcome::Finished { lap } => {
                    self.last_events
                        .push(RaceEvent::LapCompleted { car: car_id, lap });
                    self.last_events
                        .push(RaceEvent::Finished { car: car_id, turn });
                }
            }
        }
    }
}
