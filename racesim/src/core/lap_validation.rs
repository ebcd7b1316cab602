use crate::core::car::Car;
use crate::core::track::Track;
use helpers::geometry::{crossing_param, Segment, Vec2};
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{debug, info};

pub const NO_CHECKPOINTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrossDirection {
    Forward,
    Backward,
}

/// Result of crossing a single checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CheckpointTransition {
    /// The checkpoint was the expected next one and is now marked as passed.
    Valid,
    /// Checkpoint 0 was crossed out of order, progress restarts from it.
    Restarted,
    /// A checkpoint was crossed out of order, progress is lost.
    OutOfOrder,
    /// A checkpoint already passed in this lap was crossed again.
    Ignored,
}

/// CheckpointState tracks which checkpoints a car has passed in the current lap.
/// * `checkpoints_passed` - One flag per checkpoint
/// * `last_valid_checkpoint` - Index of the last checkpoint passed in order, -1 if none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointState {
    pub checkpoints_passed: [bool; NO_CHECKPOINTS],
    pub last_valid_checkpoint: i8,
}

impl Default for CheckpointState {
    fn default() -> Self {
        CheckpointState {
            checkpoints_passed: [false; NO_CHECKPOINTS],
            last_valid_checkpoint: -1,
        }
    }
}

impl CheckpointState {
    pub fn reset(&mut self) {
        *self = CheckpointState::default();
    }

    /// get_expected_next returns the index of the checkpoint that has to be crossed next.
    pub fn get_expected_next(&self) -> usize {
        (self.last_valid_checkpoint + 1).rem_euclid(NO_CHECKPOINTS as i8) as usize
    }

    /// is_complete returns true if all checkpoints were passed in order, i.e. the next forward
    /// start line crossing completes a lap.
    pub fn is_complete(&self) -> bool {
        self.checkpoints_passed.iter().all(|&x| x)
            && self.last_valid_checkpoint == NO_CHECKPOINTS as i8 - 1
    }

    /// cross_checkpoint advances the state machine for a crossing of checkpoint `idx`.
    pub fn cross_checkpoint(&mut self, idx: usize) -> CheckpointTransition {
        let expected = self.get_expected_next();

        if idx == expected && !self.checkpoints_passed[idx] {
            self.checkpoints_passed[idx] = true;
            self.last_valid_checkpoint = idx as i8;
            CheckpointTransition::Valid
        } else if idx == 0 {
            // re-entering the circuit at checkpoint 0 always restarts cleanly
            self.reset();
            self.checkpoints_passed[0] = true;
            self.last_valid_checkpoint = 0;
            CheckpointTransition::Restarted
        } else if self.checkpoints_passed[idx] && idx as i8 <= self.last_valid_checkpoint {
            CheckpointTransition::Ignored
        } else {
            self.reset();
            CheckpointTransition::OutOfOrder
        }
    }
}

/// checkpoint_crossings returns the indices of all checkpoints touched by the move from -> to,
/// ordered by where along the move they are touched. Standing still crosses nothing.
pub fn checkpoint_crossings(track: &Track, from: Vec2, to: Vec2) -> Vec<usize> {
    if from == to {
        return Vec::new();
    }
    let path = Segment::new(from, to);

    let mut hits: Vec<(f64, usize)> = track
        .checkpoints
        .iter()
        .enumerate()
        .filter_map(|(idx, cp)| crossing_param(&path, cp).map(|t| (t, idx)))
        .collect();
    hits.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    hits.into_iter().map(|(_, idx)| idx).collect()
}

/// start_line_crossing returns the direction in which the move from -> to crosses the start
/// line, or None if it does not cross it. A crossing requires touching the segment and
/// changing sides, so landing on the line and leaving it again counts only once.
pub fn start_line_crossing(track: &Track, from: Vec2, to: Vec2) -> Option<CrossDirection> {
    let side_from = track.side_of_start(from);
    let side_to = track.side_of_start(to);
    if side_from == side_to {
        return None;
    }

    crossing_param(&Segment::new(from, to), &track.start)?;

    if to.y > from.y {
        Some(CrossDirection::Forward)
    } else {
        Some(CrossDirection::Backward)
    }
}

/// Outcome of a start line crossing with respect to the lap counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LapOutcome {
    /// Direction recorded, lap counter unchanged.
    Recorded,
    LapCompleted { lap: u32 },
    Finished { lap: u32 },
}

/// handle_start_crossing applies the lap completion rules for a start line crossing of `car`
/// in direction `dir`. `turn` is the race turn counter used as finish time.
pub fn handle_start_crossing(
    car: &mut Car,
    dir: CrossDirection,
    target_laps: u32,
    turn: u32,
) -> LapOutcome {
    car.last_cross_direction = Some(dir);

    if dir == CrossDirection::Backward || !car.checkpoint_state.is_complete() {
        debug!(
            "Car {} crossed the start line {:?} without completing a lap",
            car.id, dir
        );
        return LapOutcome::Recorded;
    }

    car.current_lap += 1;
    car.checkpoint_state.reset();
    car.lap_start_position = Some(car.pos);

    if car.current_lap >= target_laps {
        car.finished = true;
        car.finish_time = Some(turn);
        info!(
            "Car {} ({}) finished after {} laps in turn {}",
            car.id, car.name, car.current_lap, turn
        );
        LapOutcome::Finished {
            lap: car.current_lap,
        }
    } else {
        info!("Car {} ({}) completed lap {}", car.id, car.name, car.current_lap);
        LapOutcome::LapCompleted {
            lap: car.current_lap,
        }
    }
}
