use crate::core::lap_validation::{CheckpointState, CrossDirection};
use crate::core::motion::{step_options_for, StepOption};
use crate::core::player::Player;
use helpers::geometry::Vec2;
use serde::Serialize;

pub type CarId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CarStatus {
    Running,
    Crashed,
    Finished,
}

/// Car holds the complete per-car race state. It is only ever changed by the transition
/// function of the race state and stays frozen once crashed or finished.
/// * `trail` - Every position the car occupied, starting with its grid slot
/// * `current_lap` - Number of completed laps
/// * `finish_time` - Race turn in which the car completed its last lap
/// * `lap_start_position` - Position at which the current lap started
#[derive(Debug, Clone)]
pub struct Car {
    pub id: CarId,
    pub player_id: usize,
    pub name: String,
    pub color: String,
    pub pos: Vec2,
    pub vel: Vec2,
    pub trail: Vec<Vec2>,
    pub crashed: bool,
    pub finished: bool,
    pub current_lap: u32,
    pub last_cross_direction: Option<CrossDirection>,
    pub finish_time: Option<u32>,
    pub checkpoint_state: CheckpointState,
    pub lap_start_position: Option<Vec2>,
}

impl Car {
    pub fn new(id: CarId, player: &Player, start_pos: Vec2) -> Car {
        Car {
            id,
            player_id: player.id,
            name: player.name.to_owned(),
            color: player.color.to_owned(),
            pos: start_pos,
            vel: Vec2::ZERO,
            trail: vec![start_pos],
            crashed: false,
            finished: false,
            current_lap: 0,
            last_cross_direction: None,
            finish_time: None,
            checkpoint_state: CheckpointState::default(),
            lap_start_position: Some(start_pos),
        }
    }

    /// is_active returns true if the car still takes part in the turn rotation.
    pub fn is_active(&self) -> bool {
        !self.crashed && !self.finished
    }

    pub fn get_status(&self) -> CarStatus {
        if self.crashed {
            CarStatus::Crashed
        } else if self.finished {
            CarStatus::Finished
        } else {
            CarStatus::Running
        }
    }

    pub fn get_speed(&self) -> f64 {
        self.vel.length()
    }

    /// step_options returns the 9 candidate moves of this car.
    pub fn step_options(&self) -> [StepOption; 9] {
        step_options_for(self.pos, self.vel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::PlayerPars;

    #[test]
    fn new_car_starts_at_rest_with_reset_progress() {
        let pars: PlayerPars = serde_json::from_str(r#"{"name": "Ann"}"#).unwrap();
        let player = Player::new(0, &pars);
        let car = Car::new(0, &player, Vec2::new(7.0, 20.0));

        assert_eq!(car.vel, Vec2::ZERO);
        assert_eq!(car.trail, vec![Vec2::new(7.0, 20.0)]);
        assert_eq!(car.checkpoint_state, CheckpointState::default());
        assert_eq!(car.get_status(), CarStatus::Running);
        assert!(car.is_active());
    }
}
