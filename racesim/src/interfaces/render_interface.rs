use crate::core::car::{CarId, CarStatus};
use crate::core::race::{GameState, RaceEvent};
use crate::post::race_result::RaceResult;
use anyhow::Context;
use helpers::geometry::Vec2;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone)]
pub struct CarState {
    pub car_id: CarId,
    pub name: String,
    pub color: RgbColor,
    pub pos: Vec2,
    pub vel: Vec2,
    pub status: CarStatus,
    pub lap: u32,
    pub next_checkpoint: usize,
}

/// TurnSnapshot is everything a renderer needs to draw the race after a move. Snapshots are
/// plain data and can be sent across threads.
#[derive(Debug, Clone)]
pub struct TurnSnapshot {
    pub turn: u32,
    pub active_car: Option<CarId>,
    pub car_states: Vec<CarState>,
    pub events: Vec<RaceEvent>,

    // final results payload (sent once when race finishes)
    pub final_result: Option<RaceResult>,
}

impl TurnSnapshot {
    pub fn from_state(state: &GameState) -> anyhow::Result<TurnSnapshot> {
        let mut car_states = Vec::with_capacity(state.cars_list.len());

        for car in state.cars_list.iter() {
            let tmp_color = car
                .color
                .parse::<css_color_parser::Color>()
                .context(format!("Could not parse color {} of car {}!", car.color, car.id))?;

            car_states.push(CarState {
                car_id: car.id,
                name: car.name.to_owned(),
                color: RgbColor {
                    r: tmp_color.r,
                    g: tmp_color.g,
                    b: tmp_color.b,
                },
                pos: car.pos,
                vel: car.vel,
                status: car.get_status(),
                lap: car.current_lap,
                next_checkpoint: car.checkpoint_state.get_expected_next(),
            });
        }

        Ok(TurnSnapshot {
            turn: state.turn,
            active_car: state.get_active_car().map(|car| car.id),
            car_states,
            events: state.last_events.to_owned(),
            final_result: None,
        })
    }
}
