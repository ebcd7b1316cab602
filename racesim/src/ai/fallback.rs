use crate::ai::racing_line::RacingLine;
use crate::core::car::Car;
use crate::core::motion::{legal_options_for, StepOption};
use crate::core::track::Track;
use std::cmp::Ordering;
use tracing::warn;

/// emergency_move is used when regular scoring produced nothing usable. Among all legal moves it
/// prefers the one that sheds the most speed, then the one closest to the track center, then
/// the one closest to the racing line. Returns None if the car is boxed in.
pub fn emergency_move(track: &Track, racing_line: &RacingLine, car: &Car) -> Option<StepOption> {
    let speed = car.get_speed();
    let center = track.center();

    let mut options = legal_options_for(track, car.pos, car.vel);
    options.sort_by(|a, b| {
        let reduction_a = speed - a.vel.length();
        let reduction_b = speed - b.vel.length();
        reduction_b
            .partial_cmp(&reduction_a)
            .unwrap_or(Ordering::Equal)
            .then(
                a.pos
                    .distance(center)
                    .partial_cmp(&b.pos.distance(center))
                    .unwrap_or(Ordering::Equal),
            )
            .then(
                racing_line
                    .distance_to_line(a.pos)
                    .partial_cmp(&racing_line.distance_to_line(b.pos))
                    .unwrap_or(Ordering::Equal),
            )
    });

    let choice = options.first().copied();
    if choice.is_none() {
        warn!("Car {} ({}) has no legal move left", car.id, car.name);
    }
    choice
}
