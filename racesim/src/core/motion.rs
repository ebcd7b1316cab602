use crate::core::race::GameState;
use crate::core::track::Track;
use helpers::geometry::Vec2;

/// All accelerations a car may choose from, in enumeration order. Tie-breaks between equally
/// rated moves favor earlier entries.
pub const ACCELERATIONS: [Vec2; 9] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(0.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(-1.0, 0.0),
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(0.0, 1.0),
    Vec2::new(1.0, 1.0),
];

/// StepOption is one candidate move: the chosen acceleration and the resulting velocity and
/// position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOption {
    pub acc: Vec2,
    pub vel: Vec2,
    pub pos: Vec2,
}

impl StepOption {
    pub fn new(pos: Vec2, vel: Vec2, acc: Vec2) -> StepOption {
        let vel_new = vel + acc;
        StepOption {
            acc,
            vel: vel_new,
            pos: pos + vel_new,
        }
    }
}

/// step_options_for returns the 9 candidate moves for a car at `pos` with velocity `vel`.
pub fn step_options_for(pos: Vec2, vel: Vec2) -> [StepOption; 9] {
    ACCELERATIONS.map(|acc| StepOption::new(pos, vel, acc))
}

/// step_options returns the 9 candidate moves of the active car, or nothing if no car is
/// active.
pub fn step_options(state: &GameState) -> Vec<StepOption> {
    state
        .get_active_car()
        .map(|car| car.step_options().to_vec())
        .unwrap_or_default()
}

/// legal_step_options returns the subset of step_options whose path stays in the track band.
pub fn legal_step_options(state: &GameState) -> Vec<StepOption> {
    match state.get_active_car() {
        Some(car) => legal_options_for(&state.track, car.pos, car.vel),
        None => Vec::new(),
    }
}

pub fn legal_options_for(track: &Track, pos: Vec2, vel: Vec2) -> Vec<StepOption> {
    step_options_for(pos, vel)
        .iter()
        .filter(|opt| track.path_legal(pos, opt.pos))
        .copied()
        .collect()
}

/// clamp_acceleration maps an arbitrary vector onto the nearest valid acceleration, i.e. each
/// component rounded and limited to {-1, 0, 1}.
pub fn clamp_acceleration(acc: Vec2) -> Vec2 {
    Vec2::new(acc.x.round().clamp(-1.0, 1.0), acc.y.round().clamp(-1.0, 1.0))
}
