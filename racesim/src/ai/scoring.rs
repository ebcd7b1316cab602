use crate::ai::difficulty::DifficultyParams;
use crate::ai::memory::LoopInfo;
use crate::ai::racing_line::{CornerType, RacingLine, RacingLinePoint};
use crate::core::car::Car;
use crate::core::track::Track;
use helpers::geometry::Vec2;

/// Racing line deviation up to this distance is penalized linearly, beyond it super-linearly.
const LINE_DEVIATION_THRESHOLD: f64 = 3.0;

/// Number of trail entries during which the start bias is applied.
const START_PHASE_LEN: usize = 3;

/// Distance within which other cars are taken into account.
const TRAFFIC_RADIUS: f64 = 5.0;

/// Everything the scoring function needs to rate the candidate moves of one car.
/// * `others` - All other cars still in the race
/// * `target` - Racing line waypoint selected for this decision
/// * `loop_info` - Loop the car is currently caught in, if any
pub struct ScoringContext<'a> {
    pub track: &'a Track,
    pub racing_line: &'a RacingLine,
    pub car: &'a Car,
    pub others: Vec<&'a Car>,
    pub params: DifficultyParams,
    pub target: RacingLinePoint,
    pub loop_info: Option<LoopInfo>,
}

impl<'a> ScoringContext<'a> {
    /// Desired speed at the target waypoint, never above the waypoint's own target speed.
    fn desired_speed(&self) -> f64 {
        let tier_speed = match self.target.corner_type {
            CornerType::Straight => self.params.straight_speed,
            CornerType::Exit => (self.params.straight_speed + self.params.corner_speed) / 2.0,
            CornerType::Entry | CornerType::Apex => self.params.corner_speed,
        };
        tier_speed.min(self.target.target_speed)
    }

    /// Speed above which crashes become likely. Tighter when the target is a braking point.
    fn crash_threshold(&self) -> f64 {
        if self.target.brake_zone || self.target.corner_type == CornerType::Entry {
            self.params.crash_speed - 1.5
        } else {
            self.params.crash_speed
        }
    }
}

/// evaluate rates a move from `from` to `pos` ending with velocity `vel`. The situational
/// terms (start bias, loop escape, traffic) only apply if `first_ply` is set, i.e. for the
/// move actually being decided rather than for moves explored during lookahead.
pub fn evaluate(ctx: &ScoringContext, from: Vec2, pos: Vec2, vel: Vec2, first_ply: bool) -> f64 {
    let mut score = forward_alignment(ctx, from, vel)
        + speed_band(ctx, vel)
        + boundary_proximity(ctx, pos, vel)
        + boundary_prediction(ctx, pos, vel)
        + racing_line(ctx, from, pos)
        + target_progress(ctx, from, pos);

    if first_ply {
        score += start_bias(ctx, from, vel) + loop_escape(ctx, from, pos) + traffic(ctx, from, pos);
    }

    score
}

// -------------------------------------------------------------------------------------------------
// TERMS -------------------------------------------------------------------------------------------
// -------------------------------------------------------------------------------------------------

/// Moving backwards is never competitive, standing still is clearly worse than moving forward.
fn forward_alignment(ctx: &ScoringContext, from: Vec2, vel: Vec2) -> f64 {
    let speed = vel.length();
    if speed == 0.0 {
        return -60.0;
    }

    let align = vel.normalized().dot(ctx.track.expected_direction(from));
    if align >= 0.5 {
        40.0 * align + 4.0 * speed.min(ctx.params.straight_speed)
    } else if align < -0.1 {
        -(1000.0 + 200.0 * speed) * align.abs()
    } else {
        20.0 * align
    }
}

fn speed_band(ctx: &ScoringContext, vel: Vec2) -> f64 {
    let speed = vel.length();
    let mut score = -2.0 * (speed - ctx.desired_speed()).powi(2);

    let excess = speed - ctx.crash_threshold();
    if excess > 0.0 {
        score -= 25.0 * excess.powi(2);
    }

    score
}

/// Critical, warning and caution bands around the walls, scaled with speed.
fn boundary_proximity(ctx: &ScoringContext, pos: Vec2, vel: Vec2) -> f64 {
    let d = ctx.track.distance_to_wall(pos);
    let speed = vel.length();

    if d < 1.0 {
        -(60.0 + 30.0 * speed)
    } else if d < 2.0 {
        -(15.0 + 12.0 * speed * (2.0 - d))
    } else if d < 3.5 {
        -3.0 * speed * (3.5 - d)
    } else {
        0.0
    }
}

/// Looks further ahead: coasting on must stay on track and the car must be able to brake to a
/// standstill.
fn boundary_prediction(ctx: &ScoringContext, pos: Vec2, vel: Vec2) -> f64 {
    let speed = vel.length();
    let mut score = 0.0;

    if !ctx.track.contains(pos + vel) {
        score -= 20.0 * speed;
    }

    if !can_stop(ctx.track, pos, vel) {
        score -= 150.0;
    }

    score
}

/// can_stop walks the full braking sequence from (pos, vel), every velocity component shrinking
/// by one per move, and returns true if all of it stays on track.
pub fn can_stop(track: &Track, pos: Vec2, vel: Vec2) -> bool {
    let mut pos = pos;
    let mut vel = vel;

    while !vel.is_zero() {
        vel = vel - vel.signum();
        let next = pos + vel;
        if !track.path_roughly_legal(pos, next) {
            return false;
        }
        pos = next;
    }

    true
}

fn racing_line(ctx: &ScoringContext, from: Vec2, pos: Vec2) -> f64 {
    let d = ctx.racing_line.distance_to_line(pos);
    let d_from = ctx.racing_line.distance_to_line(from);

    let mut score = if d <= LINE_DEVIATION_THRESHOLD {
        -ctx.params.line_weight * d
    } else {
        -ctx.params.line_weight
            * (LINE_DEVIATION_THRESHOLD + (d - LINE_DEVIATION_THRESHOLD).powf(1.5))
    };

    if d < 1.0 {
        score += 6.0 * (1.0 - d);
    }
    if d_from > 4.0 {
        score += 4.0 * (d_from - d);
    }

    score
}

fn target_progress(ctx: &ScoringContext, from: Vec2, pos: Vec2) -> f64 {
    3.0 * (from.distance(ctx.target.pos) - pos.distance(ctx.target.pos))
}

/// Right after leaving the grid the car is pushed hard into the racing direction.
fn start_bias(ctx: &ScoringContext, from: Vec2, vel: Vec2) -> f64 {
    if ctx.car.trail.len() > START_PHASE_LEN {
        return 0.0;
    }
    if vel.is_zero() {
        -100.0
    } else {
        50.0 * vel.normalized().dot(ctx.track.expected_direction(from))
    }
}

fn loop_escape(ctx: &ScoringContext, from: Vec2, pos: Vec2) -> f64 {
    match &ctx.loop_info {
        Some(info) => {
            let mut score = 12.0 * (pos.distance(info.centroid) - from.distance(info.centroid));
            if info.contains(pos) {
                score -= 150.0;
            }
            score
        }
        None => 0.0,
    }
}

fn traffic(ctx: &ScoringContext, from: Vec2, pos: Vec2) -> f64 {
    let forward = ctx.track.expected_direction(from);
    let mut score = 0.0;

    for other in ctx.others.iter() {
        let d = pos.distance(other.pos);
        if d >= TRAFFIC_RADIUS {
            continue;
        }
        score -= ctx.params.avoid_weight / d.max(0.5);

        let ahead_before = (other.pos - from).dot(forward) > 0.0;
        let ahead_after = (other.pos - pos).dot(forward) > 0.0;
        if ctx.params.overtaking && ahead_before && !ahead_after {
            score += 6.0;
        }
        // staying in front of a car behind on its line
        if ctx.params.defensive && !ahead_after && (other.pos - pos).cross(forward).abs() < 1.5 {
            score += 3.0;
        }
    }

    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::player::{AiDifficulty, Player, PlayerPars};
    use crate::core::track::tests::rect_track;
    use crate::core::track::SafeZone;
    use approx::assert_relative_eq;

    fn car_at(id: usize, pos: Vec2) -> Car {
        let pars: PlayerPars = serde_json::from_str(r#"{"name": "P", "is_ai": true}"#).unwrap();
        Car::new(id, &Player::new(id, &pars), pos)
    }

    fn straight_target(pos: Vec2) -> RacingLinePoint {
        RacingLinePoint {
            pos,
            target_speed: 5.0,
            brake_zone: false,
            corner_type: CornerType::Straight,
            safe_zone: SafeZone::Left,
        }
    }

    fn context<'a>(track: &'a Track, line: &'a RacingLine, car: &'a Car) -> ScoringContext<'a> {
        ScoringContext {
            track,
            racing_line: line,
            car,
            others: Vec::new(),
            params: DifficultyParams::for_difficulty(AiDifficulty::Medium),
            target: straight_target(Vec2::new(7.0, 24.0)),
            loop_info: None,
        }
    }

    #[test]
    fn forward_beats_standing_still_beats_backward() {
        let track = rect_track();
        let line = RacingLine::from_track(&track).unwrap();
        let car = car_at(0, Vec2::new(7.0, 20.0));
        let ctx = context(&track, &line, &car);
        let from = car.pos;

        let fwd = evaluate(&ctx, from, Vec2::new(7.0, 21.0), Vec2::new(0.0, 1.0), true);
        let zero = evaluate(&ctx, from, from, Vec2::ZERO, true);
        let back = evaluate(&ctx, from, Vec2::new(7.0, 19.0), Vec2::new(0.0, -1.0), true);

        assert!(fwd > zero);
        assert!(zero > back);
    }

    #[test]
    fn wall_proximity_bands() {
        let track = rect_track();
        let line = RacingLine::from_track(&track).unwrap();
        let car = car_at(0, Vec2::new(7.0, 20.0));
        let ctx = context(&track, &line, &car);
        let vel = Vec2::new(0.0, 1.0);

        assert_relative_eq!(boundary_proximity(&ctx, Vec2::new(2.5, 20.0), vel), -90.0);
        assert_relative_eq!(boundary_proximity(&ctx, Vec2::new(3.5, 20.0), vel), -21.0);
        assert_relative_eq!(boundary_proximity(&ctx, Vec2::new(4.5, 20.0), vel), -3.0);
        assert_relative_eq!(boundary_proximity(&ctx, Vec2::new(7.0, 20.0), vel), 0.0);
    }

    #[test]
    fn speeding_into_a_brake_zone_is_penalized() {
        let track = rect_track();
        let line = RacingLine::from_track(&track).unwrap();
        let car = car_at(0, Vec2::new(7.0, 20.0));
        let mut ctx = context(&track, &line, &car);
        let fast = Vec2::new(0.0, 5.0);

        let open_road = speed_band(&ctx, fast);
        ctx.target.brake_zone = true;
        assert!(speed_band(&ctx, fast) < open_road);
    }

    #[test]
    fn moves_that_cannot_brake_before_the_wall_are_penalized() {
        let track = rect_track();
        let line = RacingLine::from_track(&track).unwrap();
        let car = car_at(0, Vec2::new(39.0, 29.0));
        let ctx = context(&track, &line, &car);

        // (43,29) at speed 4 ends at x = 48 after braking, (42,29) at speed 3 stops at x = 45
        assert!(!can_stop(&track, Vec2::new(43.0, 29.0), Vec2::new(4.0, 0.0)));
        assert!(can_stop(&track, Vec2::new(42.0, 29.0), Vec2::new(3.0, 0.0)));
        assert!(boundary_prediction(&ctx, Vec2::new(43.0, 29.0), Vec2::new(4.0, 0.0)) <= -150.0);
        assert_relative_eq!(
            boundary_prediction(&ctx, Vec2::new(42.0, 29.0), Vec2::new(3.0, 0.0)),
            0.0
        );
    }

    #[test]
    fn desired_speed_is_capped_by_the_waypoint() {
        let track = rect_track();
        let line = RacingLine::from_track(&track).unwrap();
        let car = car_at(0, Vec2::new(7.0, 20.0));
        let mut ctx = context(&track, &line, &car);
        ctx.params = DifficultyParams::for_difficulty(AiDifficulty::Hard);

        assert_relative_eq!(ctx.desired_speed(), 5.0);
        ctx.target.target_speed = 2.0;
        assert_relative_eq!(ctx.desired_speed(), 2.0);
    }

    #[test]
    fn loops_are_escaped() {
        let track = rect_track();
        let line = RacingLine::from_track(&track).unwrap();
        let car = car_at(0, Vec2::new(7.0, 20.0));
        let mut ctx = context(&track, &line, &car);
        ctx.loop_info = Some(LoopInfo {
            period: 2,
            positions: vec![Vec2::new(7.0, 20.0), Vec2::new(7.0, 21.0)],
            centroid: Vec2::new(7.0, 20.5),
        });

        let stay = loop_escape(&ctx, car.pos, Vec2::new(7.0, 21.0));
        let leave = loop_escape(&ctx, car.pos, Vec2::new(7.0, 22.0));
        assert!(leave > stay);
        assert!(stay < -100.0);
    }

    #[test]
    fn nearby_cars_are_avoided() {
        let track = rect_track();
        let line = RacingLine::from_track(&track).unwrap();
        let car = car_at(0, Vec2::new(7.0, 20.0));
        let other = car_at(1, Vec2::new(5.0, 22.0));
        let mut ctx = context(&track, &line, &car);
        ctx.others = vec![&other];

        let close = traffic(&ctx, car.pos, Vec2::new(6.0, 22.0));
        let far = traffic(&ctx, car.pos, Vec2::new(8.0, 22.0));
        assert!(close < far);
    }
}
