use crate::ai::scoring::{evaluate, ScoringContext};
use crate::core::motion::{step_options_for, StepOption};
use helpers::geometry::Vec2;
use std::time::Instant;
use tracing::debug;

/// Value of a position from which no move stays on track.
const DEAD_END_VALUE: f64 = -400.0;

/// search returns the discounted value of the best continuation from (pos, vel) over `depth`
/// further plies. Continuations are filtered with the approximate legality check only. Returns
/// None as soon as the deadline has passed.
pub fn search(
    ctx: &ScoringContext,
    pos: Vec2,
    vel: Vec2,
    depth: u32,
    discount: f64,
    deadline: Instant,
) -> Option<f64> {
    if depth == 0 {
        return Some(0.0);
    }
    if Instant::now() > deadline {
        return None;
    }

    let mut best: Option<f64> = None;

    for opt in step_options_for(pos, vel).iter() {
        if !ctx.track.path_roughly_legal(pos, opt.pos) {
            continue;
        }
        let value = evaluate(ctx, pos, opt.pos, opt.vel, false)
            + search(ctx, opt.pos, opt.vel, depth - 1, discount, deadline)?;
        best = Some(best.map_or(value, |b: f64| b.max(value)));
    }

    Some(discount * best.unwrap_or(DEAD_END_VALUE))
}

/// deepen runs the search for every candidate with increasing depth up to `max_depth` and
/// returns the future values of the deepest iteration that completed before the deadline,
/// together with that depth. Returns None if not even depth 1 completed.
pub fn deepen(
    ctx: &ScoringContext,
    candidates: &[StepOption],
    max_depth: u32,
    discount: f64,
    deadline: Instant,
) -> Option<(Vec<f64>, u32)> {
    let mut completed: Option<(Vec<f64>, u32)> = None;

    for depth in 1..=max_depth {
        let values: Option<Vec<f64>> = candidates
            .iter()
            .map(|cand| search(ctx, cand.pos, cand.vel, depth, discount, deadline))
            .collect();

        match values {
            Some(values) => completed = Some((values, depth)),
            None => {
                debug!("Lookahead budget exhausted at depth {}", depth);
                break;
            }
        }
    }

    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::difficulty::DifficultyParams;
    use crate::ai::racing_line::RacingLine;
    use crate::core::car::Car;
    use crate::core::player::{AiDifficulty, Player, PlayerPars};
    use crate::core::track::tests::rect_track;
    use std::time::Duration;

    fn with_context<F: FnOnce(&ScoringContext)>(pos: Vec2, f: F) {
        let track = rect_track();
        let line = RacingLine::from_track(&track).unwrap();
        let pars: PlayerPars = serde_json::from_str(r#"{"name": "P", "is_ai": true}"#).unwrap();
        let car = Car::new(0, &Player::new(0, &pars), pos);
        let target = *line.get_point(line.select_target(&track, pos));
        let ctx = ScoringContext {
            track: &track,
            racing_line: &line,
            car: &car,
            others: Vec::new(),
            params: DifficultyParams::for_difficulty(AiDifficulty::Hard),
            target,
            loop_info: None,
        };
        f(&ctx);
    }

    #[test]
    fn high_speed_towards_a_wall_is_a_bad_future() {
        with_context(Vec2::new(7.0, 27.0), |ctx| {
            let deadline = Instant::now() + Duration::from_secs(10);
            let calm = search(ctx, Vec2::new(7.0, 28.0), Vec2::new(0.0, 1.0), 2, 0.7, deadline);
            let wild = search(ctx, Vec2::new(7.0, 31.0), Vec2::new(0.0, 4.0), 2, 0.7, deadline);
            assert!(calm.unwrap() > wild.unwrap());
        });
    }

    #[test]
    fn expired_deadline_yields_no_result() {
        with_context(Vec2::new(7.0, 20.0), |ctx| {
            let deadline = Instant::now() - Duration::from_millis(1);
            let candidates = step_options_for(Vec2::new(7.0, 20.0), Vec2::ZERO);
            assert!(search(ctx, Vec2::new(7.0, 21.0), Vec2::new(0.0, 1.0), 1, 0.7, deadline)
                .is_none());
            assert!(deepen(ctx, &candidates, 3, 0.7, deadline).is_none());
        });
    }

    #[test]
    fn deepening_reaches_the_depth_limit_with_enough_budget() {
        with_context(Vec2::new(7.0, 20.0), |ctx| {
            let deadline = Instant::now() + Duration::from_secs(30);
            let candidates = step_options_for(Vec2::new(7.0, 20.0), Vec2::ZERO);
            let (values, depth) = deepen(ctx, &candidates, 2, 0.7, deadline).unwrap();
            assert_eq!(depth, 2);
            assert_eq!(values.len(), candidates.len());
        });
    }
}
