use helpers::geometry::Vec2;
use racesim::ai::{AiEngine, AiPars};
use racesim::core::car::CarStatus;
use racesim::core::lap_validation::CheckpointState;
use racesim::core::motion::legal_step_options;
use racesim::core::player::PlayerPars;
use racesim::core::race::{GameState, RacePars};
use racesim::core::track::{Track, TrackPars};

fn rect_track() -> Track {
    let track_pars: TrackPars = serde_json::from_str(
        r#"{
            "name": "rect",
            "outer": [{"x": 2, "y": 2}, {"x": 48, "y": 2}, {"x": 48, "y": 33}, {"x": 2, "y": 33}],
            "inner": [{"x": 12, "y": 10}, {"x": 38, "y": 10}, {"x": 38, "y": 25}, {"x": 12, "y": 25}],
            "start": {"a": {"x": 2, "y": 18}, "b": {"x": 12, "y": 18}}
        }"#,
    )
    .unwrap();
    Track::new(&track_pars).unwrap()
}

fn race_pars(target_laps: u32, collisions: bool) -> RacePars {
    serde_json::from_str(&format!(
        r#"{{"target_laps": {}, "collisions": {{"enabled": {}}}}}"#,
        target_laps, collisions
    ))
    .unwrap()
}

fn ai_players(difficulties: &[&str]) -> Vec<PlayerPars> {
    difficulties
        .iter()
        .enumerate()
        .map(|(i, d)| {
            serde_json::from_str(&format!(
                r#"{{"name": "Bot{}", "is_ai": true, "ai_difficulty": "{}"}}"#,
                i, d
            ))
            .unwrap()
        })
        .collect()
}

fn engine(seed: u64) -> AiEngine {
    AiEngine::new(&AiPars {
        seed,
        lookahead_budget_ms: 5_000,
        ..AiPars::default()
    })
}

#[test]
fn grid_move_and_forward_lap_completion() {
    let human: PlayerPars = serde_json::from_str(r#"{"name": "Ann"}"#).unwrap();
    let state = GameState::new(&race_pars(3, false), rect_track(), None, &[human]).unwrap();

    let state = state.apply_move(Vec2::new(0.0, 1.0));
    assert_eq!(state.cars_list[0].pos, Vec2::new(7.0, 21.0));
    assert_eq!(state.cars_list[0].vel, Vec2::new(0.0, 1.0));

    let mut state = state;
    state.cars_list[0].pos = Vec2::new(7.0, 17.0);
    state.cars_list[0].checkpoint_state = CheckpointState {
        checkpoints_passed: [true; 4],
        last_valid_checkpoint: 3,
    };
    let state = state.apply_move(Vec2::new(0.0, 1.0));
    assert_eq!(state.cars_list[0].pos, Vec2::new(7.0, 19.0));
    assert_eq!(state.cars_list[0].current_lap, 1);
}

/// Lets a single AI car without score jitter race on its own and returns the final state.
fn solo_race(difficulty: &str, target_laps: u32, max_turns: u32) -> GameState {
    let mut state = GameState::new(
        &race_pars(target_laps, false),
        rect_track(),
        None,
        &ai_players(&[difficulty]),
    )
    .unwrap();
    let mut ai_engine = AiEngine::new(&AiPars {
        jitter: false,
        lookahead_budget_ms: 60_000,
        ..AiPars::default()
    });

    while !state.game_finished() && state.turn < max_turns {
        let acc = ai_engine.choose_move(&state).unwrap_or(Vec2::ZERO);
        state = state.apply_move(acc);
    }
    state
}

#[test]
fn solo_ai_cars_of_every_tier_finish_the_race() {
    for difficulty in ["easy", "medium", "hard"] {
        let state = solo_race(difficulty, 2, 300);
        let car = &state.cars_list[0];

        assert!(!car.crashed, "{} car crashed at {:?}", difficulty, car.pos);
        assert!(car.finished, "{} car did not finish", difficulty);
        assert_eq!(car.current_lap, 2);
        assert_eq!(car.finish_time, Some(state.turn));
        assert!(state.game_finished());
    }
}

#[test]
fn harder_tiers_finish_a_lap_sooner() {
    let easy = solo_race("easy", 1, 200).turn;
    let hard = solo_race("hard", 1, 200).turn;
    assert!(hard < easy);
}

#[test]
fn ai_only_crashes_when_boxed_in_and_never_idles() {
    for (seed, collisions) in [(1, false), (2, true), (3, true)] {
        let mut state = GameState::new(
            &race_pars(1, collisions),
            rect_track(),
            None,
            &ai_players(&["easy", "medium", "hard"]),
        )
        .unwrap();
        let mut ai_engine = engine(seed);

        for _ in 0..90 {
            if state.game_finished() {
                break;
            }
            let legal = legal_step_options(&state);
            let idx = state.current_player_idx;
            let acc = ai_engine.choose_move(&state);

            match acc {
                Some(acc) => {
                    let car = &state.cars_list[idx];
                    let chosen = legal
                        .iter()
                        .find(|opt| opt.acc == acc)
                        .expect("AI picked an illegal move");
                    // standing still only if nothing else is legal
                    if chosen.vel.is_zero() {
                        assert!(legal.iter().all(|opt| opt.vel.is_zero()));
                    }
                    assert!(state.track.path_legal(car.pos, chosen.pos));
                }
                None => assert!(legal.is_empty()),
            }

            state = state.apply_move(acc.unwrap_or(Vec2::ZERO));
            if state.cars_list[idx].crashed {
                assert!(legal.is_empty());
            }
        }

        // every car that is still running lies inside the band
        for car in state.cars_list.iter() {
            if car.get_status() != CarStatus::Crashed {
                assert!(state.track.contains(car.pos));
            }
        }
    }
}

#[test]
fn ai_cars_leave_the_grid_in_racing_direction() {
    let mut state = GameState::new(
        &race_pars(1, true),
        rect_track(),
        None,
        &ai_players(&["medium", "hard"]),
    )
    .unwrap();
    let mut ai_engine = engine(11);

    for _ in 0..20 {
        let acc = ai_engine.choose_move(&state).unwrap_or(Vec2::ZERO);
        state = state.apply_move(acc);
    }

    // on the left side of the circuit racing direction is +y
    for car in state.cars_list.iter() {
        assert!(car.pos.y > 20.0 || car.pos.x > 12.0);
    }
}

#[test]
fn scheduler_skips_inactive_cars_and_race_ends_when_all_are_out() {
    let players = ai_players(&["easy", "easy", "easy"]);
    let mut state = GameState::new(&race_pars(1, false), rect_track(), None, &players).unwrap();
    state.cars_list[1].crashed = true;

    let state = state.apply_move(Vec2::new(0.0, 1.0));
    assert_eq!(state.current_player_idx, 2);

    let mut state = state;
    state.cars_list[0].finished = true;
    state.cars_list[2].vel = Vec2::new(-9.0, 0.0);
    let state = state.apply_move(Vec2::ZERO);
    assert!(state.cars_list[2].crashed);
    assert!(state.game_finished());
    assert!(state.get_active_car().is_none());
}
