use crate::ai::AiEngine;
use crate::core::race::{GameState, RaceEvent};
use crate::core::session::Session;
use crate::core::track::Track;
use crate::interfaces::render_interface::TurnSnapshot;
use crate::post::race_result::RaceResult;
use crate::pre::read_racing_line::read_racing_line;
use crate::pre::read_sim_pars::SimPars;
use anyhow::Context;
use flume::Sender;
use helpers::geometry::Vec2;
use std::thread::sleep;
use std::time::Duration;
use tracing::{info, warn};

/// Input of a local human player for one turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    Accelerate(Vec2),
    Undo,
    Quit,
}

/// * `max_turns` - Stop the race after this many moves
/// * `print_debug` - Print every move to the console
/// * `autopilot` - Let the AI drive the cars of human players as well
/// * `ai_move_delay` - Pause after every AI move, e.g. to follow the race in a watcher
#[derive(Debug, Clone)]
pub struct RunOpts {
    pub max_turns: u32,
    pub print_debug: bool,
    pub autopilot: bool,
    pub ai_move_delay: Duration,
}

impl Default for RunOpts {
    fn default() -> Self {
        RunOpts {
            max_turns: 2000,
            print_debug: false,
            autopilot: false,
            ai_move_delay: Duration::ZERO,
        }
    }
}

/// handle_race creates a race on the basis of the inserted parameters, plays it until all cars
/// are out or finished (or the turn limit is hit) and returns the results for post-processing.
/// Moves of human players are requested from `human_input`. If a sender is inserted, a snapshot
/// is sent after every move and once more with the final result.
pub fn handle_race(
    sim_pars: &SimPars,
    run_opts: &RunOpts,
    human_input: &mut dyn FnMut(&GameState) -> PlayerCommand,
    tx: Option<&Sender<TurnSnapshot>>,
) -> anyhow::Result<RaceResult> {
    if sim_pars.player_pars_all.is_empty() {
        anyhow::bail!("At least one player is required to start a race!");
    }

    // create track and racing line
    let track = Track::new(&sim_pars.track_pars).context(format!(
        "Invalid geometry of track {}!",
        sim_pars.track_pars.name
    ))?;
    let racing_line = match &sim_pars.track_pars.racing_line_file {
        Some(filepath) => Some(read_racing_line(filepath)?),
        None => None,
    };

    let mut player_pars_all = sim_pars.player_pars_all.to_owned();
    if run_opts.autopilot {
        for player_pars in player_pars_all.iter_mut() {
            player_pars.is_ai = true;
        }
    }

    let state = GameState::new(&sim_pars.race_pars, track, racing_line, &player_pars_all)
        .context("Failed to set up the starting grid!")?;
    let mut session = Session::new(state, sim_pars.race_pars.history_depth);
    let mut ai_engine = AiEngine::new(&sim_pars.ai_pars);

    // events of the race, event_marks[i] is the number of events before move i
    let mut events: Vec<RaceEvent> = Vec::new();
    let mut event_marks: Vec<usize> = Vec::new();

    if let Some(tx) = tx {
        tx.send(TurnSnapshot::from_state(session.get_state())?)
            .context("Failed to send turn snapshot!")?;
    }

    while !session.get_state().game_finished() && session.get_state().turn < run_opts.max_turns {
        let state = session.get_state();
        let (car_id, is_ai) = match state.get_active_player() {
            Some(player) => (player.id, player.is_ai()),
            None => break,
        };

        let acc = if is_ai {
            let acc = match ai_engine.choose_move(state) {
                Some(acc) => acc,
                None => {
                    warn!("Car {} is boxed in, holding its course", car_id);
                    Vec2::ZERO
                }
            };
            if !run_opts.ai_move_delay.is_zero() {
                sleep(run_opts.ai_move_delay);
            }
            acc
        } else {
            match human_input(state) {
                PlayerCommand::Accelerate(acc) => acc,
                PlayerCommand::Undo => {
                    if session.undo() {
                        if let Some(mark) = event_marks.pop() {
                            events.truncate(mark);
                        }
                        ai_engine.get_memory_mut().clear();
                        info!("Move undone, back to turn {}", session.get_state().turn);
                    }
                    continue;
                }
                PlayerCommand::Quit => {
                    info!("Race aborted by player {}", car_id);
                    break;
                }
            }
        };

        event_marks.push(events.len());
        let state = session.play(acc);
        events.extend(state.last_events.iter().cloned());

        if run_opts.print_debug {
            let car = &state.cars_list[car_id];
            println!(
                "INFO: Turn {:4}: {} acc ({:2}, {:2}) -> pos ({}, {}), vel ({}, {}), lap {}",
                state.turn,
                car.name,
                acc.x,
                acc.y,
                car.pos.x,
                car.pos.y,
                car.vel.x,
                car.vel.y,
                car.current_lap
            );
        }

        if let Some(tx) = tx {
            tx.send(TurnSnapshot::from_state(state)?)
                .context("Failed to send turn snapshot!")?;
        }
    }

    let result = RaceResult::from_state(session.get_state(), events);

    // send final result once
    if let Some(tx) = tx {
        let mut final_msg = TurnSnapshot::from_state(session.get_state())?;
        final_msg.final_result = Some(result.to_owned());
        tx.send(final_msg)
            .context("Failed to send final race result!")?;
    }

    Ok(result)
}
