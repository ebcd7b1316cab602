use clap::Parser;
use helpers::geometry::Vec2;
use racesim::core::handle_race::{handle_race, PlayerCommand, RunOpts};
use racesim::core::motion::legal_step_options;
use racesim::core::race::GameState;
use racesim::interfaces::render_interface::TurnSnapshot;
use racesim::post::race_result::RaceResult;
use racesim::pre::read_sim_pars::{read_sim_pars, SimPars};
use racesim::pre::sim_opts::SimOpts;
use rayon::prelude::*;
use std::io::{self, BufRead, Write};
use std::thread;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// numpad_acc maps a numpad digit onto an acceleration, 5 keeps the current velocity. The
/// y axis points down the screen, i.e. 8 decelerates in y.
fn numpad_acc(digit: char) -> Option<Vec2> {
    let (x, y) = match digit {
        '7' => (-1.0, -1.0),
        '8' => (0.0, -1.0),
        '9' => (1.0, -1.0),
        '4' => (-1.0, 0.0),
        '5' => (0.0, 0.0),
        '6' => (1.0, 0.0),
        '1' => (-1.0, 1.0),
        '2' => (0.0, 1.0),
        '3' => (1.0, 1.0),
        _ => return None,
    };
    Some(Vec2::new(x, y))
}

/// read_human_command prompts the active player on stdin until a valid command is entered.
/// A closed stdin ends the race.
fn read_human_command(state: &GameState) -> PlayerCommand {
    let car = match state.get_active_car() {
        Some(car) => car,
        None => return PlayerCommand::Quit,
    };
    let no_legal = legal_step_options(state).len();
    let stdin = io::stdin();

    loop {
        print!(
            "INPUT: {} at ({}, {}) with velocity ({}, {}), lap {}/{}, {} legal moves. Move [1-9], undo [u], quit [q]: ",
            car.name,
            car.pos.x,
            car.pos.y,
            car.vel.x,
            car.vel.y,
            car.current_lap,
            state.target_laps,
            no_legal
        );
        let _ = io::stdout().flush();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => return PlayerCommand::Quit,
            Ok(_) => {}
        }

        match line.trim() {
            "u" => return PlayerCommand::Undo,
            "q" => return PlayerCommand::Quit,
            input => {
                if let Some(acc) = input.chars().next().and_then(numpad_acc) {
                    if input.len() == 1 {
                        return PlayerCommand::Accelerate(acc);
                    }
                }
                println!("WARNING: Invalid input {:?}!", input);
            }
        }
    }
}

/// watch_race prints the received snapshots until the final result arrives.
fn watch_race(rx: flume::Receiver<TurnSnapshot>) {
    for snapshot in rx.iter() {
        if snapshot.final_result.is_some() {
            println!("INFO: Watcher received the final result after {} moves", snapshot.turn);
            break;
        }
        let positions: Vec<String> = snapshot
            .car_states
            .iter()
            .map(|car_state| {
                format!(
                    "{} ({}, {}) {:?}",
                    car_state.name, car_state.pos.x, car_state.pos.y, car_state.status
                )
            })
            .collect();
        println!("INFO: Turn {:4} | {}", snapshot.turn, positions.join(" | "));
    }
}

fn run_single(sim_opts: &SimOpts, sim_pars: &SimPars, run_opts: &RunOpts) -> anyhow::Result<()> {
    let t_start = Instant::now();

    let race_result = if sim_opts.watch {
        let (tx, rx) = flume::unbounded();
        let watcher = thread::spawn(move || watch_race(rx));
        let race_result = handle_race(sim_pars, run_opts, &mut read_human_command, Some(&tx))?;
        drop(tx);
        if watcher.join().is_err() {
            println!("WARNING: Watcher thread panicked!");
        }
        race_result
    } else {
        handle_race(sim_pars, run_opts, &mut read_human_command, None)?
    };

    println!(
        "INFO: Execution time: {}ms",
        t_start.elapsed().as_millis()
    );

    race_result.print_leaderboard();
    let out_path = race_result.write_leaderboard_csv(sim_opts.output_path.as_deref())?;
    println!("INFO: Leaderboard written to {}", out_path);

    Ok(())
}

fn run_batch(sim_opts: &SimOpts, sim_pars: &SimPars, run_opts: &RunOpts) -> anyhow::Result<()> {
    println!(
        "INFO: Running {} races in parallel on autopilot...",
        sim_opts.no_sim_runs
    );
    let t_start = Instant::now();
    let run_opts = RunOpts {
        autopilot: true,
        ..run_opts.to_owned()
    };

    let race_results: Vec<anyhow::Result<RaceResult>> = (0..sim_opts.no_sim_runs)
        .into_par_iter()
        .map(|run| {
            let mut sim_pars_run = sim_pars.to_owned();
            sim_pars_run.ai_pars.seed = sim_pars.ai_pars.seed + run as u64;
            handle_race(
                &sim_pars_run,
                &run_opts,
                &mut |_: &GameState| PlayerCommand::Quit,
                None,
            )
        })
        .collect();

    println!(
        "INFO: Execution time: {}ms",
        t_start.elapsed().as_millis()
    );

    for (run, race_result) in race_results.into_iter().enumerate() {
        let race_result = race_result?;
        match race_result.leaderboard.first() {
            Some(winner) => println!(
                "RESULT: Run {:3}: {} leads with {} laps after {} moves",
                run, winner.name, winner.laps, race_result.turns
            ),
            None => println!("RESULT: Run {:3}: no cars", run),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // PRE-PROCESSING ------------------------------------------------------------------------------
    // get simulation options from the command line arguments
    let sim_opts: SimOpts = SimOpts::parse();

    // get simulation parameters
    println!(
        "INFO: Reading simulation parameters from {:?}",
        sim_opts.parfile_path
    );
    let mut sim_pars = read_sim_pars(&sim_opts.parfile_path)?;
    if let Some(seed) = sim_opts.seed {
        sim_pars.ai_pars.seed = seed;
    }

    // print race details
    println!(
        "INFO: Racing {} laps on track {} with {} players",
        sim_pars.race_pars.target_laps,
        sim_pars.track_pars.name,
        sim_pars.player_pars_all.len()
    );

    let run_opts = RunOpts {
        max_turns: sim_opts.max_turns,
        print_debug: sim_opts.debug,
        autopilot: sim_opts.autopilot,
        ai_move_delay: Duration::from_millis(sim_opts.ai_delay_ms),
    };

    // EXECUTION -----------------------------------------------------------------------------------
    if sim_opts.no_sim_runs > 1 {
        run_batch(&sim_opts, &sim_pars, &run_opts)
    } else {
        run_single(&sim_opts, &sim_pars, &run_opts)
    }
}
