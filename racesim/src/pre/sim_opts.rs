use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[clap(
    version = "0.1.0",
    name = "gridrace",
    about = "A turn-based grid racing game with computer opponents"
)]
pub struct SimOpts {
    // FLAGS ---------------------------------------------------------------------------------------
    /// Activate debug printing of every turn
    #[clap(short, long)]
    pub debug: bool,

    /// Let the AI drive all cars, including those of human players
    #[clap(short, long)]
    pub autopilot: bool,

    /// Stream turn snapshots to a watcher thread that prints the car positions
    #[clap(short, long)]
    pub watch: bool,

    // OPTIONS -------------------------------------------------------------------------------------
    /// Set number of race runs, more than one run implies autopilot and runs in parallel
    #[clap(short, long, default_value = "1")]
    pub no_sim_runs: u32,

    /// Set path to the simulation parameter file
    #[clap(short, long)]
    pub parfile_path: PathBuf,

    /// Stop the race after this many moves
    #[clap(short, long, default_value = "2000")]
    pub max_turns: u32,

    /// Override the random seed of the AI
    #[clap(short, long)]
    pub seed: Option<u64>,

    /// Set path of the result CSV file (default: output/last_run.csv)
    #[clap(short, long)]
    pub output_path: Option<PathBuf>,

    /// Delay between two AI moves in milliseconds
    #[clap(long, default_value = "0")]
    pub ai_delay_ms: u64,
}
