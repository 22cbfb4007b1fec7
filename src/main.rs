//! Track Pilot entry point
//!
//! Headless evaluation: spawn a seeded population of feed-forward drivers,
//! run one episode, print the ranked report as JSON.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use track_pilot::sim::{Episode, Track};
use track_pilot::{FeedForward, SimulationConfig};

#[derive(Parser, Debug)]
#[command(name = "track-pilot")]
#[command(about = "Evaluate a seeded population of drivers on a track", long_about = None)]
#[command(version)]
struct Args {
    /// Track JSON file (built-in concentric rectangles if omitted)
    #[arg(value_name = "TRACK")]
    track: Option<PathBuf>,

    /// Simulation config JSON file
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Number of cars in the episode
    #[arg(short, long, default_value_t = 50)]
    pilots: usize,

    /// Seed of the first pilot; pilot `i` uses `seed + i`
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Hidden layer width of each driver network
    #[arg(long, default_value_t = 6)]
    hidden: usize,

    /// Replay a single car with the champion preset
    #[arg(long)]
    champion: bool,
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let track = match &args.track {
        Some(path) => Track::load(path)?,
        None => {
            log::info!("No track given, using the built-in concentric rectangles");
            Track::concentric_rectangles()
        }
    };

    let config = match (&args.config, args.champion) {
        (Some(path), _) => SimulationConfig::load(path)?,
        (None, true) => SimulationConfig::champion_replay(),
        (None, false) => SimulationConfig::default(),
    };

    // A champion replay drives a single car
    let pilots = if args.champion { 1 } else { args.pilots };

    let mut episode = Episode::new(&track, config)?;
    for i in 0..pilots {
        episode.add_pilot(FeedForward::from_seed(args.seed.wrapping_add(i as u64), &[args.hidden]));
    }

    let report = episode.run();
    if let Some(best) = report.best() {
        log::info!(
            "Best pilot {} (seed {}): fitness {}, {} gates",
            best.id,
            args.seed.wrapping_add(best.id as u64),
            best.fitness,
            best.gates
        );
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    log::info!("Track Pilot starting...");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
