//! Round-robin tournament CLI.
//!
//! Plays every pairing of the chosen strategies in both rule modes and prints
//! the per-pairing results as JSON keyed `"<A>_vs_<B>"`.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use flexi_logger::Logger;
use log::info;

use shutbox::board::DiceModel;
use shutbox::game::DEFAULT_MAX_TURNS;
use shutbox::sim::{run_tournament, TournamentConfig};
use shutbox::strategy::StrategyKind;

#[derive(Parser, Debug)]
#[command(name = "tournament", about = "Play every strategy pairing in both modes")]
struct Cli {
    /// Games per pairing and mode
    #[arg(short = 'g', long, default_value_t = 10_000)]
    games: u32,

    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Worker threads (default: all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Comma-separated entrants (default: every built-in strategy)
    #[arg(long, value_delimiter = ',')]
    strategies: Vec<String>,

    /// Roll sampler: two_dice or weighted
    #[arg(long, default_value = "two_dice")]
    dice: String,

    /// Extended-mode turn limit per game
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    max_turns: u32,

    /// Write the results here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let _logger = Logger::try_with_env_or_str(&cli.log_level)?.start()?;

    let strategies = if cli.strategies.is_empty() {
        StrategyKind::ALL.to_vec()
    } else {
        cli.strategies
            .iter()
            .map(|s| s.trim().parse::<StrategyKind>())
            .collect::<Result<Vec<_>, _>>()?
    };
    let config = TournamentConfig {
        games_per_matchup: cli.games,
        seed: cli.seed,
        threads: cli.threads,
        strategies,
        dice: cli.dice.parse::<DiceModel>()?,
        max_turns: cli.max_turns,
        ..Default::default()
    };

    let start = Instant::now();
    let report = run_tournament(&config)?;
    info!(
        "{} pairings in {:.1}s",
        report.len(),
        start.elapsed().as_secs_f64()
    );

    let json = serde_json::to_string_pretty(&report)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, json + "\n")?;
            info!("wrote results to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
