//! shutbox -- run one simulation batch and print its summary as JSON.
//!
//! With `--processes N` (N > 1) this binary becomes rank 0 of an N-process
//! world: it re-launches itself N - 1 times with hidden `--rank`/`--world-size`
//! flags, plays its own share, and collects the workers' results.

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use flexi_logger::Logger;
use log::{debug, info};

use shutbox::board::DiceModel;
use shutbox::game::{BoardUpdate, GameMode, DEFAULT_MAX_TURNS};
use shutbox::sim::{
    BatchReport, Harness, ProcessGroup, SimulationConfig, SingleProcess, StdoutWorker,
    SubprocessGroup,
};

#[derive(Parser, Debug)]
#[command(name = "shutbox", version, about = "Parallel shut-the-box simulation")]
struct Cli {
    /// Total games across every process
    #[arg(short = 'g', long, default_value_t = 10_000)]
    games: u32,

    /// Rule mode: base or extended
    #[arg(short, long, default_value = "base")]
    mode: String,

    /// Strategy in seat A
    #[arg(short = 'a', long, default_value = "Random")]
    strategy_a: String,

    /// Strategy in seat B
    #[arg(short = 'b', long, default_value = "HighestValue")]
    strategy_b: String,

    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Worker threads per process (default: all cores)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Number of processes to spread the batch over
    #[arg(short, long, default_value_t = 1)]
    processes: usize,

    /// Roll sampler: two_dice or weighted
    #[arg(long, default_value = "two_dice")]
    dice: String,

    /// Apply Base-mode moves through a compare-and-swap board
    #[arg(long, default_value_t = false)]
    atomic_boards: bool,

    /// Extended-mode turn limit per game
    #[arg(long, default_value_t = DEFAULT_MAX_TURNS)]
    max_turns: u32,

    /// JSON configuration file; replaces the game flags above
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the summary here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, hide = true)]
    rank: Option<usize>,

    #[arg(long, hide = true)]
    world_size: Option<usize>,
}

impl Cli {
    fn simulation_config(&self) -> Result<SimulationConfig, Box<dyn Error>> {
        if let Some(path) = &self.config {
            let text = fs::read_to_string(path)?;
            return Ok(SimulationConfig::from_json(&text)?);
        }
        Ok(SimulationConfig {
            num_games: self.games,
            mode: self.mode.parse::<GameMode>()?,
            strategy_names: [self.strategy_a.clone(), self.strategy_b.clone()],
            seed: self.seed,
            threads: self.threads,
            dice: self.dice.parse::<DiceModel>()?,
            board_update: if self.atomic_boards {
                BoardUpdate::Atomic
            } else {
                BoardUpdate::Sequential
            },
            max_turns: self.max_turns,
        })
    }
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

    let config = cli.simulation_config()?;
    let harness = Harness::new(config)?;

    if let Some(rank) = cli.rank {
        let world_size = cli.world_size.unwrap_or(cli.processes);
        let mut worker = StdoutWorker::new(rank, world_size)?;
        debug!("rank {rank}/{world_size} starting");
        harness.run(&mut worker)?;
        return Ok(());
    }

    let report = if cli.processes > 1 {
        let program = std::env::current_exe()?;
        let args = std::env::args_os().skip(1);
        let mut group = SubprocessGroup::spawn(&program, args, cli.processes)?;
        coordinate(&harness, &mut group)?
    } else {
        coordinate(&harness, &mut SingleProcess)?
    };

    report.summary.log(&report.label());
    let json = serde_json::to_string_pretty(&report.to_json())?;
    match &cli.output {
        Some(path) => {
            fs::write(path, json + "\n")?;
            info!("wrote summary to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn coordinate(harness: &Harness, group: &mut dyn ProcessGroup) -> Result<BatchReport, Box<dyn Error>> {
    match harness.run(group)? {
        Some(report) => Ok(report),
        None => Err("rank 0 finished without a report".into()),
    }
}
