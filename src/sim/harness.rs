//! Batch execution: partition games across processes and worker threads,
//! play them, and reduce the results.
//!
//! Each worker owns a `SmallRng` seeded from the batch seed, its rank, and
//! its thread index, so no two workers ever share a random stream and a
//! batch with the same seed, world size, and thread count replays exactly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::cluster::{ChannelGroup, ProcessGroup, SingleProcess};
use super::config::SimulationConfig;
use super::summary::ResultSummary;
use crate::error::{ConfigError, SimError};
use crate::game::{Game, GameResult, Player};
use crate::strategy::StrategyKind;

/// How a batch is split. Both divisions truncate: remainder games are not
/// played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub world_size: usize,
    pub threads: usize,
    pub games_per_process: u32,
    pub games_per_thread: u32,
}

impl Partition {
    pub fn new(num_games: u32, world_size: usize, threads: usize) -> Self {
        let world_size = world_size.max(1);
        let threads = threads.max(1);
        let games_per_process = num_games / world_size as u32;
        let games_per_thread = games_per_process / threads as u32;
        Partition {
            world_size,
            threads,
            games_per_process,
            games_per_thread,
        }
    }

    /// Games actually played across the whole world.
    pub fn games_run(&self) -> u64 {
        self.world_size as u64 * self.threads as u64 * u64::from(self.games_per_thread)
    }

    /// Requested games lost to truncation.
    pub fn dropped(&self, num_games: u32) -> u64 {
        u64::from(num_games).saturating_sub(self.games_run())
    }

    /// Seed of the stream owned by worker `thread` on `rank`.
    pub fn worker_seed(&self, base: u64, rank: usize, thread: usize) -> u64 {
        base.wrapping_add(rank as u64 * u64::from(self.games_per_process))
            .wrapping_add(thread as u64)
    }
}

/// Everything the coordinator knows after a batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub config: SimulationConfig,
    pub partition: Partition,
    /// Every rank's results, concatenated in rank then thread order.
    pub results: Vec<GameResult>,
    pub summary: ResultSummary,
    /// Games finished by the harness that produced the report. In-process
    /// ranks share one harness, so this covers all of them.
    pub games_completed: usize,
}

impl BatchReport {
    pub fn label(&self) -> String {
        self.config.label()
    }

    pub fn to_json(&self) -> serde_json::Value {
        self.summary.to_json(&self.label())
    }
}

/// Per-thread result lists, deposited once each and read back in thread
/// order.
struct ResultSink {
    slots: Mutex<Vec<Vec<GameResult>>>,
}

impl ResultSink {
    fn new(threads: usize) -> Self {
        ResultSink {
            slots: Mutex::new(vec![Vec::new(); threads]),
        }
    }

    fn deposit(&self, thread: usize, results: Vec<GameResult>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots[thread] = results;
    }

    fn concat(self) -> Vec<GameResult> {
        self.slots
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Runs batches for one validated configuration.
pub struct Harness {
    config: SimulationConfig,
    kinds: [StrategyKind; 2],
    threads: usize,
    completed: AtomicUsize,
}

impl Harness {
    /// Validates `config`; nothing runs until [`Harness::run`].
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        let kinds = config.validate()?;
        let threads = config.thread_count();
        Ok(Harness {
            config,
            kinds,
            threads,
            completed: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn partition(&self, world_size: usize) -> Partition {
        Partition::new(self.config.num_games, world_size, self.threads)
    }

    /// Games finished by this harness so far, across all its runs.
    pub fn games_completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Plays this process's share and returns it in thread order.
    pub fn run_local(&self, rank: usize, world_size: usize) -> Result<Vec<GameResult>, SimError> {
        if world_size == 0 {
            return Err(ConfigError::InvalidWorldSize.into());
        }
        if rank >= world_size {
            return Err(ConfigError::InvalidRank { rank, world_size }.into());
        }
        let partition = self.partition(world_size);
        let dropped = partition.dropped(self.config.num_games);
        if rank == 0 && dropped > 0 {
            warn!(
                "{} of {} requested games dropped by partitioning ({} processes x {} threads x {} games)",
                dropped,
                self.config.num_games,
                partition.world_size,
                partition.threads,
                partition.games_per_thread
            );
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(move |i| format!("shutbox-r{rank}-w{i}"))
            .build()?;

        let sink = ResultSink::new(self.threads);
        pool.install(|| {
            (0..self.threads).into_par_iter().for_each(|thread| {
                let results = self.run_worker(&partition, rank, thread);
                sink.deposit(thread, results);
            });
        });
        Ok(sink.concat())
    }

    /// One worker's sequential share.
    fn run_worker(&self, partition: &Partition, rank: usize, thread: usize) -> Vec<GameResult> {
        let seed = partition.worker_seed(self.config.seed, rank, thread);
        let mut rng = SmallRng::seed_from_u64(seed);
        let dice = self.config.dice.sampler();
        let [kind_a, kind_b] = self.kinds;
        let mut a = kind_a.build(rng.gen());
        let mut b = kind_b.build(rng.gen());

        let start = Instant::now();
        let mut results = Vec::with_capacity(partition.games_per_thread as usize);
        for _ in 0..partition.games_per_thread {
            let game = Game::with_update(self.config.mode, self.config.board_update)
                .with_max_turns(self.config.max_turns);
            let result = game.play(a.as_mut(), b.as_mut(), &dice, &mut rng);
            a.record_game(result.scores[0], result.winner == Player::A);
            b.record_game(result.scores[1], result.winner == Player::B);
            results.push(result);
            self.completed.fetch_add(1, Ordering::Relaxed);
        }
        debug!(
            "rank {rank} worker {thread}: {} games in {:.2}s (seed {seed})",
            results.len(),
            start.elapsed().as_secs_f64()
        );
        results
    }

    /// Runs this process's share and takes part in the reduction.
    ///
    /// Returns the report on the coordinator and `None` on other ranks.
    pub fn run(&self, group: &mut dyn ProcessGroup) -> Result<Option<BatchReport>, SimError> {
        let rank = group.rank();
        let world_size = group.world_size();
        let start = Instant::now();
        let local = self.run_local(rank, world_size)?;
        info!(
            "rank {rank}/{world_size}: {} {} games of {} in {:.2}s",
            local.len(),
            self.config.mode,
            self.config.label(),
            start.elapsed().as_secs_f64()
        );

        let Some(results) = group.gather(local)? else {
            return Ok(None);
        };
        let summary = ResultSummary::from_results(&results);
        Ok(Some(BatchReport {
            config: self.config.clone(),
            partition: self.partition(world_size),
            results,
            summary,
            games_completed: self.games_completed(),
        }))
    }
}

/// Runs a whole batch in this process.
pub fn run_single(config: SimulationConfig) -> Result<BatchReport, SimError> {
    let harness = Harness::new(config)?;
    harness
        .run(&mut SingleProcess)?
        .ok_or(SimError::MissingRank(0))
}

/// Runs a batch over `world_size` in-process ranks joined by channels.
pub fn run_local_cluster(config: SimulationConfig, world_size: usize) -> Result<BatchReport, SimError> {
    let harness = Harness::new(config)?;
    let groups = ChannelGroup::create(world_size)?;

    let outcomes: Vec<Result<Option<BatchReport>, SimError>> = std::thread::scope(|s| {
        let handles: Vec<_> = groups
            .into_iter()
            .map(|mut group| {
                let harness = &harness;
                s.spawn(move || harness.run(&mut group))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or(Err(SimError::WorkerPanicked)))
            .collect()
    });

    // A failing worker rank explains the coordinator's missing share.
    let mut report = None;
    let mut coordinator_err = None;
    for (rank, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(Some(r)) => report = Some(r),
            Ok(None) => {}
            Err(e) if rank == 0 => coordinator_err = Some(e),
            Err(e) => return Err(e),
        }
    }
    if let Some(e) = coordinator_err {
        return Err(e);
    }
    report.ok_or(SimError::MissingRank(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameMode;

    fn config(num_games: u32, mode: GameMode, threads: usize) -> SimulationConfig {
        SimulationConfig {
            threads: Some(threads),
            ..SimulationConfig::new(num_games, mode, "Random", "HighestValue", 2024)
        }
    }

    #[test]
    fn partition_even_split() {
        let p = Partition::new(1000, 4, 5);
        assert_eq!(p.games_per_process, 250);
        assert_eq!(p.games_per_thread, 50);
        assert_eq!(p.games_run(), 1000);
        assert_eq!(p.dropped(1000), 0);
    }

    #[test]
    fn partition_drops_remainder() {
        let p = Partition::new(1001, 4, 5);
        assert_eq!(p.games_per_process, 250);
        assert_eq!(p.games_per_thread, 50);
        assert_eq!(p.games_run(), 1000);
        assert_eq!(p.dropped(1001), 1);
    }

    #[test]
    fn partition_too_few_games() {
        let p = Partition::new(3, 1, 4);
        assert_eq!(p.games_per_thread, 0);
        assert_eq!(p.dropped(3), 3);
    }

    #[test]
    fn worker_seeds_are_distinct() {
        let p = Partition::new(1000, 4, 5);
        let mut seeds: Vec<u64> = (0..4)
            .flat_map(|rank| (0..5).map(move |t| p.worker_seed(9, rank, t)))
            .collect();
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 20);
        assert_eq!(p.worker_seed(9, 0, 0), 9);
        assert_eq!(p.worker_seed(9, 2, 3), 9 + 500 + 3);
    }

    #[test]
    fn single_process_plays_requested_games() {
        let report = run_single(config(40, GameMode::Base, 4)).unwrap();
        assert_eq!(report.results.len(), 40);
        assert_eq!(report.summary.games, 40);
        assert_eq!(report.summary.player_a_wins + report.summary.player_b_wins, 40);
        assert_eq!(report.summary.avg_rounds, 5.0);
        assert_eq!(report.games_completed, 40);
    }

    #[test]
    fn harness_counts_completed_games() {
        let harness = Harness::new(config(12, GameMode::Extended, 3)).unwrap();
        let local = harness.run_local(0, 1).unwrap();
        assert_eq!(local.len(), 12);
        assert_eq!(harness.games_completed(), 12);
    }

    #[test]
    fn same_seed_replays_exactly() {
        for mode in [GameMode::Base, GameMode::Extended] {
            let a = run_single(config(60, mode, 3)).unwrap();
            let b = run_single(config(60, mode, 3)).unwrap();
            assert_eq!(a.results, b.results, "{mode}");
        }
    }

    #[test]
    fn extended_batches_finish_for_every_pairing() {
        for a in StrategyKind::ALL {
            for b in StrategyKind::ALL {
                let cfg = SimulationConfig {
                    threads: Some(2),
                    ..SimulationConfig::new(6, GameMode::Extended, a.name(), b.name(), 17)
                };
                let report = run_single(cfg).unwrap();
                assert_eq!(report.results.len(), 6, "{a} vs {b}");
                assert!(report
                    .results
                    .iter()
                    .all(|r| r.rounds_played <= crate::game::DEFAULT_MAX_TURNS));
            }
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let a = run_single(config(60, GameMode::Base, 2)).unwrap();
        let b = run_single(SimulationConfig {
            seed: 77,
            ..config(60, GameMode::Base, 2)
        })
        .unwrap();
        assert_ne!(a.results, b.results);
    }

    #[test]
    fn cluster_matches_rank_by_rank_local_runs() {
        let cfg = config(48, GameMode::Base, 2);
        let report = run_local_cluster(cfg.clone(), 3).unwrap();
        assert_eq!(report.results.len(), 48);
        assert_eq!(report.partition.games_per_thread, 8);
        assert_eq!(report.games_completed, 48);

        let harness = Harness::new(cfg).unwrap();
        let mut expected = Vec::new();
        for rank in 0..3 {
            expected.extend(harness.run_local(rank, 3).unwrap());
        }
        assert_eq!(report.results, expected);
    }

    #[test]
    fn cluster_with_remainder() {
        let report = run_local_cluster(config(1001, GameMode::Base, 5), 4).unwrap();
        assert_eq!(report.results.len(), 1000);
        assert_eq!(report.partition.dropped(1001), 1);
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let cfg = SimulationConfig::new(10, GameMode::Base, "Nope", "Random", 1);
        assert!(matches!(
            run_single(cfg),
            Err(SimError::Config(ConfigError::UnknownStrategy(_)))
        ));
    }

    #[test]
    fn bad_rank_is_rejected() {
        let harness = Harness::new(config(10, GameMode::Base, 1)).unwrap();
        assert!(matches!(
            harness.run_local(2, 2),
            Err(SimError::Config(ConfigError::InvalidRank { rank: 2, world_size: 2 }))
        ));
        assert_eq!(harness.games_completed(), 0);
    }

    #[test]
    fn atomic_boards_match_sequential() {
        let seq = run_single(config(30, GameMode::Base, 2)).unwrap();
        let atomic = run_single(SimulationConfig {
            board_update: crate::game::BoardUpdate::Atomic,
            ..config(30, GameMode::Base, 2)
        })
        .unwrap();
        assert_eq!(seq.results, atomic.results);
    }
}
