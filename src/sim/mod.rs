//! Batch simulation.
//!
//! Splits a batch of games over processes and worker threads, plays them,
//! and gathers the results on rank 0 for aggregation.

pub mod cluster;
pub mod config;
pub mod harness;
pub mod subprocess;
pub mod summary;
pub mod tournament;

pub use cluster::{ChannelGroup, ProcessGroup, SingleProcess};
pub use config::SimulationConfig;
pub use harness::{run_local_cluster, run_single, BatchReport, Harness, Partition};
pub use subprocess::{read_results, write_results, StdoutWorker, SubprocessGroup};
pub use summary::{matchup_label, ResultSummary};
pub use tournament::{
    run_tournament, BaseGameStats, ExtendedGameStats, MatchupReport, TournamentConfig,
    TournamentReport,
};
