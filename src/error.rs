//! Error types.
//!
//! Configuration problems are reported before any game is played. Everything
//! else is a fatal batch failure: thread pool or worker process startup,
//! and result collection from other ranks.

use std::io;
use std::process::ExitStatus;

/// Invalid simulation configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown strategy: '{0}'")]
    UnknownStrategy(String),

    #[error("invalid game mode: '{0}' (expected 'base' or 'extended')")]
    InvalidMode(String),

    #[error("invalid dice model: '{0}' (expected 'two_dice' or 'weighted')")]
    InvalidDiceModel(String),

    #[error("game count must be positive")]
    NonPositiveGameCount,

    #[error("world size must be at least 1")]
    InvalidWorldSize,

    #[error("rank {rank} is outside a world of size {world_size}")]
    InvalidRank { rank: usize, world_size: usize },

    #[error("thread count must be at least 1")]
    ZeroThreads,

    #[error("extended-mode turn limit must be at least 1")]
    ZeroTurnLimit,

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors that abort a simulation batch.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to start worker thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to spawn worker process: {0}")]
    Spawn(#[source] io::Error),

    #[error("i/o error talking to rank {rank}: {source}")]
    WorkerIo {
        rank: usize,
        #[source]
        source: io::Error,
    },

    #[error("rank {rank} exited with {status}")]
    WorkerFailed { rank: usize, status: ExitStatus },

    #[error("could not decode results from rank {rank}: {source}")]
    Decode {
        rank: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("rank {0} never delivered its results")]
    MissingRank(usize),

    #[error("a simulation worker panicked")]
    WorkerPanicked,
}
