//! Ranks as OS processes.
//!
//! The coordinator re-launches the current binary once per extra rank with
//! `--rank <r> --world-size <n>` appended. Each worker runs its share and
//! writes its results to stdout as one JSON array; the coordinator reads
//! them back in rank order.

use std::ffi::OsString;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};

use log::{debug, warn};

use super::cluster::{concat_in_rank_order, ProcessGroup};
use crate::error::{ConfigError, SimError};
use crate::game::GameResult;

/// Writes a result list in the worker wire format.
pub fn write_results<W: Write>(out: &mut W, results: &[GameResult]) -> io::Result<()> {
    serde_json::to_writer(&mut *out, results)?;
    writeln!(out)?;
    out.flush()
}

/// Reads a result list written by [`write_results`].
pub fn read_results<R: Read>(input: R, rank: usize) -> Result<Vec<GameResult>, SimError> {
    serde_json::from_reader(input).map_err(|source| SimError::Decode { rank, source })
}

/// Coordinator side: owns the spawned worker processes.
pub struct SubprocessGroup {
    world_size: usize,
    /// `children[i]` runs rank `i + 1`.
    children: Vec<Child>,
}

impl SubprocessGroup {
    /// Launches `world_size - 1` copies of `program` with `args`.
    pub fn spawn<I, S>(program: &Path, args: I, world_size: usize) -> Result<Self, SimError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        if world_size == 0 {
            return Err(ConfigError::InvalidWorldSize.into());
        }
        let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
        let mut group = SubprocessGroup {
            world_size,
            children: Vec::with_capacity(world_size - 1),
        };
        for rank in 1..world_size {
            let child = Command::new(program)
                .args(&args)
                .arg("--rank")
                .arg(rank.to_string())
                .arg("--world-size")
                .arg(world_size.to_string())
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .spawn()
                .map_err(SimError::Spawn)?;
            debug!("spawned rank {rank} as pid {}", child.id());
            group.children.push(child);
        }
        Ok(group)
    }
}

impl ProcessGroup for SubprocessGroup {
    fn rank(&self) -> usize {
        0
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn gather(&mut self, local: Vec<GameResult>) -> Result<Option<Vec<GameResult>>, SimError> {
        let mut shares = Vec::with_capacity(self.world_size);
        shares.push(Some(local));
        // A child leaves `children` only once reaped; on error the rest stay
        // behind for `Drop` to stop.
        for rank in 1..self.world_size {
            let Some(child) = self.children.first_mut() else {
                return Err(SimError::MissingRank(rank));
            };
            let mut output = Vec::new();
            if let Some(mut stdout) = child.stdout.take() {
                stdout
                    .read_to_end(&mut output)
                    .map_err(|source| SimError::WorkerIo { rank, source })?;
            }
            let status = child
                .wait()
                .map_err(|source| SimError::WorkerIo { rank, source })?;
            self.children.remove(0);
            if !status.success() {
                return Err(SimError::WorkerFailed { rank, status });
            }
            shares.push(Some(read_results(output.as_slice(), rank)?));
        }
        concat_in_rank_order(shares).map(Some)
    }
}

impl Drop for SubprocessGroup {
    fn drop(&mut self) {
        // Only reached with children left if the batch failed early.
        for child in &mut self.children {
            if let Err(e) = child.kill() {
                warn!("failed to stop worker pid {}: {e}", child.id());
            }
            let _ = child.wait();
        }
    }
}

/// Worker side: a non-zero rank reporting through stdout.
#[derive(Debug, Clone, Copy)]
pub struct StdoutWorker {
    rank: usize,
    world_size: usize,
}

impl StdoutWorker {
    pub fn new(rank: usize, world_size: usize) -> Result<Self, ConfigError> {
        if world_size == 0 {
            return Err(ConfigError::InvalidWorldSize);
        }
        if rank == 0 || rank >= world_size {
            return Err(ConfigError::InvalidRank { rank, world_size });
        }
        Ok(StdoutWorker { rank, world_size })
    }
}

impl ProcessGroup for StdoutWorker {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn gather(&mut self, local: Vec<GameResult>) -> Result<Option<Vec<GameResult>>, SimError> {
        let stdout = io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        write_results(&mut out, &local).map_err(|source| SimError::WorkerIo {
            rank: self.rank,
            source,
        })?;
        Ok(None)
    }
}
