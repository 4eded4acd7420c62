//! Process groups: who runs which share of a batch, and how shares are
//! collected by the coordinator (rank 0).

use std::sync::mpsc::{self, Receiver, Sender};

use log::warn;

use crate::error::{ConfigError, SimError};
use crate::game::GameResult;

/// Rank-based fan-in of per-process results.
pub trait ProcessGroup {
    fn rank(&self) -> usize;

    fn world_size(&self) -> usize;

    /// Sends this process's results to the coordinator.
    ///
    /// The coordinator gets every rank's results concatenated in rank order;
    /// every other rank gets `None`.
    fn gather(&mut self, local: Vec<GameResult>) -> Result<Option<Vec<GameResult>>, SimError>;

    fn is_coordinator(&self) -> bool {
        self.rank() == 0
    }
}

/// A world of one.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleProcess;

impl ProcessGroup for SingleProcess {
    fn rank(&self) -> usize {
        0
    }

    fn world_size(&self) -> usize {
        1
    }

    fn gather(&mut self, local: Vec<GameResult>) -> Result<Option<Vec<GameResult>>, SimError> {
        Ok(Some(local))
    }
}

type Share = (usize, Vec<GameResult>);

enum Link {
    Coordinator(Receiver<Share>),
    Worker(Sender<Share>),
}

/// Ranks living in one OS process, connected by a channel.
pub struct ChannelGroup {
    rank: usize,
    world_size: usize,
    link: Link,
}

impl ChannelGroup {
    /// Creates one group handle per rank, index = rank.
    pub fn create(world_size: usize) -> Result<Vec<ChannelGroup>, ConfigError> {
        if world_size == 0 {
            return Err(ConfigError::InvalidWorldSize);
        }
        let (tx, rx) = mpsc::channel();
        let mut groups = Vec::with_capacity(world_size);
        groups.push(ChannelGroup {
            rank: 0,
            world_size,
            link: Link::Coordinator(rx),
        });
        for rank in 1..world_size {
            groups.push(ChannelGroup {
                rank,
                world_size,
                link: Link::Worker(tx.clone()),
            });
        }
        Ok(groups)
    }
}

impl ProcessGroup for ChannelGroup {
    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }

    fn gather(&mut self, local: Vec<GameResult>) -> Result<Option<Vec<GameResult>>, SimError> {
        match &self.link {
            Link::Worker(tx) => {
                if tx.send((self.rank, local)).is_err() {
                    warn!("rank {}: coordinator is gone, results discarded", self.rank);
                }
                Ok(None)
            }
            Link::Coordinator(rx) => {
                let mut shares: Vec<Option<Vec<GameResult>>> = vec![None; self.world_size];
                shares[0] = Some(local);
                for _ in 1..self.world_size {
                    // Every sender dropping early means some rank died.
                    let Ok((rank, results)) = rx.recv() else { break };
                    shares[rank] = Some(results);
                }
                concat_in_rank_order(shares).map(Some)
            }
        }
    }
}

/// Concatenates per-rank shares, failing on the first missing rank.
pub(crate) fn concat_in_rank_order(
    shares: Vec<Option<Vec<GameResult>>>,
) -> Result<Vec<GameResult>, SimError> {
    let total = shares.iter().flatten().map(Vec::len).sum();
    let mut all = Vec::with_capacity(total);
    for (rank, share) in shares.into_iter().enumerate() {
        all.extend(share.ok_or(SimError::MissingRank(rank))?);
    }
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Player;

    fn tagged(rank: u32, n: usize) -> Vec<GameResult> {
        (0..n)
            .map(|i| GameResult {
                winner: Player::A,
                scores: [rank, i as u32],
                rounds_played: 5,
            })
            .collect()
    }

    #[test]
    fn single_process_returns_local() {
        let mut g = SingleProcess;
        assert!(g.is_coordinator());
        assert_eq!(g.gather(tagged(0, 3)).unwrap().unwrap().len(), 3);
    }

    #[test]
    fn zero_world_is_rejected() {
        assert!(matches!(ChannelGroup::create(0), Err(ConfigError::InvalidWorldSize)));
    }

    #[test]
    fn channel_group_orders_by_rank() {
        let mut groups = ChannelGroup::create(3).unwrap();
        let mut coordinator = groups.remove(0);
        // Send out of order.
        let mut rank2 = groups.pop().unwrap();
        let mut rank1 = groups.pop().unwrap();
        assert!(rank2.gather(tagged(2, 2)).unwrap().is_none());
        assert!(rank1.gather(tagged(1, 1)).unwrap().is_none());

        let all = coordinator.gather(tagged(0, 2)).unwrap().unwrap();
        let ranks: Vec<u32> = all.iter().map(|r| r.scores[0]).collect();
        assert_eq!(ranks, vec![0, 0, 1, 2, 2]);
    }

    #[test]
    fn missing_rank_is_reported() {
        let mut groups = ChannelGroup::create(3).unwrap();
        let mut coordinator = groups.remove(0);
        let mut rank1 = groups.remove(0);
        rank1.gather(tagged(1, 1)).unwrap();
        // Rank 2 dies without sending.
        drop(groups);
        drop(rank1);
        let err = coordinator.gather(Vec::new()).unwrap_err();
        assert!(matches!(err, SimError::MissingRank(2)));
    }
}
