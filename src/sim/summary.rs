//! Aggregate statistics over a batch of game results.

use serde::{Deserialize, Serialize};

use crate::game::{GameResult, Player};

/// The key a pairing's results are reported under.
pub fn matchup_label(a: &str, b: &str) -> String {
    format!("{a}_vs_{b}")
}

/// Win counts and averages for one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSummary {
    pub games: usize,
    pub player_a_wins: usize,
    pub player_b_wins: usize,
    pub player_a_avg_score: f64,
    pub player_b_avg_score: f64,
    pub avg_rounds: f64,
}

impl ResultSummary {
    /// Reduces `results`; averages are 0.0 for an empty batch.
    pub fn from_results(results: &[GameResult]) -> Self {
        let mut summary = ResultSummary {
            games: results.len(),
            ..Default::default()
        };
        if results.is_empty() {
            return summary;
        }

        let mut score_totals = [0u64; 2];
        let mut round_total = 0u64;
        for r in results {
            match r.winner {
                Player::A => summary.player_a_wins += 1,
                Player::B => summary.player_b_wins += 1,
            }
            score_totals[0] += u64::from(r.scores[0]);
            score_totals[1] += u64::from(r.scores[1]);
            round_total += u64::from(r.rounds_played);
        }

        let n = results.len() as f64;
        summary.player_a_avg_score = score_totals[0] as f64 / n;
        summary.player_b_avg_score = score_totals[1] as f64 / n;
        summary.avg_rounds = round_total as f64 / n;
        summary
    }

    /// Fraction of games won by `player`.
    pub fn win_rate(&self, player: Player) -> f64 {
        let wins = match player {
            Player::A => self.player_a_wins,
            Player::B => self.player_b_wins,
        };
        wins as f64 / self.games.max(1) as f64
    }

    /// Renders `{ "<label>": { ...summary } }`.
    pub fn to_json(&self, label: &str) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        // Serializing a plain struct of numbers cannot fail.
        let body = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        map.insert(label.to_string(), body);
        serde_json::Value::Object(map)
    }

    /// Logs a human-readable summary.
    pub fn log(&self, label: &str) {
        log::info!("=== {label} ===");
        log::info!("Games: {}", self.games);
        log::info!(
            "Player A wins: {} ({:.1}%), avg score {:.2}",
            self.player_a_wins,
            100.0 * self.win_rate(Player::A),
            self.player_a_avg_score
        );
        log::info!(
            "Player B wins: {} ({:.1}%), avg score {:.2}",
            self.player_b_wins,
            100.0 * self.win_rate(Player::B),
            self.player_b_avg_score
        );
        log::info!("Avg rounds: {:.2}", self.avg_rounds);
    }
}
