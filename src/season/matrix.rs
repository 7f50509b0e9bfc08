//! Pairwise win-count matrix
//!
//! An N×N grid over the season's teams where entry (i, j) counts wins of
//! team i over team j. Ties are not represented and the diagonal stays
//! zero. The id-to-index mapping is fixed at construction from the team
//! list's order.

use crate::{TeamId, TeamList};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    names: Vec<String>,
    index: HashMap<TeamId, usize>,
    matrix: Vec<Vec<u32>>,
}

impl ConfusionMatrix {
    pub fn new(teams: &TeamList) -> Self {
        let n = teams.len();
        ConfusionMatrix {
            names: teams.iter().map(|t| t.name.clone()).collect(),
            index: teams.iter().enumerate().map(|(i, t)| (t.id, i)).collect(),
            matrix: vec![vec![0; n]; n],
        }
    }

    /// Record a decided game. Ties pass `None` for both sides and are a
    /// no-op; so is self-play.
    pub fn add_game(&mut self, winner: Option<TeamId>, loser: Option<TeamId>) {
        let (Some(winner), Some(loser)) = (winner, loser) else {
            return;
        };
        if winner == loser {
            return;
        }
        match (self.index.get(&winner), self.index.get(&loser)) {
            (Some(&i), Some(&j)) => self.matrix[i][j] += 1,
            _ => log::warn!(
                "ignoring result between teams outside the matrix: {} over {}",
                winner,
                loser
            ),
        }
    }

    /// `(wins of a over b, wins of b over a)`
    pub fn get_entry(&self, a: TeamId, b: TeamId) -> Option<(u32, u32)> {
        let i = *self.index.get(&a)?;
        let j = *self.index.get(&b)?;
        Some((self.matrix[i][j], self.matrix[j][i]))
    }

    /// Win rates of the pair against each other. A pair that has never
    /// met reports (0.0, 0.0), the same well-defined-everywhere policy
    /// used by `win_percentages`.
    pub fn head_to_head(&self, a: TeamId, b: TeamId) -> Option<(f64, f64)> {
        let (won, lost) = self.get_entry(a, b)?;
        let total = won + lost;
        if total == 0 {
            return Some((0.0, 0.0));
        }
        let p = won as f64 / total as f64;
        Some((p, 1.0 - p))
    }

    /// The normalized matrix: entry (i, j) is i's win rate over j among
    /// their decided meetings. Pairs with zero meetings report 0.0 on
    /// both sides rather than NaN, so the grid is defined everywhere.
    pub fn win_percentages(&self) -> Vec<Vec<f64>> {
        let n = self.names.len();
        let mut out = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in 0..n {
                let total = self.matrix[i][j] + self.matrix[j][i];
                if total > 0 {
                    out[i][j] = self.matrix[i][j] as f64 / total as f64;
                }
            }
        }
        out
    }

    /// Raw win counts, rows indexed like `team_names`
    pub fn grid(&self) -> &[Vec<u32>] {
        &self.matrix
    }

    pub fn team_names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
