//! Win/loss/tie records and streaks
//!
//! A running record driven by a three-way outcome, with an append-only
//! per-date history. `as_of` reconstructs the record at any past date
//! from the history rather than the live counters, which is what lets
//! the season ledger hand out pre-game records without leaking the game
//! being added.

use crate::{GameResult, TeamId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single game from one team's perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameOutcome {
    Win,
    Loss,
    Tie,
}

impl GameOutcome {
    /// How `result` reads from `team`'s side
    pub fn from_result(result: &GameResult, team: TeamId) -> GameOutcome {
        match result.winner() {
            Some(winner) if winner == team => GameOutcome::Win,
            Some(_) => GameOutcome::Loss,
            None => GameOutcome::Tie,
        }
    }
}

/// A record frozen at some point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSnapshot {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Positive = consecutive wins, negative = consecutive losses
    pub streak: i32,
}

impl RecordSnapshot {
    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    /// None before any game has been played
    pub fn win_percentage(&self) -> Option<f64> {
        let games = self.games_played();
        (games > 0).then(|| self.wins as f64 / games as f64)
    }

    pub fn loss_percentage(&self) -> Option<f64> {
        let games = self.games_played();
        (games > 0).then(|| self.losses as f64 / games as f64)
    }

    pub fn tie_percentage(&self) -> Option<f64> {
        let games = self.games_played();
        (games > 0).then(|| self.ties as f64 / games as f64)
    }
}

impl fmt::Display for RecordSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

/// One appended transition
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RecordEntry {
    pub date: NaiveDate,
    pub outcome: GameOutcome,
    pub snapshot: RecordSnapshot,
}

/// Running win/loss/tie record with a signed streak counter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Record {
    wins: u32,
    losses: u32,
    ties: u32,
    streak: i32,
    history: Vec<RecordEntry>,
}

impl Record {
    pub fn new() -> Self {
        Record::default()
    }

    /// Apply one game's outcome. Transitions are never retracted.
    pub fn add_game(&mut self, date: NaiveDate, outcome: GameOutcome) {
        match outcome {
            GameOutcome::Win => {
                self.wins += 1;
                self.streak = if self.streak < 0 { 1 } else { self.streak + 1 };
            }
            GameOutcome::Loss => {
                self.losses += 1;
                self.streak = if self.streak > 0 { -1 } else { self.streak - 1 };
            }
            GameOutcome::Tie => {
                self.ties += 1;
                self.streak = 0;
            }
        }
        self.history.push(RecordEntry {
            date,
            outcome,
            snapshot: self.snapshot(),
        });
    }

    pub fn wins(&self) -> u32 {
        self.wins
    }

    pub fn losses(&self) -> u32 {
        self.losses
    }

    pub fn ties(&self) -> u32 {
        self.ties
    }

    pub fn streak(&self) -> i32 {
        self.streak
    }

    pub fn games_played(&self) -> u32 {
        self.wins + self.losses + self.ties
    }

    pub fn win_percentage(&self) -> Option<f64> {
        self.snapshot().win_percentage()
    }

    pub fn history(&self) -> &[RecordEntry] {
        &self.history
    }

    /// The live record
    pub fn snapshot(&self) -> RecordSnapshot {
        RecordSnapshot {
            wins: self.wins,
            losses: self.losses,
            ties: self.ties,
            streak: self.streak,
        }
    }

    /// The record as it stood after the last game at or before `date`,
    /// reconstructed from history. A date before the first game yields
    /// the zero record.
    pub fn as_of(&self, date: NaiveDate) -> RecordSnapshot {
        self.history
            .iter()
            .rev()
            .find(|entry| entry.date <= date)
            .map(|entry| entry.snapshot)
            .unwrap_or_default()
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.snapshot())
    }
}
