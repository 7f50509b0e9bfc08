//! Per-team venue-split stat ledgers
//!
//! Three parallel ledgers per team: every accepted game sheet lands in
//! `all` and in exactly one of `home`/`away`, so
//! `all.len() == home.len() + away.len()` always holds.

use crate::stats::{StatLedger, StatVector};
use crate::{GameStats, HockeyError, Result, SnapshotConfig, TeamId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One team's accumulated season statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamStats {
    team: TeamId,
    all: StatLedger,
    home: StatLedger,
    away: StatLedger,
}

impl TeamStats {
    pub fn new(team: TeamId) -> Self {
        TeamStats {
            team,
            all: StatLedger::new(),
            home: StatLedger::new(),
            away: StatLedger::new(),
        }
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    /// Append one game sheet. Rejects sheets for other teams and dates
    /// already on record; a rejected append leaves all three ledgers
    /// untouched.
    pub fn add_game(&mut self, stats: &GameStats) -> Result<()> {
        if stats.team() != self.team {
            return Err(HockeyError::WrongTeam {
                team: stats.team(),
                date: stats.date(),
            });
        }
        if self.all.contains_date(stats.date()) {
            return Err(HockeyError::DuplicateDate { date: stats.date() });
        }
        self.all.append(stats.date(), stats.stats().clone())?;
        let venue = if stats.is_home() {
            &mut self.home
        } else {
            &mut self.away
        };
        // cannot collide: venue dates are a subset of `all` dates
        venue.append(stats.date(), stats.stats().clone())?;
        debug_assert_eq!(self.all.len(), self.home.len() + self.away.len());
        Ok(())
    }

    pub fn games_played(&self) -> usize {
        self.all.len()
    }

    pub fn all(&self) -> &StatLedger {
        &self.all
    }

    pub fn home(&self) -> &StatLedger {
        &self.home
    }

    pub fn away(&self) -> &StatLedger {
        &self.away
    }

    pub fn total(&self) -> StatVector {
        self.all.total()
    }

    pub fn average(&self) -> Result<StatVector> {
        self.all.average()
    }

    pub fn home_total(&self) -> StatVector {
        self.home.total()
    }

    pub fn away_total(&self) -> StatVector {
        self.away.total()
    }

    pub fn total_as_of(&self, cutoff: NaiveDate) -> StatVector {
        self.all.total_as_of(Some(cutoff)).0
    }

    pub fn average_as_of(&self, cutoff: NaiveDate) -> Result<StatVector> {
        self.all.average_as_of(Some(cutoff))
    }

    pub fn home_total_as_of(&self, cutoff: NaiveDate) -> StatVector {
        self.home.total_as_of(Some(cutoff)).0
    }

    pub fn home_average_as_of(&self, cutoff: NaiveDate) -> Result<StatVector> {
        self.home.average_as_of(Some(cutoff))
    }

    pub fn away_total_as_of(&self, cutoff: NaiveDate) -> StatVector {
        self.away.total_as_of(Some(cutoff)).0
    }

    pub fn away_average_as_of(&self, cutoff: NaiveDate) -> Result<StatVector> {
        self.away.average_as_of(Some(cutoff))
    }

    /// Build the ordered pre-game feature list for a cutoff date.
    ///
    /// Slot order matches `SnapshotConfig::feature_labels`. A slot whose
    /// selection is empty (a team yet to play at that venue) contributes
    /// the empty vector; the strict `EmptySelection` surface stays on the
    /// direct accessors, where an empty average is a caller bug rather
    /// than a legitimate pre-season state.
    pub fn snapshot(&self, date: NaiveDate, config: &SnapshotConfig) -> Vec<StatVector> {
        let mut out = Vec::new();
        if config.average {
            out.push(average_or_empty(&self.all, date));
            if let Some(n) = config.last_n {
                out.push(window_average(&self.all, date, n));
            }
        }
        if config.home {
            out.push(average_or_empty(&self.home, date));
            if let Some(n) = config.last_n {
                out.push(window_average(&self.home, date, n));
            }
        }
        if config.away {
            out.push(average_or_empty(&self.away, date));
            if let Some(n) = config.last_n {
                out.push(window_average(&self.away, date, n));
            }
        }
        if config.total {
            out.push(self.all.total_as_of(Some(date)).0);
            if let Some(n) = config.last_n {
                out.push(self.all.last_n_as_of(Some(date), n).total());
            }
        }
        out
    }
}

fn average_or_empty(ledger: &StatLedger, cutoff: NaiveDate) -> StatVector {
    match ledger.average_as_of(Some(cutoff)) {
        Ok(avg) => avg,
        Err(_) => StatVector::new(),
    }
}

fn window_average(ledger: &StatLedger, cutoff: NaiveDate, n: usize) -> StatVector {
    let window = ledger.last_n_as_of(Some(cutoff), n);
    match window.average() {
        Ok(avg) => avg,
        Err(_) => StatVector::new(),
    }
}
