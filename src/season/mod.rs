//! Season ledger
//!
//! Orchestrates per-game ingestion: snapshot both teams' pre-game state,
//! record the result, then fold the game's own statistics into the
//! ledgers. The snapshot is taken strictly before the append, so a
//! game's own numbers can never leak into the features stored alongside
//! its result. This ordering is the central invariant of the engine.

pub mod matrix;

pub use matrix::ConfusionMatrix;

use crate::stats::record::{GameOutcome, Record, RecordSnapshot};
use crate::stats::team::TeamStats;
use crate::stats::StatVector;
use crate::{
    Game, GameResult, HockeyError, Result, SeasonId, SnapshotConfig, Team, TeamId, TeamList,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Pre-game state bound to a finished game's result
///
/// Immutable once appended; this is the only artifact exposed for
/// feature-vector construction, and it carries nothing from the game
/// beyond the result itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonGameRecord {
    pub date: NaiveDate,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_snapshot: Vec<StatVector>,
    pub home_record: RecordSnapshot,
    pub away_snapshot: Vec<StatVector>,
    pub away_record: RecordSnapshot,
    pub result: GameResult,
}

/// One team's live season state
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TeamEntry {
    stats: TeamStats,
    record: Record,
}

/// A season's full ledger: teams, records, pairwise outcomes and the
/// append-only game list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    season_id: SeasonId,
    teams: TeamList,
    entries: HashMap<TeamId, TeamEntry>,
    matrix: ConfusionMatrix,
    config: SnapshotConfig,
    games: Vec<SeasonGameRecord>,
}

impl Season {
    /// Build a season over an externally constructed team list. The
    /// snapshot config decides which aggregates each `SeasonGameRecord`
    /// carries.
    pub fn new(season_id: SeasonId, teams: TeamList, config: SnapshotConfig) -> Self {
        if teams.len() != season_id.number_of_teams {
            log::warn!(
                "team list has {} teams, season declares {}",
                teams.len(),
                season_id.number_of_teams
            );
        }
        let entries = teams
            .iter()
            .map(|t| {
                (
                    t.id,
                    TeamEntry {
                        stats: TeamStats::new(t.id),
                        record: Record::new(),
                    },
                )
            })
            .collect();
        let matrix = ConfusionMatrix::new(&teams);
        Season {
            season_id,
            teams,
            entries,
            matrix,
            config,
            games: Vec::new(),
        }
    }

    /// Ingest one finished game.
    ///
    /// Games must arrive in non-decreasing date order per team; the
    /// ledger fails fast on a violation. All validation happens before
    /// any state changes, so a rejected game leaves the season exactly
    /// as it was.
    pub fn add_game(&mut self, game: &Game) -> Result<GameResult> {
        let date = game.date();
        let home = game.home_team();
        let away = game.away_team();

        if game.season() != &self.season_id {
            return Err(HockeyError::SeasonMismatch {
                game: game.season().year,
                season: self.season_id.year,
            });
        }
        for team in [home, away] {
            let entry = self
                .entries
                .get(&team)
                .ok_or(HockeyError::UnknownTeam(team))?;
            let dates = entry.stats.all().dates();
            if dates.contains(date) {
                return Err(HockeyError::DuplicateDate { date });
            }
            if let Some(latest) = dates.latest() {
                if date < latest {
                    return Err(HockeyError::OutOfOrder { date, latest });
                }
            }
        }

        // Pre-game snapshots: the game itself has not been appended yet,
        // so nothing of it can show up here. The record cutoff is each
        // team's closest played date at or before the game.
        let (home_snapshot, home_record) = self.pre_game_state(home, date)?;
        let (away_snapshot, away_record) = self.pre_game_state(away, date)?;

        let result = game.result();
        self.games.push(SeasonGameRecord {
            date,
            home_team: home,
            away_team: away,
            home_snapshot,
            home_record,
            away_snapshot,
            away_record,
            result,
        });
        self.matrix.add_game(result.winner(), result.loser());

        // Only now does the game enter the ledgers and records.
        for team in [home, away] {
            let sheet = game
                .stats_for(team)
                .ok_or(HockeyError::UnknownTeam(team))?
                .clone();
            let entry = self
                .entries
                .get_mut(&team)
                .ok_or(HockeyError::UnknownTeam(team))?;
            entry.record.add_game(date, GameOutcome::from_result(&result, team));
            entry.stats.add_game(&sheet)?;
        }

        log::debug!("added {} on {} to {}", game, date, self.season_id);
        Ok(result)
    }

    fn pre_game_state(
        &self,
        team: TeamId,
        date: NaiveDate,
    ) -> Result<(Vec<StatVector>, RecordSnapshot)> {
        let entry = self
            .entries
            .get(&team)
            .ok_or(HockeyError::UnknownTeam(team))?;
        let snapshot = entry.stats.snapshot(date, &self.config);
        let record = entry
            .stats
            .all()
            .closest_before(date)
            .map(|prev| entry.record.as_of(prev))
            .unwrap_or_default();
        Ok((snapshot, record))
    }

    pub fn season_id(&self) -> &SeasonId {
        &self.season_id
    }

    pub fn team_list(&self) -> &TeamList {
        &self.teams
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Labels for the snapshot slots of every `SeasonGameRecord`
    pub fn feature_labels(&self) -> Vec<String> {
        self.config.feature_labels()
    }

    /// The season's game list, in ingestion order
    pub fn games(&self) -> &[SeasonGameRecord] {
        &self.games
    }

    pub fn matrix(&self) -> &ConfusionMatrix {
        &self.matrix
    }

    pub fn team_stats(&self, team: TeamId) -> Option<&TeamStats> {
        self.entries.get(&team).map(|e| &e.stats)
    }

    pub fn record(&self, team: TeamId) -> Option<&Record> {
        self.entries.get(&team).map(|e| &e.record)
    }

    /// Every date on which at least one game was played, sorted
    pub fn played_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<_> = self.games.iter().map(|g| g.date).collect();
        dates.sort();
        dates.dedup();
        dates
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.games.iter().map(|g| g.date).min()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.games.iter().map(|g| g.date).max()
    }

    /// Teams ordered by win percentage, best first. Teams yet to play
    /// sort last.
    pub fn standings(&self) -> Vec<(&Team, RecordSnapshot)> {
        let mut rows: Vec<_> = self
            .teams
            .iter()
            .map(|team| {
                let snapshot = self
                    .entries
                    .get(&team.id)
                    .map(|e| e.record.snapshot())
                    .unwrap_or_default();
                (team, snapshot)
            })
            .collect();
        rows.sort_by(|(_, a), (_, b)| {
            let a_pct = a.win_percentage().unwrap_or(-1.0);
            let b_pct = b.win_percentage().unwrap_or(-1.0);
            b_pct
                .total_cmp(&a_pct)
                .then_with(|| b.wins.cmp(&a.wins))
        });
        rows
    }

    /// Cumulative value of one stat category per team per played date,
    /// in `team_list` order. This is the tabular form display and export
    /// collaborators consume.
    pub fn stat_table(&self, key: &str) -> Vec<(NaiveDate, Vec<f64>)> {
        self.played_dates()
            .into_iter()
            .map(|date| {
                let row = self
                    .teams
                    .iter()
                    .map(|team| {
                        self.entries
                            .get(&team.id)
                            .map(|e| e.stats.total_as_of(date).get(key))
                            .unwrap_or(0.0)
                    })
                    .collect();
                (date, row)
            })
            .collect()
    }
}
