//! NHL season statistics engine
//!
//! Tracks an append-only, date-ordered ledger of per-game statistic vectors
//! for every team in a season and answers point-in-time aggregate queries
//! ("what were this team's cumulative stats strictly before date D?").
//! Snapshots taken before a game is folded in are guaranteed to contain
//! nothing from that game, which makes them safe as training features for
//! a downstream prediction model.

pub mod season;
pub mod stats;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::stats::StatVector;

/// Stat category that every game sheet must contain.
pub const PRIMARY_STAT: &str = "Goals";

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// An NHL team
///
/// Equality and hashing go through the id only; name, city and
/// abbreviation are display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub city: Option<String>,
    pub abbreviation: Option<String>,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Team {
            id,
            name: name.into(),
            city: None,
            abbreviation: None,
        }
    }

    /// Check a display name against the team's name or abbreviation
    pub fn matches_name(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        self.name.to_lowercase() == name_lower
            || self
                .abbreviation
                .as_deref()
                .map(|a| a.to_lowercase() == name_lower)
                .unwrap_or(false)
    }
}

impl PartialEq for Team {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Team {}

impl std::hash::Hash for Team {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// The ordered set of teams competing in a season
///
/// Team ids are unique within the list; lookups by id preserve the
/// insertion order used to index the confusion matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamList {
    teams: Vec<Team>,
}

impl TeamList {
    pub fn new(teams: Vec<Team>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for team in &teams {
            if !seen.insert(team.id) {
                return Err(HockeyError::DuplicateTeam(team.id));
            }
        }
        Ok(TeamList { teams })
    }

    pub fn get(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: TeamId) -> bool {
        self.get(id).is_some()
    }

    /// Position of a team in the list, used as its matrix row/column
    pub fn index_of(&self, id: TeamId) -> Option<usize> {
        self.teams.iter().position(|t| t.id == id)
    }

    /// Find a team by display name or abbreviation
    pub fn find_by_name(&self, name: &str) -> Option<&Team> {
        self.teams.iter().find(|t| t.matches_name(name))
    }

    pub fn team_names(&self) -> Vec<&str> {
        self.teams.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }
}

/// Identity of a season
///
/// Two seasons are the same season when their years match, regardless of
/// bookkeeping fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonId {
    pub year: i32,
    pub start_date: Option<NaiveDate>,
    pub number_of_teams: usize,
    /// Explicit override for the schedule length; derived when absent
    pub games_per_team: Option<usize>,
}

impl SeasonId {
    pub fn new(year: i32, number_of_teams: usize) -> Self {
        SeasonId {
            year,
            start_date: None,
            number_of_teams,
            games_per_team: None,
        }
    }

    /// Games per team: the explicit override, or a double round-robin
    pub fn number_of_games(&self) -> usize {
        self.games_per_team
            .unwrap_or_else(|| self.number_of_teams * self.number_of_teams.saturating_sub(1))
    }
}

impl PartialEq for SeasonId {
    fn eq(&self, other: &Self) -> bool {
        self.year == other.year
    }
}

impl Eq for SeasonId {}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Season {} ({} teams)", self.year, self.number_of_teams)
    }
}

/// Final outcome of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    HomeWin { home: TeamId, away: TeamId },
    AwayWin { home: TeamId, away: TeamId },
    Tie { home: TeamId, away: TeamId },
}

impl GameResult {
    /// The winning team, or None for a tie
    pub fn winner(&self) -> Option<TeamId> {
        match self {
            GameResult::HomeWin { home, .. } => Some(*home),
            GameResult::AwayWin { away, .. } => Some(*away),
            GameResult::Tie { .. } => None,
        }
    }

    /// The losing team, or None for a tie
    pub fn loser(&self) -> Option<TeamId> {
        match self {
            GameResult::HomeWin { away, .. } => Some(*away),
            GameResult::AwayWin { home, .. } => Some(*home),
            GameResult::Tie { .. } => None,
        }
    }

    pub fn is_tie(&self) -> bool {
        matches!(self, GameResult::Tie { .. })
    }

    pub fn home_team(&self) -> TeamId {
        match self {
            GameResult::HomeWin { home, .. }
            | GameResult::AwayWin { home, .. }
            | GameResult::Tie { home, .. } => *home,
        }
    }

    pub fn away_team(&self) -> TeamId {
        match self {
            GameResult::HomeWin { away, .. }
            | GameResult::AwayWin { away, .. }
            | GameResult::Tie { away, .. } => *away,
        }
    }

    /// `(home_win, away_win, tie)` indicator row for tabular output
    pub fn one_hot(&self) -> (u8, u8, u8) {
        match self {
            GameResult::HomeWin { .. } => (1, 0, 0),
            GameResult::AwayWin { .. } => (0, 1, 0),
            GameResult::Tie { .. } => (0, 0, 1),
        }
    }
}

/// One team's stat sheet for a single game
///
/// The `"Goals"` category is required; everything else is whatever the
/// box score produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStats {
    team: TeamId,
    date: NaiveDate,
    stats: StatVector,
    is_home: bool,
}

impl GameStats {
    pub fn new(team: TeamId, date: NaiveDate, stats: StatVector, is_home: bool) -> Result<Self> {
        if !stats.contains(PRIMARY_STAT) {
            return Err(HockeyError::MissingPrimaryStat { team, date });
        }
        Ok(GameStats {
            team,
            date,
            stats: stats.with_home(is_home),
            is_home,
        })
    }

    pub fn team(&self) -> TeamId {
        self.team
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_home(&self) -> bool {
        self.is_home
    }

    pub fn stats(&self) -> &StatVector {
        &self.stats
    }

    /// The primary score (goals) recorded on this sheet
    pub fn score(&self) -> f64 {
        self.stats.get(PRIMARY_STAT)
    }
}

/// A finished game: two stat sheets bound to a season and a date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    season: SeasonId,
    date: NaiveDate,
    home: GameStats,
    away: GameStats,
}

impl Game {
    pub fn new(season: SeasonId, home: GameStats, away: GameStats) -> Result<Self> {
        if home.team() == away.team() {
            return Err(HockeyError::InvalidGame(format!(
                "{} cannot play itself",
                home.team()
            )));
        }
        if !home.is_home() || away.is_home() {
            return Err(HockeyError::InvalidGame(
                "home sheet must carry the home flag, away sheet must not".to_string(),
            ));
        }
        if home.date() != away.date() {
            return Err(HockeyError::InvalidGame(format!(
                "stat sheets disagree on the game date: {} vs {}",
                home.date(),
                away.date()
            )));
        }
        let date = home.date();
        Ok(Game {
            season,
            date,
            home,
            away,
        })
    }

    pub fn season(&self) -> &SeasonId {
        &self.season
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn home(&self) -> &GameStats {
        &self.home
    }

    pub fn away(&self) -> &GameStats {
        &self.away
    }

    pub fn home_team(&self) -> TeamId {
        self.home.team()
    }

    pub fn away_team(&self) -> TeamId {
        self.away.team()
    }

    /// Decide the result from the embedded score comparison
    pub fn result(&self) -> GameResult {
        let home = self.home.team();
        let away = self.away.team();
        let home_score = self.home.score();
        let away_score = self.away.score();
        if home_score > away_score {
            GameResult::HomeWin { home, away }
        } else if home_score < away_score {
            GameResult::AwayWin { home, away }
        } else {
            GameResult::Tie { home, away }
        }
    }

    /// Stat sheet for one of the two participants
    pub fn stats_for(&self, team: TeamId) -> Option<&GameStats> {
        if self.home.team() == team {
            Some(&self.home)
        } else if self.away.team() == team {
            Some(&self.away)
        } else {
            None
        }
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) vs {} ({})",
            self.home.team(),
            self.home.score(),
            self.away.team(),
            self.away.score()
        )
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HockeyError {
    #[error("stat sheet for {team} on {date} is missing the \"Goals\" entry")]
    MissingPrimaryStat { team: TeamId, date: NaiveDate },

    #[error("stats on {date} do not belong to {team}")]
    WrongTeam { team: TeamId, date: NaiveDate },

    #[error("an entry for {date} already exists")]
    DuplicateDate { date: NaiveDate },

    #[error("date {date} precedes the latest recorded date {latest}")]
    OutOfOrder { date: NaiveDate, latest: NaiveDate },

    #[error("average requested over zero entries")]
    EmptySelection,

    #[error("division by zero in stat category \"{key}\"")]
    DivideByZero { key: String },

    #[error("cannot divide stats by a zero scalar")]
    ZeroDivisor,

    #[error("unknown team: {0}")]
    UnknownTeam(TeamId),

    #[error("duplicate team id: {0}")]
    DuplicateTeam(TeamId),

    #[error("game belongs to season {game}, ledger tracks season {season}")]
    SeasonMismatch { game: i32, season: i32 },

    #[error("invalid game: {0}")]
    InvalidGame(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HockeyError>;

/// Snapshot policy: which aggregates make up a pre-game feature list
///
/// Slot order is fixed (`feature_labels` documents it) so downstream
/// consumers can index snapshots positionally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotConfig {
    /// Per-game averages over all games to date
    pub average: bool,
    /// Home-venue averages
    pub home: bool,
    /// Away-venue averages
    pub away: bool,
    /// Cumulative totals
    pub total: bool,
    /// Window size for the trailing-window variant of each enabled slot
    pub last_n: Option<usize>,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        SnapshotConfig {
            average: true,
            home: false,
            away: false,
            total: false,
            last_n: None,
        }
    }
}

impl SnapshotConfig {
    /// Labels for the snapshot slots, in the order `TeamStats::snapshot`
    /// produces them
    pub fn feature_labels(&self) -> Vec<String> {
        let mut labels = Vec::new();
        if self.average {
            labels.push("TD".to_string());
            if let Some(n) = self.last_n {
                labels.push(format!("Last{}", n));
            }
        }
        if self.home {
            labels.push("H".to_string());
            if let Some(n) = self.last_n {
                labels.push(format!("H-Last{}", n));
            }
        }
        if self.away {
            labels.push("A".to_string());
            if let Some(n) = self.last_n {
                labels.push(format!("A-Last{}", n));
            }
        }
        if self.total {
            labels.push("Tot".to_string());
            if let Some(n) = self.last_n {
                labels.push(format!("Tot-Last{}", n));
            }
        }
        labels
    }

    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HockeyError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| HockeyError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HockeyError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goals(n: f64) -> StatVector {
        StatVector::from_entries([(PRIMARY_STAT, n)], true)
    }

    #[test]
    fn test_team_equality_by_id() {
        let mut a = Team::new(TeamId(1), "Pittsburgh Penguins");
        let b = Team::new(TeamId(1), "Penguins");
        a.city = Some("Pittsburgh".to_string());
        assert_eq!(a, b);
    }

    #[test]
    fn test_team_list_rejects_duplicate_ids() {
        let teams = vec![
            Team::new(TeamId(1), "Penguins"),
            Team::new(TeamId(1), "Canucks"),
        ];
        assert!(matches!(
            TeamList::new(teams),
            Err(HockeyError::DuplicateTeam(TeamId(1)))
        ));
    }

    #[test]
    fn test_season_games_derived_from_team_count() {
        let season = SeasonId::new(2019, 4);
        assert_eq!(season.number_of_games(), 12);

        let mut overridden = SeasonId::new(2019, 32);
        overridden.games_per_team = Some(82);
        assert_eq!(overridden.number_of_games(), 82);
    }

    #[test]
    fn test_game_stats_requires_goals() {
        let date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let stats = StatVector::from_entries([("Shots", 30.0)], true);
        let err = GameStats::new(TeamId(1), date, stats, true).unwrap_err();
        assert!(matches!(err, HockeyError::MissingPrimaryStat { .. }));
    }

    #[test]
    fn test_game_result_from_scores() {
        let date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let home = GameStats::new(TeamId(1), date, goals(3.0), true).unwrap();
        let away = GameStats::new(
            TeamId(2),
            date,
            StatVector::from_entries([(PRIMARY_STAT, 1.0)], false),
            false,
        )
        .unwrap();
        let game = Game::new(SeasonId::new(2019, 2), home, away).unwrap();

        let result = game.result();
        assert_eq!(result.winner(), Some(TeamId(1)));
        assert_eq!(result.loser(), Some(TeamId(2)));
        assert_eq!(result.one_hot(), (1, 0, 0));
    }

    #[test]
    fn test_game_rejects_mismatched_venue_flags() {
        let date = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let home = GameStats::new(TeamId(1), date, goals(3.0), false).unwrap();
        let away = GameStats::new(TeamId(2), date, goals(1.0), false).unwrap();
        assert!(matches!(
            Game::new(SeasonId::new(2019, 2), home, away),
            Err(HockeyError::InvalidGame(_))
        ));
    }

    #[test]
    fn test_snapshot_config_toml_round_trip() {
        let config = SnapshotConfig {
            average: true,
            home: true,
            away: false,
            total: true,
            last_n: Some(3),
        };
        let path = std::env::temp_dir().join("hockey_snapshot_config_test.toml");
        let path = path.to_str().unwrap();
        config.save(path).unwrap();

        let loaded = SnapshotConfig::load(path).unwrap();
        assert!(loaded.home);
        assert!(!loaded.away);
        assert_eq!(loaded.last_n, Some(3));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_snapshot_config_labels() {
        let config = SnapshotConfig {
            average: true,
            home: true,
            away: true,
            total: true,
            last_n: Some(5),
        };
        assert_eq!(
            config.feature_labels(),
            vec!["TD", "Last5", "H", "H-Last5", "A", "A-Last5", "Tot", "Tot-Last5"]
        );
    }
}
