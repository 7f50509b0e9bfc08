//! Point-in-time statistics primitives
//!
//! Stat vectors, date indexing, per-team ledgers and win/loss records.

pub mod dates;
pub mod ledger;
pub mod record;
pub mod team;
pub mod vector;

pub use dates::{DateIndex, Direction};
pub use ledger::StatLedger;
pub use record::{GameOutcome, Record, RecordSnapshot};
pub use team::TeamStats;
pub use vector::StatVector;
