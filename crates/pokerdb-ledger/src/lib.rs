//! Session ledger and settlement engine for pokerdb.
//!
//! This crate is the heart of pokerdb. It provides:
//! - [`SessionLedger`]: the in-progress session, mutated one operation at a
//!   time while the game runs (`Open`), then sealed once settled (`Sealed`)
//! - [`SettlementEngine`]: collects final stacks through a [`StackSource`],
//!   enforces that stacks balance contributions to the cent, and applies
//!   lifetime accrual to every participant all-or-nothing
//! - [`StatsProjection`]: read-only leaderboard and summary over a database

pub mod error;
pub mod session;
pub mod settlement;
pub mod stats;

pub use error::{LedgerError, LedgerResult};
pub use session::{LedgerState, SessionLedger};
pub use settlement::{
    PlayerOutcome, SettlementConfig, SettlementEngine, SettlementReport, StackSource,
};
pub use stats::{DatabaseSummary, PlayerStats, StatsProjection};
