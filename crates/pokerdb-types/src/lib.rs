//! Foundation types for pokerdb.
//!
//! This crate provides the data model shared by every other pokerdb crate:
//! the persisted database document and the values it is built from.
//!
//! # Key Types
//!
//! - [`Money`] -- Exact amount in cents, serialized as a two-decimal number
//! - [`Timestamp`] -- Local wall-clock time with second precision
//! - [`Player`] / [`PlayerRegistry`] -- Lifetime statistics, one record per name
//! - [`Participation`] -- One player's buy-in, rebuys and final stack in a session
//! - [`Session`] -- One sitting of a game, bounded by start and end time
//! - [`Database`] -- Root document: the registry plus sealed sessions

pub mod database;
pub mod error;
pub mod money;
pub mod player;
pub mod session;
pub mod temporal;

pub use database::Database;
pub use error::{RegistryError, TypeError};
pub use money::{round2, Money};
pub use player::{Player, PlayerRegistry};
pub use session::{Participation, Session};
pub use temporal::{Timestamp, TIMESTAMP_FORMAT};
