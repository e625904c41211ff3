//! Persistence for pokerdb database documents.
//!
//! Each database is a single JSON document named `<name>.json` inside a
//! storage directory. The store loads and saves whole documents; it never
//! interprets sessions or players beyond (de)serializing them.
//!
//! # Storage Backends
//!
//! All backends implement the [`DatabaseStore`] trait:
//!
//! - [`FileStore`] -- one JSON file per database under [`StoreConfig::root`]
//! - [`InMemoryStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Saves are atomic: write a sibling temp file, then rename over the target.
//! 2. The storage directory is created on demand, owner-only on unix.
//! 3. No locking: two processes saving the same database race, last write wins.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod names;
pub mod traits;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use file::FileStore;
pub use memory::InMemoryStore;
pub use names::validate_database_name;
pub use traits::DatabaseStore;
