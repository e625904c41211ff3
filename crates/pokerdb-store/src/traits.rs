use pokerdb_types::Database;

use crate::error::{StoreError, StoreResult};

/// Whole-document storage for named databases.
///
/// Backends implement the three primitives; `open`, `create` and `recreate`
/// are built on top of them.
pub trait DatabaseStore {
    /// Load a database. Returns `Ok(None)` if it does not exist.
    fn load(&self, name: &str) -> StoreResult<Option<Database>>;

    /// Persist a database, replacing any previous content.
    fn save(&self, name: &str, db: &Database) -> StoreResult<()>;

    /// Check whether a database exists.
    fn exists(&self, name: &str) -> StoreResult<bool>;

    /// Load a database that must exist.
    fn open(&self, name: &str) -> StoreResult<Database> {
        self.load(name)?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    /// Create an empty database. Fails if one already exists under `name`.
    fn create(&self, name: &str) -> StoreResult<Database> {
        if self.exists(name)? {
            return Err(StoreError::AlreadyExists(name.to_string()));
        }
        self.recreate(name)
    }

    /// Create an empty database, overwriting any existing one.
    fn recreate(&self, name: &str) -> StoreResult<Database> {
        let db = Database::new();
        self.save(name, &db)?;
        Ok(db)
    }
}
