use std::collections::HashMap;
use std::sync::RwLock;

use pokerdb_types::Database;

use crate::error::{StoreError, StoreResult};
use crate::names::validate_database_name;
use crate::traits::DatabaseStore;

/// In-memory, HashMap-based database store.
///
/// Intended for tests and embedding. Documents are held as serialized JSON,
/// so every save/load goes through the same encoding as the file store.
#[derive(Default)]
pub struct InMemoryStore {
    documents: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of databases currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw JSON of a stored database.
    pub fn raw(&self, name: &str) -> Option<String> {
        self.documents.read().expect("lock poisoned").get(name).cloned()
    }
}

impl DatabaseStore for InMemoryStore {
    fn load(&self, name: &str) -> StoreResult<Option<Database>> {
        validate_database_name(name)?;
        let docs = self.documents.read().expect("lock poisoned");
        docs.get(name)
            .map(|raw| serde_json::from_str::<Database>(raw).map_err(StoreError::from))
            .transpose()
    }

    fn save(&self, name: &str, db: &Database) -> StoreResult<()> {
        validate_database_name(name)?;
        let raw = serde_json::to_string(db)?;
        self.documents
            .write()
            .expect("lock poisoned")
            .insert(name.to_string(), raw);
        Ok(())
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        validate_database_name(name)?;
        Ok(self.documents.read().expect("lock poisoned").contains_key(name))
    }
}

impl std::fmt::Debug for InMemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("database_count", &self.len())
            .finish()
    }
}
