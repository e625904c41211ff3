use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pokerdb_types::Database;
use serde::Serialize;
use tracing::debug;

use crate::config::StoreConfig;
use crate::error::StoreResult;
use crate::names::validate_database_name;
use crate::traits::DatabaseStore;

/// File-backed store: one pretty-printed JSON document per database.
///
/// Writes go to `<name>.json.tmp` first and are renamed over
/// `<name>.json`, so a failed save leaves the previous document intact.
#[derive(Clone, Debug)]
pub struct FileStore {
    config: StoreConfig,
}

impl FileStore {
    pub fn new(config: StoreConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of the document for `name`, after validating the name.
    pub fn path_for(&self, name: &str) -> StoreResult<PathBuf> {
        validate_database_name(name)?;
        Ok(self.config.path_for(name))
    }

    fn ensure_root(&self) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }
        builder.create(&self.config.root)
    }
}

impl DatabaseStore for FileStore {
    fn load(&self, name: &str) -> StoreResult<Option<Database>> {
        let path = self.path_for(name)?;
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let db: Database = serde_json::from_str(&raw)?;
        debug!(
            path = %path.display(),
            players = db.players.len(),
            sessions = db.sessions().len(),
            "database loaded"
        );
        Ok(Some(db))
    }

    fn save(&self, name: &str, db: &Database) -> StoreResult<()> {
        let path = self.path_for(name)?;
        self.ensure_root()?;

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        db.serialize(&mut ser)?;
        buf.push(b'\n');

        let tmp_path = path.with_extension("json.tmp");
        if let Err(e) = write_synced(&tmp_path, &buf).and_then(|_| fs::rename(&tmp_path, &path)) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        debug!(path = %path.display(), bytes = buf.len(), "database saved");
        Ok(())
    }

    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.path_for(name)?.is_file())
    }
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use pokerdb_types::{Money, Participation, Session};

    fn store_in(dir: &Path) -> FileStore {
        FileStore::new(StoreConfig::new(dir.join("pokerdb")))
    }

    fn sample_db() -> Database {
        let mut db = Database::new();
        db.players.add("Alice").unwrap();
        db.players.add("Bob").unwrap();
        db.players.accrue("Alice", Money::from_cents(4250), 3.5).unwrap();
        db.players.accrue("Bob", Money::from_cents(-4250), 3.5).unwrap();

        let mut session = Session::new("2024-02-02 20:00:00".parse().unwrap());
        let mut alice = Participation::new(Money::from_units(100));
        alice.rebuys.push(Money::from_cents(2550));
        alice.final_stack = Some(Money::from_cents(16800));
        let mut bob = Participation::new(Money::from_units(100));
        bob.final_stack = Some(Money::from_cents(5750));
        session.participants.insert("Alice".into(), alice);
        session.participants.insert("Bob".into(), bob);
        session.end_time = Some("2024-02-02 23:30:00".parse().unwrap());
        db.push_session(session).unwrap();
        db
    }

    #[test]
    fn save_then_open_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let db = sample_db();
        store.save("home", &db).unwrap();
        assert_eq!(store.open("home").unwrap(), db);
    }

    #[test]
    fn open_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(matches!(store.open("nope"), Err(StoreError::NotFound(_))));
        assert!(store.load("nope").unwrap().is_none());
    }

    #[test]
    fn create_writes_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.create("fresh").unwrap();
        let raw = fs::read_to_string(store.path_for("fresh").unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({"players": [], "sessions": []}));
    }

    #[test]
    fn create_refuses_existing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.save("home", &sample_db()).unwrap();
        assert!(matches!(store.create("home"), Err(StoreError::AlreadyExists(_))));
        assert_eq!(store.open("home").unwrap(), sample_db());
    }

    #[test]
    fn recreate_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.save("home", &sample_db()).unwrap();
        store.recreate("home").unwrap();
        assert_eq!(store.open("home").unwrap(), Database::new());
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.save("home", &sample_db()).unwrap();
        let names: Vec<_> = fs::read_dir(&store.config().root)
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["home.json".to_string()]);
    }

    #[test]
    fn reads_document_with_legacy_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        fs::create_dir_all(&store.config().root).unwrap();
        fs::write(
            store.path_for("legacy").unwrap(),
            r#"{
    "players": [
        {"hoursPlayed": 0, "name": "Alice", "profit": 0.0, "sessions": 0}
    ],
    "sessions": []
}"#,
        )
        .unwrap();
        let db = store.open("legacy").unwrap();
        assert!(db.players.exists("Alice"));
    }

    #[test]
    fn corrupt_document_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        fs::create_dir_all(&store.config().root).unwrap();
        fs::write(store.path_for("bad").unwrap(), "{ not json").unwrap();
        assert!(matches!(store.open("bad"), Err(StoreError::Serialization(_))));
    }

    #[test]
    fn invalid_name_rejected_before_io() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        assert!(matches!(store.create("../escape"), Err(StoreError::InvalidName { .. })));
        assert!(!store.config().root.exists());
    }

    #[cfg(unix)]
    #[test]
    fn root_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        store.create("home").unwrap();
        let mode = fs::metadata(&store.config().root).unwrap().permissions().mode();
        assert_eq!(mode & 0o077, 0);
    }
}
