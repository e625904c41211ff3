use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Directory under `$HOME` that holds database documents by default.
const DEFAULT_SUBDIR: &str = ".config/pokerdb";

/// Location of database documents on disk.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one `<name>.json` file per database.
    pub root: PathBuf,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The per-user default location, `$HOME/.config/pokerdb`.
    pub fn from_home() -> StoreResult<Self> {
        let home = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .ok_or(StoreError::NoHomeDirectory)?;
        Ok(Self::new(Path::new(&home).join(DEFAULT_SUBDIR)))
    }

    /// Path of the document for database `name`. The name is not validated.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_for_appends_extension() {
        let c = StoreConfig::new("/data/poker");
        assert_eq!(c.path_for("friday"), PathBuf::from("/data/poker/friday.json"));
    }

    #[test]
    fn from_home_uses_config_subdir() {
        if let Ok(c) = StoreConfig::from_home() {
            assert!(c.root.ends_with(".config/pokerdb"));
        }
    }
}
