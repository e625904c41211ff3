//! Database name validation.
//!
//! A database name becomes a file name, so it must be non-empty, must not be
//! `.` or `..`, and must not contain path separators or control characters.

use crate::error::{StoreError, StoreResult};

const FORBIDDEN_CHARS: &[char] = &['/', '\\', '\0'];

/// Validate a database name, returning `Ok(())` if it is usable as a file stem.
///
/// # Examples
///
/// ```
/// use pokerdb_store::names::validate_database_name;
///
/// assert!(validate_database_name("friday-game").is_ok());
/// assert!(validate_database_name("").is_err());
/// assert!(validate_database_name("../etc").is_err());
/// ```
pub fn validate_database_name(name: &str) -> StoreResult<()> {
    let invalid = |reason: &str| StoreError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    };

    if name.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if name == "." || name == ".." {
        return Err(invalid("name must not be a relative directory"));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control()) {
        return Err(invalid(&format!("contains forbidden character: {ch:?}")));
    }
    Ok(())
}
