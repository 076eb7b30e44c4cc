//! The persisted credential record.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::write_json_atomic;
use crate::core::error::NwsError;
use crate::core::time::now_iso;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotionAuthConfig {
    pub token: String,
    pub updated_at: String,
}

impl NotionAuthConfig {
    fn is_valid(&self) -> bool {
        !self.token.trim().is_empty() && DateTime::parse_from_rfc3339(&self.updated_at).is_ok()
    }
}

fn parse_auth_config(raw: &str) -> Option<NotionAuthConfig> {
    serde_json::from_str::<NotionAuthConfig>(raw)
        .ok()
        .filter(NotionAuthConfig::is_valid)
}

/// Loads the saved credential. Missing, unreadable, or invalid files read as
/// absent; a later save replaces them wholesale.
pub fn load_notion_auth(path: &Path) -> Option<NotionAuthConfig> {
    let raw = fs::read_to_string(path).ok()?;
    parse_auth_config(&raw)
}

/// Persists the token with a fresh `updated_at` stamp, atomically.
///
/// # Errors
///
/// Returns an error when the token is empty or the write fails.
pub fn save_notion_auth(path: &Path, token: &str) -> Result<NotionAuthConfig, NwsError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(NwsError::ValidationError("Token is required.".to_string()));
    }

    let payload = NotionAuthConfig {
        token: token.to_string(),
        updated_at: now_iso(),
    };
    write_json_atomic(path, &payload)?;
    Ok(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_save_then_load_round_trips() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("notion-auth.json");

        let saved = save_notion_auth(&path, "secret_token_1234").unwrap();
        let loaded = load_notion_auth(&path).unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.token, "secret_token_1234");
    }

    #[test]
    fn test_save_trims_and_rejects_empty_token() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("notion-auth.json");

        let saved = save_notion_auth(&path, "  secret  ").unwrap();
        assert_eq!(saved.token, "secret");

        let err = save_notion_auth(&path, "   ").unwrap_err();
        assert!(matches!(err, NwsError::ValidationError(_)));
    }

    #[test]
    fn test_missing_file_loads_as_absent() {
        let tmp = tempdir().unwrap();
        assert!(load_notion_auth(&tmp.path().join("notion-auth.json")).is_none());
    }

    #[test]
    fn test_mangled_file_loads_as_absent() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("notion-auth.json");

        fs::write(&path, "{ not json").unwrap();
        assert!(load_notion_auth(&path).is_none());

        fs::write(&path, r#"{"token":"","updated_at":"2026-01-01T00:00:00Z"}"#).unwrap();
        assert!(load_notion_auth(&path).is_none());

        fs::write(&path, r#"{"token":"x","updated_at":"yesterday"}"#).unwrap();
        assert!(load_notion_auth(&path).is_none());
    }

    #[test]
    fn test_save_leaves_no_temp_file_behind() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("notion-auth.json");
        save_notion_auth(&path, "secret").unwrap();

        let entries: Vec<_> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec!["notion-auth.json"]);
    }
}
