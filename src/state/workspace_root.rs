//! The persisted workspace root record.
//!
//! Written only after a fully successful verification run; read at the start
//! of every later invocation. A database root also records which data source
//! rows will be written into.

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::write_json_atomic;
use crate::core::error::NwsError;
use crate::core::time::now_iso;
use crate::notion::root::ResolvedRoot;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkspaceRootState {
    Page {
        page_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        updated_at: String,
    },
    Database {
        database_id: String,
        data_source_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        updated_at: String,
    },
}

impl WorkspaceRootState {
    /// Builds the persisted form of a resolved root. Database roots require
    /// the chosen data source.
    ///
    /// # Errors
    ///
    /// Returns an error when a database root is given no data source id.
    pub fn from_resolved(
        root: &ResolvedRoot,
        data_source_id: Option<&str>,
    ) -> Result<Self, NwsError> {
        match root {
            ResolvedRoot::Page { page_id, title, url } => Ok(WorkspaceRootState::Page {
                page_id: page_id.clone(),
                title: Some(title.clone()),
                url: url.clone(),
                updated_at: now_iso(),
            }),
            ResolvedRoot::Database {
                database_id,
                title,
                url,
                ..
            } => {
                let data_source_id = data_source_id
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| {
                        NwsError::ValidationError(
                            "Data source selection is required.".to_string(),
                        )
                    })?;
                Ok(WorkspaceRootState::Database {
                    database_id: database_id.clone(),
                    data_source_id: data_source_id.to_string(),
                    title: Some(title.clone()),
                    url: url.clone(),
                    updated_at: now_iso(),
                })
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            WorkspaceRootState::Page { .. } => "page",
            WorkspaceRootState::Database { .. } => "database",
        }
    }

    /// The id later invocations resolve against.
    pub fn root_id(&self) -> &str {
        match self {
            WorkspaceRootState::Page { page_id, .. } => page_id,
            WorkspaceRootState::Database { database_id, .. } => database_id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            WorkspaceRootState::Page { title, .. }
            | WorkspaceRootState::Database { title, .. } => title.as_deref(),
        }
    }

    fn is_valid(&self) -> bool {
        let (ids_ok, updated_at) = match self {
            WorkspaceRootState::Page {
                page_id,
                updated_at,
                ..
            } => (!page_id.trim().is_empty(), updated_at),
            WorkspaceRootState::Database {
                database_id,
                data_source_id,
                updated_at,
                ..
            } => (
                !database_id.trim().is_empty() && !data_source_id.trim().is_empty(),
                updated_at,
            ),
        };
        ids_ok && DateTime::parse_from_rfc3339(updated_at).is_ok()
    }
}

fn parse_workspace_root(raw: &str) -> Option<WorkspaceRootState> {
    serde_json::from_str::<WorkspaceRootState>(raw)
        .ok()
        .filter(WorkspaceRootState::is_valid)
}

/// Loads the saved workspace root. Missing, unreadable, or invalid files read
/// as absent.
pub fn load_workspace_root(path: &Path) -> Option<WorkspaceRootState> {
    let raw = fs::read_to_string(path).ok()?;
    parse_workspace_root(&raw)
}

/// Persists the workspace root atomically.
///
/// # Errors
///
/// Returns an error when the record fails validation or the write fails.
pub fn save_workspace_root(path: &Path, state: &WorkspaceRootState) -> Result<(), NwsError> {
    if !state.is_valid() {
        return Err(NwsError::ValidationError(
            "Workspace root record is incomplete.".to_string(),
        ));
    }
    write_json_atomic(path, state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn database_root() -> ResolvedRoot {
        ResolvedRoot::Database {
            database_id: "db-1".to_string(),
            title: "Tracker".to_string(),
            url: Some("https://www.notion.so/db-1".to_string()),
            data_source_ids: vec!["ds-1".to_string()],
        }
    }

    #[test]
    fn test_page_round_trip() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("workspace-root.json");

        let root = ResolvedRoot::Page {
            page_id: "page-1".to_string(),
            title: "My Page".to_string(),
            url: None,
        };
        let state = WorkspaceRootState::from_resolved(&root, None).unwrap();
        save_workspace_root(&path, &state).unwrap();

        let loaded = load_workspace_root(&path).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(loaded.kind_name(), "page");
        assert_eq!(loaded.root_id(), "page-1");
        assert_eq!(loaded.title(), Some("My Page"));
    }

    #[test]
    fn test_database_requires_data_source() {
        let err = WorkspaceRootState::from_resolved(&database_root(), None).unwrap_err();
        assert!(matches!(err, NwsError::ValidationError(_)));

        let state = WorkspaceRootState::from_resolved(&database_root(), Some("ds-1")).unwrap();
        match &state {
            WorkspaceRootState::Database { data_source_id, .. } => {
                assert_eq!(data_source_id, "ds-1");
            }
            other => panic!("expected database state, got {:?}", other),
        }
    }

    #[test]
    fn test_discriminant_is_persisted() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("workspace-root.json");

        let state = WorkspaceRootState::from_resolved(&database_root(), Some("ds-1")).unwrap();
        save_workspace_root(&path, &state).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["type"], "database");
        assert_eq!(value["database_id"], "db-1");
        assert_eq!(value["data_source_id"], "ds-1");
        assert!(raw.ends_with('\n'));
    }

    #[test]
    fn test_save_overwrites_previous_record() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("workspace-root.json");

        let first = WorkspaceRootState::from_resolved(&database_root(), Some("ds-1")).unwrap();
        save_workspace_root(&path, &first).unwrap();

        let page = ResolvedRoot::Page {
            page_id: "page-2".to_string(),
            title: "Second".to_string(),
            url: None,
        };
        let second = WorkspaceRootState::from_resolved(&page, None).unwrap();
        save_workspace_root(&path, &second).unwrap();

        assert_eq!(load_workspace_root(&path).unwrap(), second);
    }

    #[test]
    fn test_invalid_records_load_as_absent() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("workspace-root.json");

        assert!(load_workspace_root(&path).is_none());

        fs::write(&path, r#"{"type":"page","page_id":""}"#).unwrap();
        assert!(load_workspace_root(&path).is_none());

        fs::write(
            &path,
            r#"{"type":"database","database_id":"db-1","updated_at":"2026-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert!(load_workspace_root(&path).is_none());
    }
}
