//! Workspace root resolution.
//!
//! Pages and databases share one opaque id namespace and the API has no
//! lookup that answers "what kind is this id". Disambiguation is therefore a
//! bounded two-arm attempt: fetch the id as a page; only on failure, fetch it
//! as a database. The database error is the one surfaced when both arms fail,
//! being the more diagnostic of the two.

use serde::Serialize;

use crate::core::error::NwsError;
use crate::core::ids::normalize_notion_id;
use crate::notion::api::{DatabaseObject, NotionSession, PageObject};
use crate::notion::verify::map_notion_error;

/// The resolved workspace root. Produced once per resolution attempt and
/// never mutated; a database root always carries at least one data source.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolvedRoot {
    Page {
        page_id: String,
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Database {
        database_id: String,
        title: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        data_source_ids: Vec<String>,
    },
}

impl ResolvedRoot {
    pub fn title(&self) -> &str {
        match self {
            ResolvedRoot::Page { title, .. } | ResolvedRoot::Database { title, .. } => title,
        }
    }

    pub fn root_id(&self) -> &str {
        match self {
            ResolvedRoot::Page { page_id, .. } => page_id,
            ResolvedRoot::Database { database_id, .. } => database_id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ResolvedRoot::Page { .. } => "page",
            ResolvedRoot::Database { .. } => "database",
        }
    }
}

fn join_runs(runs: &[crate::notion::api::RichTextRun]) -> String {
    runs.iter().map(|run| run.plain_text.as_str()).collect()
}

fn extract_title_from_page(page: &PageObject) -> String {
    let title = page
        .properties
        .values()
        .find(|property| property.kind == "title")
        .and_then(|property| property.title.as_deref())
        .map(join_runs)
        .unwrap_or_default();

    if title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}

fn extract_title_from_database(database: &DatabaseObject) -> String {
    let title = join_runs(&database.title);
    if title.trim().is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}

fn extract_data_source_ids(database: &DatabaseObject) -> Vec<String> {
    database
        .data_sources
        .iter()
        .filter(|source| !source.id.is_empty())
        .map(|source| source.id.clone())
        .collect()
}

/// Resolves free-form root input (URL or id) to a page or database.
///
/// The page fetch is attempted first; its failure is not distinguished by
/// cause and is discarded once the database arm runs. A database exposing
/// zero data sources is a hard failure: nothing can be written into it.
///
/// # Errors
///
/// `InvalidIdentifier` when the input contains no id pattern,
/// `ResolutionError` when neither fetch succeeds, and `NoDataSources` for an
/// empty database.
pub fn resolve_root(session: &dyn NotionSession, input: &str) -> Result<ResolvedRoot, NwsError> {
    let normalized_id = normalize_notion_id(input)?;

    match session.retrieve_page(&normalized_id) {
        Ok(page) => Ok(ResolvedRoot::Page {
            title: extract_title_from_page(&page),
            page_id: page.id,
            url: page.url,
        }),
        Err(_page_error) => {
            let database = session
                .retrieve_database(&normalized_id)
                .map_err(|error| NwsError::ResolutionError(map_notion_error(&error)))?;

            let data_source_ids = extract_data_source_ids(&database);
            if data_source_ids.is_empty() {
                return Err(NwsError::NoDataSources(
                    "Selected database has no data sources. Create a data source or choose a different database."
                        .to_string(),
                ));
            }

            Ok(ResolvedRoot::Database {
                title: extract_title_from_database(&database),
                database_id: database.id,
                url: database.url,
                data_source_ids,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::testing::{
        database_object, titled_page, untitled_page, MockSession, StubError,
    };

    const RAW: &str = "1f3b5c7d9e0f4a2b8c6d012345abcdef";
    const DASHED: &str = "1f3b5c7d-9e0f-4a2b-8c6d-012345abcdef";

    fn not_found() -> StubError {
        StubError::Api {
            status: 404,
            code: "object_not_found".to_string(),
            message: Some("Could not find object.".to_string()),
        }
    }

    #[test]
    fn test_page_success_skips_database_fetch() {
        let session = MockSession::new().with_page(Ok(titled_page(DASHED, "My Page")));

        let root = resolve_root(&session, RAW).unwrap();
        assert_eq!(
            root,
            ResolvedRoot::Page {
                page_id: DASHED.to_string(),
                title: "My Page".to_string(),
                url: Some(format!("https://www.notion.so/{}", DASHED)),
            }
        );
        assert_eq!(session.page_calls.get(), 1);
        assert_eq!(session.database_calls.get(), 0);
    }

    #[test]
    fn test_url_input_resolves_to_titled_page() {
        let session = MockSession::new().with_page(Ok(titled_page(DASHED, "My Page")));

        let url = format!("https://notion.so/My-Page-{}", RAW);
        let root = resolve_root(&session, &url).unwrap();
        assert_eq!(root.kind_name(), "page");
        assert_eq!(root.title(), "My Page");
        assert_eq!(session.last_page_id.borrow().as_deref(), Some(DASHED));
    }

    #[test]
    fn test_page_without_title_property_is_untitled() {
        let session = MockSession::new().with_page(Ok(untitled_page(DASHED)));

        let root = resolve_root(&session, DASHED).unwrap();
        assert_eq!(root.title(), "Untitled");
    }

    #[test]
    fn test_page_failure_falls_back_to_database() {
        let session = MockSession::new()
            .with_page(Err(not_found()))
            .with_database(Ok(database_object(DASHED, "Tracker", &["ds-1", "ds-2"])));

        let root = resolve_root(&session, DASHED).unwrap();
        assert_eq!(
            root,
            ResolvedRoot::Database {
                database_id: DASHED.to_string(),
                title: "Tracker".to_string(),
                url: Some(format!("https://www.notion.so/{}", DASHED)),
                data_source_ids: vec!["ds-1".to_string(), "ds-2".to_string()],
            }
        );
        assert_eq!(session.page_calls.get(), 1);
        assert_eq!(session.database_calls.get(), 1);
    }

    #[test]
    fn test_both_arms_failing_surfaces_database_error() {
        let session = MockSession::new()
            .with_page(Err(StubError::Api {
                status: 403,
                code: "restricted_resource".to_string(),
                message: None,
            }))
            .with_database(Err(not_found()));

        let err = resolve_root(&session, DASHED).unwrap_err();
        match err {
            NwsError::ResolutionError(message) => {
                // The database arm's error wins, mapped to its guidance text.
                assert_eq!(
                    message,
                    "Not found or not shared with the integration. Share the page or database in Notion and try again."
                );
            }
            other => panic!("expected ResolutionError, got {:?}", other),
        }
    }

    #[test]
    fn test_database_with_zero_data_sources_is_hard_failure() {
        let session = MockSession::new()
            .with_page(Err(not_found()))
            .with_database(Ok(database_object(DASHED, "Empty", &[])));

        let err = resolve_root(&session, DASHED).unwrap_err();
        match err {
            NwsError::NoDataSources(message) => {
                assert!(message.contains("no data sources"));
            }
            other => panic!("expected NoDataSources, got {:?}", other),
        }
    }

    #[test]
    fn test_garbage_input_fails_before_any_fetch() {
        let session = MockSession::new();
        let err = resolve_root(&session, "not an id").unwrap_err();
        assert!(matches!(err, NwsError::InvalidIdentifier(_)));
        assert_eq!(session.page_calls.get(), 0);
        assert_eq!(session.database_calls.get(), 0);
    }
}
