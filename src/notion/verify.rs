//! Credential and capability verification.
//!
//! Every verifier in this module returns a structured result instead of
//! propagating remote failures: callers branch on `ok`, never on errors. The
//! capability probe is the one sequence with side effects; it creates a
//! single throwaway page and archives it again, keeping the created id around
//! so a failed cleanup can still be surfaced.

use serde::Serialize;

use crate::core::time::now_iso;
use crate::notion::api::{
    CreatePageRequest, IntegrationUser, NotionError, NotionSession, PageParent,
};
use crate::notion::root::ResolvedRoot;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Error,
}

/// One atomic probe outcome. Check order within a report is execution order.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationCheck {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            error: None,
        }
    }

    fn error(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            error: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerificationResult {
    pub ok: bool,
    pub checks: Vec<VerificationCheck>,
    pub summary: String,
}

/// Token verification with the integration identity echoed on success.
#[derive(Debug, Serialize)]
pub struct TokenVerification {
    pub ok: bool,
    pub checks: Vec<VerificationCheck>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<IntegrationUser>,
}

/// Capability verification. `test_page_id` is the probe page created by the
/// write stage, present whenever creation succeeded so a failed archive still
/// names the page left behind.
#[derive(Debug, Serialize)]
pub struct RootCapabilityVerification {
    pub ok: bool,
    pub checks: Vec<VerificationCheck>,
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_page_id: Option<String>,
}

fn all_ok(checks: &[VerificationCheck]) -> bool {
    checks.iter().all(|check| check.status == CheckStatus::Ok)
}

fn summarize_checks(checks: &[VerificationCheck]) -> String {
    let failed: Vec<&str> = checks
        .iter()
        .filter(|check| check.status == CheckStatus::Error)
        .map(|check| check.name.as_str())
        .collect();

    if failed.is_empty() {
        "All checks passed.".to_string()
    } else {
        format!("Failed checks: {}.", failed.join(", "))
    }
}

/// Rewrites a remote failure into one actionable display line. Total: every
/// input produces a string, nothing is raised.
pub fn map_notion_error(error: &NotionError) -> String {
    match error {
        NotionError::Api { code, message, .. } => match code.as_str() {
            "restricted_resource" => {
                "Access restricted. Share the page or database with the integration in Notion and try again."
                    .to_string()
            }
            "object_not_found" => {
                "Not found or not shared with the integration. Share the page or database in Notion and try again."
                    .to_string()
            }
            _ => message
                .clone()
                .unwrap_or_else(|| "Notion API error.".to_string()),
        },
        NotionError::Transport { message } => match message {
            Some(text) if !text.is_empty() => text.clone(),
            _ => "Unknown error.".to_string(),
        },
    }
}

/// Confirms the token is accepted by Notion via the self lookup, which needs
/// no resource-specific permission.
pub fn verify_token(session: &dyn NotionSession) -> TokenVerification {
    match session.me() {
        Ok(user) => {
            let checks = vec![VerificationCheck::ok("token", "Token verified.")];
            TokenVerification {
                ok: true,
                summary: summarize_checks(&checks),
                checks,
                user: Some(user),
            }
        }
        Err(error) => {
            let message = map_notion_error(&error);
            let checks = vec![VerificationCheck::error("token", &message)];
            TokenVerification {
                ok: false,
                summary: summarize_checks(&checks),
                checks,
                user: None,
            }
        }
    }
}

/// Confirms the token can reach shared workspace content at all, using the
/// smallest possible search.
pub fn verify_workspace_access(session: &dyn NotionSession) -> VerificationResult {
    match session.search_any() {
        Ok(()) => {
            let checks = vec![VerificationCheck::ok(
                "workspace",
                "Workspace search succeeded.",
            )];
            VerificationResult {
                ok: true,
                summary: summarize_checks(&checks),
                checks,
            }
        }
        Err(error) => {
            let message = map_notion_error(&error);
            let checks = vec![VerificationCheck::error("workspace", &message)];
            VerificationResult {
                ok: false,
                summary: summarize_checks(&checks),
                checks,
            }
        }
    }
}

/// Finds the title-typed property of a database, for row creation. Falls back
/// to the literal key `"Title"` when none is found; that key is unvalidated
/// against the schema and the ensuing create may fail remotely.
fn database_title_property_name(
    session: &dyn NotionSession,
    database_id: &str,
) -> Result<String, NotionError> {
    let database = session.retrieve_database(database_id)?;

    let title_property = database
        .properties
        .iter()
        .find(|(_, property)| property.kind == "title")
        .map(|(name, _)| name.clone());

    Ok(title_property.unwrap_or_else(|| "Title".to_string()))
}

fn capability_result(
    checks: Vec<VerificationCheck>,
    test_page_id: Option<String>,
) -> RootCapabilityVerification {
    RootCapabilityVerification {
        ok: all_ok(&checks),
        summary: summarize_checks(&checks),
        checks,
        test_page_id,
    }
}

/// Proves read, write, and archive capability against a resolved root.
///
/// Three sequential stages, short-circuiting on the first structurally
/// blocking failure while recording every stage attempted:
///
/// 1. **read** - re-fetch the root by its own kind. Failure blocks: nothing
///    is safe to probe against an unreadable root.
/// 2. **write** - create one throwaway page (child page of a page root, row
///    in the first data source of a database root). Failure blocks archive.
/// 3. **archive** - best-effort cleanup of the probe page. Failure fails the
///    overall result but never blocks; the orphaned page id stays in the
///    result for the caller to surface.
pub fn verify_root_capabilities(
    session: &dyn NotionSession,
    root: &ResolvedRoot,
) -> RootCapabilityVerification {
    let mut checks = Vec::new();

    let read_attempt = match root {
        ResolvedRoot::Page { page_id, .. } => session.retrieve_page(page_id).map(|_| ()),
        ResolvedRoot::Database { database_id, .. } => {
            session.retrieve_database(database_id).map(|_| ())
        }
    };
    match read_attempt {
        Ok(()) => checks.push(VerificationCheck::ok("read", "Root is readable.")),
        Err(error) => {
            checks.push(VerificationCheck::error("read", &map_notion_error(&error)));
            return capability_result(checks, None);
        }
    }

    let test_title = format!("NWS Access Check {}", now_iso());
    let write_attempt = match root {
        ResolvedRoot::Page { page_id, .. } => session.create_page(&CreatePageRequest::with_title(
            PageParent::Page {
                page_id: page_id.clone(),
            },
            "title",
            &test_title,
        )),
        ResolvedRoot::Database {
            database_id,
            data_source_ids,
            ..
        } => database_title_property_name(session, database_id).and_then(|property_name| {
            // Resolution guarantees at least one data source.
            let data_source_id =
                data_source_ids
                    .first()
                    .cloned()
                    .ok_or(NotionError::Transport {
                        message: Some("Database root has no data sources.".to_string()),
                    })?;
            session.create_page(&CreatePageRequest::with_title(
                PageParent::DataSource { data_source_id },
                &property_name,
                &test_title,
            ))
        }),
    };

    let test_page_id = match write_attempt {
        Ok(created) => {
            checks.push(VerificationCheck::ok("write", "Test page created."));
            Some(created.id)
        }
        Err(error) => {
            checks.push(VerificationCheck::error("write", &map_notion_error(&error)));
            return capability_result(checks, None);
        }
    };

    if let Some(page_id) = &test_page_id {
        match session.archive_page(page_id) {
            Ok(_) => checks.push(VerificationCheck::ok("archive", "Test page archived.")),
            Err(error) => {
                checks.push(VerificationCheck::error(
                    "archive",
                    &map_notion_error(&error),
                ));
            }
        }
    }

    capability_result(checks, test_page_id)
}
