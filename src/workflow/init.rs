//! The init pipeline: prove the token works, resolve the root, prove the
//! three capabilities, then persist.
//!
//! Each remote step yields a structured result; the pipeline stops at the
//! first failed step and reports it. Nothing is persisted until every step
//! has passed, so saved configuration always describes a verified setup.

use colored::Colorize;

use crate::config::auth::{load_notion_auth, save_notion_auth};
use crate::config::paths;
use crate::core::error::NwsError;
use crate::core::output::render_checks;
use crate::core::prompt;
use crate::notion::client::NotionHttpClient;
use crate::notion::root::{resolve_root, ResolvedRoot};
use crate::notion::verify::{
    verify_root_capabilities, verify_token, verify_workspace_access, CheckStatus,
    VerificationCheck,
};
use crate::state::workspace_root::{load_workspace_root, save_workspace_root, WorkspaceRootState};
use crate::workflow::{WorkflowOptions, WorkflowResult};

fn first_error_message(checks: &[VerificationCheck], fallback: &str) -> String {
    checks
        .iter()
        .find(|check| check.status == CheckStatus::Error)
        .map(|check| check.message.clone())
        .unwrap_or_else(|| fallback.to_string())
}

fn step_header(options: &WorkflowOptions, text: &str) {
    if !options.json {
        println!("{}", text.bright_white());
    }
}

fn show_checks(options: &WorkflowOptions, checks: &[VerificationCheck]) {
    if !options.json {
        render_checks(checks);
    }
}

/// Runs the full verification pipeline and persists the credential and
/// workspace root records on success.
///
/// # Errors
///
/// Propagates identifier-parse failures and required-input validation errors
/// (cancelled prompts, empty token); every remote failure comes back as an
/// error-status result instead.
pub fn init_workflow(options: &WorkflowOptions) -> Result<WorkflowResult, NwsError> {
    let auth_path = paths::auth_config_path()?;
    let root_path = paths::workspace_root_path()?;

    let saved_auth = load_notion_auth(&auth_path);
    let token = prompt::prompt_for_token(
        saved_auth.as_ref().map(|auth| auth.token.as_str()),
        options.yes,
    )?;
    let client = NotionHttpClient::new(&token)?;

    step_header(options, "Verifying integration token");
    let token_result = verify_token(&client);
    show_checks(options, &token_result.checks);
    if !token_result.ok {
        let message = first_error_message(&token_result.checks, &token_result.summary);
        return Ok(WorkflowResult::error("init", &message)
            .with_details(checks_details(&token_result.checks)));
    }

    let workspace_result = verify_workspace_access(&client);
    show_checks(options, &workspace_result.checks);
    if !workspace_result.ok {
        let message = first_error_message(&workspace_result.checks, &workspace_result.summary);
        return Ok(WorkflowResult::error("init", &message)
            .with_details(checks_details(&workspace_result.checks)));
    }

    let saved_root = load_workspace_root(&root_path);
    let root_input = prompt::prompt_for_root_input(saved_root.as_ref(), options.yes)?;

    step_header(options, "Resolving workspace root");
    let root = match resolve_root(&client, &root_input) {
        Ok(root) => root,
        Err(error @ NwsError::InvalidIdentifier(_)) => return Err(error),
        Err(error) => return Ok(WorkflowResult::error("init", &error.to_string())),
    };
    if !options.json {
        println!("  Found {}: {}", root.kind_name(), root.title());
    }

    step_header(options, "Verifying root capabilities");
    let capability = verify_root_capabilities(&client, &root);
    show_checks(options, &capability.checks);
    if !capability.ok {
        let mut message = first_error_message(&capability.checks, &capability.summary);
        // A failed archive leaves the probe page behind; name it rather than
        // pretending the run was clean.
        if let Some(test_page_id) = &capability.test_page_id {
            message = format!(
                "{} Test page {} was left behind; archive it manually in Notion.",
                message, test_page_id
            );
        }
        let mut details = checks_details(&capability.checks);
        if let Some(test_page_id) = &capability.test_page_id {
            details.insert(
                "test_page_id".to_string(),
                serde_json::json!(test_page_id),
            );
        }
        return Ok(WorkflowResult::error("init", &message).with_details(details));
    }

    let data_source_id = match &root {
        ResolvedRoot::Page { .. } => None,
        ResolvedRoot::Database {
            data_source_ids, ..
        } => Some(prompt::prompt_for_data_source(data_source_ids, options.yes)?),
    };

    save_notion_auth(&auth_path, &token)?;
    let state = WorkspaceRootState::from_resolved(&root, data_source_id.as_deref())?;
    save_workspace_root(&root_path, &state)?;

    let message = format!(
        "Workspace root '{}' ({}) verified and saved.",
        root.title(),
        root.kind_name()
    );

    let mut details = checks_details(&capability.checks);
    details.insert("root".to_string(), serde_json::to_value(&state)?);
    if let Some(user) = &token_result.user {
        details.insert("user".to_string(), serde_json::to_value(user)?);
    }

    Ok(WorkflowResult::ok("init", &message).with_details(details))
}

fn checks_details(checks: &[VerificationCheck]) -> serde_json::Map<String, serde_json::Value> {
    let mut details = serde_json::Map::new();
    details.insert(
        "checks".to_string(),
        serde_json::to_value(checks).unwrap_or_default(),
    );
    details
}
