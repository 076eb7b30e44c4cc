//! Interactive prompts for the init flow.
//!
//! Every prompt honors `--yes`: saved values are reused and single-choice
//! selections are taken without asking. EOF on stdin surfaces as a cancelled
//! prompt, which callers treat as a validation failure, not a crash.

use colored::Colorize;
use std::io::{self, BufRead, Write};

use crate::core::error::NwsError;
use crate::core::output::mask_token;
use crate::state::workspace_root::WorkspaceRootState;

fn read_trimmed_line() -> Result<String, NwsError> {
    let mut line = String::new();
    let read = io::stdin().lock().read_line(&mut line)?;
    if read == 0 {
        return Err(NwsError::ValidationError("Prompt cancelled.".to_string()));
    }
    Ok(line.trim().to_string())
}

fn ask(message: &str) -> Result<String, NwsError> {
    print!("{} ", message.bright_cyan());
    io::stdout().flush()?;
    read_trimmed_line()
}

fn confirm(message: &str) -> Result<bool, NwsError> {
    let answer = ask(&format!("{} [Y/n]", message))?;
    Ok(matches!(answer.to_lowercase().as_str(), "" | "y" | "yes"))
}

/// Returns the token to use: the saved one (after confirmation, or
/// immediately under `--yes`) or freshly entered input.
pub fn prompt_for_token(saved_token: Option<&str>, yes: bool) -> Result<String, NwsError> {
    if let Some(saved) = saved_token.map(str::trim).filter(|token| !token.is_empty()) {
        if yes {
            return Ok(saved.to_string());
        }
        if confirm(&format!("Reuse saved token ({})?", mask_token(saved)))? {
            return Ok(saved.to_string());
        }
    }

    let token = ask("Enter Notion integration token:")?;
    if token.is_empty() {
        return Err(NwsError::ValidationError("Token is required.".to_string()));
    }
    Ok(token)
}

/// Returns the root URL/id to resolve: the saved root's id (after
/// confirmation, or immediately under `--yes`) or freshly entered input.
pub fn prompt_for_root_input(
    saved_root: Option<&WorkspaceRootState>,
    yes: bool,
) -> Result<String, NwsError> {
    if let Some(saved) = saved_root {
        let label = match saved.title() {
            Some(title) => format!("{} ({})", title, saved.kind_name()),
            None => format!("{} root", saved.kind_name()),
        };
        if yes {
            return Ok(saved.root_id().to_string());
        }
        if confirm(&format!("Reuse saved root {}?", label))? {
            return Ok(saved.root_id().to_string());
        }
    }

    let root = ask("Enter Notion root URL or ID:")?;
    if root.is_empty() {
        return Err(NwsError::ValidationError(
            "Root URL or ID is required.".to_string(),
        ));
    }
    Ok(root)
}

/// Picks the data source rows will be written into. A single candidate (or
/// `--yes`) takes the first; otherwise the operator selects by number.
pub fn prompt_for_data_source(data_source_ids: &[String], yes: bool) -> Result<String, NwsError> {
    let first = data_source_ids.first().ok_or_else(|| {
        NwsError::ValidationError("No data sources available for selection.".to_string())
    })?;

    if data_source_ids.len() == 1 || yes {
        return Ok(first.clone());
    }

    println!("Select a database data source:");
    for (index, id) in data_source_ids.iter().enumerate() {
        println!("  {}. {}", index + 1, id);
    }

    let answer = ask(&format!("Choice [1-{}]:", data_source_ids.len()))?;
    answer
        .parse::<usize>()
        .ok()
        .and_then(|choice| choice.checked_sub(1))
        .and_then(|index| data_source_ids.get(index))
        .cloned()
        .ok_or_else(|| {
            NwsError::ValidationError("Data source selection is required.".to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_reuses_saved_token_without_asking() {
        let token = prompt_for_token(Some("  secret_1234  "), true).unwrap();
        assert_eq!(token, "secret_1234");
    }

    #[test]
    fn test_yes_reuses_saved_root_without_asking() {
        let saved = WorkspaceRootState::Page {
            page_id: "page-1".to_string(),
            title: Some("My Page".to_string()),
            url: None,
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let root = prompt_for_root_input(Some(&saved), true).unwrap();
        assert_eq!(root, "page-1");
    }

    #[test]
    fn test_single_data_source_needs_no_prompt() {
        let ids = vec!["ds-1".to_string()];
        assert_eq!(prompt_for_data_source(&ids, false).unwrap(), "ds-1");
    }

    #[test]
    fn test_yes_takes_first_data_source() {
        let ids = vec!["ds-1".to_string(), "ds-2".to_string()];
        assert_eq!(prompt_for_data_source(&ids, true).unwrap(), "ds-1");
    }

    #[test]
    fn test_empty_data_source_list_is_rejected() {
        let err = prompt_for_data_source(&[], true).unwrap_err();
        assert!(matches!(err, NwsError::ValidationError(_)));
    }
}
