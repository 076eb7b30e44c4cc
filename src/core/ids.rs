//! Notion identifier parsing and normalization.
//!
//! Notion renders one 128-bit id namespace two ways: dashed 8-4-4-4-12 UUID
//! form (URLs, API responses) and a bare 32-hex run (share links, pasted ids
//! with dashes stripped). Both page and database ids live in this namespace,
//! so parsing says nothing about resource kind - that is the resolver's job.

use regex::Regex;
use std::sync::OnceLock;

use crate::core::error::NwsError;

fn dashed_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
            .expect("valid dashed id regex")
    })
}

fn raw_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9a-fA-F]{32}").expect("valid raw id regex"))
}

/// Extracts a Notion id from free-form text (a URL, a dashed id, a bare id)
/// and returns it as 32 lowercase hex characters with dashes stripped.
///
/// The dashed form is matched first so a URL like `.../My-Page-<dashed-id>`
/// yields the id rather than the first 32 hex digits that happen to span a
/// dash. No existence check is performed.
pub fn parse_notion_id(input: &str) -> Result<String, NwsError> {
    let trimmed = input.trim();

    if let Some(matched) = dashed_id_pattern().find(trimmed) {
        return Ok(matched.as_str().replace('-', "").to_lowercase());
    }

    if let Some(matched) = raw_id_pattern().find(trimmed) {
        return Ok(matched.as_str().to_lowercase());
    }

    Err(NwsError::InvalidIdentifier(
        "No valid Notion ID found in input. Provide a Notion URL or 32-character ID.".to_string(),
    ))
}

/// Re-renders any parseable id in canonical dashed lowercase form
/// (`8-4-4-4-12`), the only form handed to the API.
pub fn normalize_notion_id(input: &str) -> Result<String, NwsError> {
    let raw = parse_notion_id(input)?;

    Ok(format!(
        "{}-{}-{}-{}-{}",
        &raw[0..8],
        &raw[8..12],
        &raw[12..16],
        &raw[16..20],
        &raw[20..]
    ))
}
