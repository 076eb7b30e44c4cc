//! CLI result rendering.
//!
//! Every command resolves to one result payload that is rendered either as a
//! single human line (`command: message`) or as one JSON object per line for
//! scripted callers. Verification-heavy commands additionally render their
//! check list in a compact preflight style.

use colored::Colorize;
use serde_json::Value as JsonValue;

use crate::notion::verify::{CheckStatus, VerificationCheck};

/// Render a command result payload. The payload must carry `command` and
/// `message` string fields; anything else rides along in JSON mode only.
pub fn log_result(payload: &JsonValue, json: bool) {
    if json {
        println!("{}", payload);
        return;
    }

    let command = payload["command"].as_str().unwrap_or("");
    let message = payload["message"].as_str().unwrap_or("");
    println!("{}: {}", command, message);
}

/// Render a check list in text mode, one `[ok]`/`[error]` line per probe,
/// in execution order.
pub fn render_checks(checks: &[VerificationCheck]) {
    for check in checks {
        let marker = match check.status {
            CheckStatus::Ok => "ok".bright_green(),
            CheckStatus::Error => "error".bright_red(),
        };
        println!("  [{}] {}: {}", marker, check.name, check.message);
    }
}

/// Mask a token for display, keeping only the last four characters.
pub fn mask_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.len() <= 4 {
        return trimmed.to_string();
    }

    let tail: String = trimmed
        .chars()
        .skip(trimmed.chars().count().saturating_sub(4))
        .collect();
    format!("****{}", tail)
}
