//! Shared timestamp helpers for persisted records and probe titles.

use chrono::{SecondsFormat, Utc};

/// Returns the current instant as an RFC 3339 UTC string
/// (e.g. `2026-08-08T14:03:12.481Z`). Stamped into `updated_at` fields
/// and probe page titles.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
