//! Helpers for request validation and model conversion.
//!
//! Only [`parse_date`] is re-exported; everything else stays internal so every
//! write path enforces the same invariants.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Longest description accepted, in characters.
pub(crate) const DESCRIPTION_MAX_CHARS: usize = 255;

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("invalid {label} id")))
}

/// Parse an ISO calendar date (`YYYY-MM-DD`), ignoring surrounding whitespace.
pub fn parse_date(value: &str) -> ResultEngine<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::Validation(format!("invalid date: {value}")))
}

/// Trim `value` and reject it when longer than `max_chars`. Blank is allowed.
pub(crate) fn normalize_text(value: &str, label: &str, max_chars: usize) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max_chars {
        return Err(EngineError::Validation(format!(
            "{label} must be at most {max_chars} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_only() {
        assert_eq!(
            parse_date("2025-01-05").unwrap(),
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
        );
        assert!(parse_date("05/01/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn text_is_trimmed_and_bounded() {
        assert_eq!(normalize_text("  rent ", "description", 10).unwrap(), "rent");
        assert_eq!(normalize_text("   ", "description", 10).unwrap(), "");
        assert_eq!(normalize_text("abcdefghij", "description", 10).unwrap(), "abcdefghij");
        assert!(normalize_text("abcdefghijk", "description", 10).is_err());
    }
}
