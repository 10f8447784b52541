//! Field-level validation helpers used at the service boundary.
//!
//! Each helper returns [`CoreError::Validation`] with a message naming the
//! offending field.

use crate::error::CoreError;
use crate::types::Date;

/// Reject empty or whitespace-only strings.
pub fn require_non_empty(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Reject negative or non-finite amounts.
pub fn require_non_negative(field: &str, value: f64) -> Result<(), CoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(CoreError::Validation(format!(
            "{field} must be a non-negative number, got {value}"
        )));
    }
    Ok(())
}

/// Apply [`require_non_negative`] to an optional amount.
pub fn optional_non_negative(field: &str, value: Option<f64>) -> Result<(), CoreError> {
    match value {
        Some(v) => require_non_negative(field, v),
        None => Ok(()),
    }
}

/// Reject integers below `min`.
pub fn require_at_least(field: &str, value: i32, min: i32) -> Result<(), CoreError> {
    if value < min {
        return Err(CoreError::Validation(format!(
            "{field} must be at least {min}, got {value}"
        )));
    }
    Ok(())
}

/// Reject a date range whose end precedes its start.
pub fn require_date_range(start: Date, end: Date) -> Result<(), CoreError> {
    if end < start {
        return Err(CoreError::Validation(format!(
            "end_date {end} is before start_date {start}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_and_blank_strings_rejected() {
        assert_matches!(require_non_empty("destination", ""), Err(CoreError::Validation(_)));
        assert_matches!(require_non_empty("destination", "  "), Err(CoreError::Validation(_)));
        assert!(require_non_empty("destination", "Goa").is_ok());
    }

    #[test]
    fn negative_and_nan_amounts_rejected() {
        assert!(require_non_negative("cost", -0.5).is_err());
        assert!(require_non_negative("cost", f64::NAN).is_err());
        assert!(require_non_negative("cost", 0.0).is_ok());
        assert!(optional_non_negative("cost", None).is_ok());
    }

    #[test]
    fn minimum_is_inclusive() {
        assert!(require_at_least("travelers", 1, 1).is_ok());
        let err = require_at_least("travelers", 0, 1).unwrap_err();
        assert!(err.to_string().contains("travelers must be at least 1"));
    }

    #[test]
    fn date_range_allows_single_day() {
        let day = Date::from_ymd_opt(2026, 3, 1).unwrap();
        assert!(require_date_range(day, day).is_ok());
        let before = Date::from_ymd_opt(2026, 2, 28).unwrap();
        assert!(require_date_range(day, before).is_err());
    }
}
