//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen based on reasonable UX limits for names, notes
//! and phone numbers; the document store has no built-in length
//! enforcement.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: dish, coupon, table, customer, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes and modification texts (item note, cancel reason, etc.)
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, city, payment method
pub const MAX_SHORT_TEXT_LEN: usize = 100;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate a discount percentage (exclusive 0, inclusive 100).
pub fn validate_percentage(value: f64, field: &str) -> Result<(), AppError> {
    if !(value > 0.0 && value <= 100.0) {
        return Err(AppError::validation(format!(
            "{field} must be between 0 and 100 (got {value})"
        )));
    }
    Ok(())
}

/// Validate a non-negative monetary amount.
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative amount (got {value})"
        )));
    }
    Ok(())
}
