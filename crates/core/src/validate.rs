//! Small field validators shared by the domain crates.

use crate::error::{DomainError, DomainResult};

/// Require a non-blank string no longer than `max` characters.
pub fn required_text(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} cannot be empty")));
    }
    optional_text(field, value, max)
}

/// Allow blank, but cap the length at `max` characters.
pub fn optional_text(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} cannot exceed {max} characters"
        )));
    }
    Ok(())
}

/// Require a strictly positive quantity.
pub fn positive_quantity(field: &str, value: i64) -> DomainResult<()> {
    if value <= 0 {
        return Err(DomainError::validation(format!("{field} must be positive")));
    }
    Ok(())
}

/// Require a quantity that is zero or more.
pub fn non_negative(field: &str, value: i64) -> DomainResult<()> {
    if value < 0 {
        return Err(DomainError::validation(format!("{field} cannot be negative")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank_and_overlong() {
        assert!(required_text("name", "Widget", 10).is_ok());
        assert!(required_text("name", "   ", 10).is_err());
        assert!(required_text("name", "abcdefghijk", 10).is_err());
    }

    #[test]
    fn quantity_checks() {
        assert!(positive_quantity("quantity", 1).is_ok());
        assert!(positive_quantity("quantity", 0).is_err());
        assert!(non_negative("stock", 0).is_ok());
        assert!(non_negative("stock", -1).is_err());
    }
}
