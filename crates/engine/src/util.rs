//! Internal helpers for input normalization and id conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every store enforces the same rules.

use uuid::Uuid;

use crate::{EngineError, MoneyCents, ResultEngine};

/// Trim a required name, rejecting empty values.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim optional text; blank input becomes `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

fn require_in_range(amount: MoneyCents, label: &str) -> ResultEngine<()> {
    if !amount.in_range() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not exceed {} in magnitude",
            MoneyCents::MAX_ABS
        )));
    }
    Ok(())
}

pub(crate) fn require_non_negative(amount: MoneyCents, label: &str) -> ResultEngine<()> {
    if amount.is_negative() {
        return Err(EngineError::InvalidInput(format!("{label} must be >= 0")));
    }
    require_in_range(amount, label)
}

pub(crate) fn require_positive(amount: MoneyCents, label: &str) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(EngineError::InvalidInput(format!("{label} must be > 0")));
    }
    require_in_range(amount, label)
}

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| EngineError::InvalidInput(format!("invalid {label} id: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_text_blank_becomes_none() {
        assert_eq!(normalize_optional_text(None), None);
        assert_eq!(normalize_optional_text(Some("   ")), None);
        assert_eq!(normalize_optional_text(Some(" cash ")), Some("cash".to_string()));
    }

    #[test]
    fn amounts_are_bounded() {
        assert!(require_positive(MoneyCents::MAX_ABS, "amount").is_ok());
        assert!(require_non_negative(MoneyCents::ZERO, "planned_budget").is_ok());
        assert!(matches!(
            require_positive(MoneyCents::new(i64::MAX), "amount"),
            Err(EngineError::InvalidInput(_))
        ));
        assert!(matches!(
            require_non_negative(MoneyCents::new(MoneyCents::MAX_ABS.cents() + 1), "planned_budget"),
            Err(EngineError::InvalidInput(_))
        ));
    }

    #[test]
    fn required_name_is_trimmed() {
        assert_eq!(normalize_required_name("  Rent ", "category").unwrap(), "Rent");
        assert!(matches!(
            normalize_required_name("   ", "category"),
            Err(EngineError::InvalidInput(_))
        ));
    }
}
