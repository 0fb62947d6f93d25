//! Input validation for secret names and values.

use crate::core::constants::RESERVED_PREFIX;
use crate::error::{Result, ValidationError};

/// Validate a GitHub secret name.
///
/// Secret names must:
/// - Only contain A-Z, a-z, 0-9, and underscore
/// - Not start with a digit
/// - Not start with the reserved `GITHUB_` prefix
/// - Not be empty
///
/// # Errors
///
/// Returns `ValidationError` if the name is invalid.
pub fn validate_secret_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName.into());
    }

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid(name, "cannot start with a digit".to_string()));
    }

    if name.to_ascii_uppercase().starts_with(RESERVED_PREFIX) {
        return Err(invalid(
            name,
            format!("the {} prefix is reserved", RESERVED_PREFIX),
        ));
    }

    for (i, ch) in name.chars().enumerate() {
        if !ch.is_ascii_alphanumeric() && ch != '_' {
            return Err(invalid(
                name,
                format!(
                    "invalid character '{}' at position {}. Only A-Z, a-z, 0-9, and underscore are allowed",
                    ch,
                    i + 1
                ),
            ));
        }
    }

    Ok(())
}

/// Validate a plaintext value about to be sealed.
///
/// # Errors
///
/// Returns `ValidationError::EmptyValue` if the value is empty or whitespace.
pub fn validate_value(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyValue(name.to_string()).into());
    }
    Ok(())
}

fn invalid(name: &str, reason: String) -> crate::error::Error {
    ValidationError::InvalidName {
        name: name.to_string(),
        reason,
    }
    .into()
}
