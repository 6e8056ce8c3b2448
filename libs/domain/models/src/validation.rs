use thiserror::Error;

use crate::workspace::{MAX_CPU_QUOTA, MAX_MEMORY_BYTES, MAX_WORKSPACE_NAME_LEN, MIN_MEMORY_BYTES};

/// A rejected input. Carries a machine-readable `field` plus a
/// human-readable `reason`; the HTTP edge turns this into a 400 with a
/// `Validation` error kind.
#[derive(Debug, Error, Clone)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

const PASSWORD_SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.<>/?";

/// 8-128 code points, at least one of each: lowercase, uppercase, digit,
/// symbol from the fixed set above.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if !(8..=128).contains(&len) {
        return Err(ValidationError::new(
            "password",
            "must be between 8 and 128 characters",
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));
    if !(has_lower && has_upper && has_digit && has_symbol) {
        return Err(ValidationError::new(
            "password",
            "must contain a lowercase letter, an uppercase letter, a digit, and a symbol",
        ));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.len() > 255 {
        return Err(ValidationError::new("email", "must be 1-255 characters"));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::new("email", "must contain '@'"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::new("email", "not a valid email address"));
    }
    Ok(())
}

/// Alphanumeric, space, dash, underscore; 1-100 characters.
pub fn validate_workspace_name(name: &str) -> Result<(), ValidationError> {
    if name.is_empty() || name.chars().count() > MAX_WORKSPACE_NAME_LEN {
        return Err(ValidationError::new(
            "name",
            format!("must be 1-{MAX_WORKSPACE_NAME_LEN} characters"),
        ));
    }
    let valid = name
        .chars()
        .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_');
    if !valid {
        return Err(ValidationError::new(
            "name",
            "may only contain letters, digits, spaces, dashes, and underscores",
        ));
    }
    Ok(())
}

pub fn validate_cpu_quota(value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 || value > MAX_CPU_QUOTA {
        return Err(ValidationError::new(
            "cpuLimit",
            format!("must be greater than 0 and at most {MAX_CPU_QUOTA}"),
        ));
    }
    Ok(())
}

pub fn validate_memory_bytes(value: i64) -> Result<(), ValidationError> {
    if value < MIN_MEMORY_BYTES || value > MAX_MEMORY_BYTES {
        return Err(ValidationError::new(
            "memoryLimit",
            format!("must be between {MIN_MEMORY_BYTES} and {MAX_MEMORY_BYTES} bytes"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_password_missing_each_required_class() {
        assert!(validate_password("short1!").is_err());
        assert!(validate_password("alllowercase1!").is_err());
        assert!(validate_password("ALLUPPERCASE1!").is_err());
        assert!(validate_password("NoDigitsHere!").is_err());
        assert!(validate_password("NoSymbolsHere1").is_err());
        assert!(validate_password("Abcd1234!").is_ok());
    }

    #[test]
    fn rejects_cpu_quota_boundaries() {
        assert!(validate_cpu_quota(0.0).is_err());
        assert!(validate_cpu_quota(8.01).is_err());
        assert!(validate_cpu_quota(8.0).is_ok());
        assert!(validate_cpu_quota(0.1).is_ok());
    }

    #[test]
    fn rejects_memory_boundaries() {
        assert!(validate_memory_bytes(127 * 1024 * 1024).is_err());
        assert!(validate_memory_bytes(8193 * 1024 * 1024).is_err());
        assert!(validate_memory_bytes(128 * 1024 * 1024).is_ok());
    }

    #[test]
    fn rejects_workspace_name_with_invalid_characters() {
        assert!(validate_workspace_name("valid name-1_2").is_ok());
        assert!(validate_workspace_name("invalid/name").is_err());
        assert!(validate_workspace_name("").is_err());
    }
}
