//! Environment variable credential lookup.
//!
//! Explicit credentials passed through `ModelOptions` always win; the
//! environment is only consulted when none was given.

use secrecy::SecretString;

/// Read a credential from the environment variable `var`.
///
/// Unset, empty, and non-Unicode values are all treated as absent, since a
/// credential must be a valid non-empty string.
pub fn env_credential(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Some(SecretString::from(value)),
        Ok(_) => None,
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => None,
    }
}

/// Pick the explicit credential if present, else fall back to `var`.
pub fn resolve_credential(explicit: Option<&SecretString>, var: &str) -> Option<SecretString> {
    match explicit {
        Some(key) => Some(key.clone()),
        None => env_credential(var),
    }
}
