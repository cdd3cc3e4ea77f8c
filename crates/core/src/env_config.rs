//! Environment variable readers with warn-level logging for unusable values.

/// Reads a non-empty environment variable. Unset, empty and non-UTF-8 values are `None`.
#[must_use]
pub fn env_string(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v),
        Ok(_) => None,
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => {
            tracing::warn!(var, "env var is not valid UTF-8, ignoring");
            None
        },
    }
}

/// Parses an environment variable, falling back to `default`.
///
/// Unset or empty variables fall back silently; set-but-unparseable values log a
/// warning first.
pub fn env_parse_with_default<T: std::str::FromStr + std::fmt::Display>(
    var: &str,
    default: T,
) -> T {
    let Some(raw) = env_string(var) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::warn!(var, value = %raw, default = %default, "invalid env var value, using default");
            default
        },
    }
}
