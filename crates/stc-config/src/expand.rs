//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use std::sync::LazyLock;

use regex::Regex;

use crate::ConfigError;

/// `${VAR}` reference without a default.
static REQUIRED_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap());

/// Expand environment variable references in a string.
///
/// Returns the original string unchanged if no `${}` patterns are present.
/// Unset variables referenced without a default are an error naming `field`.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    if let Some(missing) = REQUIRED_VAR_RE
        .captures_iter(value)
        .map(|caps| caps[1].to_owned())
        .find(|name| std::env::var_os(name).is_none())
    {
        return Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{missing}}} not set"),
        });
    }

    Ok(shellexpand::env_with_context_no_errors(value, |var| std::env::var(var).ok()).into_owned())
}
