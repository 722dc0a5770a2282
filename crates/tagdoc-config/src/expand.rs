//! Environment variable expansion for configuration strings.

use crate::ConfigError;

/// Expand `${VAR}` and `${VAR:-default}` references in `value`.
///
/// `field` names the configuration key in error messages.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    shellexpand::env(value)
        .map(std::borrow::Cow::into_owned)
        .map_err(|e| ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", e.var_name),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_unchanged() {
        assert_eq!(
            expand_env("https://registry.npmjs.org", "f").unwrap(),
            "https://registry.npmjs.org"
        );
    }

    #[test]
    fn test_default_used_when_unset() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TAGDOC_EXPAND_UNSET");
        }
        assert_eq!(
            expand_env("${TAGDOC_EXPAND_UNSET:-http://localhost}/npm", "f").unwrap(),
            "http://localhost/npm"
        );
    }

    #[test]
    fn test_variable_expanded() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TAGDOC_EXPAND_SET", "https://npm.example.com");
        }
        assert_eq!(
            expand_env("${TAGDOC_EXPAND_SET}", "f").unwrap(),
            "https://npm.example.com"
        );
        unsafe {
            std::env::remove_var("TAGDOC_EXPAND_SET");
        }
    }

    #[test]
    fn test_missing_variable_names_field() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("TAGDOC_EXPAND_MISSING");
        }
        let err = expand_env("${TAGDOC_EXPAND_MISSING}", "packages.registry_url").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Environment variable error in packages.registry_url: ${TAGDOC_EXPAND_MISSING} not set"
        );
    }
}
