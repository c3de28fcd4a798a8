//! Environment variable expansion for configuration strings.
//!
//! Supports:
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use crate::ConfigError;

/// Expand `${VAR}` references in `value`.
///
/// Strings without `${` are returned as-is, so a bare `$VAR` survives.
/// `field` names the config key in the error.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let lookup = |name: &str| {
        std::env::var(name).map(Some).map_err(|_| UnsetVar(name.to_owned()))
    };
    match shellexpand::env_with_context(value, lookup) {
        Ok(expanded) => Ok(expanded.into_owned()),
        Err(err) => Err(ConfigError::EnvVar {
            field: field.to_owned(),
            message: format!("${{{}}} not set", err.cause.0),
        }),
    }
}

/// Expand an optional field in place.
pub(crate) fn expand_opt(value: &mut Option<String>, field: &str) -> Result<(), ConfigError> {
    if let Some(raw) = value.as_deref() {
        *value = Some(expand_env(raw, field)?);
    }
    Ok(())
}

/// Name of a referenced variable that is not set.
struct UnsetVar(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_with_default_uses_value() {
        // SAFETY: each test touches its own variable
        unsafe {
            std::env::set_var("SPECREL_TEST_DEFAULT", "docs/spec.md");
        }
        let result = expand_env("${SPECREL_TEST_DEFAULT:-spec.md}", "spec_path").unwrap();
        assert_eq!(result, "docs/spec.md");
        unsafe {
            std::env::remove_var("SPECREL_TEST_DEFAULT");
        }
    }

    #[test]
    fn test_expand_with_default_uses_default() {
        // SAFETY: each test touches its own variable
        unsafe {
            std::env::remove_var("SPECREL_UNSET_TEST");
        }
        let result = expand_env("${SPECREL_UNSET_TEST:-spec.md}", "spec_path").unwrap();
        assert_eq!(result, "spec.md");
    }

    #[test]
    fn test_expand_missing_var_error() {
        // SAFETY: each test touches its own variable
        unsafe {
            std::env::remove_var("SPECREL_MISSING_TEST");
        }
        let err = expand_env("${SPECREL_MISSING_TEST}", "output_path").unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("SPECREL_MISSING_TEST"));
        assert!(err.to_string().contains("output_path"));
    }

    #[test]
    fn test_expand_embedded_var() {
        // SAFETY: each test touches its own variable
        unsafe {
            std::env::set_var("SPECREL_DIST_TEST", "public");
        }
        let result = expand_env("./${SPECREL_DIST_TEST}/spec.html", "output_path").unwrap();
        assert_eq!(result, "./public/spec.html");
        unsafe {
            std::env::remove_var("SPECREL_DIST_TEST");
        }
    }

    #[test]
    fn test_bare_dollar_not_expanded() {
        let result = expand_env("$VAR", "spec_path").unwrap();
        assert_eq!(result, "$VAR");
    }

    #[test]
    fn test_expand_opt_none_untouched() {
        let mut value = None;
        expand_opt(&mut value, "spec_path").unwrap();
        assert!(value.is_none());
    }
}
