//! Environment snapshot and typed lookups
//!
//! The resolver never reads ambient process state directly. The environment is
//! captured once into an [`EnvSnapshot`] and every lookup goes through it, so
//! resolving twice from the same snapshot always yields the same result.

use crate::error::{Result, SettingsError};
use crate::utils::split_csv;
use std::collections::BTreeMap;
use std::env;
use std::path::Path;

/// Tokens accepted as `true` (compared case-insensitively)
pub const TRUTHY_TOKENS: &[&str] = &["1", "true", "yes", "on", "y", "t"];

/// Tokens accepted as `false` (compared case-insensitively)
pub const FALSY_TOKENS: &[&str] = &["0", "false", "no", "off", "n", "f", ""];

/// Frozen view of the environment variables visible to the resolver
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the current process environment
    ///
    /// Variables whose name or value is not valid UTF-8 are skipped.
    pub fn from_process() -> Self {
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Capture the process environment on top of a `.env` file
    ///
    /// With `path = None` the usual `.env` lookup is used and a missing file is
    /// not an error. An explicit path must exist and parse. Process variables
    /// always win over file entries.
    pub fn from_process_with_dotenv(path: Option<&Path>) -> Result<Self> {
        let mut snapshot = Self::new();

        let iter = match path {
            Some(path) => dotenvy::from_path_iter(path),
            None => dotenvy::dotenv_iter(),
        };

        match iter {
            Ok(entries) => {
                for entry in entries {
                    let (key, value) = entry.map_err(|source| SettingsError::EnvFile {
                        path: path.unwrap_or(Path::new(".env")).to_path_buf(),
                        source,
                    })?;
                    snapshot.vars.insert(key, value);
                }
                tracing::debug!(
                    count = snapshot.vars.len(),
                    "Loaded variables from env file"
                );
            }
            Err(e) if path.is_none() && e.not_found() => {
                tracing::debug!("No .env file found, using process environment only");
            }
            Err(source) => {
                return Err(SettingsError::EnvFile {
                    path: path.unwrap_or(Path::new(".env")).to_path_buf(),
                    source,
                });
            }
        }

        snapshot.vars.extend(Self::from_process().vars);
        Ok(snapshot)
    }

    /// Builder-style helper that sets one variable
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    /// Look up a variable
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Look up a variable, treating an empty or whitespace-only value as unset
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name).filter(|value| !value.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for EnvSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// Parse a boolean token, returning `None` when it is in neither token set
pub fn parse_bool(raw: &str) -> Option<bool> {
    let token = raw.trim().to_ascii_lowercase();
    if TRUTHY_TOKENS.contains(&token.as_str()) {
        Some(true)
    } else if FALSY_TOKENS.contains(&token.as_str()) {
        Some(false)
    } else {
        None
    }
}

/// Read a boolean variable, falling back to `default` when it is absent
pub fn resolve_bool(env: &EnvSnapshot, name: &str, default: bool) -> Result<bool> {
    match env.get(name) {
        None => Ok(default),
        Some(raw) => parse_bool(raw).ok_or_else(|| {
            SettingsError::invalid_value(
                name,
                raw,
                format!(
                    "expected one of {} (true) or {} (false)",
                    TRUTHY_TOKENS.join("/"),
                    FALSY_TOKENS
                        .iter()
                        .filter(|token| !token.is_empty())
                        .copied()
                        .collect::<Vec<_>>()
                        .join("/")
                ),
            )
        }),
    }
}

/// Read a string variable, falling back to `default` when it is absent
pub fn resolve_string(env: &EnvSnapshot, name: &str, default: &str) -> String {
    env.get(name).unwrap_or(default).to_string()
}

/// Read a comma-separated variable into trimmed, non-empty entries
pub fn resolve_list(env: &EnvSnapshot, name: &str) -> Vec<String> {
    env.get(name).map(split_csv).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_bool_absent_uses_default() {
        let env = EnvSnapshot::new();
        assert!(resolve_bool(&env, "DEBUG", true).unwrap());
        assert!(!resolve_bool(&env, "DEBUG", false).unwrap());
    }

    #[test]
    fn test_resolve_bool_tokens() {
        for token in ["true", "True", "TRUE", "1", "yes", "On", "y", "T"] {
            let env = EnvSnapshot::new().with_var("DEBUG", token);
            assert!(resolve_bool(&env, "DEBUG", false).unwrap(), "{token}");
        }
        for token in ["false", "False", "0", "no", "OFF", "n", "f", ""] {
            let env = EnvSnapshot::new().with_var("DEBUG", token);
            assert!(!resolve_bool(&env, "DEBUG", true).unwrap(), "{token}");
        }
    }

    #[test]
    fn test_resolve_bool_rejects_garbage() {
        let env = EnvSnapshot::new().with_var("DEBUG", "maybe");
        let err = resolve_bool(&env, "DEBUG", false).unwrap_err();
        assert!(matches!(
            err,
            SettingsError::InvalidConfigValue { ref name, ref value, .. }
                if name == "DEBUG" && value == "maybe"
        ));
    }

    #[test]
    fn test_rejection_lists_every_named_token() {
        let env = EnvSnapshot::new().with_var("DEBUG", "maybe");
        let SettingsError::InvalidConfigValue { reason, .. } =
            resolve_bool(&env, "DEBUG", false).unwrap_err()
        else {
            panic!("expected InvalidConfigValue");
        };

        assert_eq!(
            reason,
            "expected one of 1/true/yes/on/y/t (true) or 0/false/no/off/n/f (false)"
        );
        assert!(!reason.contains("//"));
    }

    #[test]
    fn test_resolve_string() {
        let env = EnvSnapshot::new().with_var("SECRET_KEY", "abc");
        assert_eq!(resolve_string(&env, "SECRET_KEY", "fallback"), "abc");
        assert_eq!(resolve_string(&env, "MISSING", "fallback"), "fallback");
    }

    #[test]
    fn test_resolve_list() {
        let env = EnvSnapshot::new().with_var("ALLOWED_HOSTS", "a.com, b.com,,");
        assert_eq!(resolve_list(&env, "ALLOWED_HOSTS"), vec!["a.com", "b.com"]);
        assert!(resolve_list(&env, "MISSING").is_empty());
    }

    #[test]
    fn test_get_non_empty() {
        let env = EnvSnapshot::new().with_var("DATABASE_URL", "  ");
        assert_eq!(env.get("DATABASE_URL"), Some("  "));
        assert_eq!(env.get_non_empty("DATABASE_URL"), None);
    }

    #[test]
    fn test_from_iterator() {
        let env: EnvSnapshot = [("A", "1"), ("B", "2")].into_iter().collect();
        assert_eq!(env.len(), 2);
        assert_eq!(env.get("B"), Some("2"));
    }

    #[test]
    fn test_explicit_env_file_is_loaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("site.env");
        fs::write(
            &path,
            "SITE_SETTINGS_TEST_ONLY_KEY=from-file\nSITE_SETTINGS_TEST_ONLY_LIST=\"a.com, b.com\"\n",
        )
        .unwrap();

        let env = EnvSnapshot::from_process_with_dotenv(Some(&path)).unwrap();
        assert_eq!(env.get("SITE_SETTINGS_TEST_ONLY_KEY"), Some("from-file"));
        assert_eq!(
            resolve_list(&env, "SITE_SETTINGS_TEST_ONLY_LIST"),
            vec!["a.com", "b.com"]
        );
    }

    #[test]
    fn test_missing_explicit_env_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.env");

        let err = EnvSnapshot::from_process_with_dotenv(Some(&path)).unwrap_err();
        assert!(matches!(err, SettingsError::EnvFile { .. }));
    }

    proptest! {
        #[test]
        fn test_unknown_tokens_always_rejected(raw in "[a-zA-Z0-9]{2,12}") {
            let known = TRUTHY_TOKENS
                .iter()
                .chain(FALSY_TOKENS)
                .any(|token| token.eq_ignore_ascii_case(&raw));
            prop_assume!(!known);

            let env = EnvSnapshot::new().with_var("DEBUG", raw.clone());
            prop_assert!(resolve_bool(&env, "DEBUG", true).is_err());
        }

        #[test]
        fn test_known_tokens_parse_in_any_case(idx in 0usize..6, upper in any::<bool>()) {
            let token = if upper {
                TRUTHY_TOKENS[idx].to_ascii_uppercase()
            } else {
                TRUTHY_TOKENS[idx].to_string()
            };
            prop_assert_eq!(parse_bool(&token), Some(true));

            let token = FALSY_TOKENS[idx].to_ascii_uppercase();
            prop_assert_eq!(parse_bool(&token), Some(false));
        }
    }
}
