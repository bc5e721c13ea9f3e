//! Settings error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    /// An environment variable is present but its value is not acceptable
    #[error("Invalid value {value:?} for {name}: {reason}")]
    InvalidConfigValue {
        name: String,
        value: String,
        reason: String,
    },

    /// A filesystem operation on `path` failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An explicitly requested `.env` file is missing or malformed
    #[error("Failed to read env file {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}

impl SettingsError {
    pub fn invalid_value(
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        SettingsError::InvalidConfigValue {
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Name of the offending variable, if the error is about one
    pub fn variable(&self) -> Option<&str> {
        match self {
            SettingsError::InvalidConfigValue { name, .. } => Some(name),
            SettingsError::Io { .. } | SettingsError::EnvFile { .. } => None,
        }
    }
}

/// Result type alias for settings operations
pub type Result<T> = std::result::Result<T, SettingsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_message() {
        let err = SettingsError::invalid_value("DEBUG", "maybe", "expected a boolean");
        assert_eq!(
            err.to_string(),
            "Invalid value \"maybe\" for DEBUG: expected a boolean"
        );
        assert_eq!(err.variable(), Some("DEBUG"));
    }

    #[test]
    fn test_io_error_message() {
        let err = SettingsError::Io {
            path: PathBuf::from("/srv/app/media"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().starts_with("I/O error on /srv/app/media"));
        assert_eq!(err.variable(), None);
    }
}
