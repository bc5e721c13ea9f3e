//! Database connection settings
//!
//! `DATABASE_URL` selects the database. When it is unset (or blank) the
//! application falls back to an embedded SQLite file inside the base
//! directory, which is what local development runs against.

use super::env::EnvSnapshot;
use super::schema::DATABASE_URL;
use crate::error::{Result, SettingsError};
use crate::utils::mask_secret;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use url::Url;

/// How long (seconds) a database connection may be reused across requests
pub const DEFAULT_CONN_MAX_AGE_SECONDS: u64 = 600;

/// File name of the embedded fallback database
pub const EMBEDDED_DATABASE_FILE: &str = "db.sqlite3";

/// Characters escaped when a filesystem path is placed in a URL path
const PATH_ESCAPES: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Database connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub conn_max_age_seconds: u64,
}

impl DatabaseConfig {
    /// Resolve the database configuration for `base_dir`
    pub fn resolve(env: &EnvSnapshot, base_dir: &Path) -> Self {
        let url = match env.get_non_empty(DATABASE_URL) {
            Some(url) => url.to_string(),
            None => {
                let fallback = embedded_database_url(base_dir);
                tracing::debug!(url = %fallback, "DATABASE_URL not set, using embedded database");
                fallback
            }
        };

        Self {
            url,
            conn_max_age_seconds: DEFAULT_CONN_MAX_AGE_SECONDS,
        }
    }

    /// Parse the connection URL into its components
    pub fn target(&self) -> Result<DatabaseTarget> {
        DatabaseTarget::parse(&self.url)
    }
}

/// Fallback URL of the embedded database for `base_dir`
///
/// The directory is percent-encoded, so `#`, `?` and `%` in a path survive
/// parsing. An absolute `base_dir` yields the four-slash absolute form.
pub fn embedded_database_url(base_dir: &Path) -> String {
    let dir = base_dir.to_string_lossy();
    format!(
        "sqlite:///{}/{}",
        utf8_percent_encode(dir.trim_end_matches('/'), PATH_ESCAPES),
        EMBEDDED_DATABASE_FILE
    )
}

/// Database backend selected by the URL scheme
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DatabaseEngine {
    Sqlite,
    Postgres,
    MySql,
    Other(String),
}

impl DatabaseEngine {
    fn from_scheme(scheme: &str) -> Self {
        match scheme {
            "sqlite" => DatabaseEngine::Sqlite,
            "postgres" | "postgresql" | "pgsql" | "postgis" => DatabaseEngine::Postgres,
            "mysql" | "mysql2" => DatabaseEngine::MySql,
            other => DatabaseEngine::Other(other.to_string()),
        }
    }
}

impl fmt::Display for DatabaseEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseEngine::Sqlite => write!(f, "sqlite"),
            DatabaseEngine::Postgres => write!(f, "postgres"),
            DatabaseEngine::MySql => write!(f, "mysql"),
            DatabaseEngine::Other(scheme) => write!(f, "{}", scheme),
        }
    }
}

/// Parsed connection target
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseTarget {
    pub engine: DatabaseEngine,
    pub host: Option<String>,
    pub port: Option<u16>,
    /// Database name, or the file path for SQLite
    pub name: Option<String>,
    pub user: Option<String>,
    /// Connection URL with any password replaced by `****`
    pub redacted_url: String,
}

impl DatabaseTarget {
    pub fn parse(raw: &str) -> Result<Self> {
        let url = Url::parse(raw).map_err(|e| {
            SettingsError::invalid_value(DATABASE_URL, mask_secret(raw), e.to_string())
        })?;

        let engine = DatabaseEngine::from_scheme(url.scheme());

        // sqlite:////abs/path keeps one leading slash after the authority
        let path = match engine {
            DatabaseEngine::Sqlite => url.path().strip_prefix('/'),
            _ => Some(url.path().trim_start_matches('/')),
        };
        let name = path
            .map(|path| percent_decode_str(path).decode_utf8_lossy().into_owned())
            .filter(|name| !name.is_empty());

        let mut redacted = url.clone();
        if redacted.password().is_some() {
            // Only fails for URLs that cannot carry credentials at all
            let _ = redacted.set_password(Some("****"));
        }

        Ok(Self {
            engine,
            host: url.host_str().filter(|h| !h.is_empty()).map(str::to_string),
            port: url.port(),
            name,
            user: Some(url.username())
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            redacted_url: redacted.to_string(),
        })
    }

    /// Whether this is the file-backed embedded engine
    pub fn is_embedded(&self) -> bool {
        self.engine == DatabaseEngine::Sqlite
    }
}
