//! Application settings and configuration
//!
//! This module resolves the immutable [`Settings`] snapshot from a frozen
//! environment, a deployment profile and the project base directory.

use super::database::DatabaseConfig;
use super::env::{resolve_bool, resolve_string, EnvSnapshot};
use super::hosts::{
    append_external_hostname, derive_csrf_origins, resolve_host_list, LOOPBACK_HOSTS,
};
use super::policy::{derive_policy, SecurityPolicy, StaticFilesStorage};
use super::schema::{
    ALLOWED_HOSTS, DEBUG, DEPLOY_PROFILE, RENDER, RENDER_EXTERNAL_HOSTNAME, SECRET_KEY,
};
use crate::error::{Result, SettingsError};
use crate::utils::ensure_directory;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Secret used when `SECRET_KEY` is unset. Only acceptable for local debug runs.
pub const INSECURE_SECRET_KEY: &str = "django-insecure-mudar-isso-em-producao";

/// Deployment profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Developer machine
    #[value(aliases = ["dev", "development"])]
    Local,
    /// Hosted platform deployment
    #[value(aliases = ["prod", "production"])]
    Hosted,
}

impl Profile {
    /// `DEBUG` value used when the variable is absent
    pub fn default_debug(&self) -> bool {
        match self {
            Profile::Local => true,
            Profile::Hosted => false,
        }
    }

    /// Pick the profile from `DEPLOY_PROFILE`, else from the platform marker
    pub fn from_env(env: &EnvSnapshot) -> Result<Self> {
        if let Some(raw) = env.get_non_empty(DEPLOY_PROFILE) {
            return raw.parse();
        }
        if resolve_bool(env, RENDER, false)? {
            Ok(Profile::Hosted)
        } else {
            Ok(Profile::Local)
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Profile::Local => write!(f, "local"),
            Profile::Hosted => write!(f, "hosted"),
        }
    }
}

impl Default for Profile {
    fn default() -> Self {
        Profile::Local
    }
}

impl std::str::FromStr for Profile {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "local" | "dev" | "development" => Ok(Profile::Local),
            "hosted" | "prod" | "production" => Ok(Profile::Hosted),
            _ => Err(SettingsError::invalid_value(
                DEPLOY_PROFILE,
                s,
                "expected local, dev, development, hosted, prod or production",
            )),
        }
    }
}

/// Static asset layout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StaticFiles {
    pub url: String,
    /// Directory static files are collected into for serving
    pub root: PathBuf,
    /// Source directories searched during collection
    pub dirs: Vec<PathBuf>,
    pub storage: StaticFilesStorage,
}

/// User-uploaded media layout
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MediaFiles {
    pub url: String,
    pub root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Localization {
    pub language_code: String,
    pub time_zone: String,
    pub use_i18n: bool,
    pub use_tz: bool,
}

impl Default for Localization {
    fn default() -> Self {
        Self {
            language_code: "pt-br".to_string(),
            time_zone: "Africa/Luanda".to_string(),
            use_i18n: true,
            use_tz: true,
        }
    }
}

/// Resolved configuration snapshot
///
/// Built once at startup and handed to whatever needs it; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub profile: Profile,
    pub debug: bool,

    #[serde(skip_serializing)]
    pub secret_key: String,

    // Request validation
    pub allowed_hosts: Vec<String>,
    pub csrf_trusted_origins: Vec<String>,

    pub database: DatabaseConfig,

    // Files
    pub static_files: StaticFiles,
    pub media: MediaFiles,

    pub security: SecurityPolicy,
    pub localization: Localization,

    pub base_dir: PathBuf,
}

/// Options for [`Settings::load`]
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Explicit profile; detected from the environment when `None`
    pub profile: Option<Profile>,
    pub base_dir: PathBuf,
    /// Explicit `.env` file; the default `.env` lookup is used when `None`
    pub env_file: Option<PathBuf>,
    pub use_dotenv: bool,
    /// Create the media directory if it is missing
    pub create_dirs: bool,
    /// Refuse the insecure fallback secret in hosted deployments and with
    /// DEBUG off
    pub strict: bool,
}

impl LoadOptions {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            profile: None,
            base_dir: base_dir.into(),
            env_file: None,
            use_dotenv: true,
            create_dirs: true,
            strict: false,
        }
    }

    /// Capture the environment these options describe
    ///
    /// Process variables take precedence over the `.env` file, when one is
    /// used.
    pub fn capture_env(&self) -> Result<EnvSnapshot> {
        if self.use_dotenv {
            EnvSnapshot::from_process_with_dotenv(self.env_file.as_deref())
        } else {
            Ok(EnvSnapshot::from_process())
        }
    }
}

impl Settings {
    /// Resolve settings from a frozen environment
    ///
    /// Pure apart from logging: the same inputs always produce the same
    /// snapshot. Fails only on malformed boolean values.
    pub fn resolve(env: &EnvSnapshot, profile: Profile, base_dir: &Path) -> Result<Self> {
        let debug = resolve_bool(env, DEBUG, profile.default_debug())?;
        let secret_key = resolve_string(env, SECRET_KEY, INSECURE_SECRET_KEY);

        let mut allowed_hosts = resolve_host_list(&LOOPBACK_HOSTS, env, ALLOWED_HOSTS);
        if let Some(hostname) = env.get_non_empty(RENDER_EXTERNAL_HOSTNAME) {
            tracing::debug!(hostname = %hostname, "Adding platform external hostname");
            append_external_hostname(&mut allowed_hosts, hostname);
        }
        let csrf_trusted_origins = derive_csrf_origins(&allowed_hosts);

        let policy = derive_policy(debug);

        let settings = Self {
            profile,
            debug,
            secret_key,
            allowed_hosts,
            csrf_trusted_origins,
            database: DatabaseConfig::resolve(env, base_dir),
            static_files: StaticFiles {
                url: "/static/".to_string(),
                root: base_dir.join("staticfiles"),
                dirs: vec![base_dir.join("static")],
                storage: policy.storage,
            },
            media: MediaFiles {
                url: "/media/".to_string(),
                root: base_dir.join("media"),
            },
            security: policy.security,
            localization: Localization::default(),
            base_dir: base_dir.to_path_buf(),
        };

        tracing::debug!(
            profile = %settings.profile,
            debug = settings.debug,
            hosts = settings.allowed_hosts.len(),
            storage = %settings.static_files.storage,
            "Settings resolved"
        );

        Ok(settings)
    }

    /// Load settings for this process
    ///
    /// Captures the environment (on top of a `.env` file when enabled),
    /// resolves, validates, and prepares the media directory.
    pub fn load(options: &LoadOptions) -> Result<Self> {
        let env = options.capture_env()?;
        Self::load_from(&env, options)
    }

    /// Same as [`Settings::load`], for an environment the caller already
    /// captured
    ///
    /// A relative base directory is resolved against the working directory.
    pub fn load_from(env: &EnvSnapshot, options: &LoadOptions) -> Result<Self> {
        let profile = match options.profile {
            Some(profile) => profile,
            None => Profile::from_env(env)?,
        };

        let base_dir = absolute_base_dir(&options.base_dir)?;
        let settings = Self::resolve(env, profile, &base_dir)?;
        settings.validate(options.strict)?;

        if options.create_dirs {
            ensure_directory(&settings.media.root)?;
        }

        Ok(settings)
    }

    /// Validate settings
    ///
    /// Unsafe but workable hosted setups only produce warnings unless
    /// `strict` is set. The fallback secret is refused in a hosted
    /// deployment whatever DEBUG says, and anywhere with DEBUG off.
    pub fn validate(&self, strict: bool) -> Result<()> {
        let target = self.database.target()?;

        if self.uses_insecure_secret() && (self.is_hosted() || !self.debug) {
            if strict {
                return Err(SettingsError::invalid_value(
                    SECRET_KEY,
                    "<unset>",
                    "the built-in development secret cannot be used in a hosted deployment or with DEBUG off",
                ));
            }
            tracing::warn!(
                profile = %self.profile,
                debug = self.debug,
                "SECRET_KEY is not set, falling back to the insecure development secret!"
            );
        }

        if self.is_hosted() {
            if self.debug {
                tracing::warn!("Running a hosted deployment with DEBUG enabled!");
            }
            if target.is_embedded() {
                tracing::warn!(
                    database = %target.redacted_url,
                    "Hosted deployment is using the embedded database, data will not survive redeploys"
                );
            }
        }

        Ok(())
    }

    /// Whether the secret is the built-in fallback
    pub fn uses_insecure_secret(&self) -> bool {
        self.secret_key == INSECURE_SECRET_KEY
    }

    pub fn is_hosted(&self) -> bool {
        self.profile == Profile::Hosted
    }
}

fn absolute_base_dir(base_dir: &Path) -> Result<PathBuf> {
    if base_dir.is_absolute() {
        return Ok(base_dir.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| SettingsError::Io {
        path: base_dir.to_path_buf(),
        source,
    })?;
    Ok(cwd.join(base_dir))
}
