//! Configuration management module
//!
//! This module resolves the application configuration snapshot from
//! environment variables, `.env` files and typed defaults.

pub mod database;
pub mod env;
pub mod hosts;
pub mod policy;
pub mod schema;
pub mod settings;

pub use database::{DatabaseConfig, DatabaseEngine, DatabaseTarget};
pub use env::{resolve_bool, resolve_list, resolve_string, EnvSnapshot};
pub use hosts::{append_external_hostname, derive_csrf_origins, resolve_host_list, LOOPBACK_HOSTS};
pub use policy::{derive_policy, FrameOptions, PolicyBundle, SecurityPolicy, StaticFilesStorage};
pub use schema::{OptionSpec, OPTIONS};
pub use settings::{LoadOptions, Localization, MediaFiles, Profile, Settings, StaticFiles};
