//! Site settings resolver library
//!
//! Resolves the runtime configuration of a hosted web application (debug and
//! production policy, allowed hosts, CSRF origins, database URL, file layout)
//! from environment variables into one immutable [`Settings`] value.

// Public modules
pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

// Re-export commonly used types
pub use config::{EnvSnapshot, LoadOptions, Profile, Settings};
pub use error::{Result, SettingsError};
