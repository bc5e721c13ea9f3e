//! Error types
//!
//! Every failure the resolver can produce is fatal at startup: the caller is
//! expected to abort initialization rather than run misconfigured.

pub mod types;

pub use types::{Result, SettingsError};
