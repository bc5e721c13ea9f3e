//! Utility modules
//!
//! Contains string and filesystem helpers shared by the resolver.

pub mod fs;
pub mod string;

pub use fs::ensure_directory;
pub use string::{mask_secret, split_csv, truncate_str};
