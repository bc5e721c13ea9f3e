//! Logging setup
//!
//! Log output goes to stderr so that stdout stays free for the resolved
//! settings.

use crate::config::schema::{LOG_FORMAT, LOG_LEVEL};
use crate::config::EnvSnapshot;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing_subscriber::{fmt as tracing_fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer};

/// Default filter directive when neither `RUST_LOG` nor a level is given
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl Default for LogFormat {
    fn default() -> Self {
        LogFormat::Pretty
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            _ => anyhow::bail!("Invalid log format: {}. Expected: json or pretty", s),
        }
    }
}

/// Pick the log level and format
///
/// Explicit arguments win over `LOG_LEVEL` / `LOG_FORMAT`, which are read
/// from the same snapshot as every other setting so `.env` values apply.
pub fn resolve_log_config(
    env: &EnvSnapshot,
    level: Option<String>,
    format: Option<LogFormat>,
) -> anyhow::Result<(String, LogFormat)> {
    let level = level
        .or_else(|| env.get_non_empty(LOG_LEVEL).map(str::to_string))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    let format = match format {
        Some(format) => format,
        None => match env.get_non_empty(LOG_FORMAT) {
            Some(raw) => raw.parse()?,
            None => LogFormat::default(),
        },
    };
    Ok((level, format))
}

/// Build the filter from `RUST_LOG`, falling back to `log_level`
pub fn build_filter(log_level: &str) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global tracing subscriber
///
/// Fails if a subscriber has already been installed.
pub fn init_tracing(log_level: &str, format: LogFormat) -> anyhow::Result<()> {
    let filter = build_filter(log_level);

    let layer: Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync> = match format {
        LogFormat::Json => tracing_fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed(),
        LogFormat::Pretty => tracing_fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(layer).try_init()?;
    Ok(())
}
