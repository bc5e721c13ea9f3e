//! Site Settings
//!
//! Resolves the settings snapshot for the current process and prints it, so
//! deployments can check what the application will run with.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use site_settings::{
    config::{schema::OPTIONS, DatabaseTarget, LoadOptions, Profile, Settings},
    logging::{init_tracing, resolve_log_config, LogFormat},
    utils::mask_secret,
};
use std::env;
use std::path::PathBuf;

/// Output format for resolved settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

/// Site Settings
///
/// Resolves environment-driven settings for a hosted web application.
#[derive(Parser, Debug)]
#[command(name = "site-settings")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Deployment profile: local, hosted (overrides DEPLOY_PROFILE env var)
    #[arg(short, long)]
    profile: Option<Profile>,

    /// Project base directory (defaults to the current directory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Env file to read instead of ./.env
    #[arg(long, conflicts_with = "no_dotenv")]
    env_file: Option<PathBuf>,

    /// Ignore .env files entirely
    #[arg(long)]
    no_dotenv: bool,

    /// Do not create the media directory
    #[arg(long)]
    no_create_dirs: bool,

    /// Fail instead of warning when the fallback secret is used in a hosted
    /// deployment or with DEBUG off
    #[arg(long)]
    strict: bool,

    /// Output format: json, pretty
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Pretty)]
    format: OutputFormat,

    /// Log level: trace, debug, info, warn, error (overrides LOG_LEVEL env var)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format: json, pretty (overrides LOG_FORMAT env var)
    #[arg(long)]
    log_format: Option<LogFormat>,

    /// Print the configuration schema and exit
    #[arg(long)]
    schema: bool,
}

/// Settings as printed, with the secret masked and the database target parsed
#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    settings: &'a Settings,
    secret_key: String,
    insecure_secret: bool,
    database_target: DatabaseTarget,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let base_dir = match args.base_dir {
        Some(dir) => dir,
        None => env::current_dir().context("Failed to determine current directory")?,
    };

    let mut options = LoadOptions::new(base_dir);
    options.profile = args.profile;
    options.env_file = args.env_file;
    options.use_dotenv = !args.no_dotenv;
    options.create_dirs = !args.no_create_dirs;
    options.strict = args.strict;

    // One snapshot feeds both logging and settings
    let env = options
        .capture_env()
        .context("Failed to read the environment")?;

    // Logging comes first so that resolution itself is visible
    let (log_level, log_format) = resolve_log_config(&env, args.log_level, args.log_format)?;
    init_tracing(&log_level, log_format)?;

    if args.schema {
        return print_schema(args.format);
    }

    let settings = Settings::load_from(&env, &options).context("Failed to resolve settings")?;
    let database_target = settings
        .database
        .target()
        .context("Failed to parse DATABASE_URL")?;

    tracing::info!(
        profile = %settings.profile,
        debug = settings.debug,
        database = %database_target.engine,
        hosts = settings.allowed_hosts.len(),
        "Settings resolved"
    );

    let report = Report {
        settings: &settings,
        secret_key: mask_secret(&settings.secret_key),
        insecure_secret: settings.uses_insecure_secret(),
        database_target,
    };

    match args.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Pretty => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &Report<'_>) {
    let settings = report.settings;
    let security = &settings.security;

    println!("profile              {}", settings.profile);
    println!("debug                {}", settings.debug);
    println!(
        "secret_key           {}{}",
        report.secret_key,
        if report.insecure_secret { " (insecure fallback)" } else { "" }
    );
    println!("allowed_hosts        {}", settings.allowed_hosts.join(", "));
    println!("csrf_trusted_origins {}", settings.csrf_trusted_origins.join(", "));
    println!(
        "database             {} ({}, conn_max_age={}s)",
        report.database_target.redacted_url,
        report.database_target.engine,
        settings.database.conn_max_age_seconds
    );
    println!(
        "static               {} -> {} [{}]",
        settings.static_files.url,
        settings.static_files.root.display(),
        settings.static_files.storage
    );
    println!(
        "media                {} -> {}",
        settings.media.url,
        settings.media.root.display()
    );
    println!(
        "cookies secure       csrf={} session={}",
        security.csrf_cookie_secure, security.session_cookie_secure
    );
    println!(
        "hsts                 {}s include_subdomains={} preload={}",
        security.hsts_seconds, security.hsts_include_subdomains, security.hsts_preload
    );
    println!(
        "headers              nosniff={} xss_filter={} x_frame_options={}",
        security.content_type_nosniff,
        security.browser_xss_filter,
        security.frame_options.header_value()
    );
    if let Some(header) = &security.proxy_ssl_header {
        println!("proxy_ssl_header     {}={}", header.header, header.value);
    }
    println!(
        "localization         {} {}",
        settings.localization.language_code, settings.localization.time_zone
    );
}

fn print_schema(format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(OPTIONS)?),
        OutputFormat::Pretty => {
            for spec in OPTIONS {
                println!("{:<26} {:<13} {}", spec.name, spec.kind.to_string(), spec.description);
                println!("{:<26} default: {}", "", spec.default);
                println!("{:<26} rule:    {}", "", spec.rule);
            }
        }
    }
    Ok(())
}
