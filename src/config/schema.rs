//! Configuration schema
//!
//! Every environment variable the resolver reads is declared here with its
//! type, default and validation rule. The resolver refers to variables only
//! through these names.

use serde::Serialize;
use std::fmt;

pub const DEPLOY_PROFILE: &str = "DEPLOY_PROFILE";
pub const RENDER: &str = "RENDER";
pub const DEBUG: &str = "DEBUG";
pub const SECRET_KEY: &str = "SECRET_KEY";
pub const ALLOWED_HOSTS: &str = "ALLOWED_HOSTS";
pub const RENDER_EXTERNAL_HOSTNAME: &str = "RENDER_EXTERNAL_HOSTNAME";
pub const DATABASE_URL: &str = "DATABASE_URL";
pub const LOG_LEVEL: &str = "LOG_LEVEL";
pub const LOG_FORMAT: &str = "LOG_FORMAT";

/// Value type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Profile,
    Bool,
    String,
    HostList,
    Hostname,
    DatabaseUrl,
}

/// Default applied when an option is absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum OptionDefault {
    Literal(&'static str),
    /// Default depends on the deployment profile
    PerProfile {
        local: &'static str,
        hosted: &'static str,
    },
    /// Default computed from other inputs
    Derived(&'static str),
    /// Nothing is added when absent
    Unset,
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OptionKind::Profile => "profile",
            OptionKind::Bool => "bool",
            OptionKind::String => "string",
            OptionKind::HostList => "host list",
            OptionKind::Hostname => "hostname",
            OptionKind::DatabaseUrl => "database url",
        };
        write!(f, "{}", name)
    }
}

impl fmt::Display for OptionDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionDefault::Literal(value) => write!(f, "{:?}", value),
            OptionDefault::PerProfile { local, hosted } => {
                write!(f, "{} (local), {} (hosted)", local, hosted)
            }
            OptionDefault::Derived(rule) => write!(f, "{}", rule),
            OptionDefault::Unset => write!(f, "-"),
        }
    }
}

/// One entry of the schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionSpec {
    pub name: &'static str,
    pub kind: OptionKind,
    pub default: OptionDefault,
    pub rule: &'static str,
    pub description: &'static str,
}

pub const OPTIONS: &[OptionSpec] = &[
    OptionSpec {
        name: DEPLOY_PROFILE,
        kind: OptionKind::Profile,
        default: OptionDefault::Derived("hosted if RENDER is truthy, else local"),
        rule: "local|dev|development or hosted|prod|production (case-insensitive)",
        description: "Deployment mode hint",
    },
    OptionSpec {
        name: RENDER,
        kind: OptionKind::Bool,
        default: OptionDefault::Literal("false"),
        rule: "boolean token",
        description: "Set by the hosting platform on every service",
    },
    OptionSpec {
        name: DEBUG,
        kind: OptionKind::Bool,
        default: OptionDefault::PerProfile {
            local: "true",
            hosted: "false",
        },
        rule: "1/true/yes/on/y/t or 0/false/no/off/n/f/empty (case-insensitive)",
        description: "Selects the debug or production policy matrix",
    },
    OptionSpec {
        name: SECRET_KEY,
        kind: OptionKind::String,
        default: OptionDefault::Literal(super::settings::INSECURE_SECRET_KEY),
        rule: "the default must not be used in a hosted deployment or with DEBUG off",
        description: "Signing secret for sessions and tokens",
    },
    OptionSpec {
        name: ALLOWED_HOSTS,
        kind: OptionKind::HostList,
        default: OptionDefault::Unset,
        rule: "comma-separated; entries trimmed, empty entries dropped, duplicates kept",
        description: "Extra host names appended after the loopback hosts",
    },
    OptionSpec {
        name: RENDER_EXTERNAL_HOSTNAME,
        kind: OptionKind::Hostname,
        default: OptionDefault::Unset,
        rule: "appended only if not already allowed",
        description: "Public hostname assigned by the hosting platform",
    },
    OptionSpec {
        name: DATABASE_URL,
        kind: OptionKind::DatabaseUrl,
        default: OptionDefault::Derived("sqlite:///{base_dir}/db.sqlite3"),
        rule: "absolute URL; blank counts as unset",
        description: "Database connection string",
    },
    OptionSpec {
        name: LOG_LEVEL,
        kind: OptionKind::String,
        default: OptionDefault::Literal(crate::logging::DEFAULT_LOG_LEVEL),
        rule: "tracing filter directive; RUST_LOG and --log-level take precedence",
        description: "Log verbosity of the CLI",
    },
    OptionSpec {
        name: LOG_FORMAT,
        kind: OptionKind::String,
        default: OptionDefault::Literal("pretty"),
        rule: "json or pretty (case-insensitive); --log-format takes precedence",
        description: "Log line format of the CLI",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(name: &str) -> Option<&'static OptionSpec> {
        OPTIONS.iter().find(|spec| spec.name == name)
    }

    #[test]
    fn test_every_documented_variable_is_declared() {
        for name in [
            DEBUG,
            SECRET_KEY,
            ALLOWED_HOSTS,
            RENDER_EXTERNAL_HOSTNAME,
            DATABASE_URL,
            DEPLOY_PROFILE,
            RENDER,
            LOG_LEVEL,
            LOG_FORMAT,
        ] {
            assert!(lookup(name).is_some(), "{name} missing from schema");
        }
        assert_eq!(OPTIONS.len(), 9);
    }

    #[test]
    fn test_names_are_unique() {
        for (i, spec) in OPTIONS.iter().enumerate() {
            assert!(OPTIONS[i + 1..].iter().all(|other| other.name != spec.name));
        }
    }

    #[test]
    fn test_debug_default_depends_on_profile() {
        assert_eq!(
            lookup(DEBUG).unwrap().default,
            OptionDefault::PerProfile {
                local: "true",
                hosted: "false"
            }
        );
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(OptionKind::HostList.to_string(), "host list");
        assert_eq!(OptionDefault::Unset.to_string(), "-");
        assert_eq!(
            lookup(DEBUG).unwrap().default.to_string(),
            "true (local), false (hosted)"
        );
    }

    #[test]
    fn test_schema_serializes() {
        let json = serde_json::to_value(OPTIONS).unwrap();
        assert_eq!(json[2]["name"], "DEBUG");
        assert_eq!(json[2]["default"]["type"], "per_profile");
        assert_eq!(json[4]["kind"], "host_list");
    }
}
