//! Security and static-file policy derived from the debug flag
//!
//! Every production hardening switch is gated on `!debug`. [`derive_policy`] is
//! the only place that knows the matrix; it has exactly two outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One year, the HSTS max-age used in production
pub const HSTS_ONE_YEAR_SECONDS: u64 = 31_536_000;

/// How static files are stored and served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaticFilesStorage {
    /// Plain files served as collected (development)
    Uncompressed,
    /// Compressed files with content-hashed manifest names (production)
    CompressedManifest,
}

impl fmt::Display for StaticFilesStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaticFilesStorage::Uncompressed => write!(f, "uncompressed"),
            StaticFilesStorage::CompressedManifest => write!(f, "compressed-manifest"),
        }
    }
}

/// Value of the `X-Frame-Options` header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum FrameOptions {
    #[serde(rename = "DENY")]
    Deny,
    #[serde(rename = "SAMEORIGIN")]
    SameOrigin,
}

impl FrameOptions {
    pub fn header_value(&self) -> &'static str {
        match self {
            FrameOptions::Deny => "DENY",
            FrameOptions::SameOrigin => "SAMEORIGIN",
        }
    }
}

/// Request header (in CGI form) and value that mark a request as HTTPS
/// when it arrives through the platform's TLS-terminating proxy
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProxySslHeader {
    pub header: String,
    pub value: String,
}

impl Default for ProxySslHeader {
    fn default() -> Self {
        Self {
            header: "HTTP_X_FORWARDED_PROTO".to_string(),
            value: "https".to_string(),
        }
    }
}

/// Transport and cookie security flags
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SecurityPolicy {
    pub csrf_cookie_secure: bool,
    pub session_cookie_secure: bool,
    pub browser_xss_filter: bool,
    pub content_type_nosniff: bool,
    pub proxy_ssl_header: Option<ProxySslHeader>,
    pub hsts_seconds: u64,
    pub hsts_include_subdomains: bool,
    pub hsts_preload: bool,
    pub frame_options: FrameOptions,
}

/// Everything that changes between debug and production
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PolicyBundle {
    pub storage: StaticFilesStorage,
    pub security: SecurityPolicy,
}

/// Map the debug flag to its policy bundle
pub fn derive_policy(debug: bool) -> PolicyBundle {
    if debug {
        PolicyBundle {
            storage: StaticFilesStorage::Uncompressed,
            security: SecurityPolicy {
                csrf_cookie_secure: false,
                session_cookie_secure: false,
                browser_xss_filter: false,
                content_type_nosniff: false,
                proxy_ssl_header: None,
                hsts_seconds: 0,
                hsts_include_subdomains: false,
                hsts_preload: false,
                frame_options: FrameOptions::SameOrigin,
            },
        }
    } else {
        PolicyBundle {
            storage: StaticFilesStorage::CompressedManifest,
            security: SecurityPolicy {
                csrf_cookie_secure: true,
                session_cookie_secure: true,
                browser_xss_filter: true,
                content_type_nosniff: true,
                proxy_ssl_header: Some(ProxySslHeader::default()),
                hsts_seconds: HSTS_ONE_YEAR_SECONDS,
                hsts_include_subdomains: true,
                hsts_preload: true,
                frame_options: FrameOptions::Deny,
            },
        }
    }
}
