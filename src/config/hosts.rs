//! Allowed hosts and CSRF trusted origins
//!
//! The host list always starts with the loopback entries. Operator-supplied
//! hosts from `ALLOWED_HOSTS` are appended verbatim (no de-duplication), while
//! the platform-provided external hostname is only appended when missing.

use super::env::{resolve_list, EnvSnapshot};

/// Loopback hosts every deployment accepts
pub const LOOPBACK_HOSTS: [&str; 2] = ["127.0.0.1", "localhost"];

/// Domain suffix of the hosting platform's public hostnames
pub const PLATFORM_DOMAIN_SUFFIX: &str = ".onrender.com";

/// Build the host list from `base_hosts` plus the comma-separated `var`
pub fn resolve_host_list(base_hosts: &[&str], env: &EnvSnapshot, var: &str) -> Vec<String> {
    let mut hosts: Vec<String> = base_hosts.iter().map(|host| host.to_string()).collect();
    let extra = resolve_list(env, var);
    if !extra.is_empty() {
        tracing::debug!(var = var, count = extra.len(), "Appending configured hosts");
    }
    hosts.extend(extra);
    hosts
}

/// Append the platform external hostname (and its platform alias) if absent
///
/// A bare service name such as `myapp` also gets `myapp.onrender.com`; a
/// hostname already on the platform domain is added as-is.
pub fn append_external_hostname(hosts: &mut Vec<String>, hostname: &str) {
    let hostname = hostname.trim();
    if hostname.is_empty() {
        return;
    }

    push_unique(hosts, hostname);
    if !hostname.ends_with(PLATFORM_DOMAIN_SUFFIX) {
        push_unique(hosts, &format!("{}{}", hostname, PLATFORM_DOMAIN_SUFFIX));
    }
}

fn push_unique(hosts: &mut Vec<String>, host: &str) {
    if hosts.iter().any(|existing| existing == host) {
        tracing::debug!(host = host, "External hostname already allowed");
    } else {
        hosts.push(host.to_string());
    }
}

/// Whether `host` is one of the loopback entries
pub fn is_loopback(host: &str) -> bool {
    LOOPBACK_HOSTS.contains(&host)
}

/// Origin trusted for CSRF purposes for a single allowed host
///
/// Loopback hosts are served over plain HTTP during development; everything
/// else is assumed to sit behind TLS. A leading-dot subdomain wildcard maps to
/// the `*.` origin form and the catch-all `*` host has no origin.
pub fn origin_for_host(host: &str) -> Option<String> {
    if host == "*" {
        return None;
    }
    if is_loopback(host) {
        return Some(format!("http://{}", host));
    }
    match host.strip_prefix('.') {
        Some(domain) => Some(format!("https://*.{}", domain)),
        None => Some(format!("https://{}", host)),
    }
}

/// Derive CSRF trusted origins mirroring the allowed host list
pub fn derive_csrf_origins(hosts: &[String]) -> Vec<String> {
    hosts.iter().filter_map(|host| origin_for_host(host)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hosts_from(value: &str) -> Vec<String> {
        let env = EnvSnapshot::new().with_var("ALLOWED_HOSTS", value);
        resolve_host_list(&LOOPBACK_HOSTS, &env, "ALLOWED_HOSTS")
    }

    #[test]
    fn test_loopback_only_when_unset() {
        let hosts = resolve_host_list(&LOOPBACK_HOSTS, &EnvSnapshot::new(), "ALLOWED_HOSTS");
        assert_eq!(hosts, vec!["127.0.0.1", "localhost"]);
    }

    #[test]
    fn test_extra_hosts_trimmed_in_order() {
        assert_eq!(
            hosts_from("a.com, b.com"),
            vec!["127.0.0.1", "localhost", "a.com", "b.com"]
        );
    }

    #[test]
    fn test_configured_hosts_not_deduplicated() {
        assert_eq!(
            hosts_from("localhost,a.com,a.com"),
            vec!["127.0.0.1", "localhost", "localhost", "a.com", "a.com"]
        );
    }

    #[test]
    fn test_external_hostname_deduplicated() {
        let mut hosts = hosts_from("myapp.onrender.com");
        append_external_hostname(&mut hosts, "myapp.onrender.com");
        assert_eq!(hosts, vec!["127.0.0.1", "localhost", "myapp.onrender.com"]);
    }

    #[test]
    fn test_bare_external_hostname_gets_platform_alias() {
        let mut hosts = hosts_from("");
        append_external_hostname(&mut hosts, "myapp");
        assert_eq!(
            hosts,
            vec!["127.0.0.1", "localhost", "myapp", "myapp.onrender.com"]
        );
    }

    #[test]
    fn test_blank_external_hostname_ignored() {
        let mut hosts = hosts_from("");
        append_external_hostname(&mut hosts, "  ");
        assert_eq!(hosts, vec!["127.0.0.1", "localhost"]);
    }

    #[test]
    fn test_csrf_origins_mirror_hosts() {
        let hosts: Vec<String> = ["127.0.0.1", "localhost", "shop.example.com", ".example.org", "*"]
            .iter()
            .map(|h| h.to_string())
            .collect();

        assert_eq!(
            derive_csrf_origins(&hosts),
            vec![
                "http://127.0.0.1",
                "http://localhost",
                "https://shop.example.com",
                "https://*.example.org",
            ]
        );
    }

    proptest! {
        #[test]
        fn test_loopback_prefix_always_present(raw in ".*") {
            let hosts = hosts_from(&raw);
            prop_assert!(hosts.len() >= 2);
            prop_assert_eq!(hosts[0].as_str(), LOOPBACK_HOSTS[0]);
            prop_assert_eq!(hosts[1].as_str(), LOOPBACK_HOSTS[1]);
        }

        #[test]
        fn test_appended_entries_are_trimmed_and_non_empty(raw in "[a-z., ]{0,40}") {
            let hosts = hosts_from(&raw);
            for host in &hosts[2..] {
                prop_assert!(!host.is_empty());
                prop_assert_eq!(host.trim(), host.as_str());
            }
        }
    }
}
