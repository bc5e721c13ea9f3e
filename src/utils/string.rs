//! String utilities
//!
//! Helpers for comma-separated environment lists and for showing secrets
//! without leaking them.

/// Number of leading characters of a secret that may be shown
pub const SECRET_PREVIEW_CHARS: usize = 4;

/// Split a comma-separated value into trimmed, non-empty entries
///
/// Order is preserved and duplicates are kept.
///
/// # Example
/// ```
/// use site_settings::utils::split_csv;
///
/// assert_eq!(split_csv(" a.com, ,b.com,"), vec!["a.com", "b.com"]);
/// ```
pub fn split_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

/// Safely truncate a string at a character boundary
pub fn truncate_str(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Mask a secret for display, keeping only a short prefix
///
/// Secrets no longer than the preview are masked entirely.
///
/// # Example
/// ```
/// use site_settings::utils::mask_secret;
///
/// assert_eq!(mask_secret("django-insecure-key"), "djan****");
/// assert_eq!(mask_secret("abc"), "****");
/// ```
pub fn mask_secret(secret: &str) -> String {
    if secret.chars().count() <= SECRET_PREVIEW_CHARS {
        "****".to_string()
    } else {
        format!("{}****", truncate_str(secret, SECRET_PREVIEW_CHARS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_csv_trims_and_drops_empty() {
        assert_eq!(split_csv("a.com, b.com"), vec!["a.com", "b.com"]);
        assert_eq!(split_csv(" , ,"), Vec::<String>::new());
        assert_eq!(split_csv(""), Vec::<String>::new());
    }

    #[test]
    fn test_split_csv_keeps_duplicates_in_order() {
        assert_eq!(split_csv("b.com,a.com,b.com"), vec!["b.com", "a.com", "b.com"]);
    }

    #[test]
    fn test_truncate_str_unicode() {
        let text = "chave-secr\u{e9}ta";
        assert_eq!(truncate_str(text, 5), "chave");
        assert_eq!(truncate_str(text, 11), "chave-secr\u{e9}");
        assert_eq!(truncate_str(text, 100), text);
    }

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("s3cr3t-value"), "s3cr****");
        assert_eq!(mask_secret("abcd"), "****");
        assert_eq!(mask_secret(""), "****");
    }
}
