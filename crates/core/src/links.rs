//! Link extraction and domain checks.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+").expect("URL pattern is valid"));

/// Returns every `http://` or `https://` URL in `text`, in order of appearance.
///
/// A URL runs until the next whitespace character.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Returns true when `url` points at `domain` or one of its subdomains.
///
/// Host comparison is case-insensitive. Unparseable URLs and URLs without a host are rejected.
pub fn is_domain_link(url: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };

    let host = host.to_ascii_lowercase();
    let domain = domain.trim_start_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }

    host == domain
        || host
            .strip_suffix(domain.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}
