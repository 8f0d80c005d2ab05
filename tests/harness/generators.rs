// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! URL generators for the integration suites.

use url::Url;

/// Source URLs spread over a handful of external hosts.
pub fn source_url(i: usize) -> Url {
    Url::parse(&format!("https://blog-{}.example.com/post/{}", i / 10, i % 10)).unwrap()
}

/// Target URLs under the site's post namespace.
pub fn target_url(i: usize) -> Url {
    Url::parse(&format!("https://my-site.example.org/posts/{i}")).unwrap()
}

/// Source URLs all sharing `host`.
pub fn sources_with_host(host: &str, count: usize) -> Vec<Url> {
    (0..count)
        .map(|i| Url::parse(&format!("https://{host}/post/{i}")).unwrap())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_urls_are_distinct() {
        let a = source_url(1);
        let b = source_url(2);
        assert_ne!(a, b);
        assert_ne!(target_url(1), target_url(2));
    }

    #[test]
    fn test_sources_share_their_host() {
        let sources = sources_with_host("mirror.example.net", 5);
        assert_eq!(sources.len(), 5);
        assert!(sources
            .iter()
            .all(|u| u.host_str() == Some("mirror.example.net")));
    }
}
