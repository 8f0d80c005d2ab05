// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Link verification: does the source document actually link to the target?

use crate::html::scan_tags;
use url::Url;

/// True iff `body` contains an anchor whose `href` equals `target`'s
/// serialized form. Exact match: no trailing-slash, case, or query-order
/// normalization. Malformed markup never fails, it just finds no anchors.
pub fn target_linked_in(body: &str, target: &Url) -> bool {
    let want = target.as_str();
    scan_tags(body, "a")
        .iter()
        .any(|tag| tag.attr("href") == Some(want))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_exact_href_matches() {
        let target = url("https://my-site.example.org/posts/hello");
        let body = format!(r#"<p>I wrote about <a href="{}">this</a>.</p>"#, target);
        assert!(target_linked_in(&body, &target));
    }

    #[test]
    fn test_unrelated_href_does_not_match() {
        let target = url("https://my-site.example.org/posts/hello");
        let body = r#"<a href="https://somewhere-else.example.com/">other</a>"#;
        assert!(!target_linked_in(body, &target));
    }

    #[test]
    fn test_no_normalization() {
        let target = url("https://my-site.example.org/posts/hello");
        // Trailing slash and case differences are different URLs.
        assert!(!target_linked_in(
            r#"<a href="https://my-site.example.org/posts/hello/">x</a>"#,
            &target
        ));
        assert!(!target_linked_in(
            r#"<a href="https://my-site.example.org/posts/HELLO">x</a>"#,
            &target
        ));
    }

    #[test]
    fn test_entity_escaped_href_matches() {
        let target = url("https://my-site.example.org/posts/hello?a=1&b=2");
        let body = r#"<a href="https://my-site.example.org/posts/hello?a=1&amp;b=2">x</a>"#;
        assert!(target_linked_in(body, &target));
    }

    #[test]
    fn test_link_in_other_attribute_does_not_count() {
        let target = url("https://my-site.example.org/posts/hello");
        let body = format!(r#"<a title="{}" href="https://other.example.com/">x</a>"#, target);
        assert!(!target_linked_in(&body, &target));
    }

    #[test]
    fn test_malformed_html_is_false_not_an_error() {
        let target = url("https://my-site.example.org/posts/hello");
        assert!(!target_linked_in("<a href=", &target));
        assert!(!target_linked_in("not html at all", &target));
        assert!(!target_linked_in("", &target));
    }
}
