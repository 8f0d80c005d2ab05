// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Minimal, forgiving HTML tag scanner.
//!
//! Just enough to find anchors and metadata tags in real-world pages.
//! Malformed markup yields fewer tags, never an error.

/// An opening tag's attribute list.
pub(crate) struct Tag {
    attrs: Vec<(String, String)>,
}

impl Tag {
    /// Value of `name` (ASCII case-insensitive), entity-decoded.
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Scan `body` for opening tags named `name` (ASCII case-insensitive) and
/// return their attribute lists. Comments are skipped.
pub(crate) fn scan_tags(body: &str, name: &str) -> Vec<Tag> {
    let bytes = body.as_bytes();
    let mut tags = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        if body[i..].starts_with("<!--") {
            i = match body[i + 4..].find("-->") {
                Some(end) => i + 4 + end + 3,
                None => bytes.len(),
            };
            continue;
        }
        i += 1;

        let name_start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        if !body[name_start..i].eq_ignore_ascii_case(name) {
            while i < bytes.len() && bytes[i] != b'>' {
                i += 1;
            }
            continue;
        }

        let mut attrs = Vec::new();
        while i < bytes.len() && bytes[i] != b'>' {
            if bytes[i].is_ascii_whitespace() || bytes[i] == b'/' {
                i += 1;
                continue;
            }

            let attr_start = i;
            while i < bytes.len()
                && !bytes[i].is_ascii_whitespace()
                && !matches!(bytes[i], b'=' | b'>' | b'/')
            {
                i += 1;
            }
            let attr_name = &body[attr_start..i];
            if attr_name.is_empty() {
                i += 1;
                continue;
            }

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let value = if i < bytes.len() && bytes[i] == b'=' {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                    i += 1;
                }
                if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                    let quote = bytes[i];
                    i += 1;
                    let value_start = i;
                    while i < bytes.len() && bytes[i] != quote {
                        i += 1;
                    }
                    let raw = &body[value_start..i];
                    if i < bytes.len() {
                        i += 1; // closing quote
                    }
                    decode_entities(raw)
                } else {
                    let value_start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                        i += 1;
                    }
                    decode_entities(&body[value_start..i])
                }
            } else {
                String::new()
            };

            attrs.push((attr_name.to_ascii_lowercase(), value));
        }

        tags.push(Tag { attrs });
    }

    tags
}

/// Inner text of the first `name` element (lowercase tag name expected),
/// entity-decoded and trimmed.
pub(crate) fn element_text(body: &str, name: &str) -> Option<String> {
    // ASCII lowercasing preserves byte offsets.
    let lower = body.to_ascii_lowercase();
    let open = format!("<{name}");
    let close = format!("</{name}");
    let mut from = 0;

    loop {
        let at = lower[from..].find(&open)? + from;
        let after = at + open.len();
        match lower.as_bytes().get(after) {
            Some(b'>') | Some(b' ') | Some(b'\t') | Some(b'\n') | Some(b'\r') => {
                let content_start = lower[after..].find('>')? + after + 1;
                let content_end = lower[content_start..].find(&close)? + content_start;
                let text = decode_entities(body[content_start..content_end].trim());
                return if text.is_empty() { None } else { Some(text) };
            }
            _ => from = after,
        }
    }
}

/// Decode the standard named entities and numeric character references.
/// Unknown entities are left as-is.
pub(crate) fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        match rest.find(';') {
            Some(end) if end <= 10 => {
                let entity = &rest[1..end];
                let decoded = match entity {
                    "amp" => Some('&'),
                    "lt" => Some('<'),
                    "gt" => Some('>'),
                    "quot" => Some('"'),
                    "apos" => Some('\''),
                    _ if entity.starts_with("#x") || entity.starts_with("#X") => {
                        u32::from_str_radix(&entity[2..], 16)
                            .ok()
                            .and_then(char::from_u32)
                    }
                    _ if entity.starts_with('#') => {
                        entity[1..].parse::<u32>().ok().and_then(char::from_u32)
                    }
                    _ => None,
                };
                match decoded {
                    Some(c) => {
                        out.push(c);
                        rest = &rest[end + 1..];
                    }
                    None => {
                        out.push('&');
                        rest = &rest[1..];
                    }
                }
            }
            _ => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_tags_basic() {
        let body = r#"<p>hi</p><a href="https://example.com/a" rel="nofollow">x</a>"#;
        let tags = scan_tags(body, "a");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].attr("href"), Some("https://example.com/a"));
        assert_eq!(tags[0].attr("rel"), Some("nofollow"));
    }

    #[test]
    fn test_scan_tags_quote_styles_and_case() {
        let body = "<A HREF='https://example.com/a'>x</A><a href=https://example.com/b>y</a>";
        let tags = scan_tags(body, "a");
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].attr("href"), Some("https://example.com/a"));
        assert_eq!(tags[1].attr("href"), Some("https://example.com/b"));
    }

    #[test]
    fn test_scan_tags_skips_comments_and_close_tags() {
        let body = r#"<!-- <a href="https://hidden.example.com/"> --><a href="https://example.com/">x</a>"#;
        let tags = scan_tags(body, "a");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].attr("href"), Some("https://example.com/"));
    }

    #[test]
    fn test_scan_tags_does_not_match_prefixed_names() {
        let tags = scan_tags(r#"<abbr title="x">y</abbr>"#, "a");
        assert!(tags.is_empty());
    }

    #[test]
    fn test_scan_tags_entity_decoding() {
        let tags = scan_tags(r#"<a href="https://example.com/?a=1&amp;b=2">x</a>"#, "a");
        assert_eq!(tags[0].attr("href"), Some("https://example.com/?a=1&b=2"));
    }

    #[test]
    fn test_scan_tags_malformed_input() {
        for body in ["<a href=", "<a", "<", "", "<><<>>", "<a href=\"unterminated"] {
            // Must not panic; anything found must still be an anchor.
            let _ = scan_tags(body, "a");
        }
    }

    #[test]
    fn test_element_text() {
        let body = "<html><head><TITLE> Hello &amp; welcome </TITLE></head></html>";
        assert_eq!(element_text(body, "title").as_deref(), Some("Hello & welcome"));
        assert!(element_text("<p>no title here</p>", "title").is_none());
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#x2F;path&#47;x"), "/path/x");
        assert_eq!(decode_entities("&unknown; stays"), "&unknown; stays");
        assert_eq!(decode_entities("plain"), "plain");
    }
}
