// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Production collaborators: the reqwest-backed transport and the
//! site-local routing, resource, and metadata implementations the binary
//! wires in. All of them are replaceable through the `services` traits.

use crate::config::SiteConfig;
use crate::html::{element_text, scan_tags};
use crate::mention::SourceMetadata;
use crate::services::{
    Document, FetchOptions, MetadataError, MetadataService, Resource, ResourceService,
    RoutingService, Transport, TransportError,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;
use uuid::Uuid;

/// reqwest-backed transport. Redirects are followed manually so the
/// per-request hop limit in `FetchOptions` is honored.
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("webmention-ingest/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn request(
        &self,
        url: &Url,
        options: FetchOptions,
    ) -> Result<Document, TransportError> {
        let mut current = url.clone();
        let mut hops = 0u32;

        loop {
            let response = self
                .client
                .get(current.clone())
                .send()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
            let status = response.status();

            if status.is_redirection() {
                if hops >= options.max_redirects {
                    return Err(TransportError::TooManyRedirects(url.clone()));
                }
                let location = response
                    .headers()
                    .get(reqwest::header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        TransportError::Request(format!(
                            "redirect from {current} without a Location header"
                        ))
                    })?;
                current = current
                    .join(location)
                    .map_err(|e| TransportError::Request(e.to_string()))?;
                hops += 1;
                continue;
            }

            if options.fail_on_status && !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    url: current,
                });
            }

            let body = response
                .text()
                .await
                .map_err(|e| TransportError::Request(e.to_string()))?;
            return Ok(Document {
                status: status.as_u16(),
                body,
            });
        }
    }
}

/// Routing against the configured site: a target is a page iff it lives
/// under the site base URL and currently answers with a non-error status.
pub struct SiteRouting {
    base: Url,
    transport: Arc<dyn Transport>,
}

impl SiteRouting {
    pub fn new(base: Url, transport: Arc<dyn Transport>) -> Self {
        Self { base, transport }
    }

    fn on_site(&self, url: &Url) -> bool {
        url.scheme() == self.base.scheme()
            && url.host_str() == self.base.host_str()
            && url.port_or_known_default() == self.base.port_or_known_default()
            && url.path().starts_with(self.base.path())
    }
}

#[async_trait]
impl RoutingService for SiteRouting {
    async fn page_exists(&self, url: &Url) -> bool {
        if !self.on_site(url) {
            return false;
        }
        match self
            .transport
            .request(
                url,
                FetchOptions {
                    max_redirects: 0,
                    fail_on_status: false,
                },
            )
            .await
        {
            Ok(doc) => (200..400).contains(&doc.status),
            Err(err) => {
                debug!(url = %url, error = %err, "page existence probe failed");
                false
            }
        }
    }
}

/// Resolves target URLs to content resources by path convention: anything
/// under a configured post prefix is a "post". Ids are derived
/// deterministically from the URL so repeat resolutions agree.
pub struct PathResourceResolver {
    base: Url,
    post_prefixes: Vec<String>,
}

impl PathResourceResolver {
    pub fn new(base: Url, site: &SiteConfig) -> Self {
        Self {
            base,
            post_prefixes: site.post_path_prefixes.clone(),
        }
    }
}

#[async_trait]
impl ResourceService for PathResourceResolver {
    async fn get_by_url(&self, url: &Url) -> Resource {
        if url.host_str() != self.base.host_str() {
            return Resource::none();
        }
        let path = url.path();
        if self
            .post_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()))
        {
            Resource::post(Uuid::new_v5(&Uuid::NAMESPACE_URL, url.as_str().as_bytes()))
        } else {
            Resource::none()
        }
    }
}

/// Scrapes basic page metadata (title, author, open-graph fields, favicon)
/// from the source document.
pub struct PageMetadataFetcher {
    transport: Arc<dyn Transport>,
    max_redirects: u32,
}

impl PageMetadataFetcher {
    pub fn new(transport: Arc<dyn Transport>, max_redirects: u32) -> Self {
        Self {
            transport,
            max_redirects,
        }
    }
}

#[async_trait]
impl MetadataService for PageMetadataFetcher {
    async fn fetch(&self, url: &Url) -> Result<SourceMetadata, MetadataError> {
        let doc = self
            .transport
            .request(
                url,
                FetchOptions {
                    max_redirects: self.max_redirects,
                    fail_on_status: true,
                },
            )
            .await
            .map_err(MetadataError::Fetch)?;

        let meta = extract_metadata(&doc.body, url);
        if meta.title.is_none() && meta.site_title.is_none() {
            return Err(MetadataError::Unscrapeable(url.clone()));
        }
        Ok(meta)
    }
}

fn extract_metadata(body: &str, base: &Url) -> SourceMetadata {
    let mut meta = SourceMetadata::default();

    for tag in scan_tags(body, "meta") {
        let Some(content) = tag.attr("content").filter(|c| !c.is_empty()) else {
            continue;
        };
        let Some(key) = tag.attr("property").or_else(|| tag.attr("name")) else {
            continue;
        };
        match key.to_ascii_lowercase().as_str() {
            "og:site_name" => meta.site_title = Some(content.to_string()),
            "og:title" => meta.title = Some(content.to_string()),
            "og:description" => meta.excerpt = Some(content.to_string()),
            "description" => {
                if meta.excerpt.is_none() {
                    meta.excerpt = Some(content.to_string());
                }
            }
            "author" => meta.author = Some(content.to_string()),
            "og:image" => meta.image = base.join(content).ok(),
            _ => {}
        }
    }

    if meta.title.is_none() {
        meta.title = element_text(body, "title");
    }

    for tag in scan_tags(body, "link") {
        let is_icon = tag
            .attr("rel")
            .map(|rel| rel.split_whitespace().any(|t| t.eq_ignore_ascii_case("icon")))
            .unwrap_or(false);
        if !is_icon {
            continue;
        }
        if let Some(href) = tag.attr("href").filter(|h| !h.is_empty()) {
            meta.favicon = base.join(href).ok();
            break;
        }
    }

    meta
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_extract_metadata_prefers_open_graph() {
        let body = r#"<html><head>
            <title>Fallback title</title>
            <meta property="og:title" content="OG title">
            <meta property="og:site_name" content="Example Blog">
            <meta property="og:description" content="A post about things.">
            <meta name="author" content="Ada Lovelace">
            <meta property="og:image" content="/img/cover.png">
            <link rel="icon" href="/favicon.ico">
        </head></html>"#;

        let meta = extract_metadata(body, &url("https://blog.example.com/post/1"));
        assert_eq!(meta.title.as_deref(), Some("OG title"));
        assert_eq!(meta.site_title.as_deref(), Some("Example Blog"));
        assert_eq!(meta.excerpt.as_deref(), Some("A post about things."));
        assert_eq!(meta.author.as_deref(), Some("Ada Lovelace"));
        assert_eq!(
            meta.image.as_ref().map(Url::as_str),
            Some("https://blog.example.com/img/cover.png")
        );
        assert_eq!(
            meta.favicon.as_ref().map(Url::as_str),
            Some("https://blog.example.com/favicon.ico")
        );
    }

    #[test]
    fn test_extract_metadata_title_fallback() {
        let body = "<html><head><title>Just a title</title></head></html>";
        let meta = extract_metadata(body, &url("https://blog.example.com/"));
        assert_eq!(meta.title.as_deref(), Some("Just a title"));
        assert!(meta.site_title.is_none());
    }

    #[test]
    fn test_extract_metadata_empty_page() {
        let meta = extract_metadata("", &url("https://blog.example.com/"));
        assert!(meta.title.is_none());
        assert!(meta.favicon.is_none());
    }

    #[test]
    fn test_site_routing_scope() {
        struct NoTransport;
        #[async_trait]
        impl Transport for NoTransport {
            async fn request(
                &self,
                url: &Url,
                _options: FetchOptions,
            ) -> Result<Document, TransportError> {
                Err(TransportError::Request(format!("unexpected fetch of {url}")))
            }
        }

        let routing = SiteRouting::new(
            url("https://my-site.example.org/"),
            Arc::new(NoTransport),
        );
        assert!(routing.on_site(&url("https://my-site.example.org/posts/hello")));
        assert!(!routing.on_site(&url("https://other.example.org/posts/hello")));
        assert!(!routing.on_site(&url("http://my-site.example.org/posts/hello")));
    }

    #[tokio::test]
    async fn test_path_resource_resolver() {
        let site = SiteConfig {
            base_url: "https://my-site.example.org/".to_string(),
            post_path_prefixes: vec!["/posts/".to_string()],
        };
        let resolver = PathResourceResolver::new(url("https://my-site.example.org/"), &site);

        let post = resolver
            .get_by_url(&url("https://my-site.example.org/posts/hello"))
            .await;
        assert_eq!(post.kind.as_deref(), Some("post"));
        assert!(post.id.is_some());

        // Deterministic: the same URL resolves to the same id.
        let again = resolver
            .get_by_url(&url("https://my-site.example.org/posts/hello"))
            .await;
        assert_eq!(post.id, again.id);

        let page = resolver
            .get_by_url(&url("https://my-site.example.org/about"))
            .await;
        assert!(page.kind.is_none());
        assert!(page.id.is_none());
    }
}
