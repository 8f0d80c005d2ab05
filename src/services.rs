// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Collaborator contracts consumed by the ingestion pipeline.
//!
//! Each collaborator is polymorphic over one capability: routing lookups,
//! resource resolution, metadata scraping, and raw document fetches. Test
//! doubles implement the same traits.

use crate::mention::SourceMetadata;
use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Errors from the fetch transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("redirect limit exceeded fetching {0}")]
    TooManyRedirects(Url),

    #[error("unexpected status {status} fetching {url}")]
    Status { status: u16, url: Url },
}

/// Errors fetching or scraping source metadata.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata fetch failed: {0}")]
    Fetch(#[source] TransportError),

    #[error("no scrapeable metadata at {0}")]
    Unscrapeable(Url),
}

/// Options for a transport fetch.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum redirect hops to follow.
    pub max_redirects: u32,
    /// When false, non-2xx statuses yield a `Document` instead of an error.
    pub fail_on_status: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            max_redirects: 10,
            fail_on_status: false,
        }
    }
}

/// A fetched document.
#[derive(Debug, Clone)]
pub struct Document {
    pub status: u16,
    pub body: String,
}

/// Resolution of a URL to an internal content resource.
#[derive(Debug, Clone, Default)]
pub struct Resource {
    pub kind: Option<String>,
    pub id: Option<Uuid>,
}

impl Resource {
    /// A URL that maps to no internal resource.
    pub fn none() -> Self {
        Self::default()
    }

    /// A URL that maps to a post.
    pub fn post(id: Uuid) -> Self {
        Self {
            kind: Some("post".to_string()),
            id: Some(id),
        }
    }
}

/// Page-existence lookup against this site's routes.
#[async_trait]
pub trait RoutingService: Send + Sync {
    /// True iff `url` resolves to a page on this site.
    async fn page_exists(&self, url: &Url) -> bool;
}

/// URL-to-content-resource resolution.
#[async_trait]
pub trait ResourceService: Send + Sync {
    async fn get_by_url(&self, url: &Url) -> Resource;
}

/// Source page metadata scraping.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Scrape metadata for `url`. Fails when the page cannot be fetched
    /// or yields nothing scrapeable.
    async fn fetch(&self, url: &Url) -> Result<SourceMetadata, MetadataError>;
}

/// Raw document fetches.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(&self, url: &Url, options: FetchOptions)
        -> Result<Document, TransportError>;
}
