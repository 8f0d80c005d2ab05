// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Scriptable collaborator doubles for the ingestion pipeline.
//!
//! Each double implements the corresponding `services` trait and can be
//! flipped mid-test to simulate infrastructure breaking between two
//! submissions of the same webmention.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;
use uuid::Uuid;
use webmention_ingest::config::IngestConfig;
use webmention_ingest::ingest::MentionProcessor;
use webmention_ingest::mention::SourceMetadata;
use webmention_ingest::metrics::IngestMetrics;
use webmention_ingest::repository::{InMemoryMentionRepository, MentionRepository};
use webmention_ingest::services::{
    Document, FetchOptions, MetadataError, MetadataService, Resource, ResourceService,
    RoutingService, Transport, TransportError,
};

/// Routing double: page existence is a switch tests can flip.
pub struct StubRouting {
    exists: AtomicBool,
}

impl StubRouting {
    pub fn new(exists: bool) -> Arc<Self> {
        Arc::new(Self {
            exists: AtomicBool::new(exists),
        })
    }

    pub fn set_exists(&self, exists: bool) {
        self.exists.store(exists, Ordering::SeqCst);
    }
}

#[async_trait]
impl RoutingService for StubRouting {
    async fn page_exists(&self, _url: &Url) -> bool {
        self.exists.load(Ordering::SeqCst)
    }
}

/// Resource double: every URL resolves to the same fixed resource.
pub struct StubResources {
    resource: Resource,
}

impl StubResources {
    pub fn none() -> Arc<Self> {
        Arc::new(Self {
            resource: Resource::none(),
        })
    }

    pub fn post() -> Arc<Self> {
        Arc::new(Self {
            resource: Resource::post(Uuid::new_v4()),
        })
    }

    pub fn of(kind: &str, id: Uuid) -> Arc<Self> {
        Arc::new(Self {
            resource: Resource {
                kind: Some(kind.to_string()),
                id: Some(id),
            },
        })
    }
}

#[async_trait]
impl ResourceService for StubResources {
    async fn get_by_url(&self, _url: &Url) -> Resource {
        self.resource.clone()
    }
}

/// Metadata double: a canned result or a failure, flippable mid-test.
pub struct StubMetadata {
    failing: AtomicBool,
    meta: SourceMetadata,
}

impl StubMetadata {
    pub fn ok(meta: SourceMetadata) -> Arc<Self> {
        Arc::new(Self {
            failing: AtomicBool::new(false),
            meta,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            failing: AtomicBool::new(true),
            meta: SourceMetadata::default(),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl MetadataService for StubMetadata {
    async fn fetch(&self, url: &Url) -> Result<SourceMetadata, MetadataError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(MetadataError::Unscrapeable(url.clone()))
        } else {
            Ok(self.meta.clone())
        }
    }
}

/// Transport double: serves a canned body, or refuses the connection.
pub struct StubTransport {
    body: Mutex<Option<String>>,
}

impl StubTransport {
    pub fn serving(body: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            body: Mutex::new(Some(body.into())),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            body: Mutex::new(None),
        })
    }

    pub fn set_body(&self, body: Option<String>) {
        *self.body.lock().unwrap() = body;
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn request(
        &self,
        url: &Url,
        _options: FetchOptions,
    ) -> Result<Document, TransportError> {
        match self.body.lock().unwrap().clone() {
            Some(body) => Ok(Document { status: 200, body }),
            None => Err(TransportError::Request(format!("connection refused: {url}"))),
        }
    }
}

/// A processor wired to doubles, with handles kept for mid-test flips.
pub struct TestPipeline {
    pub repository: Arc<InMemoryMentionRepository>,
    pub routing: Arc<StubRouting>,
    pub resources: Arc<StubResources>,
    pub metadata: Arc<StubMetadata>,
    pub transport: Arc<StubTransport>,
    pub processor: Arc<MentionProcessor>,
}

pub fn pipeline(
    routing: Arc<StubRouting>,
    resources: Arc<StubResources>,
    metadata: Arc<StubMetadata>,
    transport: Arc<StubTransport>,
) -> TestPipeline {
    let repository = Arc::new(InMemoryMentionRepository::new());
    let metrics = Arc::new(IngestMetrics::new().unwrap());
    let processor = Arc::new(MentionProcessor::new(
        repository.clone() as Arc<dyn MentionRepository>,
        routing.clone() as Arc<dyn RoutingService>,
        resources.clone() as Arc<dyn ResourceService>,
        metadata.clone() as Arc<dyn MetadataService>,
        transport.clone() as Arc<dyn Transport>,
        metrics,
        IngestConfig::default(),
    ));
    TestPipeline {
        repository,
        routing,
        resources,
        metadata,
        transport,
        processor,
    }
}

/// Canned metadata used by the ok-path doubles.
pub fn sample_metadata() -> SourceMetadata {
    SourceMetadata {
        site_title: Some("Example Blog".to_string()),
        title: Some("A post".to_string()),
        excerpt: Some("First paragraph.".to_string()),
        author: Some("Ada Lovelace".to_string()),
        image: Some(Url::parse("https://blog.example.com/cover.png").unwrap()),
        favicon: Some(Url::parse("https://blog.example.com/favicon.ico").unwrap()),
    }
}
