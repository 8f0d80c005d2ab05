// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Webmention processing pipeline.
//!
//! Decides, for one (source, target) submission, whether a mention is
//! created, updated, deleted, or rejected, coordinating the routing,
//! resource, metadata, and transport collaborators in sequence.
//!
//! Failure policy: only a brand-new webmention can fail outright (unknown
//! target, unreachable source). Once a record exists, later breakage
//! soft-fails into deletion or an unset `verified` flag instead of an
//! error, so a mention whose infrastructure has gone away disappears
//! rather than lingering.

use crate::config::IngestConfig;
use crate::mention::{Mention, Payload};
use crate::metrics::IngestMetrics;
use crate::repository::{MentionRepository, RepositoryError};
use crate::services::{
    FetchOptions, MetadataError, MetadataService, ResourceService, RoutingService, Transport,
    TransportError,
};
use crate::verify::target_linked_in;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use url::Url;

/// Errors surfaced to the caller of `process_webmention`.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Target is not a page on this site and no prior mention exists.
    #[error("target is not a page on this site: {0}")]
    InvalidTarget(Url),

    /// Source metadata could not be fetched for a brand-new mention.
    #[error("source could not be scraped: {0}")]
    SourceUnreachable(#[from] MetadataError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// The webmention orchestrator.
///
/// Collaborators are injected once at construction; per-pair locks
/// serialize concurrent submissions for the same identity key so two
/// callers cannot both observe "no existing mention" and double-create.
pub struct MentionProcessor {
    repository: Arc<dyn MentionRepository>,
    routing: Arc<dyn RoutingService>,
    resources: Arc<dyn ResourceService>,
    metadata: Arc<dyn MetadataService>,
    transport: Arc<dyn Transport>,
    metrics: Arc<IngestMetrics>,
    config: IngestConfig,
    pair_locks: Mutex<HashMap<(String, String), Arc<Mutex<()>>>>,
}

impl MentionProcessor {
    pub fn new(
        repository: Arc<dyn MentionRepository>,
        routing: Arc<dyn RoutingService>,
        resources: Arc<dyn ResourceService>,
        metadata: Arc<dyn MetadataService>,
        transport: Arc<dyn Transport>,
        metrics: Arc<IngestMetrics>,
        config: IngestConfig,
    ) -> Self {
        Self {
            repository,
            routing,
            resources,
            metadata,
            transport,
            metrics,
            config,
            pair_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Process one webmention submission.
    ///
    /// All collaborator calls are awaited in sequence; the persisted
    /// state reflects the last successful fetch within this call.
    /// Exactly one repository write happens per invocation.
    pub async fn process_webmention(
        &self,
        source: Url,
        target: Url,
        payload: Payload,
    ) -> Result<Mention, ProcessError> {
        let pair_lock = self.pair_lock(&source, &target).await;
        let _guard = pair_lock.lock().await;

        self.metrics.webmentions_received.inc();
        debug!(source = %source, target = %target, "processing webmention");

        // 1. Prior record for this identity key, if any.
        let mut mention = self
            .repository
            .get_by_source_and_target(&source, &target)
            .await?;
        let had_existing = mention.is_some();

        // 2. The target must still be a page on this site. A stale
        //    mention for a removed page is deleted rather than rejected.
        if !self.routing.page_exists(&target).await {
            match mention.as_mut() {
                Some(m) => {
                    info!(
                        source = %source,
                        target = %target,
                        id = %m.id,
                        "target no longer routes to a page, deleting mention"
                    );
                    m.mark_deleted();
                }
                None => {
                    info!(source = %source, target = %target, "rejecting webmention for unknown target");
                    return Err(ProcessError::InvalidTarget(target));
                }
            }
        }

        // 3. Resource linkage only ever applies to newly created mentions,
        //    and only for posts.
        let resource = self.resources.get_by_url(&target).await;

        // 4. Source metadata. Losing it is fatal for a new mention and a
        //    deletion for an existing one.
        let metadata = match self.metadata.fetch(&source).await {
            Ok(meta) => Some(meta),
            Err(err) => match mention.as_mut() {
                Some(m) => {
                    info!(
                        source = %source,
                        id = %m.id,
                        error = %err,
                        "source no longer scrapeable, deleting mention"
                    );
                    m.mark_deleted();
                    None
                }
                None => return Err(ProcessError::SourceUnreachable(err)),
            },
        };

        // 5. Verify the link. Failures here degrade to "unverified" and
        //    are counted, never propagated.
        let verified = match self.fetch_and_verify(&source, &target).await {
            Ok(found) => Some(found),
            Err(err) => {
                warn!(
                    source = %source,
                    target = %target,
                    error = %err,
                    "verification fetch failed"
                );
                self.metrics.verification_failures.inc();
                None
            }
        };

        if let Some(m) = mention.as_mut() {
            m.set_payload(payload.clone());
            if let Some(meta) = metadata.as_ref() {
                m.apply_metadata(meta);
            }
            if let Some(found) = verified {
                m.set_verified(found);
            }
        }

        // 6. Nothing on file and nothing rejected: this is a new mention.
        let mention = match mention {
            Some(m) => m,
            None => {
                let mut m = Mention::new(source, target, payload);
                if let (Some(kind), Some(id)) = (resource.kind.as_deref(), resource.id) {
                    if kind == "post" {
                        m.attach_resource(kind, id);
                    }
                }
                if let Some(meta) = metadata.as_ref() {
                    m.apply_metadata(meta);
                }
                if let Some(found) = verified {
                    m.set_verified(found);
                }
                m
            }
        };

        // 7. The single repository write: create, update, or
        //    delete-via-save.
        self.repository.save(&mention).await?;

        if mention.deleted {
            self.metrics.mentions_deleted.inc();
            info!(id = %mention.id, "mention deleted");
        } else if had_existing {
            self.metrics.mentions_updated.inc();
            debug!(id = %mention.id, "mention updated");
        } else {
            self.metrics.mentions_created.inc();
            info!(
                id = %mention.id,
                source = %mention.source,
                target = %mention.target,
                "mention created"
            );
        }

        Ok(mention)
    }

    /// Drop pair locks nobody is holding or waiting on. Called
    /// periodically from the binary's maintenance task.
    pub async fn cleanup(&self) {
        let mut locks = self.pair_locks.lock().await;
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    async fn pair_lock(&self, source: &Url, target: &Url) -> Arc<Mutex<()>> {
        let key = (source.as_str().to_string(), target.as_str().to_string());
        let mut locks = self.pair_locks.lock().await;
        locks
            .entry(key)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn fetch_and_verify(&self, source: &Url, target: &Url) -> Result<bool, TransportError> {
        let doc = self
            .transport
            .request(
                source,
                FetchOptions {
                    max_redirects: self.config.max_redirects,
                    fail_on_status: false,
                },
            )
            .await?;
        Ok(target_linked_in(&doc.body, target))
    }
}
