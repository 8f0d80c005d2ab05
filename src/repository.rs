// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mention persistence contract and the in-memory reference store.
//!
//! Durable engines live behind `MentionRepository`; the orchestrator and
//! the listing endpoint only ever see this trait.

use crate::listing::{paginate, ListOptions, MentionPage};
use crate::mention::Mention;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use url::Url;

/// Errors from the persistence engine.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence and query surface for mentions.
#[async_trait]
pub trait MentionRepository: Send + Sync {
    /// Exact-match lookup on the (source, target) identity key. Deleted
    /// mentions are never returned.
    async fn get_by_source_and_target(
        &self,
        source: &Url,
        target: &Url,
    ) -> RepositoryResult<Option<Mention>>;

    /// List mentions per the `listing` contract.
    async fn get_page(&self, options: &ListOptions) -> RepositoryResult<MentionPage>;

    /// Upsert by id. A mention with `deleted` set is removed from the store.
    async fn save(&self, mention: &Mention) -> RepositoryResult<()>;
}

/// In-memory reference store. Keeps insertion order so listing
/// tie-breaking stays deterministic.
pub struct InMemoryMentionRepository {
    records: RwLock<Vec<Mention>>,
}

impl InMemoryMentionRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryMentionRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MentionRepository for InMemoryMentionRepository {
    async fn get_by_source_and_target(
        &self,
        source: &Url,
        target: &Url,
    ) -> RepositoryResult<Option<Mention>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|m| !m.deleted && m.source == *source && m.target == *target)
            .cloned())
    }

    async fn get_page(&self, options: &ListOptions) -> RepositoryResult<MentionPage> {
        let records = self.records.read().await;
        Ok(paginate(&records, options))
    }

    async fn save(&self, mention: &Mention) -> RepositoryResult<()> {
        let mut records = self.records.write().await;
        if mention.deleted {
            records.retain(|m| m.id != mention.id);
            return Ok(());
        }
        match records.iter_mut().find(|m| m.id == mention.id) {
            Some(slot) => *slot = mention.clone(),
            None => records.push(mention.clone()),
        }
        Ok(())
    }
}
