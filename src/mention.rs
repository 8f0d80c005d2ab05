// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Mention entity: the persisted record of a processed webmention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;
use uuid::Uuid;

/// Unique identifier for a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MentionId(Uuid);

impl MentionId {
    /// Create a new random MentionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a MentionId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for MentionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MentionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque key/value data attached by the sender at creation time.
pub type Payload = Map<String, Value>;

/// Metadata scraped from the source page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub site_title: Option<String>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub image: Option<Url>,
    pub favicon: Option<Url>,
}

/// One assertion that `source` links to `target`.
///
/// At most one non-deleted mention exists per (source, target) pair; the
/// repository lookup on that key is the enforcement point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    pub id: MentionId,
    /// URL of the linking page. Part of the identity key.
    pub source: Url,
    /// URL of the linked page. Part of the identity key.
    pub target: Url,
    /// Creation time. Never updated on re-processing.
    pub timestamp: DateTime<Utc>,
    pub payload: Payload,
    /// Set only when the target resolves to a "post" resource.
    pub resource_id: Option<Uuid>,
    pub resource_type: Option<String>,
    pub source_title: Option<String>,
    pub source_site_title: Option<String>,
    pub source_author: Option<String>,
    pub source_excerpt: Option<String>,
    pub source_favicon: Option<Url>,
    pub source_featured_image: Option<Url>,
    /// Whether the source was last seen to link to the target. `None`
    /// when verification has not been attempted.
    pub verified: Option<bool>,
    /// Once set, the mention is excluded from listings and removed from
    /// the store on save.
    pub deleted: bool,
}

impl Mention {
    /// Create a new mention for a (source, target) pair.
    pub fn new(source: Url, target: Url, payload: Payload) -> Self {
        Self {
            id: MentionId::new(),
            source,
            target,
            timestamp: Utc::now(),
            payload,
            resource_id: None,
            resource_type: None,
            source_title: None,
            source_site_title: None,
            source_author: None,
            source_excerpt: None,
            source_favicon: None,
            source_featured_image: None,
            verified: None,
            deleted: false,
        }
    }

    /// Attach resource linkage. Callers only link "post" resources.
    pub fn attach_resource(&mut self, kind: impl Into<String>, id: Uuid) {
        self.resource_type = Some(kind.into());
        self.resource_id = Some(id);
    }

    /// Replace the payload. Happens on every repeat webmention.
    pub fn set_payload(&mut self, payload: Payload) {
        self.payload = payload;
    }

    /// Overwrite the scraped source fields from a successful metadata fetch.
    pub fn apply_metadata(&mut self, meta: &SourceMetadata) {
        self.source_site_title = meta.site_title.clone();
        self.source_title = meta.title.clone();
        self.source_excerpt = meta.excerpt.clone();
        self.source_author = meta.author.clone();
        self.source_featured_image = meta.image.clone();
        self.source_favicon = meta.favicon.clone();
    }

    pub fn set_verified(&mut self, verified: bool) {
        self.verified = Some(verified);
    }

    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }

    /// Host of the linking page, if the source URL has one.
    pub fn source_host(&self) -> Option<&str> {
        self.source.host_str()
    }
}
