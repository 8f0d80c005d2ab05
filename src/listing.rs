// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Listing and pagination over mention records.
//!
//! Translates list options into a paginated or unbounded result set.
//! Filtering happens before counting, ordering is stable, and deleted
//! mentions never appear.

use crate::mention::Mention;
use serde::{Serialize, Serializer};
use url::Url;

/// Field a listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderField {
    #[default]
    CreatedAt,
    Source,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Asc,
    #[default]
    Desc,
}

/// Requested ordering. Defaults to newest-first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Order {
    pub field: OrderField,
    pub direction: Direction,
}

/// Pagination mode. The unbounded mode is its own variant rather than a
/// sentinel overloading the numeric limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Every matching record in a single page.
    All,
    /// 1-based page of at most `limit` records.
    Page { page: u64, limit: u64 },
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination::Page { page: 1, limit: 15 }
    }
}

/// Predicate over mention fields, applied before counting and paging.
#[derive(Debug, Clone, Default)]
pub struct MentionFilter {
    /// `source` host equality (ASCII case-insensitive).
    pub source_host: Option<String>,
    /// Exact `target` URL equality.
    pub target: Option<Url>,
    /// Verification state equality.
    pub verified: Option<bool>,
}

impl MentionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source_host(mut self, host: impl Into<String>) -> Self {
        self.source_host = Some(host.into());
        self
    }

    pub fn with_target(mut self, target: Url) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }

    pub fn matches(&self, mention: &Mention) -> bool {
        if let Some(host) = &self.source_host {
            match mention.source_host() {
                Some(h) if h.eq_ignore_ascii_case(host) => {}
                _ => return false,
            }
        }
        if let Some(target) = &self.target {
            if mention.target != *target {
                return false;
            }
        }
        if let Some(verified) = self.verified {
            if mention.verified != Some(verified) {
                return false;
            }
        }
        true
    }
}

/// Options accepted by `get_page`.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub filter: MentionFilter,
    pub order: Order,
    pub pagination: Pagination,
}

/// Reported page size: numeric, or `"all"` for unbounded listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitValue {
    Count(u64),
    All,
}

impl Serialize for LimitValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            LimitValue::Count(n) => serializer.serialize_u64(*n),
            LimitValue::All => serializer.serialize_str("all"),
        }
    }
}

/// Pagination framing for a result page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationMeta {
    pub page: u64,
    pub pages: u64,
    pub limit: LimitValue,
    pub total: u64,
    pub prev: Option<u64>,
    pub next: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub pagination: PaginationMeta,
}

/// One page of mentions plus its framing.
#[derive(Debug, Clone, Serialize)]
pub struct MentionPage {
    pub data: Vec<Mention>,
    pub meta: PageMeta,
}

/// Apply filter, order, and pagination over the candidate set.
pub fn paginate(records: &[Mention], options: &ListOptions) -> MentionPage {
    let mut matching: Vec<&Mention> = records
        .iter()
        .filter(|m| !m.deleted && options.filter.matches(m))
        .collect();

    // Stable sort: equal keys keep insertion order.
    match (options.order.field, options.order.direction) {
        (OrderField::CreatedAt, Direction::Asc) => {
            matching.sort_by(|a, b| a.timestamp.cmp(&b.timestamp))
        }
        (OrderField::CreatedAt, Direction::Desc) => {
            matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp))
        }
        (OrderField::Source, Direction::Asc) => {
            matching.sort_by(|a, b| a.source.as_str().cmp(b.source.as_str()))
        }
        (OrderField::Source, Direction::Desc) => {
            matching.sort_by(|a, b| b.source.as_str().cmp(a.source.as_str()))
        }
    }

    let total = matching.len() as u64;

    match options.pagination {
        Pagination::All => MentionPage {
            data: matching.into_iter().cloned().collect(),
            meta: PageMeta {
                pagination: PaginationMeta {
                    page: 1,
                    pages: 1,
                    limit: LimitValue::All,
                    total,
                    prev: None,
                    next: None,
                },
            },
        },
        Pagination::Page { page, limit } => {
            let page = page.max(1);
            let limit = limit.max(1);
            let pages = total.div_ceil(limit).max(1);
            let start = (page - 1).saturating_mul(limit) as usize;
            let data: Vec<Mention> = matching
                .into_iter()
                .skip(start)
                .take(limit as usize)
                .cloned()
                .collect();

            MentionPage {
                data,
                meta: PageMeta {
                    pagination: PaginationMeta {
                        page,
                        pages,
                        limit: LimitValue::Count(limit),
                        total,
                        prev: if page > 1 { Some(page - 1) } else { None },
                        next: if page < pages { Some(page + 1) } else { None },
                    },
                },
            }
        }
    }
}
