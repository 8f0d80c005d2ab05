// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the ingestion pipeline.
//!
//! Soft failures the pipeline absorbs (notably verification fetches) are
//! counted here so they stay observable.

use prometheus::{Encoder, IntCounter, Registry, TextEncoder};

/// Counters owned by the service.
pub struct IngestMetrics {
    registry: Registry,
    pub webmentions_received: IntCounter,
    pub mentions_created: IntCounter,
    pub mentions_updated: IntCounter,
    pub mentions_deleted: IntCounter,
    pub verification_failures: IntCounter,
}

impl IngestMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let webmentions_received = IntCounter::new(
            "webmentions_received_total",
            "Webmention submissions processed",
        )?;
        let mentions_created = IntCounter::new("mentions_created_total", "Mentions created")?;
        let mentions_updated =
            IntCounter::new("mentions_updated_total", "Mentions updated in place")?;
        let mentions_deleted = IntCounter::new(
            "mentions_deleted_total",
            "Mentions deleted during re-processing",
        )?;
        let verification_failures = IntCounter::new(
            "verification_failures_total",
            "Verification fetches that failed and were absorbed",
        )?;

        registry.register(Box::new(webmentions_received.clone()))?;
        registry.register(Box::new(mentions_created.clone()))?;
        registry.register(Box::new(mentions_updated.clone()))?;
        registry.register(Box::new(mentions_deleted.clone()))?;
        registry.register(Box::new(verification_failures.clone()))?;

        Ok(Self {
            registry,
            webmentions_received,
            mentions_created,
            mentions_updated,
            mentions_deleted,
            verification_failures,
        })
    }

    /// Render the registry in Prometheus text exposition format.
    pub fn gather(&self) -> prometheus::Result<String> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
