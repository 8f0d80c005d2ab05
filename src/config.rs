// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the webmention ingestion service.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the webmention ingestion service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Site identity used for target routing and resource resolution
    #[serde(default)]
    pub site: SiteConfig,

    /// Ingestion pipeline configuration
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Listing defaults
    #[serde(default)]
    pub listing: ListingConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// The site this service accepts webmentions for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Base URL valid targets must live under (default: http://localhost:3000/)
    #[serde(default = "default_site_base_url")]
    pub base_url: String,

    /// Path prefixes that resolve to "post" resources (default: ["/posts/"])
    #[serde(default = "default_post_path_prefixes")]
    pub post_path_prefixes: Vec<String>,
}

/// Ingestion pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum redirect hops when fetching the source document (default: 10)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Outbound request timeout in milliseconds (default: 10000)
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

/// Defaults for the mention listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Page size used when the caller does not pass `limit` (default: 15)
    #[serde(default = "default_page_limit")]
    pub default_limit: u64,

    /// Upper bound on a caller-requested page size (default: 100)
    #[serde(default = "default_max_limit")]
    pub max_limit: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_site_base_url() -> String {
    "http://localhost:3000/".to_string()
}

fn default_post_path_prefixes() -> Vec<String> {
    vec!["/posts/".to_string()]
}

fn default_max_redirects() -> u32 {
    10
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_page_limit() -> u64 {
    15
}

fn default_max_limit() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            site: SiteConfig::default(),
            ingest: IngestConfig::default(),
            listing: ListingConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_site_base_url(),
            post_path_prefixes: default_post_path_prefixes(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_redirects: default_max_redirects(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            default_limit: default_page_limit(),
            max_limit: default_max_limit(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl IngestConfig {
    /// Get the outbound request timeout
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
