// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Webmention Ingestion Service
//!
//! Receives Webmention notifications, verifies that the source really
//! links to the target, scrapes source metadata, and serves the stored
//! mentions through a paginated listing API.
//!
//! ## Endpoints
//!
//! - `POST /webmention`: form-encoded `source`/`target` submission; extra
//!   form fields are stored as the mention payload.
//! - `GET /mentions`: filterable, orderable, paginated listing
//!   (`limit=all` for an unbounded page).
//! - `GET /health`, `GET /healthz`: health checks.
//! - `GET /metrics`: Prometheus exposition (configurable).
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `SITE_BASE_URL`: Base URL valid targets must live under
//!   (default: http://localhost:3000/)
//! - `POST_PATH_PREFIXES`: Comma-separated path prefixes resolving to
//!   "post" resources (default: /posts/)
//! - `MAX_REDIRECTS`: Redirect hops allowed on source fetches (default: 10)
//! - `REQUEST_TIMEOUT_MS`: Outbound request timeout (default: 10000)

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use url::Url;

use webmention_ingest::{
    config::Config,
    handlers::{health, list_mentions, metrics, receive_webmention, AppState},
    http::{HttpTransport, PageMetadataFetcher, PathResourceResolver, SiteRouting},
    ingest::MentionProcessor,
    metrics::IngestMetrics,
    repository::{InMemoryMentionRepository, MentionRepository},
    services::{MetadataService, ResourceService, RoutingService, Transport},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Load configuration
    let config = load_config();
    let site_base: Url = config.site.base_url.parse()?;
    info!(
        bind_addr = %config.bind_addr,
        site = %site_base,
        max_redirects = config.ingest.max_redirects,
        "Starting webmention ingestion service"
    );

    // Create application state
    let ingest_metrics = Arc::new(IngestMetrics::new()?);
    let transport: Arc<dyn Transport> =
        Arc::new(HttpTransport::new(config.ingest.request_timeout())?);
    let routing: Arc<dyn RoutingService> =
        Arc::new(SiteRouting::new(site_base.clone(), transport.clone()));
    let resources: Arc<dyn ResourceService> =
        Arc::new(PathResourceResolver::new(site_base.clone(), &config.site));
    let metadata: Arc<dyn MetadataService> = Arc::new(PageMetadataFetcher::new(
        transport.clone(),
        config.ingest.max_redirects,
    ));
    let repository: Arc<dyn MentionRepository> = Arc::new(InMemoryMentionRepository::new());

    let processor = MentionProcessor::new(
        repository.clone(),
        routing,
        resources,
        metadata,
        transport,
        ingest_metrics.clone(),
        config.ingest.clone(),
    );

    let state = Arc::new(AppState {
        processor,
        repository,
        metrics: ingest_metrics,
        config: config.clone(),
    });

    // Spawn pair-lock cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.processor.cleanup().await;
        }
    });

    // Build router
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/webmention", post(receive_webmention))
        .route("/mentions", get(list_mentions));
    if config.metrics.enabled {
        app = app.route(&config.metrics.path, get(metrics));
    }
    let app = app.layer(TraceLayer::new_for_http()).with_state(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Load configuration from environment variables.
fn load_config() -> Config {
    Config {
        bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        site: webmention_ingest::config::SiteConfig {
            base_url: std::env::var("SITE_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000/".to_string()),
            post_path_prefixes: std::env::var("POST_PATH_PREFIXES")
                .ok()
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["/posts/".to_string()]),
        },
        ingest: webmention_ingest::config::IngestConfig {
            max_redirects: std::env::var("MAX_REDIRECTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
        },
        ..Default::default()
    }
}
