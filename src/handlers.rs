// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the webmention ingestion service.
//!
//! The receiving endpoint takes the W3C form-encoded `source`/`target`
//! shape; any additional form fields travel with the mention as its
//! payload. Listing exposes the repository's pagination contract.

use crate::config::{Config, ListingConfig};
use crate::ingest::{MentionProcessor, ProcessError};
use crate::listing::{Direction, ListOptions, MentionFilter, Order, OrderField, Pagination};
use crate::mention::Payload;
use crate::metrics::IngestMetrics;
use crate::repository::MentionRepository;
use axum::{
    extract::{Form, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use url::Url;

/// Shared application state.
pub struct AppState {
    pub processor: MentionProcessor,
    pub repository: Arc<dyn MentionRepository>,
    pub metrics: Arc<IngestMetrics>,
    pub config: Config,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Query parameters accepted by the listing endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Positive integer, or the literal `all`.
    pub limit: Option<String>,
    /// 1-based; meaningful only with a numeric `limit`.
    pub page: Option<u64>,
    pub source_host: Option<String>,
    pub target: Option<String>,
    /// `created_at asc`, `created_at desc`, `source asc`, `source desc`.
    pub order: Option<String>,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "webmention-ingest",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Receive a webmention submission.
pub async fn receive_webmention(
    State(state): State<Arc<AppState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let source = match parse_url_param(form.get("source"), "source") {
        Ok(url) => url,
        Err(resp) => return resp,
    };
    let target = match parse_url_param(form.get("target"), "target") {
        Ok(url) => url,
        Err(resp) => return resp,
    };

    let payload: Payload = form
        .iter()
        .filter(|(k, _)| k.as_str() != "source" && k.as_str() != "target")
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    match state
        .processor
        .process_webmention(source, target, payload)
        .await
    {
        Ok(mention) if mention.deleted => (StatusCode::OK, Json(mention)).into_response(),
        Ok(mention) => (StatusCode::CREATED, Json(mention)).into_response(),
        Err(err) => process_error_response(err),
    }
}

/// List stored mentions.
pub async fn list_mentions(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    let options = match list_options_from_query(&query, &state.config.listing) {
        Ok(options) => options,
        Err(resp) => return resp,
    };

    match state.repository.get_page(&options).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => {
            error!(error = %err, "listing mentions failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal storage error".to_string(),
                    code: "STORAGE",
                }),
            )
                .into_response()
        }
    }
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.gather() {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(err) => {
            error!(error = %err, "metrics encoding failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

fn parse_url_param(raw: Option<&String>, param: &'static str) -> Result<Url, Response> {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r,
        _ => {
            return Err(bad_request(
                format!("missing {param} parameter"),
                "MISSING_PARAMETER",
            ))
        }
    };
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => Ok(url),
        _ => Err(bad_request(
            format!("invalid {param} URL: {raw}"),
            "INVALID_URL",
        )),
    }
}

fn process_error_response(err: ProcessError) -> Response {
    match &err {
        ProcessError::InvalidTarget(_) => bad_request(err.to_string(), "INVALID_TARGET"),
        ProcessError::SourceUnreachable(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: err.to_string(),
                code: "SOURCE_UNREACHABLE",
            }),
        )
            .into_response(),
        ProcessError::Repository(inner) => {
            error!(error = %inner, "repository failure during processing");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal storage error".to_string(),
                    code: "STORAGE",
                }),
            )
                .into_response()
        }
    }
}

fn bad_request(error: String, code: &'static str) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse { error, code })).into_response()
}

fn list_options_from_query(
    query: &ListQuery,
    config: &ListingConfig,
) -> Result<ListOptions, Response> {
    let pagination = match query.limit.as_deref() {
        Some("all") => Pagination::All,
        Some(raw) => {
            let limit = raw.parse::<u64>().ok().filter(|l| *l > 0).ok_or_else(|| {
                bad_request(format!("invalid limit: {raw}"), "INVALID_LIMIT")
            })?;
            Pagination::Page {
                page: query.page.unwrap_or(1).max(1),
                limit: limit.min(config.max_limit),
            }
        }
        None => Pagination::Page {
            page: query.page.unwrap_or(1).max(1),
            limit: config.default_limit,
        },
    };

    let order = match query.order.as_deref() {
        None => Order::default(),
        Some(raw) => parse_order(raw)
            .ok_or_else(|| bad_request(format!("unsupported order: {raw}"), "INVALID_ORDER"))?,
    };

    let mut filter = MentionFilter::new();
    if let Some(host) = &query.source_host {
        filter = filter.with_source_host(host.clone());
    }
    if let Some(raw) = &query.target {
        let target = Url::parse(raw)
            .map_err(|_| bad_request(format!("invalid target filter: {raw}"), "INVALID_URL"))?;
        filter = filter.with_target(target);
    }

    Ok(ListOptions {
        filter,
        order,
        pagination,
    })
}

fn parse_order(raw: &str) -> Option<Order> {
    let mut parts = raw.split_whitespace();
    let field = match parts.next()? {
        "created_at" => OrderField::CreatedAt,
        "source" => OrderField::Source,
        _ => return None,
    };
    let direction = match parts.next() {
        None => Direction::default(),
        Some("asc") => Direction::Asc,
        Some("desc") => Direction::Desc,
        Some(_) => return None,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(Order { field, direction })
}
