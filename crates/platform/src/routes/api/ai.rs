//! AI proxy endpoints.
//!
//! Thin shims over the external embedding/semantic-search service. The
//! search endpoint validates and normalizes the request before any network
//! call; the backfill endpoint requires a staff role. `GET` on either path
//! serves a static documentation payload describing the contract.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use bookpress_core::Role;

use crate::ai::types::{MODEL_NAME, SEARCH_METHOD};
use crate::ai::SearchParams;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::state::AppState;

/// Default number of search results.
const DEFAULT_LIMIT: u32 = 10;

/// Hard cap on requested search results, applied before forwarding.
const MAX_LIMIT: u32 = 50;

/// Default similarity cutoff.
const DEFAULT_THRESHOLD: f32 = 0.7;

/// Semantic search request body.
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    pub category: Option<String>,
    pub limit: Option<u32>,
    pub threshold: Option<f32>,
}

/// Validate and normalize a search request.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the query is empty after trimming.
fn normalize(request: SearchRequest) -> Result<SearchParams> {
    let query = request.query.trim().to_owned();
    if query.is_empty() {
        return Err(AppError::BadRequest("query is required".to_owned()));
    }

    Ok(SearchParams {
        query,
        category: request.category.filter(|c| !c.trim().is_empty()),
        limit: request.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT),
        threshold: request.threshold.unwrap_or(DEFAULT_THRESHOLD),
    })
}

/// `POST /api/ai/search` - semantic book search.
#[instrument(skip(state, body))]
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchRequest>,
) -> Response {
    let params = match normalize(body) {
        Ok(params) => params,
        Err(e) => return e.into_response(),
    };

    match state.ai().semantic_search(&params).await {
        Ok(found) => Json(json!({
            "query": params.query,
            "results": found.results,
            "resultCount": found.results.len(),
            "searchMethod": SEARCH_METHOD,
            "model": MODEL_NAME,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("semantic search failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Semantic search failed",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// `GET /api/ai/search` - endpoint documentation.
pub async fn search_docs() -> Json<Value> {
    Json(search_docs_payload())
}

/// `POST /api/ai/generate-embeddings` - backfill embeddings for all books
/// lacking them. Staff only.
#[instrument(skip(state, auth))]
pub async fn generate_embeddings(
    State(state): State<AppState>,
    auth: RequireAuth,
) -> Response {
    let RequireAuth(user) = auth;
    let role = state
        .profiles()
        .get(user.id)
        .await
        .map_or(Role::Reader, |profile| profile.role);
    if !role.is_staff() {
        return AppError::Forbidden("editor or publisher role required".to_owned())
            .into_response();
    }

    match state.ai().generate_missing_embeddings().await {
        Ok(summary) => Json(json!({
            "message": summary.message,
            "results": summary.results,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("embedding backfill failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Embedding generation failed",
                    "details": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// `GET /api/ai/generate-embeddings` - endpoint documentation.
pub async fn generate_embeddings_docs() -> Json<Value> {
    Json(generate_embeddings_docs_payload())
}

fn search_docs_payload() -> Value {
    json!({
        "endpoint": "/api/ai/search",
        "method": "POST",
        "description": "Semantic book search backed by multilingual embeddings",
        "body": {
            "query": "string (required)",
            "category": "string (optional)",
            "limit": format!("number (optional, default {DEFAULT_LIMIT}, max {MAX_LIMIT})"),
            "threshold": format!("number (optional, default {DEFAULT_THRESHOLD}, similarity cutoff)"),
        },
        "model": MODEL_NAME,
    })
}

fn generate_embeddings_docs_payload() -> Value {
    json!({
        "endpoint": "/api/ai/generate-embeddings",
        "method": "POST",
        "description": "Generate embeddings for all books that lack them",
        "body": "none",
        "auth": "editor or publisher role required",
        "model": MODEL_NAME,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request(query: &str, limit: Option<u32>) -> SearchRequest {
        SearchRequest {
            query: query.to_owned(),
            category: None,
            limit,
            threshold: None,
        }
    }

    #[test]
    fn test_empty_query_is_rejected_before_any_call() {
        assert!(matches!(
            normalize(request("", None)),
            Err(AppError::BadRequest(_))
        ));
        assert!(matches!(
            normalize(request("   ", None)),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_query_is_trimmed() {
        let params = normalize(request("  myanmar history  ", None)).unwrap();
        assert_eq!(params.query, "myanmar history");
    }

    #[test]
    fn test_limit_defaults_and_caps() {
        assert_eq!(normalize(request("q", None)).unwrap().limit, DEFAULT_LIMIT);
        assert_eq!(normalize(request("q", Some(25))).unwrap().limit, 25);
        assert_eq!(normalize(request("q", Some(1000))).unwrap().limit, MAX_LIMIT);
    }

    #[test]
    fn test_threshold_passes_through_unchanged() {
        let mut req = request("q", None);
        req.threshold = Some(0.42);
        let params = normalize(req).unwrap();
        assert!((params.threshold - 0.42).abs() < f32::EPSILON);

        let defaulted = normalize(request("q", None)).unwrap();
        assert!((defaulted.threshold - DEFAULT_THRESHOLD).abs() < f32::EPSILON);
    }

    #[test]
    fn test_blank_category_is_dropped() {
        let mut req = request("q", None);
        req.category = Some("  ".to_owned());
        assert_eq!(normalize(req).unwrap().category, None);
    }

    #[test]
    fn test_docs_payloads_describe_their_endpoints() {
        let search = search_docs_payload();
        assert_eq!(search["endpoint"], "/api/ai/search");
        assert_eq!(search["method"], "POST");
        assert_eq!(search["model"], MODEL_NAME);

        let backfill = generate_embeddings_docs_payload();
        assert_eq!(backfill["endpoint"], "/api/ai/generate-embeddings");
        assert_eq!(backfill["body"], "none");
    }
}
