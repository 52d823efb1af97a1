//! HTTP Endpoints
//!
//! REST API for the compliance assistant.

use std::time::{Duration, Instant};

use axum::{
    extract::{Json, Query, State},
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use compliance_assist_config::constants::{endpoints, search};
use compliance_assist_core::{MatchOutcome, Retriever, SearchHit, SearchOptions, SearchResponse};
use compliance_assist_rag::{category_preference, classify, QueryIntent, ScoreBreakdown};

use crate::answer::{self, Answer};
use crate::auth::admin_auth;
use crate::metrics::{metrics_handler, record_request, record_search_latency};
use crate::state::AppState;
use crate::ServerError;

/// Query used by `/debug/search` when none is given
const DEFAULT_DEBUG_QUERY: &str = "hotel sold out";

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let timeout = Duration::from_secs(config.server.timeout_seconds);
    drop(config); // Release lock before building router

    let admin = Router::new()
        .route("/admin/reload-knowledge", post(reload_knowledge))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    Router::new()
        .route("/api/ask", post(ask))
        .route("/api/search", post(search_rows))
        .route("/debug/search", get(debug_search))
        // Health check
        .route("/health", get(health_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        // Admin endpoints
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        if !origins.is_empty() {
            tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        } else {
            tracing::info!(
                "No CORS origins configured, defaulting to {}",
                endpoints::DEFAULT_CORS_ORIGIN
            );
        }
        return CorsLayer::new()
            .allow_origin(HeaderValue::from_static(endpoints::DEFAULT_CORS_ORIGIN))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// POST /api/ask
async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>, ServerError> {
    let question = request.question.unwrap_or_default().trim().to_string();
    if question.is_empty() {
        record_request("ask", "invalid");
        return Err(ServerError::InvalidRequest("Missing question".to_string()));
    }

    let (label, proof_limit) = {
        let config = state.get_config();
        (
            config.knowledge.source_label.clone(),
            config.search.proof_limit,
        )
    };

    match classify(&question) {
        QueryIntent::SmallTalk => {
            record_request("ask", "smalltalk");
            return Ok(Json(answer::small_talk(&label)));
        },
        QueryIntent::Capability => {
            record_request("ask", "capability");
            return Ok(Json(answer::capability(&label)));
        },
        QueryIntent::Procedure => {},
    }

    let mut options = SearchOptions::default();
    let prefer_ticket_tab = match category_preference(&question) {
        Some(preference) => {
            options = options.preferring(preference);
            true
        },
        None => false,
    };

    let retriever = state.retriever();
    let started = Instant::now();
    let outcome = retriever.accept_best(&question, &options);
    record_search_latency(started.elapsed());

    let answer = match outcome {
        MatchOutcome::Matched(result) => {
            record_request("ask", "matched");
            tracing::info!(
                row = %result.matched_row.id,
                score = result.score,
                preferred = result.preferred,
                "Answered from matrix"
            );
            answer::matched(&label, &question, &result, proof_limit, prefer_ticket_tab)
        },
        MatchOutcome::NotCovered {
            top_score,
            matched_count,
        } => {
            record_request("ask", "not_covered");
            tracing::info!(top_score, matched_count, "Scenario not covered by matrix");
            answer::not_covered(&label, top_score, matched_count, prefer_ticket_tab)
        },
    };

    Ok(Json(answer))
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// POST /api/search
async fn search_rows(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    let question = request.question.unwrap_or_default();
    let options = SearchOptions {
        top_k: request.top_k,
        prefer: None,
    };

    let retriever = state.retriever();
    let started = Instant::now();
    let response = retriever.search(&question, &options);
    record_search_latency(started.elapsed());
    record_request("search", if response.hits.is_empty() { "empty" } else { "ok" });

    Json(response)
}

#[derive(Debug, Deserialize)]
pub struct DebugQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
struct DebugHit {
    #[serde(flatten)]
    hit: SearchHit,
    breakdown: ScoreBreakdown,
}

#[derive(Debug, Serialize)]
struct DebugSearchResponse {
    query: String,
    expanded: String,
    tokens: Vec<String>,
    matched_count: usize,
    top_score: f32,
    top_hit: Option<SearchHit>,
    sample: Vec<DebugHit>,
}

/// GET /debug/search?q=
///
/// Ranked sample with per-component scores, for tuning the vocabulary.
async fn debug_search(
    State(state): State<AppState>,
    Query(params): Query<DebugQuery>,
) -> Json<DebugSearchResponse> {
    let query = params
        .q
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DEBUG_QUERY.to_string());

    let retriever = state.retriever();
    let expanded = retriever.expand(&query);
    let sample: Vec<DebugHit> = retriever
        .explain(&query, Some(search::DEBUG_SAMPLE))
        .into_iter()
        .map(|explained| DebugHit {
            hit: SearchHit::from(&explained.scored),
            breakdown: explained.breakdown,
        })
        .collect();

    record_request("debug_search", "ok");

    Json(DebugSearchResponse {
        query,
        expanded: expanded.text,
        tokens: expanded.tokens,
        matched_count: sample.len(),
        top_score: sample.first().map(|h| h.hit.score).unwrap_or(0.0),
        top_hit: sample.first().map(|h| h.hit.clone()),
        sample,
    })
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let (path, source_label) = {
        let config = state.get_config();
        (
            config.knowledge.path.clone(),
            config.knowledge.source_label.clone(),
        )
    };
    let rows = state.retriever().row_count();

    let healthy = rows > 0;
    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": if healthy { "healthy" } else { "degraded" },
            "version": env!("CARGO_PKG_VERSION"),
            "knowledge": {
                "path": path,
                "source": source_label,
                "rows": rows
            }
        })),
    )
}

/// POST /admin/reload-knowledge
///
/// Rebuilds the knowledge index from disk. The previous index keeps serving
/// if the new one fails to load.
async fn reload_knowledge(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ServerError> {
    let reload = tokio::task::spawn_blocking(move || state.reload_knowledge())
        .await
        .map_err(|e| ServerError::Internal(format!("Knowledge reload task failed: {}", e)))?;

    Ok(match reload {
        Ok(rows) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "rows": rows
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Knowledge reload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "message": e.to_string()
                })),
            )
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use compliance_assist_config::{Settings, VocabularyConfig};
    use compliance_assist_rag::{load_rows, MatrixRetriever, RetrieverConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let rows = load_rows(&json!([
            {
                "tab": "Voice Matrix",
                "row": 2,
                "issue": "Hotel sold out at check-in",
                "instructions": "1. Call supplier. 2. Rebook guest. 3. Escalate to supervisor.",
                "supervisor": "Yes"
            },
            {
                "tab": "Ticket Matrix",
                "row": 3,
                "issue": "Hotel sold out ticket follow-up",
                "instructions": "1. Link the voice case. 2. Set priority to urgent.",
                "ticket": "Yes"
            }
        ]))
        .unwrap();
        let retriever =
            MatrixRetriever::new(rows, &VocabularyConfig::default(), RetrieverConfig::default());
        AppState::new(Settings::default(), retriever)
    }

    async fn call(state: AppState, request: Request<Body>) -> (StatusCode, Value) {
        let response = create_router(state).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_router_creation() {
        let _ = create_router(test_state());
    }

    #[tokio::test]
    async fn test_ask_missing_question() {
        let (status, body) = call(test_state(), post_json("/api/ask", json!({"question": "  "}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Missing question");

        let (status, _) = call(test_state(), post_json("/api/ask", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ask_matched() {
        let (status, body) = call(
            test_state(),
            post_json("/api/ask", json!({"question": "the hotel is sold out"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["covered"], true);
        assert_eq!(body["routing"]["supervisor"], "Yes");
        assert_eq!(body["routing"]["refundQueue"], "not specified");
        assert_eq!(body["steps"].as_array().unwrap().len(), 3);
        assert!(body["answer"]
            .as_str()
            .unwrap()
            .contains("Voice Matrix → Row 2 → Hotel sold out at check-in"));
        assert_eq!(body["debug"]["prefer_ticket_tab"], false);
    }

    #[tokio::test]
    async fn test_ask_prefers_ticket_tab() {
        let (status, body) = call(
            test_state(),
            post_json("/api/ask", json!({"question": "hotel sold out, need a ticket"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["debug"]["prefer_ticket_tab"], true);
        assert_eq!(body["routing"]["ticket"], "Yes");
        assert!(body["answer"].as_str().unwrap().contains("Ticket Matrix → Row 3"));
    }

    #[tokio::test]
    async fn test_ask_not_covered_is_ok() {
        let (status, body) = call(
            test_state(),
            post_json("/api/ask", json!({"question": "pool towels are missing"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["covered"], false);
        assert!(body["routing"].is_null());
        assert!(body["answer"]
            .as_str()
            .unwrap()
            .contains("escalate to a supervisor"));
    }

    #[tokio::test]
    async fn test_ask_small_talk() {
        let (status, body) =
            call(test_state(), post_json("/api/ask", json!({"question": "hello"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["debug"]["reason"], "smalltalk");
        assert!(body["proof"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let (status, body) = call(
            test_state(),
            post_json("/api/search", json!({"question": "sold out", "top_k": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hits"].as_array().unwrap().len(), 1);
        assert_eq!(body["hits"][0]["slack"], "not specified");

        let (status, body) = call(test_state(), post_json("/api/search", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["hits"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_debug_search_defaults_query() {
        let request = Request::builder()
            .uri("/debug/search")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(test_state(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["query"], DEFAULT_DEBUG_QUERY);
        assert!(body["matched_count"].as_u64().unwrap() > 0);
        assert!(body["sample"][0]["breakdown"]["description"].as_f64().unwrap() > 0.0);
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let (status, body) = call(test_state(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["knowledge"]["rows"], 2);
    }

    #[tokio::test]
    async fn test_metrics_disabled_without_recorder() {
        let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
        let response = create_router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    fn sample_knowledge_path() -> String {
        format!("{}/../../knowledge/matrix-2026.json", env!("CARGO_MANIFEST_DIR"))
    }

    fn reload_request(authorization: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method("POST").uri("/admin/reload-knowledge");
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_reload_swaps_index() {
        let state = test_state();
        state.config.write().knowledge.path = sample_knowledge_path();

        let (status, body) = call(state.clone(), reload_request(None)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["rows"], 9);
        assert_eq!(state.retriever().row_count(), 9);
    }

    #[tokio::test]
    async fn test_reload_requires_admin_key_when_configured() {
        let state = test_state();
        {
            let mut config = state.config.write();
            config.knowledge.path = sample_knowledge_path();
            config.server.admin_api_key = Some("s3cret".to_string());
        }

        let response = create_router(state.clone())
            .oneshot(reload_request(None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = create_router(state.clone())
            .oneshot(reload_request(Some("Bearer wrong")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = create_router(state.clone())
            .oneshot(reload_request(Some("s3cret")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.retriever().row_count(), 2);

        let (status, body) = call(state.clone(), reload_request(Some("Bearer s3cret"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], 9);

        // Question routes stay open
        let (status, _) = call(state, post_json("/api/search", json!({"question": "refund"}))).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_reload_failure_keeps_index() {
        let state = test_state();
        state.config.write().knowledge.path = "/nonexistent/matrix.json".to_string();

        let request = Request::builder()
            .method("POST")
            .uri("/admin/reload-knowledge")
            .body(Body::empty())
            .unwrap();
        let (status, body) = call(state.clone(), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");
        assert_eq!(state.retriever().row_count(), 2);
    }
}
