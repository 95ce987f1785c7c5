mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use ilm_agents::{TutorAgent, TutorConfig};
use ilm_core::{AskInput, PlanRequest, TutorError};
use ilm_observability::{AppMetrics, MetricsSnapshot};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use crate::rate_limit::ClientRateLimiter;

const MAX_BODY_BYTES: usize = 64 * 1024;
const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: u64 = 60;
const DEFAULT_RATE_LIMIT_MAX: usize = 60;
const DEFAULT_ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://127.0.0.1:3000",
    "http://localhost:5173",
    "http://127.0.0.1:5173",
];
const COMPOSITION_FAILED_MESSAGE: &str =
    "the answer could not be assembled right now; please try again later";

/// HTTP-level settings. Tutor settings live in [`TutorConfig`].
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub rate_limit_window: Duration,
    pub rate_limit_max: usize,
    pub allowed_origins: Vec<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            rate_limit_window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECONDS),
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS
                .iter()
                .map(|origin| origin.to_string())
                .collect(),
        }
    }
}

impl ApiSettings {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let rate_limit_window = env::var("ILM_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.trim().parse::<u64>().ok())
            .filter(|seconds| *seconds > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.rate_limit_window);
        let rate_limit_max = env::var("ILM_RATE_LIMIT_MAX")
            .ok()
            .and_then(|value| value.trim().parse::<usize>().ok())
            .filter(|max| *max > 0)
            .unwrap_or(defaults.rate_limit_max);
        let allowed_origins = env::var("ILM_ALLOWED_ORIGINS")
            .ok()
            .map(|value| parse_origins(&value))
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        Self {
            rate_limit_window,
            rate_limit_max,
            allowed_origins,
        }
    }
}

#[derive(Clone)]
pub struct ApiState {
    pub agent: Arc<TutorAgent>,
    pub metrics: Arc<AppMetrics>,
    pub limiter: ClientRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
}

impl ApiState {
    pub fn new(agent: TutorAgent, metrics: Arc<AppMetrics>, settings: ApiSettings) -> Self {
        Self {
            agent: Arc::new(agent),
            metrics,
            limiter: ClientRateLimiter::new(settings.rate_limit_window, settings.rate_limit_max),
            allowed_origins: Arc::new(settings.allowed_origins),
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    backend: &'static str,
    metrics: MetricsSnapshot,
}

/// Reads tutor and HTTP settings from the environment and wires the router.
pub fn build_app() -> Result<Router> {
    let metrics = AppMetrics::shared();
    let config = TutorConfig::from_env().context("invalid tutor configuration")?;
    let agent = TutorAgent::from_config(config, metrics.clone())
        .context("failed to initialize knowledge backend")?;

    Ok(build_router(ApiState::new(
        agent,
        metrics,
        ApiSettings::from_env(),
    )))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/ask", post(ask))
        .route("/v1/plan", post(plan))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        backend: state.agent.backend_name(),
        metrics: state.metrics.snapshot(),
    })
}

async fn ask(
    State(state): State<ApiState>,
    payload: Result<Json<AskInput>, JsonRejection>,
) -> Response {
    let Json(input) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(&state, rejection),
    };

    match state.agent.ask(input).await {
        Ok(answer) => (StatusCode::OK, Json(answer)).into_response(),
        Err(error) => tutor_error_response(error),
    }
}

async fn plan(
    State(state): State<ApiState>,
    payload: Result<Json<PlanRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return malformed_body(&state, rejection),
    };

    match state.agent.plan(request) {
        Ok(plan) => (StatusCode::OK, Json(plan)).into_response(),
        Err(error) => tutor_error_response(error),
    }
}

fn tutor_error_response(error: TutorError) -> Response {
    match error {
        TutorError::InvalidInput { parameter, reason } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_input",
                "parameter": parameter,
                "message": reason,
            })),
        )
            .into_response(),
        // Details are logged by the agent; callers only learn that it failed.
        TutorError::Composition(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "composition_failed",
                "message": COMPOSITION_FAILED_MESSAGE,
            })),
        )
            .into_response(),
    }
}

fn malformed_body(state: &ApiState, rejection: JsonRejection) -> Response {
    state.metrics.inc_invalid_input();
    let status = match rejection.status() {
        StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(json!({
            "error": "invalid_input",
            "parameter": "body",
            "message": rejection.body_text(),
        })),
    )
        .into_response()
}

fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-request-id"),
        ])
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let client = client_key(&request);
    if let Err(retry_after) = state.limiter.check(&client) {
        let seconds = retry_after.as_secs().max(1);
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "error": "rate_limited",
                "message": "too many requests from this client; wait and retry"
            })),
        )
            .into_response();
        if let Ok(value) = HeaderValue::from_str(&seconds.to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(request).await
}

fn client_key(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "local".to_string())
}

async fn security_headers_middleware(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("no-referrer"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'; base-uri 'none'"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use tower::ServiceExt;

    fn router(settings: ApiSettings) -> Router {
        let metrics = AppMetrics::shared();
        let agent = TutorAgent::from_config(TutorConfig::default(), metrics.clone()).unwrap();
        build_router(ApiState::new(agent, metrics, settings))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn origins_are_trimmed() {
        assert_eq!(
            parse_origins(" https://ilm.example/ , ,http://localhost:3000"),
            vec![
                "https://ilm.example".to_string(),
                "http://localhost:3000".to_string()
            ]
        );
    }

    #[test]
    fn composition_failures_hide_details() {
        let violation = ilm_core::SchemaViolation::missing("primary_block.drills");
        let response = tutor_error_response(TutorError::Composition(violation));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn malformed_json_is_invalid_input() {
        let response = router(ApiSettings::default())
            .oneshot(post_json("/v1/ask", "{\"question\": 42"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed["error"], "invalid_input");
        assert_eq!(parsed["parameter"], "body");
    }

    #[tokio::test]
    async fn rate_limit_returns_retry_after() {
        let app = router(ApiSettings {
            rate_limit_max: 1,
            ..ApiSettings::default()
        });
        let body = r#"{"days_per_week":3,"minutes_per_day":20,"review_ratio":0.5,"base_language":"en"}"#;

        let first = app.clone().oneshot(post_json("/v1/plan", body)).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(
            first.headers().get(header::X_CONTENT_TYPE_OPTIONS).unwrap(),
            "nosniff"
        );

        let second = app.oneshot(post_json("/v1/plan", body)).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(header::RETRY_AFTER));
    }
}
