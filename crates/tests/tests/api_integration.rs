use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use ilm_agents::{TutorAgent, TutorConfig};
use ilm_api::{build_app, build_router, ApiSettings, ApiState};
use ilm_backend::{KnowledgeBackend, StaticKnowledgeBackend};
use ilm_core::{BackendUnavailable, FragmentQuery, KnowledgeFragments, QaUnit};
use ilm_observability::AppMetrics;
use serde_json::{json, Value};
use tower::ServiceExt;

struct DownBackend;

#[async_trait]
impl KnowledgeBackend for DownBackend {
    fn name(&self) -> &'static str {
        "down"
    }

    async fn fetch_fragments(
        &self,
        _query: &FragmentQuery,
    ) -> Result<KnowledgeFragments, BackendUnavailable> {
        Err(BackendUnavailable::new("down", "503 from upstream"))
    }
}

/// Hadith content without its sources.
struct UncitedBackend;

#[async_trait]
impl KnowledgeBackend for UncitedBackend {
    fn name(&self) -> &'static str {
        "uncited"
    }

    async fn fetch_fragments(
        &self,
        _query: &FragmentQuery,
    ) -> Result<KnowledgeFragments, BackendUnavailable> {
        Ok(KnowledgeFragments {
            primary: QaUnit {
                original_text: Some("إِنَّمَا الْأَعْمَالُ بِالنِّيَّاتِ".to_string()),
                transliteration: Some("Innamal-a'malu bin-niyyat".to_string()),
                translations: vec!["Actions are only by intentions.".to_string()],
                ..QaUnit::default()
            },
            ..KnowledgeFragments::default()
        })
    }
}

fn app_with(backend: Arc<dyn KnowledgeBackend>) -> Router {
    let metrics = AppMetrics::shared();
    let agent = TutorAgent::new(backend, TutorConfig::default(), metrics.clone());
    build_router(ApiState::new(agent, metrics, ApiSettings::default()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_reports_backend_and_metrics() {
    let app = build_app().expect("app should build");

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["status"], "ok");
    assert!(parsed["backend"].is_string());
    assert!(parsed["metrics"]["ask_requests_total"].is_number());
}

#[tokio::test]
async fn qalqalah_question_returns_tajwid_drills() {
    let app = app_with(Arc::new(StaticKnowledgeBackend));

    let response = app
        .oneshot(post_json(
            "/v1/ask",
            json!({ "question": "What is qalqalah and how do I practice it?" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let parsed = read_json(response).await;
    assert_eq!(parsed["category"], "tajwid");
    assert!(!parsed["primary_block"]["drills"].as_array().unwrap().is_empty());
    assert!(!parsed["primary_block"]["examples"].as_array().unwrap().is_empty());
    assert!(parsed["voiceover"]["primary_script"].is_string());
}

#[tokio::test]
async fn arabic_question_gets_arabic_primary_and_english_secondary() {
    let app = app_with(Arc::new(StaticKnowledgeBackend));

    let response = app
        .oneshot(post_json(
            "/v1/ask",
            json!({ "question": "ما هي القلقلة في التجويد؟" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert_eq!(parsed["category"], "tajwid");
    assert_eq!(parsed["primary_language"], "ar");
    assert_eq!(parsed["secondary_language"], "en");
    assert!(parsed["secondary_block"].is_object());
}

#[tokio::test]
async fn empty_question_is_rejected() {
    let app = app_with(Arc::new(StaticKnowledgeBackend));

    let response = app
        .oneshot(post_json("/v1/ask", json!({ "question": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = read_json(response).await;
    assert_eq!(parsed["error"], "invalid_input");
    assert_eq!(parsed["parameter"], "question");
}

#[tokio::test]
async fn unavailable_backend_degrades_to_fallback() {
    let app = app_with(Arc::new(DownBackend));

    let response = app
        .oneshot(post_json(
            "/v1/ask",
            json!({ "question": "Explain the hadith about intentions" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    assert!(parsed["category"].is_null());
    assert!(parsed["safety_notes"].is_string());
    assert!(parsed["primary_block"]["original_text"].is_null());
    assert!(parsed["primary_block"]["sources"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn composition_failure_is_generic_500() {
    let app = app_with(Arc::new(UncitedBackend));

    let response = app
        .oneshot(post_json(
            "/v1/ask",
            json!({ "question": "Explain the hadith about intentions" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let parsed = read_json(response).await;
    assert_eq!(parsed["error"], "composition_failed");
    assert!(!parsed["message"].as_str().unwrap().contains("primary_block"));
}

#[tokio::test]
async fn al_baqarah_plan_has_one_entry_per_day() {
    let app = app_with(Arc::new(StaticKnowledgeBackend));

    let response = app
        .oneshot(post_json(
            "/v1/plan",
            json!({
                "goal": "Al-Baqarah",
                "days_per_week": 5,
                "minutes_per_day": 30,
                "review_ratio": 0.5,
                "base_language": "en"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let parsed = read_json(response).await;
    let days = parsed["daily_plan"].as_array().unwrap();
    assert_eq!(days.len(), 5);
    for entry in days {
        let entry = entry.as_str().unwrap();
        assert!(entry.contains("15 min new material"));
        assert!(entry.contains("15 min review"));
    }
    assert_eq!(parsed["reminders"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn plan_rejects_eight_days() {
    let app = app_with(Arc::new(StaticKnowledgeBackend));

    let response = app
        .oneshot(post_json(
            "/v1/plan",
            json!({
                "days_per_week": 8,
                "minutes_per_day": 30,
                "review_ratio": 0.5,
                "base_language": "en"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let parsed = read_json(response).await;
    assert_eq!(parsed["parameter"], "days_per_week");
}
