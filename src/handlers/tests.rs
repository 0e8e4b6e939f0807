//! Router tests
//!
//! Drive the full router (layers included) with mock detectors.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::config::Config;
use crate::detector::{DetectorError, LinearDetector, ReviewDetector};
use crate::models::ReviewInput;
use crate::{create_router, AppState};

/// Echoes its input so tests can see exactly what the route layer passed on
struct SentinelDetector;

impl ReviewDetector for SentinelDetector {
    fn predict(&self, input: &ReviewInput) -> Result<Value, DetectorError> {
        Ok(json!({
            "sentinel": true,
            "review_text": input.review_text,
            "rating": input.rating,
            "reviewer_total_reviews": input.reviewer_total_reviews,
            "reviewer_avg_rating": input.reviewer_avg_rating,
        }))
    }

    fn version(&self) -> &str {
        "sentinel-1"
    }
}

/// Rejects texts containing "bad", fails internally on "boom", panics on "panic"
struct PickyDetector;

impl ReviewDetector for PickyDetector {
    fn predict(&self, input: &ReviewInput) -> Result<Value, DetectorError> {
        if input.review_text.contains("panic") {
            panic!("detector bug");
        }
        if input.review_text.contains("boom") {
            return Err(DetectorError::Inference("model exploded: secret detail".to_string()));
        }
        if input.review_text.contains("bad") {
            return Err(DetectorError::InvalidInput("text rejected".to_string()));
        }
        Ok(json!({"text": input.review_text}))
    }
}

fn app(detector: Option<Arc<dyn ReviewDetector>>) -> Router {
    create_router(AppState::new(detector, Config::default()))
}

fn sentinel_app() -> Router {
    app(Some(Arc::new(SentinelDetector)))
}

fn picky_app() -> Router {
    app(Some(Arc::new(PickyDetector)))
}

async fn call(app: Router, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn post(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
    call(app, Method::POST, uri, body).await
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    call(app, Method::GET, uri, "").await
}

// ============================================================================
// HEALTH
// ============================================================================

#[tokio::test]
async fn test_health_with_model() {
    let app = sentinel_app();
    for _ in 0..3 {
        let (status, body) = get(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model_loaded"], true);
        assert_eq!(body["model_version"], "sentinel-1");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}

#[tokio::test]
async fn test_health_without_model() {
    let app = app(None);
    for _ in 0..3 {
        let (status, body) = get(app.clone(), "/health").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body, json!({"status": "unhealthy", "message": "Model not loaded"}));
    }
}

// ============================================================================
// SINGLE PREDICTION
// ============================================================================

#[tokio::test]
async fn test_predict_passes_result_through() {
    let (status, body) = post(
        sentinel_app(),
        "/predict",
        r#"{"review_text": "Great product!", "rating": 5}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "sentinel": true,
            "review_text": "Great product!",
            "rating": 5.0,
            "reviewer_total_reviews": 1,
            "reviewer_avg_rating": null,
        })
    );
}

#[tokio::test]
async fn test_predict_forwards_reviewer_stats() {
    let (status, body) = post(
        sentinel_app(),
        "/predict",
        r#"{"review_text": "ok", "rating": "3", "reviewer_total_reviews": 17, "reviewer_avg_rating": 2.5}"#,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rating"], 3.0);
    assert_eq!(body["reviewer_total_reviews"], 17);
    assert_eq!(body["reviewer_avg_rating"], 2.5);
}

#[tokio::test]
async fn test_predict_rating_out_of_range() {
    for text in ["Great product!", "", "terrible", "ünïcödé ★★★"] {
        for rating in [0, 6] {
            let body = json!({"review_text": text, "rating": rating}).to_string();
            let (status, resp) = post(sentinel_app(), "/predict", &body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "rating {} text {:?}", rating, text);
            assert_eq!(resp["error"], "Rating must be between 1 and 5");
        }
    }
}

#[tokio::test]
async fn test_predict_missing_fields() {
    for body in [r#"{"review_text": "no rating"}"#, r#"{"rating": 4}"#, r#"{"text": "x", "stars": 4}"#] {
        let (status, resp) = post(sentinel_app(), "/predict", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"], "Missing review_text or rating");
    }
}

#[tokio::test]
async fn test_predict_no_data() {
    for body in ["", "   ", "null", "{}"] {
        let (status, resp) = post(sentinel_app(), "/predict", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {:?}", body);
        assert_eq!(resp["error"], "No JSON data provided");
    }
}

#[tokio::test]
async fn test_predict_non_numeric_rating() {
    let (status, resp) = post(sentinel_app(), "/predict", r#"{"review_text": "x", "rating": "five"}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "Rating must be a number");
}

#[tokio::test]
async fn test_predict_malformed_json_is_internal_error() {
    let (status, resp) = post(sentinel_app(), "/predict", r#"{"review_text": "#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp["error"], "Internal server error");
}

#[tokio::test]
async fn test_predict_without_model() {
    let (status, resp) = post(app(None), "/predict", r#"{"review_text": "x", "rating": 3}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp["error"], "Model not loaded");
}

#[tokio::test]
async fn test_predict_detector_failure_hides_detail() {
    let (status, resp) = post(picky_app(), "/predict", r#"{"review_text": "boom", "rating": 3}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp["error"], "Internal server error");
    assert!(!resp.to_string().contains("secret detail"));
}

#[tokio::test]
async fn test_predict_detector_rejects_input() {
    let (status, resp) = post(picky_app(), "/predict", r#"{"review_text": "bad", "rating": 3}"#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["error"], "text rejected");
}

#[tokio::test]
async fn test_predict_detector_panic_is_internal_error() {
    let (status, resp) = post(picky_app(), "/predict", r#"{"review_text": "panic", "rating": 3}"#).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp["error"], "Internal server error");
}

// ============================================================================
// BATCH PREDICTION
// ============================================================================

#[tokio::test]
async fn test_batch_mixed_items_keep_order() {
    let body = json!({
        "reviews": [
            {"review_text": "first", "rating": 5},
            {"review_text": "missing rating"},
            {"review_text": "too high", "rating": 9},
            {"review_text": "bad", "rating": 2},
            "not an object",
            {"review_text": "boom", "rating": 1},
            {"review_text": "last", "rating": "4"},
        ]
    })
    .to_string();

    let (status, resp) = post(picky_app(), "/predict/batch", &body).await;
    assert_eq!(status, StatusCode::OK);

    let invalid = json!({"error": "Invalid review data"});
    assert_eq!(
        resp,
        json!({
            "results": [
                {"text": "first"},
                invalid,
                invalid,
                invalid,
                invalid,
                invalid,
                {"text": "last"},
            ]
        })
    );
}

#[tokio::test]
async fn test_batch_detector_panic_only_fails_its_item() {
    let body = json!({
        "reviews": [
            {"review_text": "first", "rating": 4},
            {"review_text": "panic", "rating": 4},
            {"review_text": "last", "rating": 2},
        ]
    })
    .to_string();

    let (status, resp) = post(picky_app(), "/predict/batch", &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        resp,
        json!({
            "results": [
                {"text": "first"},
                {"error": "Invalid review data"},
                {"text": "last"},
            ]
        })
    );
}

#[tokio::test]
async fn test_batch_passes_each_result_through() {
    let body = json!({
        "reviews": [
            {"review_text": "a", "rating": 1, "reviewer_total_reviews": 3},
            {"review_text": "b", "rating": 2.5, "reviewer_avg_rating": 4},
        ]
    })
    .to_string();

    let (status, resp) = post(sentinel_app(), "/predict/batch", &body).await;
    assert_eq!(status, StatusCode::OK);

    let results = resp["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["review_text"], "a");
    assert_eq!(results[0]["reviewer_total_reviews"], 3);
    assert_eq!(results[1]["review_text"], "b");
    assert_eq!(results[1]["reviewer_avg_rating"], 4.0);
}

#[tokio::test]
async fn test_batch_empty_and_absent_reviews() {
    for body in [r#"{"reviews": []}"#, r#"{}"#, r#"{"reviews": null}"#] {
        let (status, resp) = post(sentinel_app(), "/predict/batch", body).await;
        assert_eq!(status, StatusCode::OK, "body {:?}", body);
        assert_eq!(resp, json!({"results": []}));
    }
}

#[tokio::test]
async fn test_batch_reviews_not_a_list() {
    for body in [r#"{"reviews": {"review_text": "x", "rating": 3}}"#, r#"{"reviews": "abc"}"#] {
        let (status, resp) = post(sentinel_app(), "/predict/batch", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp["error"], "reviews must be a list");
    }
}

#[tokio::test]
async fn test_batch_unreadable_body() {
    for body in ["", "{not json", "[1, 2]", "null"] {
        let (status, resp) = post(sentinel_app(), "/predict/batch", body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "body {:?}", body);
        assert_eq!(resp["error"], "Internal server error");
    }
}

#[tokio::test]
async fn test_batch_without_model() {
    let (status, resp) = post(app(None), "/predict/batch", r#"{"reviews": []}"#).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp["error"], "Model not loaded");
}

// ============================================================================
// HOME & LAYERS
// ============================================================================

#[tokio::test]
async fn test_home_serves_html() {
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app(None).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("ReviewGuard"));
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let request = Request::builder()
        .uri("/health")
        .header(header::ORIGIN, "https://shop.example.com")
        .body(Body::empty())
        .unwrap();
    let response = sentinel_app().oneshot(request).await.unwrap();

    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}

#[tokio::test]
async fn test_bundled_model_end_to_end() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/artifacts/review_model.json");
    let detector = LinearDetector::load(path).unwrap();
    let app = app(Some(Arc::new(detector)));

    let (status, resp) = post(
        app.clone(),
        "/predict",
        r#"{"review_text": "BEST EVER!!! Amazing, perfect, must buy!!!", "rating": 5}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["prediction"], "fake");
    assert_eq!(resp["is_fake"], true);

    let (status, resp) = post(
        app,
        "/predict",
        r#"{"review_text": "The strap is shorter than listed and the stitching on one side came loose after a month of daily use.", "rating": 3, "reviewer_total_reviews": 85, "reviewer_avg_rating": 3.4}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["prediction"], "genuine");
}
