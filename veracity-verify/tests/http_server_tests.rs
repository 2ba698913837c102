//! HTTP Server & Routing Integration Tests
//!
//! Exercises the router with `oneshot` requests against an in-memory store.

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use helpers::*;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use veracity_common::config::LimitsConfig;
use veracity_verify::db::verifications;
use veracity_verify::extractors::DetectorVerdict;
use veracity_verify::models::VerificationRequest;
use veracity_verify::{build_router, AppState};

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn upload_request(parts: &[FormPart<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/verifyImage")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// Wait for the background save to land
async fn wait_for_history(state: &AppState, user_id: &str, expected: usize) -> Vec<Value> {
    for _ in 0..50 {
        let history = verifications::load_history(&state.db, user_id, 50)
            .await
            .unwrap();
        if history.len() >= expected {
            return history
                .into_iter()
                .map(|r| serde_json::to_value(r).unwrap())
                .collect();
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("background save did not complete");
}

#[tokio::test]
async fn test_health_endpoint() {
    let state = test_app_state(unconfigured_verifier()).await;
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["module"], "veracity-verify");
    assert_eq!(json["providers"]["reverse_search"], false);
    assert_eq!(json["providers"]["ai_detection"], false);
    assert!(json["uptime_seconds"].is_u64());
    assert!(json.get("last_error").is_none());
}

#[tokio::test]
async fn test_health_reports_configured_providers() {
    let verifier = verifier_with(
        Some(Arc::new(FixedMatches(0))),
        vec![Arc::new(FixedVerdict(DetectorVerdict::Authentic))],
    );
    let app = build_router(test_app_state(verifier).await);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["providers"]["reverse_search"], true);
    assert_eq!(json["providers"]["ai_detection"], true);
}

#[tokio::test]
async fn test_verify_image_returns_result_and_saves_it() {
    let verifier = verifier_with(
        Some(Arc::new(FixedMatches(1))),
        vec![Arc::new(FixedVerdict(DetectorVerdict::Probability(0.1)))],
    );
    let state = test_app_state(verifier).await;
    let app = build_router(state.clone());

    let image = image_with_complete_metadata();
    let response = app
        .oneshot(upload_request(&[
            FormPart::File {
                name: "image",
                file_name: "holiday.tif",
                content_type: Some("image/tiff"),
                data: &image,
            },
            FormPart::Text {
                name: "userId",
                value: "alice",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["userId"], "alice");
    assert_eq!(json["verificationScore"], 100);
    assert_eq!(json["status"], "authentic");
    assert_eq!(json["metadataStatus"], "complete");
    assert_eq!(json["aiDetectionSource"], "hive");
    assert_eq!(json["reverseImageMatchCount"], 1);
    assert_eq!(json["metadata"]["make"], "Canon");
    assert!(json["imageUrl"].as_str().unwrap().ends_with("_holiday.tif"));
    assert!(json.get("errorMessage").map_or(true, Value::is_null));

    let history = wait_for_history(&state, "alice", 1).await;
    assert_eq!(history[0]["id"], json["id"]);
}

#[tokio::test]
async fn test_untyped_image_is_sniffed() {
    let state = test_app_state(unconfigured_verifier()).await;
    let app = build_router(state);

    let image = image_without_metadata();
    let response = app
        .oneshot(upload_request(&[
            FormPart::Text {
                name: "userId",
                value: "bob",
            },
            FormPart::File {
                name: "image",
                file_name: "upload.bin",
                content_type: Some("application/octet-stream"),
                data: &image,
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["verificationScore"], 40);
    assert_eq!(json["status"], "likelyFake");
    assert!(json["errorMessage"]
        .as_str()
        .unwrap()
        .contains("Reverse search: API credentials not configured"));
}

#[tokio::test]
async fn test_missing_image_is_bad_request() {
    let app = build_router(test_app_state(unconfigured_verifier()).await);

    let response = app
        .oneshot(upload_request(&[FormPart::Text {
            name: "userId",
            value: "carol",
        }]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
    assert_eq!(json["error"]["message"], "No image file provided");
}

#[tokio::test]
async fn test_missing_user_is_bad_request() {
    let app = build_router(test_app_state(unconfigured_verifier()).await);

    let image = image_without_metadata();
    let response = app
        .oneshot(upload_request(&[
            FormPart::File {
                name: "image",
                file_name: "a.png",
                content_type: Some("image/png"),
                data: &image,
            },
            FormPart::Text {
                name: "userId",
                value: "   ",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "userId is required");
}

#[tokio::test]
async fn test_non_image_upload_is_rejected() {
    let app = build_router(test_app_state(unconfigured_verifier()).await);

    let response = app
        .oneshot(upload_request(&[
            FormPart::File {
                name: "image",
                file_name: "notes.txt",
                content_type: Some("text/plain"),
                data: b"just some notes",
            },
            FormPart::Text {
                name: "userId",
                value: "dave",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Only image files are allowed");
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let limits = LimitsConfig {
        max_upload_bytes: 1024,
        ..LimitsConfig::default()
    };
    let state = AppState::new(test_pool(true).await, unconfigured_verifier(), limits);
    let app = build_router(state);

    let image = vec![0xFFu8; 4096];
    let response = app
        .oneshot(upload_request(&[
            FormPart::File {
                name: "image",
                file_name: "big.jpg",
                content_type: Some("image/jpeg"),
                data: &image,
            },
            FormPart::Text {
                name: "userId",
                value: "erin",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_store_failure_does_not_fail_request() {
    // No schema: every save fails
    let state = AppState::new(
        test_pool(false).await,
        unconfigured_verifier(),
        LimitsConfig::default(),
    );
    let app = build_router(state.clone());

    let image = image_without_metadata();
    let response = app
        .oneshot(upload_request(&[
            FormPart::File {
                name: "image",
                file_name: "a.png",
                content_type: Some("image/png"),
                data: &image,
            },
            FormPart::Text {
                name: "userId",
                value: "frank",
            },
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    // The failure surfaces only as the diagnostic last_error
    for _ in 0..50 {
        if state.last_error.read().await.is_some() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let last_error = state.last_error.read().await.clone().unwrap();
    assert!(last_error.contains("Failed to save verification result"));

    let health = build_router(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let json = body_json(health).await;
    assert_eq!(json["status"], "degraded");
    assert!(json["last_error"].as_str().unwrap().contains("Failed to save"));
}

#[tokio::test]
async fn test_history_newest_first_with_limit() {
    let state = test_app_state(unconfigured_verifier()).await;
    let verifier = unconfigured_verifier();

    for name in ["first.png", "second.png", "third.png"] {
        let request = VerificationRequest::new(image_without_metadata(), name, "gina").unwrap();
        let result = verifier.verify(&request).await;
        verifications::save_result(&state.db, &result).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let app = build_router(state);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/verificationHistory?userId=gina&limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries[0]["imageUrl"].as_str().unwrap().ends_with("_third.png"));
    assert!(entries[1]["imageUrl"].as_str().unwrap().ends_with("_second.png"));
}

#[tokio::test]
async fn test_history_requires_user() {
    let app = build_router(test_app_state(unconfigured_verifier()).await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/verificationHistory")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "userId is required");
}

#[tokio::test]
async fn test_history_unknown_user_is_empty() {
    let app = build_router(test_app_state(unconfigured_verifier()).await);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/verificationHistory?userId=nobody")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}
