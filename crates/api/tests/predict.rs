// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for the prediction endpoint

mod fixtures;

use axum::http::StatusCode;
use fixtures::start_server;
use prediction_store::RecordStatus;
use serde_json::{Value, json};

const INVALID_TEXT: &str = "Invalid input, \"text\" key is required.";

fn assert_four_decimals(value: f64) {
    assert!(
        ((value * 10_000.0).round() / 10_000.0 - value).abs() < 1e-12,
        "{value} has more than 4 decimals"
    );
}

#[tokio::test]
async fn predict_spam() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/predict"))
        .json(&json!({ "text": "WIN A FREE PRIZE NOW!!! Claim your cash" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse body");
    assert_eq!(body["isSpam"], true);

    let confidence = body["confidence"].as_f64().unwrap();
    assert!(confidence > 0.5 && confidence <= 1.0);
    assert_four_decimals(confidence);

    let processing_time = body["processingTime"].as_f64().unwrap();
    assert!(processing_time >= 0.0);
    assert_four_decimals(processing_time);
}

#[tokio::test]
async fn predict_ham_is_persisted() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/predict"))
        .json(&json!({ "text": "Can we meet for lunch tomorrow?" }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["isSpam"], false);

    let records = server.store.recent(10).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, RecordStatus::Success);
    assert_eq!(records[0].input_text, "Can we meet for lunch tomorrow?");
    assert!(records[0].error.is_none());
}

#[tokio::test]
async fn empty_text_falls_back_to_priors() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/predict"))
        .json(&json!({ "text": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["isSpam"], false);
    assert_eq!(body["confidence"].as_f64(), Some(0.6));
}

#[tokio::test]
async fn missing_text_is_rejected() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    for payload in [json!({}), json!({ "text": 123 }), json!({ "message": "hi" })] {
        let response = client
            .post(server.url("/predict"))
            .json(&payload)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{payload}");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], INVALID_TEXT);
    }

    // Rejected requests never reach the prediction log
    assert!(server.store.recent(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/predict"))
        .header("content-type", "application/json")
        .body("{\"text\": ")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn store_outage_does_not_change_response() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    server.store.close().await;

    let response = client
        .post(server.url("/predict"))
        .json(&json!({ "text": "free prize" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["isSpam"], true);
}

#[tokio::test]
async fn response_carries_request_id() {
    let server = start_server().await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/predict"))
        .json(&json!({ "text": "call me at home" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}
