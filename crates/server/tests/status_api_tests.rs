//! Integration tests for the card status endpoint.

mod common;

use axum::http::StatusCode;
use common::server::{NOW, TestServer, json_request};
use serde_json::json;
use veto_core::{BlockedCard, BlockedMerchant, MS_PER_DAY};

async fn seed_merchant(server: &TestServer, merchant: BlockedMerchant) {
    let mut card = BlockedCard {
        card_id: "C1".to_string(),
        time_stamp: 1,
        blocked_merchants: Default::default(),
    };
    card.blocked_merchants.insert("M1".to_string(), merchant);
    server.store.seed_blocked_card(card).await;
}

#[tokio::test]
async fn missing_merchant_identifier_is_rejected() {
    let server = TestServer::new();

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/v1/cards/status",
        Some(json!({ "cardId": "C1" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn empty_merchant_identifier_is_rejected() {
    let server = TestServer::new();

    let (status, _) = json_request(
        &server.router,
        "POST",
        "/v1/cards/status",
        Some(json!({ "cardId": "C1", "merchantIdentifier": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_card_answers_the_zero_value() {
    let server = TestServer::new();

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/v1/cards/status",
        Some(json!({ "cardId": "C1", "merchantIdentifier": "M1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "blockType": "", "blocked": false, "hasRetries": false })
    );
}

#[tokio::test]
async fn permanent_block_is_reported() {
    let server = TestServer::new();
    seed_merchant(
        &server,
        BlockedMerchant {
            block_type: "PERMANENT".to_string(),
            expiration_date: NOW - 10_000,
            last_retry: NOW - 1000,
        },
    )
    .await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/v1/cards/status",
        Some(json!({ "cardId": "C1", "merchantIdentifier": "M1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "blockType": "PERMANENT", "blocked": true, "hasRetries": false })
    );
}

#[tokio::test]
async fn active_temporary_block_is_reported() {
    let server = TestServer::new();
    seed_merchant(
        &server,
        BlockedMerchant {
            block_type: "TEMPORARY".to_string(),
            expiration_date: NOW + 60_000,
            last_retry: 0,
        },
    )
    .await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/v1/cards/status",
        Some(json!({ "cardId": "C1", "merchantIdentifier": "M1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocked"], true);
    assert_eq!(body["blockType"], "TEMPORARY");
    assert_eq!(body["hasRetries"], false);
}

#[tokio::test]
async fn expired_block_with_recent_retry_admits_but_accumulates() {
    let server = TestServer::new();
    seed_merchant(
        &server,
        BlockedMerchant {
            block_type: "TEMPORARY".to_string(),
            expiration_date: NOW - 1000,
            last_retry: NOW - 1_000_000,
        },
    )
    .await;

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/v1/cards/status",
        Some(json!({ "cardId": "C1", "merchantIdentifier": "M1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "blockType": "", "blocked": false, "hasRetries": true })
    );
}

#[tokio::test]
async fn block_expires_as_the_clock_moves() {
    let server = TestServer::new();
    seed_merchant(
        &server,
        BlockedMerchant {
            block_type: "TEMPORARY".to_string(),
            expiration_date: NOW + MS_PER_DAY,
            last_retry: NOW,
        },
    )
    .await;

    let request = json!({ "cardId": "C1", "merchantIdentifier": "M1" });
    let (_, body) =
        json_request(&server.router, "POST", "/v1/cards/status", Some(request.clone())).await;
    assert_eq!(body["blocked"], true);

    server.clock.advance(MS_PER_DAY + 1);
    let (_, body) = json_request(&server.router, "POST", "/v1/cards/status", Some(request)).await;
    assert_eq!(body["blocked"], false);
    assert_eq!(body["hasRetries"], false);
}

#[tokio::test]
async fn empty_card_id_answers_the_zero_value() {
    let server = TestServer::new();

    let (status, body) = json_request(
        &server.router,
        "POST",
        "/v1/cards/status",
        Some(json!({ "cardId": "", "merchantIdentifier": "M1" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blocked"], false);
}

#[tokio::test]
async fn health_endpoint_reports_backend() {
    let server = TestServer::new();

    let (status, body) = json_request(&server.router, "GET", "/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}
