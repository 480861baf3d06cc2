use std::time::Duration;

use httpmock::prelude::*;
use serde_json::json;

use zibal::{CallbackParams, Hop, Outcome, PaymentRelay, RelayError, RelaySettings};

const SECRET: &[u8] = b"test-secret";
const WEBHOOK: &str = "/api/v1/payments/zibal-webhook";

fn relay_for(gateway: &MockServer, ticketing_url: &str) -> PaymentRelay {
    let mut settings = RelaySettings::new(ticketing_url, SECRET.to_vec());
    settings.verify_url = gateway.url("/v1/verify");
    settings.timeout = Duration::from_secs(2);
    PaymentRelay::new(reqwest::Client::new(), settings)
}

fn params(track_id: &str) -> CallbackParams {
    CallbackParams {
        track_id: track_id.to_string(),
        success: 1,
        status: 2,
        order_id: Some("order-7".to_string()),
    }
}

#[tokio::test]
async fn test_verified_and_accepted_payment_is_paid() {
    let gateway = MockServer::start_async().await;
    let ticketing = MockServer::start_async().await;

    let verify = gateway
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/verify")
                .header("Content-Type", "application/json")
                .json_body(json!({"merchant": "zibal", "trackId": 998877}));
            then.status(200)
                .json_body(json!({"result": 100, "message": "success", "amount": 150000}));
        })
        .await;
    let forward = ticketing
        .mock_async(|when, then| {
            when.method(POST)
                .path(WEBHOOK)
                .header(
                    "X-Webhook-Signature",
                    "6425b05a58f096d554564c5acd2ccf852902f601ec40989ce9fe000bd48f7743",
                )
                .json_body_partial(
                    r#"{"trackId":"998877","success":1,"status":2,"orderId":"order-7",
                        "verifyResult":{"result":100,"message":"success","amount":150000}}"#,
                );
            then.status(200)
                .json_body(json!({"success": true, "ref_number": "R1", "reservation_id": "RES1"}));
        })
        .await;

    let outcome = relay_for(&gateway, &ticketing.base_url())
        .process(&params("998877"))
        .await
        .unwrap();

    verify.assert_async().await;
    forward.assert_async().await;
    assert_eq!(
        outcome,
        Outcome::Paid {
            ref_number: Some("R1".to_string()),
            reservation_id: Some("RES1".to_string()),
        }
    );
}

#[tokio::test]
async fn test_unverified_payment_is_rejected_with_gateway_message() {
    let gateway = MockServer::start_async().await;
    let ticketing = MockServer::start_async().await;

    gateway
        .mock_async(|when, then| {
            when.method(POST).path("/v1/verify");
            then.status(200)
                .json_body(json!({"result": 102, "message": "merchant not found"}));
        })
        .await;
    // The outcome is still forwarded so the ticketing API can release the hold.
    let forward = ticketing
        .mock_async(|when, then| {
            when.method(POST).path(WEBHOOK);
            then.status(200).json_body(json!({"success": false}));
        })
        .await;

    let outcome = relay_for(&gateway, &ticketing.base_url())
        .process(&params("998877"))
        .await
        .unwrap();

    forward.assert_async().await;
    assert_eq!(
        outcome,
        Outcome::Rejected {
            message: Some("merchant not found".to_string())
        }
    );
}

#[tokio::test]
async fn test_verified_but_ticketing_declines_is_rejected() {
    let gateway = MockServer::start_async().await;
    let ticketing = MockServer::start_async().await;

    gateway
        .mock_async(|when, then| {
            when.method(POST).path("/v1/verify");
            then.status(200).json_body(json!({"result": 100}));
        })
        .await;
    ticketing
        .mock_async(|when, then| {
            when.method(POST).path(WEBHOOK);
            then.status(400).json_body(json!({"success": false, "detail": "unknown trackId"}));
        })
        .await;

    let outcome = relay_for(&gateway, &ticketing.base_url())
        .process(&params("998877"))
        .await
        .unwrap();

    assert_eq!(outcome, Outcome::Rejected { message: None });
}

#[tokio::test]
async fn test_non_numeric_track_id_never_reaches_gateway() {
    let gateway = MockServer::start_async().await;
    let verify = gateway
        .mock_async(|when, then| {
            when.method(POST).path("/v1/verify");
            then.status(200).json_body(json!({"result": 100}));
        })
        .await;

    let err = relay_for(&gateway, "http://localhost:1")
        .process(&params("ABC123"))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::InvalidTrackId { .. }));
    assert_eq!(verify.hits_async().await, 0);
}

#[tokio::test]
async fn test_unreachable_ticketing_api_is_network_error() {
    let gateway = MockServer::start_async().await;
    gateway
        .mock_async(|when, then| {
            when.method(POST).path("/v1/verify");
            then.status(200).json_body(json!({"result": 100}));
        })
        .await;

    let err = relay_for(&gateway, "http://localhost:1")
        .process(&params("998877"))
        .await
        .unwrap_err();

    assert!(err.is_network());
    assert_eq!(err.hop(), Some(Hop::Forward));
}

#[tokio::test]
async fn test_slow_gateway_times_out_as_network_error() {
    let gateway = MockServer::start_async().await;
    gateway
        .mock_async(|when, then| {
            when.method(POST).path("/v1/verify");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(json!({"result": 100}));
        })
        .await;

    let mut settings = RelaySettings::new("http://localhost:1", SECRET.to_vec());
    settings.verify_url = gateway.url("/v1/verify");
    settings.timeout = Duration::from_millis(200);
    let relay = PaymentRelay::new(reqwest::Client::new(), settings);

    let err = relay.process(&params("998877")).await.unwrap_err();
    assert!(err.is_network());
    assert_eq!(err.hop(), Some(Hop::Verify));
}

#[tokio::test]
async fn test_html_from_gateway_is_decode_error() {
    let gateway = MockServer::start_async().await;
    gateway
        .mock_async(|when, then| {
            when.method(POST).path("/v1/verify");
            then.status(502).body("<html>Bad Gateway</html>");
        })
        .await;

    let err = relay_for(&gateway, "http://localhost:1")
        .process(&params("998877"))
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Decode { hop: Hop::Verify, .. }));
}
