//! The two outbound calls made per callback.
//!
//! Both POST a JSON body with a per-request timeout and read the whole
//! response before parsing it. The HTTP status is logged but not acted on:
//! the body decides the outcome.

use std::time::Duration;

use crate::callback::{VerifyRequest, WebhookPayload};
use crate::constants::SIGNATURE_HEADER;
use crate::error::{Hop, RelayError};
use crate::response::{ForwardResult, VerifyResult};

async fn post_json(
    client: &reqwest::Client,
    hop: Hop,
    url: &str,
    body: Vec<u8>,
    signature: Option<&str>,
    timeout: Duration,
) -> Result<Vec<u8>, RelayError> {
    let mut request = client
        .post(url)
        .header("Content-Type", "application/json")
        .header("Accept", "application/json")
        .timeout(timeout);

    if let Some(sig) = signature {
        request = request.header(SIGNATURE_HEADER, sig);
    }

    let started = std::time::Instant::now();
    let response = request
        .body(body)
        .send()
        .await
        .map_err(|source| RelayError::Network { hop, source })?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|source| RelayError::Network { hop, source })?;

    tracing::debug!(
        hop = hop.as_str(),
        status = %status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        bytes = bytes.len(),
        "upstream responded"
    );
    if !status.is_success() {
        tracing::warn!(hop = hop.as_str(), status = %status, "upstream returned non-success status");
    }

    Ok(bytes.to_vec())
}

/// Ask Zibal whether `track_id` was genuinely paid.
pub async fn call_verify(
    client: &reqwest::Client,
    verify_url: &str,
    merchant: &str,
    track_id: i64,
    timeout: Duration,
) -> Result<VerifyResult, RelayError> {
    let request = VerifyRequest { merchant, track_id };
    let body = serde_json::to_vec(&request).map_err(|source| RelayError::Encode {
        hop: Hop::Verify,
        source,
    })?;
    tracing::info!(track_id, merchant, url = %verify_url, "sending verify request");

    let bytes = post_json(client, Hop::Verify, verify_url, body, None, timeout).await?;
    VerifyResult::from_body(&bytes)
}

/// Deliver a signed outcome to the ticketing API's webhook.
pub async fn call_webhook(
    client: &reqwest::Client,
    webhook_url: &str,
    payload: &WebhookPayload<'_>,
    signature: &str,
    timeout: Duration,
) -> Result<ForwardResult, RelayError> {
    let body = serde_json::to_vec(payload).map_err(|source| RelayError::Encode {
        hop: Hop::Forward,
        source,
    })?;
    tracing::info!(track_id = payload.track_id, url = %webhook_url, "forwarding to ticketing API");

    let bytes = post_json(
        client,
        Hop::Forward,
        webhook_url,
        body,
        Some(signature),
        timeout,
    )
    .await?;
    ForwardResult::from_body(&bytes)
}
