use std::fmt;
use std::time::Duration;

use chrono::Utc;

use crate::callback::{CallbackParams, WebhookPayload};
use crate::client::{call_verify, call_webhook};
use crate::constants::{
    DEFAULT_MERCHANT_ID, DEFAULT_UPSTREAM_TIMEOUT, DEFAULT_VERIFY_URL, WEBHOOK_PATH,
};
use crate::error::RelayError;
use crate::hmac;

/// Everything the relay needs to reach its two upstreams.
#[derive(Clone)]
pub struct RelaySettings {
    pub merchant_id: String,
    pub verify_url: String,
    /// Base URL of the ticketing API; [`WEBHOOK_PATH`] is appended.
    pub ticketing_api_url: String,
    pub webhook_secret: Vec<u8>,
    pub timeout: Duration,
}

impl RelaySettings {
    /// Settings pointing at Zibal's production endpoints with the sandbox merchant.
    pub fn new(ticketing_api_url: impl Into<String>, webhook_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            merchant_id: DEFAULT_MERCHANT_ID.to_string(),
            verify_url: DEFAULT_VERIFY_URL.to_string(),
            ticketing_api_url: ticketing_api_url.into(),
            webhook_secret: webhook_secret.into(),
            timeout: DEFAULT_UPSTREAM_TIMEOUT,
        }
    }

    pub fn webhook_url(&self) -> String {
        format!(
            "{}{}",
            self.ticketing_api_url.trim_end_matches('/'),
            WEBHOOK_PATH
        )
    }
}

impl fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySettings")
            .field("merchant_id", &self.merchant_id)
            .field("verify_url", &self.verify_url)
            .field("ticketing_api_url", &self.ticketing_api_url)
            .field("webhook_secret", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// How a callback ended, when both upstreams answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Zibal verified the payment and the ticketing API accepted it.
    Paid {
        ref_number: Option<String>,
        reservation_id: Option<String>,
    },
    /// Either side declined. `message` is Zibal's explanation, if it gave one.
    Rejected { message: Option<String> },
}

/// Runs one gateway callback: verify, sign, forward, decide.
///
/// Holds no per-request state; one instance is shared by every worker.
#[derive(Debug, Clone)]
pub struct PaymentRelay {
    http: reqwest::Client,
    settings: RelaySettings,
}

impl PaymentRelay {
    pub fn new(http: reqwest::Client, settings: RelaySettings) -> Self {
        Self { http, settings }
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Signature the ticketing API will recompute for this callback.
    pub fn signature_for(&self, params: &CallbackParams) -> String {
        hmac::sign(
            &self.settings.webhook_secret,
            &params.track_id,
            params.success,
            params.status,
        )
    }

    /// Relay one callback. Each step runs once; the first error ends the flow.
    ///
    /// A verified payment the ticketing API then fails to record is reported
    /// as an error or a rejection even though Zibal may already hold the funds.
    pub async fn process(&self, params: &CallbackParams) -> Result<Outcome, RelayError> {
        let track_id = params.numeric_track_id()?;

        let verify_result = call_verify(
            &self.http,
            &self.settings.verify_url,
            &self.settings.merchant_id,
            track_id,
            self.settings.timeout,
        )
        .await?;
        tracing::info!(
            track_id = %params.track_id,
            result = ?verify_result.result,
            message = verify_result.message.as_deref().unwrap_or(""),
            body = %serde_json::Value::Object(verify_result.raw().clone()),
            "zibal verify response"
        );

        let payload = WebhookPayload::new(params, &verify_result, Utc::now());
        let signature = self.signature_for(params);

        let forward_result = call_webhook(
            &self.http,
            &self.settings.webhook_url(),
            &payload,
            &signature,
            self.settings.timeout,
        )
        .await?;
        tracing::info!(
            track_id = %params.track_id,
            success = forward_result.success,
            body = %serde_json::Value::Object(forward_result.raw().clone()),
            "ticketing API response"
        );

        if verify_result.is_verified() && forward_result.success {
            Ok(Outcome::Paid {
                ref_number: forward_result.ref_number,
                reservation_id: forward_result.reservation_id,
            })
        } else {
            Ok(Outcome::Rejected {
                message: verify_result.message,
            })
        }
    }
}
