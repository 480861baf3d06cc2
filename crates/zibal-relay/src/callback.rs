use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RelayError;
use crate::response::VerifyResult;

/// Query parameters Zibal appends when it sends the browser back to us.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackParams {
    /// Zibal transaction token. Kept as received; parsed only for the verify call.
    pub track_id: String,
    /// 1 if Zibal considers the payment successful, 0 otherwise.
    pub success: i64,
    /// Zibal status code for the transaction.
    pub status: i64,
    #[serde(default)]
    pub order_id: Option<String>,
}

impl CallbackParams {
    /// The track id as the integer Zibal's verify endpoint expects.
    ///
    /// Zibal issues track ids as signed 64-bit integers; anything outside
    /// that range is rejected rather than sent upstream.
    pub fn numeric_track_id(&self) -> Result<i64, RelayError> {
        self.track_id
            .trim()
            .parse()
            .map_err(|source| RelayError::InvalidTrackId {
                track_id: self.track_id.clone(),
                source,
            })
    }
}

/// JSON body POSTed to Zibal's verify endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest<'a> {
    pub merchant: &'a str,
    pub track_id: i64,
}

/// JSON body forwarded to the ticketing API's webhook.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload<'a> {
    pub track_id: &'a str,
    pub success: i64,
    pub status: i64,
    pub order_id: Option<&'a str>,
    pub verify_result: &'a VerifyResult,
    pub timestamp: String,
}

impl<'a> WebhookPayload<'a> {
    pub fn new(
        params: &'a CallbackParams,
        verify_result: &'a VerifyResult,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            track_id: &params.track_id,
            success: params.success,
            status: params.status,
            order_id: params.order_id.as_deref(),
            verify_result,
            timestamp: generated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}
