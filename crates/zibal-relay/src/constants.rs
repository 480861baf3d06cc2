use std::time::Duration;

/// Zibal `result` code for a payment that is fully verified.
pub const VERIFIED_RESULT_CODE: i64 = 100;

/// Merchant id Zibal accepts for its sandbox.
pub const DEFAULT_MERCHANT_ID: &str = "zibal";

/// Zibal's server-to-server verification endpoint.
pub const DEFAULT_VERIFY_URL: &str = "https://gateway.zibal.ir/v1/verify";

/// Zibal's payment start page. The track id is appended verbatim.
pub const DEFAULT_PAYMENT_URL: &str = "https://gateway.zibal.ir/start/";

/// Path of the ticketing API's webhook, relative to its base URL.
pub const WEBHOOK_PATH: &str = "/api/v1/payments/zibal-webhook";

/// Header carrying the hex HMAC of the forwarded outcome.
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// Timeout applied to each outbound call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(15);
