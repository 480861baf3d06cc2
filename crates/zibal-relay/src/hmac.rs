//! Webhook signatures.
//!
//! The ticketing API authenticates forwarded outcomes by recomputing
//! HMAC-SHA256 over `"{trackId}:{success}:{status}"` with the shared secret
//! and comparing it to the `X-Webhook-Signature` header. The signed material
//! carries no nonce or timestamp, so a signature is stable for a given
//! outcome and does not protect against replay.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Compute HMAC-SHA256 over `message` and return it as lowercase hex.
pub fn compute_hmac(secret: &[u8], message: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// The exact bytes that get signed for an outcome.
pub fn signing_message(track_id: &str, success: i64, status: i64) -> String {
    format!("{track_id}:{success}:{status}")
}

/// Sign a callback outcome for the ticketing webhook.
pub fn sign(secret: &[u8], track_id: &str, success: i64, status: i64) -> String {
    compute_hmac(secret, signing_message(track_id, success, status).as_bytes())
}

/// Check a received `X-Webhook-Signature` against the outcome it claims to sign.
///
/// Comparison is constant-time. A malformed hex string is compared against
/// zeros rather than rejected early.
pub fn verify_signature(
    secret: &[u8],
    track_id: &str,
    success: i64,
    status: i64,
    signature: &str,
) -> bool {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
    mac.update(signing_message(track_id, success, status).as_bytes());

    let expected = hex::decode(signature).unwrap_or_else(|_| vec![0u8; 32]);
    mac.verify_slice(&expected).is_ok()
}
