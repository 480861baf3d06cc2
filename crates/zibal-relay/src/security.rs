//! Constant-time comparison for bearer tokens and other secrets.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Compare two byte strings without leaking their content or length.
///
/// Both inputs are hashed to fixed-length SHA-256 digests first, then
/// compared with `subtle::ConstantTimeEq`.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    let ha = Sha256::digest(a);
    let hb = Sha256::digest(b);
    ha.ct_eq(&hb).into()
}
