//! Views over the two upstream response bodies.
//!
//! Neither Zibal nor the ticketing API publishes a schema we can rely on, so
//! each body is kept as a raw JSON object and only the keys the relay acts on
//! are lifted into typed fields. Missing or oddly-typed keys fall back to
//! `None`/`false` instead of failing the request.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::constants::VERIFIED_RESULT_CODE;
use crate::error::{Hop, RelayError};

/// Parse an upstream body, requiring a top-level JSON object.
pub fn parse_object(hop: Hop, body: &[u8]) -> Result<Map<String, Value>, RelayError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| RelayError::Decode {
        hop,
        reason: format!("invalid JSON: {e}"),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(RelayError::Decode {
            hop,
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Render a scalar the way it should appear in a redirect query string.
/// `null` counts as absent.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Loose truthiness: `false`, `null`, `0`, `""`, `[]` and `{}` are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// 2^53: integers up to here are exact in an f64.
const MAX_EXACT_F64_INT: f64 = 9_007_199_254_740_992.0;

/// Integer result code. `100.0` counts as `100`; `100.5` and `"100"` do not.
fn result_code(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_EXACT_F64_INT)
            .map(|f| f as i64)
    })
}

/// Body of Zibal's verify response.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifyResult {
    /// Zibal result code; `100` means fully verified.
    pub result: Option<i64>,
    /// Human-readable explanation, usually in Persian.
    pub message: Option<String>,
    raw: Map<String, Value>,
}

impl VerifyResult {
    pub fn from_object(raw: Map<String, Value>) -> Self {
        let result = raw.get("result").and_then(result_code);
        let message = raw.get("message").and_then(scalar_text);
        Self {
            result,
            message,
            raw,
        }
    }

    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        parse_object(Hop::Verify, body).map(Self::from_object)
    }

    pub fn is_verified(&self) -> bool {
        self.result == Some(VERIFIED_RESULT_CODE)
    }

    /// The complete body as received.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

/// Serializes as the untouched gateway body, so the ticketing API sees every
/// field Zibal returned (amount, cardNumber, refNumber, ...).
impl Serialize for VerifyResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Body of the ticketing API's webhook response.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardResult {
    pub success: bool,
    pub ref_number: Option<String>,
    pub reservation_id: Option<String>,
    raw: Map<String, Value>,
}

impl ForwardResult {
    pub fn from_object(raw: Map<String, Value>) -> Self {
        Self {
            success: raw.get("success").is_some_and(is_truthy),
            ref_number: raw.get("ref_number").and_then(scalar_text),
            reservation_id: raw.get("reservation_id").and_then(scalar_text),
            raw,
        }
    }

    pub fn from_body(body: &[u8]) -> Result<Self, RelayError> {
        parse_object(Hop::Forward, body).map(Self::from_object)
    }

    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_verify_result_reads_known_keys() {
        let v = VerifyResult::from_body(
            br#"{"result":100,"message":"success","amount":150000,"refNumber":42}"#,
        )
        .unwrap();
        assert_eq!(v.result, Some(100));
        assert_eq!(v.message.as_deref(), Some("success"));
        assert!(v.is_verified());
        assert_eq!(v.raw()["amount"], 150000);
    }

    #[test]
    fn test_verify_result_tolerates_missing_keys() {
        let v = VerifyResult::from_body(b"{}").unwrap();
        assert_eq!(v.result, None);
        assert_eq!(v.message, None);
        assert!(!v.is_verified());
    }

    #[test]
    fn test_verify_result_other_codes_are_not_verified() {
        for code in [102, 201, 202, -1] {
            let v = VerifyResult::from_object(
                json!({ "result": code }).as_object().unwrap().clone(),
            );
            assert!(!v.is_verified(), "code {code} must not count as verified");
        }
    }

    #[test]
    fn test_verify_result_string_result_is_not_verified() {
        let v = VerifyResult::from_body(br#"{"result":"100"}"#).unwrap();
        assert_eq!(v.result, None);
        assert!(!v.is_verified());
    }

    #[test]
    fn test_verify_result_integral_float_result_is_verified() {
        let v = VerifyResult::from_body(br#"{"result": 100.0}"#).unwrap();
        assert_eq!(v.result, Some(100));
        assert!(v.is_verified());

        let v = VerifyResult::from_body(br#"{"result": 100.5}"#).unwrap();
        assert_eq!(v.result, None);
        assert!(!v.is_verified());

        let v = VerifyResult::from_body(br#"{"result": 1e300}"#).unwrap();
        assert_eq!(v.result, None);
    }

    #[test]
    fn test_verify_result_serializes_raw_body() {
        let body = json!({"result": 102, "message": "merchant not found", "extra": [1, 2]});
        let v = VerifyResult::from_object(body.as_object().unwrap().clone());
        assert_eq!(serde_json::to_value(&v).unwrap(), body);
    }

    #[test]
    fn test_non_object_body_is_decode_error() {
        let err = VerifyResult::from_body(b"[1,2,3]").unwrap_err();
        assert!(matches!(
            err,
            RelayError::Decode {
                hop: Hop::Verify,
                ..
            }
        ));
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_invalid_json_is_decode_error() {
        let err = ForwardResult::from_body(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(
            err,
            RelayError::Decode {
                hop: Hop::Forward,
                ..
            }
        ));
    }

    #[test]
    fn test_forward_result_reads_known_keys() {
        let f = ForwardResult::from_body(
            br#"{"success":true,"ref_number":"R1","reservation_id":"RES1"}"#,
        )
        .unwrap();
        assert!(f.success);
        assert_eq!(f.ref_number.as_deref(), Some("R1"));
        assert_eq!(f.reservation_id.as_deref(), Some("RES1"));
    }

    #[test]
    fn test_forward_result_numeric_ids_are_stringified() {
        let f = ForwardResult::from_body(br#"{"success":1,"ref_number":884,"reservation_id":null}"#)
            .unwrap();
        assert!(f.success);
        assert_eq!(f.ref_number.as_deref(), Some("884"));
        assert_eq!(f.reservation_id, None);
    }

    #[test]
    fn test_forward_result_missing_success_is_false() {
        let f = ForwardResult::from_body(br#"{"detail":"Invalid signature"}"#).unwrap();
        assert!(!f.success);
        assert_eq!(f.raw()["detail"], "Invalid signature");
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!([])));
        assert!(!is_truthy(&json!({})));
        assert!(is_truthy(&json!(true)));
        assert!(is_truthy(&json!(2)));
        assert!(is_truthy(&json!("false")));
        assert!(is_truthy(&json!({"a": 1})));
    }
}
