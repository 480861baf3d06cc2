use std::fmt;

use thiserror::Error;

/// The outbound call an error happened on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    /// POST to Zibal's verify endpoint.
    Verify,
    /// POST to the ticketing API's webhook.
    Forward,
}

impl Hop {
    /// Stable label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Hop::Verify => "verify",
            Hop::Forward => "forward",
        }
    }
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hop::Verify => write!(f, "gateway verify"),
            Hop::Forward => write!(f, "ticketing webhook"),
        }
    }
}

/// Errors raised while relaying one callback.
///
/// A payment the gateway or the ticketing API declines is not an error; it
/// comes back as [`crate::Outcome::Rejected`].
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("trackId {track_id:?} is not an integer: {source}")]
    InvalidTrackId {
        track_id: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("{hop} request failed: {source}")]
    Network {
        hop: Hop,
        #[source]
        source: reqwest::Error,
    },

    #[error("{hop} returned an unusable body: {reason}")]
    Decode { hop: Hop, reason: String },

    #[error("failed to encode {hop} request: {source}")]
    Encode {
        hop: Hop,
        #[source]
        source: serde_json::Error,
    },
}

impl RelayError {
    /// True for transport-level failures: connect, DNS, timeout, body read.
    pub fn is_network(&self) -> bool {
        matches!(self, RelayError::Network { .. })
    }

    /// The hop the error happened on, if it got that far.
    pub fn hop(&self) -> Option<Hop> {
        match self {
            RelayError::InvalidTrackId { .. } => None,
            RelayError::Network { hop, .. }
            | RelayError::Decode { hop, .. }
            | RelayError::Encode { hop, .. } => Some(*hop),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_track_id_is_not_network() {
        let err = RelayError::InvalidTrackId {
            track_id: "abc".to_string(),
            source: "abc".parse::<i64>().unwrap_err(),
        };
        assert!(!err.is_network());
        assert_eq!(err.hop(), None);
        assert!(err.to_string().contains("\"abc\""));
    }

    #[test]
    fn decode_error_names_the_hop() {
        let err = RelayError::Decode {
            hop: Hop::Forward,
            reason: "expected a JSON object".to_string(),
        };
        assert_eq!(err.hop(), Some(Hop::Forward));
        assert_eq!(
            err.to_string(),
            "ticketing webhook returned an unusable body: expected a JSON object"
        );
    }
}
