//! Zibal payment callback relay.
//!
//! Confirms a gateway callback with Zibal's verify endpoint, signs the
//! outcome with a shared secret, and forwards it to the ticketing API's
//! webhook. The HTTP surface that receives callbacks and redirects the
//! browser lives in `zibal-relay-server`; this crate holds everything that
//! talks to the two upstreams.
//!
//! # Modules
//!
//! - [`callback`] - inbound callback parameters and the forwarded webhook payload
//! - [`response`] - partially-typed views over the upstream response bodies
//! - [`client`] - the two outbound calls (gateway verify, ticketing webhook)
//! - [`relay`] - [`PaymentRelay`], which runs one callback end to end
//! - [`hmac`] - webhook signature generation and checking

pub mod callback;
pub mod client;
pub mod constants;
pub mod error;
pub mod hmac;
pub mod relay;
pub mod response;
pub mod security;

pub use callback::{CallbackParams, WebhookPayload};
pub use error::{Hop, RelayError};
pub use relay::{Outcome, PaymentRelay, RelaySettings};
pub use response::{ForwardResult, VerifyResult};
