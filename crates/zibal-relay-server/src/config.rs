use std::env;
use std::time::Duration;

use url::Url;
use zibal::constants::{DEFAULT_MERCHANT_ID, DEFAULT_PAYMENT_URL, DEFAULT_VERIFY_URL};
use zibal::RelaySettings;

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_RATE_LIMIT_RPM: u32 = 120;
const MAX_RATE_LIMIT_RPM: u32 = 60_000;
const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Clone)]
pub struct RelayConfig {
    /// Zibal merchant id sent with every verify call
    pub merchant_id: String,
    /// Zibal verify endpoint
    pub verify_url: String,
    /// Zibal payment start page; the track id is appended verbatim
    pub payment_url: String,
    /// Base URL of the ticketing API
    pub ticketing_api_url: String,
    /// Base URL of the ticketing frontend the browser is sent back to
    pub frontend_url: String,
    /// Shared secret for `X-Webhook-Signature`
    pub webhook_secret: Vec<u8>,
    /// Verbose logging
    pub debug: bool,
    pub port: u16,
    /// Timeout for each outbound call
    pub upstream_timeout: Duration,
    /// CORS allowed origins (`*` = any)
    pub allowed_origins: Vec<String>,
    /// Rate limit requests per minute per IP
    pub rate_limit_rpm: u32,
    /// Bearer token required for /metrics (None = public)
    pub metrics_token: Option<String>,
}

impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("merchant_id", &self.merchant_id)
            .field("verify_url", &self.verify_url)
            .field("payment_url", &self.payment_url)
            .field("ticketing_api_url", &self.ticketing_api_url)
            .field("frontend_url", &self.frontend_url)
            .field("webhook_secret", &"[REDACTED]")
            .field("debug", &self.debug)
            .field("port", &self.port)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("allowed_origins", &self.allowed_origins)
            .field("rate_limit_rpm", &self.rate_limit_rpm)
            .field(
                "metrics_token",
                &self.metrics_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key/value source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let merchant_id = get("ZIBAL_MERCHANT_ID").unwrap_or_else(|| DEFAULT_MERCHANT_ID.to_string());

        let verify_url = get("ZIBAL_VERIFY_URL").unwrap_or_else(|| DEFAULT_VERIFY_URL.to_string());
        validate_url(&verify_url)?;

        let payment_url =
            get("ZIBAL_PAYMENT_URL").unwrap_or_else(|| DEFAULT_PAYMENT_URL.to_string());
        validate_url(&payment_url)?;

        // Required: ticketing API and frontend
        let ticketing_api_url = get("TICKETING_API_URL")
            .ok_or(ConfigError::MissingRequired("TICKETING_API_URL"))?;
        validate_url(&ticketing_api_url)?;

        let frontend_url = get("TICKETING_FRONTEND_URL")
            .ok_or(ConfigError::MissingRequired("TICKETING_FRONTEND_URL"))?;
        validate_url(&frontend_url)?;

        // Required: webhook secret
        let webhook_secret = get("WEBHOOK_SECRET")
            .ok_or(ConfigError::MissingRequired("WEBHOOK_SECRET"))?
            .into_bytes();
        if webhook_secret.len() < 32 {
            tracing::warn!(
                "WEBHOOK_SECRET is only {} bytes (minimum 32 recommended) - \
                 use `openssl rand -hex 32` to generate a secure secret",
                webhook_secret.len()
            );
        }

        let debug = get("DEBUG").map(|v| parse_flag(&v)).unwrap_or(false);

        let port = parse_number(get("PORT"), "PORT", DEFAULT_PORT)?;

        let timeout_secs = parse_number(
            get("UPSTREAM_TIMEOUT_SECS"),
            "UPSTREAM_TIMEOUT_SECS",
            DEFAULT_TIMEOUT_SECS,
        )?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidNumber(
                "UPSTREAM_TIMEOUT_SECS",
                "0".to_string(),
            ));
        }

        let allowed_origins: Vec<String> = get("ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let rate_limit_rpm = parse_number(
            get("RATE_LIMIT_RPM"),
            "RATE_LIMIT_RPM",
            DEFAULT_RATE_LIMIT_RPM,
        )?;
        // The limiter refills one slot every 60_000 / rpm milliseconds.
        if !(1..=MAX_RATE_LIMIT_RPM).contains(&rate_limit_rpm) {
            return Err(ConfigError::InvalidNumber(
                "RATE_LIMIT_RPM",
                rate_limit_rpm.to_string(),
            ));
        }

        let metrics_token = get("METRICS_TOKEN");
        if metrics_token.is_none() {
            tracing::warn!("METRICS_TOKEN not set - /metrics endpoint is publicly accessible");
        }

        Ok(Self {
            merchant_id,
            verify_url,
            payment_url,
            ticketing_api_url,
            frontend_url,
            webhook_secret,
            debug,
            port,
            upstream_timeout: Duration::from_secs(timeout_secs),
            allowed_origins,
            rate_limit_rpm,
            metrics_token,
        })
    }

    /// The subset the relay core needs.
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            merchant_id: self.merchant_id.clone(),
            verify_url: self.verify_url.clone(),
            ticketing_api_url: self.ticketing_api_url.clone(),
            webhook_secret: self.webhook_secret.clone(),
            timeout: self.upstream_timeout,
        }
    }
}

/// `true`, `1` and `yes` (any case) are on; anything else is off.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    )
}

fn validate_url(value: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidUrl(value.to_string()))
}

fn parse_number<T: std::str::FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber(key, v)),
        None => Ok(default),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingRequired(&'static str),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("invalid number for {0}: {1}")]
    InvalidNumber(&'static str, String),
}
