use std::sync::Arc;

use zibal::PaymentRelay;

use crate::config::RelayConfig;
use crate::frontend::FrontendRedirects;

/// Shared application state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub relay: PaymentRelay,
    pub frontend: FrontendRedirects,
}

impl AppState {
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        let relay = PaymentRelay::new(http_client, config.relay_settings());
        let frontend = FrontendRedirects::new(&config.frontend_url);

        Ok(Self {
            config: Arc::new(config),
            relay,
            frontend,
        })
    }
}
