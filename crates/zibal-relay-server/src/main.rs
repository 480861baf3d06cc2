use actix_governor::{Governor, GovernorConfigBuilder};
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use zibal_relay_server::{
    config::parse_flag, cors::build_cors, metrics::register_metrics, AppState, RelayConfig,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // DEBUG only changes the default filter; RUST_LOG still wins.
    let debug = std::env::var("DEBUG")
        .map(|v| parse_flag(&v))
        .unwrap_or(false);
    let default_filter = if debug {
        "debug,actix_web=debug"
    } else {
        "info,actix_web=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match RelayConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    tracing::debug!(?config, "configuration loaded");

    let port = config.port;
    let allowed_origins = config.allowed_origins.clone();
    let rate_limit_rpm = config.rate_limit_rpm;

    tracing::info!("Starting zibal-relay on port {}", port);
    tracing::info!("Debug mode: {}", config.debug);
    tracing::info!("Zibal verify URL: {}", config.verify_url);
    tracing::info!("Ticketing API: {}", config.ticketing_api_url);
    tracing::info!("Ticketing frontend: {}", config.frontend_url);
    tracing::info!("Rate limit: {rate_limit_rpm} req/min per IP (callback exempt)");
    if allowed_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS allows any origin - set ALLOWED_ORIGINS to restrict it");
    }

    register_metrics();

    let state = AppState::new(config).expect("failed to create HTTP client");
    let state_data = web::Data::new(state);

    let governor_conf = GovernorConfigBuilder::default()
        .requests_per_minute(rate_limit_rpm as u64)
        .finish()
        .expect("RATE_LIMIT_RPM is validated by RelayConfig");

    HttpServer::new(move || {
        App::new()
            .app_data(state_data.clone())
            .wrap(Logger::default())
            .wrap(build_cors(&allowed_origins))
            .configure(zibal_relay_server::configure_callback)
            .service(
                web::scope("")
                    .wrap(Governor::new(&governor_conf))
                    .configure(zibal_relay_server::configure_rate_limited),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
