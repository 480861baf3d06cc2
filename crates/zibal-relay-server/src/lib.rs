pub mod config;
pub mod cors;
pub mod frontend;
pub mod metrics;
pub mod routes;
pub mod state;

pub use config::RelayConfig;
pub use state::AppState;

use actix_web::web;

/// Mount every route with no limiter in front. `main` mounts the two
/// halves separately.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.configure(configure_callback)
        .configure(configure_rate_limited);
}

/// The gateway callback. Not rate limited; it always answers with a 303.
pub fn configure_callback(cfg: &mut web::ServiceConfig) {
    cfg.configure(routes::callback::configure);
}

/// Everything `main` puts behind the per-IP limiter.
pub fn configure_rate_limited(cfg: &mut web::ServiceConfig) {
    cfg.configure(routes::health::configure)
        .configure(routes::docs::configure)
        .configure(routes::redirect::configure);
}
