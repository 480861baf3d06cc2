use actix_web::{http::header, web, HttpRequest, HttpResponse};
use chrono::{SecondsFormat, Utc};
use prometheus::{Encoder, TextEncoder};
use zibal::security::constant_time_eq;

use crate::metrics::REGISTRY;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "Zibal Payment Proxy";

/// GET / - Service metadata
pub async fn root() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "service": SERVICE_NAME,
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
        "documentation": "/docs",
        "endpoints": {
            "health": "/health",
            "callback": "/api/zibal/callback",
            "docs": "/docs",
        },
    }))
}

/// GET /health - Liveness only; does not touch config or upstreams.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "healthy" }))
}

/// GET /metrics - Prometheus text exposition, bearer-gated when
/// `METRICS_TOKEN` is set.
pub async fn metrics(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if !scrape_authorized(&req, state.config.metrics_token.as_deref()) {
        tracing::debug!("rejected /metrics scrape without a valid token");
        return HttpResponse::Unauthorized()
            .insert_header((header::WWW_AUTHENTICATE, "Bearer"))
            .json(serde_json::json!({
                "error": "unauthorized",
                "message": "Bearer token required for /metrics",
            }));
    }

    let encoder = TextEncoder::new();
    match encoder.encode_to_string(&REGISTRY.gather()) {
        Ok(body) => HttpResponse::Ok()
            .content_type(encoder.format_type())
            .body(body),
        Err(e) => {
            tracing::error!(error = %e, "metrics encoding failed");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn scrape_authorized(req: &HttpRequest, expected: Option<&str>) -> bool {
    let Some(expected) = expected else {
        return true;
    };
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| constant_time_eq(token.as_bytes(), expected.as_bytes()))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(root))
        .route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics));
}
