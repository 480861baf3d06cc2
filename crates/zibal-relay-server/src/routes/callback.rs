use std::time::Instant;

use actix_web::{error::InternalError, web, HttpResponse};
use zibal::{CallbackParams, Outcome, RelayError};

use crate::frontend::{see_other, CONNECTION_ERROR, SYSTEM_ERROR};
use crate::metrics::{CALLBACKS_TOTAL, CALLBACK_LATENCY, UPSTREAM_ERRORS};
use crate::state::AppState;

/// GET /api/zibal/callback - Zibal sends the browser here after payment.
///
/// Always answers with a 303 to the frontend. Upstream failures become a
/// failure page; they never surface as a 5xx.
pub async fn zibal_callback(
    state: web::Data<AppState>,
    query: web::Query<CallbackParams>,
) -> HttpResponse {
    let params = query.into_inner();
    tracing::info!(
        track_id = %params.track_id,
        success = params.success,
        status = params.status,
        order_id = params.order_id.as_deref().unwrap_or("-"),
        "zibal callback received"
    );

    let started = Instant::now();
    let result = state.relay.process(&params).await;

    let (outcome, location) = match result {
        Ok(Outcome::Paid {
            ref_number,
            reservation_id,
        }) => {
            tracing::info!(
                track_id = %params.track_id,
                ref_number = ref_number.as_deref().unwrap_or("-"),
                reservation_id = reservation_id.as_deref().unwrap_or("-"),
                "payment successful"
            );
            (
                "success",
                state
                    .frontend
                    .success(ref_number.as_deref(), reservation_id.as_deref()),
            )
        }
        Ok(Outcome::Rejected { message }) => {
            tracing::info!(
                track_id = %params.track_id,
                message = message.as_deref().unwrap_or("-"),
                "payment failed"
            );
            (
                "rejected",
                state.frontend.rejected(message.as_deref(), &params.track_id),
            )
        }
        Err(e @ RelayError::Network { .. }) => {
            tracing::error!(track_id = %params.track_id, error = %e, "network error while relaying callback");
            record_upstream_error(&e, "network");
            ("connection_error", state.frontend.failed(CONNECTION_ERROR))
        }
        Err(
            e @ (RelayError::InvalidTrackId { .. }
            | RelayError::Decode { .. }
            | RelayError::Encode { .. }),
        ) => {
            tracing::error!(
                track_id = %params.track_id,
                error = %e,
                detail = ?e,
                "unexpected error while relaying callback"
            );
            record_upstream_error(&e, "system");
            ("system_error", state.frontend.failed(SYSTEM_ERROR))
        }
    };

    CALLBACKS_TOTAL.with_label_values(&[outcome]).inc();
    CALLBACK_LATENCY
        .with_label_values(&[outcome])
        .observe(started.elapsed().as_secs_f64());

    tracing::info!(track_id = %params.track_id, location = %location, "redirecting browser");
    see_other(&location)
}

fn record_upstream_error(error: &RelayError, kind: &str) {
    if let Some(hop) = error.hop() {
        UPSTREAM_ERRORS
            .with_label_values(&[hop.as_str(), kind])
            .inc();
    }
}

/// Missing or non-integer query fields are rejected before the handler runs.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        tracing::warn!(error = %err, "rejected malformed callback query");
        let response = HttpResponse::BadRequest().json(serde_json::json!({
            "error": "invalid_query",
            "message": err.to_string(),
        }));
        InternalError::from_response(err, response).into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/zibal/callback")
            .app_data(query_config())
            .route(web::get().to(zibal_callback)),
    );
}
