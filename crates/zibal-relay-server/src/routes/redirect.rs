use actix_web::{web, HttpResponse};
use url::form_urlencoded;

use crate::frontend::see_other;
use crate::metrics::GATEWAY_REDIRECTS;
use crate::state::AppState;

/// Zibal's start page for `track_id`.
///
/// The token is appended to `payment_url` as one percent-encoded path
/// segment. Alphanumerics and `-._*` pass through unchanged, so ordinary
/// tokens are not altered.
pub fn gateway_start_url(payment_url: &str, track_id: &str) -> String {
    format!("{payment_url}{}", encode_path_segment(track_id))
}

/// `byte_serialize` targets query strings, where a space is `+`. In a path
/// `+` is literal, so spaces are written as `%20` instead. A literal `+` in
/// the input has already become `%2B` at this point.
fn encode_path_segment(segment: &str) -> String {
    form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

/// GET /redirect/{track_id} - bounce the browser to Zibal's start page.
///
/// Zibal checks the Referer of the request that opens a payment session
/// against the merchant's registered domain. Sending the browser through
/// this service first makes that Referer our domain instead of the
/// frontend's. The token is not validated; Zibal rejects bad ones itself.
pub async fn redirect_to_gateway(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let track_id = path.into_inner();
    let target = gateway_start_url(&state.config.payment_url, &track_id);

    tracing::info!(track_id = %track_id, target = %target, "redirecting to zibal gateway");
    GATEWAY_REDIRECTS.inc();

    see_other(&target)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/redirect/{track_id}", web::get().to(redirect_to_gateway));
}
