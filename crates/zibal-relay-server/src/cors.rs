//! CORS configuration.

use actix_cors::Cors;

/// Build the CORS middleware from allowed origins.
///
/// `*` allows any origin. The callback and redirect routes are plain browser
/// navigations, so CORS only matters for the JSON routes.
pub fn build_cors(allowed_origins: &[String]) -> Cors {
    let cors = if allowed_origins.iter().any(|o| o == "*") {
        Cors::default().allow_any_origin()
    } else {
        let allowed = allowed_origins.to_vec();
        Cors::default().allowed_origin_fn(move |origin, _req_head| {
            let origin_str = origin.to_str().unwrap_or("");
            allowed.iter().any(|a| a == origin_str)
        })
    };

    cors.allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![
            actix_web::http::header::AUTHORIZATION,
            actix_web::http::header::ACCEPT,
            actix_web::http::header::CONTENT_TYPE,
        ])
        .max_age(3600)
}
