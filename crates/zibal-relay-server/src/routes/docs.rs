//! API reference: a hand-maintained OpenAPI document and a Scalar page that renders it.

use actix_web::{web, HttpResponse};

use crate::routes::health::SERVICE_NAME;

const DOCS_HTML: &str = r#"<!doctype html>
<html>
  <head>
    <title>Zibal Payment Proxy</title>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
  </head>
  <body>
    <script id="api-reference" data-url="/openapi.json"></script>
    <script src="https://cdn.jsdelivr.net/npm/@scalar/api-reference"></script>
  </body>
</html>
"#;

pub fn openapi_document() -> serde_json::Value {
    let redirect = |description: &str| {
        serde_json::json!({
            "description": description,
            "headers": { "Location": { "schema": { "type": "string" } } }
        })
    };

    serde_json::json!({
        "openapi": "3.1.0",
        "info": {
            "title": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Receives Zibal payment callbacks, verifies them with Zibal, \
                            forwards the HMAC-SHA256 signed result to the ticketing API \
                            and redirects the user to the success or failure page."
        },
        "paths": {
            "/": {
                "get": {
                    "summary": "Service metadata",
                    "responses": { "200": { "description": "Service name, status and links" } }
                }
            },
            "/health": {
                "get": {
                    "summary": "Health check",
                    "responses": { "200": { "description": "{\"status\": \"healthy\"}" } }
                }
            },
            "/redirect/{trackId}": {
                "get": {
                    "summary": "Send the browser to Zibal's payment page",
                    "description": "Makes the Referer seen by Zibal this service's registered domain.",
                    "parameters": [
                        { "name": "trackId", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "responses": { "303": redirect("Zibal start page for the track id") }
                }
            },
            "/api/zibal/callback": {
                "get": {
                    "summary": "Zibal payment callback",
                    "parameters": [
                        { "name": "trackId", "in": "query", "required": true, "schema": { "type": "string" } },
                        { "name": "success", "in": "query", "required": true, "schema": { "type": "integer" } },
                        { "name": "status", "in": "query", "required": true, "schema": { "type": "integer" } },
                        { "name": "orderId", "in": "query", "required": false, "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "303": redirect("Frontend /payment/success or /payment/failed"),
                        "400": { "description": "Missing or malformed query parameters" }
                    }
                }
            }
        }
    })
}

/// GET /openapi.json
pub async fn openapi() -> HttpResponse {
    HttpResponse::Ok().json(openapi_document())
}

/// GET /docs - Scalar API reference
pub async fn docs() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(DOCS_HTML)
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/docs", web::get().to(docs))
        .route("/openapi.json", web::get().to(openapi));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = openapi_document();
        for path in ["/", "/health", "/redirect/{trackId}", "/api/zibal/callback"] {
            assert!(doc["paths"].get(path).is_some(), "{path} missing");
        }
        assert_eq!(doc["info"]["version"], env!("CARGO_PKG_VERSION"));
    }
}
