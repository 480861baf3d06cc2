//! Redirect targets on the ticketing frontend.

use actix_web::http::header;
use actix_web::HttpResponse;
use url::form_urlencoded;

pub const CONNECTION_ERROR: &str = "Connection error";
pub const SYSTEM_ERROR: &str = "System error";
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// Builds `/payment/success` and `/payment/failed` URLs under the frontend base.
///
/// Query values are form-encoded, so `"Connection error"` becomes
/// `error=Connection+error`.
#[derive(Debug, Clone)]
pub struct FrontendRedirects {
    base: String,
}

impl FrontendRedirects {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }

    pub fn success(&self, ref_number: Option<&str>, reservation_id: Option<&str>) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("ref_id", ref_number.unwrap_or_default())
            .append_pair("reservation_id", reservation_id.unwrap_or_default())
            .finish();
        format!("{}/payment/success?{}", self.base, query)
    }

    /// Failure page for a declined payment. Echoes the track id.
    pub fn rejected(&self, message: Option<&str>, track_id: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("error", message.unwrap_or(UNKNOWN_ERROR))
            .append_pair("trackId", track_id)
            .finish();
        format!("{}/payment/failed?{}", self.base, query)
    }

    /// Failure page carrying only a generic error string.
    pub fn failed(&self, error: &str) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("error", error)
            .finish();
        format!("{}/payment/failed?{}", self.base, query)
    }
}

/// 303 See Other to `location`.
pub fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}
