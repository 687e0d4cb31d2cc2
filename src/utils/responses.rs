//! HTTP response helpers
//!
//! Redirects and JSON error bodies share one shape across the service:
//! `{"error": <code>, "error_description": <text>}`.

use actix_web::{http::header, http::StatusCode, HttpResponse};
use serde_json::json;

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// `302 Found` to the given location
    #[must_use]
    pub fn redirect(location: &str) -> HttpResponse {
        HttpResponse::Found()
            .insert_header((header::LOCATION, location))
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish()
    }

    /// JSON error response with the standard error body
    #[must_use]
    pub fn json_error(status: StatusCode, error: &str, description: &str) -> HttpResponse {
        HttpResponse::build(status).json(json!({
            "error": error,
            "error_description": description
        }))
    }

    /// HTML response that must not be cached
    #[must_use]
    pub fn html(body: String) -> HttpResponse {
        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .body(body)
    }
}
