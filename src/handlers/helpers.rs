// Helper functions used by the callback route
use actix_web::{HttpMessage, HttpRequest};
use url::Url;

use crate::models::AuthError;
use crate::oauth::{CallbackQuery, CallbackRequest, OriginalUri};

/// Build the handler's view of an incoming request
///
/// The original URI comes from an `OriginalUri` extension set by host
/// middleware, else from `redirect_base_url` joined with the request path.
///
/// # Errors
///
/// Returns `InvalidRequest` if the request URI cannot be parsed and
/// `Configuration` if `redirect_base_url` is not a valid URL
pub fn callback_request(
    req: &HttpRequest,
    query: CallbackQuery,
    redirect_base_url: Option<&str>,
) -> Result<CallbackRequest, AuthError> {
    let uri = request_url(req)?;

    let attached = req.extensions().get::<OriginalUri>().map(|original| original.0.clone());
    let original_uri = match attached {
        Some(original) => Some(original),
        None => redirect_base_url
            .map(|base| public_url(base, req.path()))
            .transpose()?,
    };

    Ok(CallbackRequest::new(uri, original_uri, query))
}

/// Absolute URL of the request as the server sees it
fn request_url(req: &HttpRequest) -> Result<Url, AuthError> {
    let path_and_query = req.uri().path_and_query().map_or("/", |pq| pq.as_str());
    let absolute = {
        let conn = req.connection_info();
        format!("{}://{}{path_and_query}", conn.scheme(), conn.host())
    };

    Url::parse(&absolute)
        .map_err(|e| AuthError::InvalidRequest(format!("Cannot parse request URI '{absolute}': {e}")))
}

fn public_url(base: &str, path: &str) -> Result<Url, AuthError> {
    let joined = format!("{}{path}", base.trim_end_matches('/'));
    Url::parse(&joined)
        .map_err(|e| AuthError::Configuration(format!("Invalid redirect_base_url '{base}': {e}")))
}
