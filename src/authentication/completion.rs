//! Popup completion page
//!
//! Sign-in runs in a popup window. The completion page passes the identity
//! payload to the opener's `app.authenticationComplete` and closes itself.

use actix_web::HttpResponse;
use async_trait::async_trait;
use log::error;

use crate::authentication::traits::IdentityResponseFactory;
use crate::models::NormalizedIdentity;
use crate::utils::responses::ResponseBuilder;

/// Default `IdentityResponseFactory` rendering the popup completion page
#[derive(Debug, Clone, Default)]
pub struct CompletionPageFactory;

impl CompletionPageFactory {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// HTML document for the given payload
    #[must_use]
    pub fn render(payload: &serde_json::Value) -> String {
        let script_payload = script_safe_json(payload);
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Signing in</title>\n</head>\n<body>\n<script>\nwindow.opener.app.authenticationComplete({script_payload});\nwindow.close();\n</script>\n</body>\n</html>\n"
        )
    }
}

/// JSON that cannot terminate the surrounding `<script>` element
fn script_safe_json(payload: &serde_json::Value) -> String {
    payload
        .to_string()
        .replace("</", "<\\/")
        .replace("<!--", "<\\!--")
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

#[async_trait(?Send)]
impl IdentityResponseFactory for CompletionPageFactory {
    async fn make(&self, identity: NormalizedIdentity) -> HttpResponse {
        match serde_json::to_value(&identity) {
            Ok(payload) => ResponseBuilder::html(Self::render(&payload)),
            Err(e) => {
                error!("Failed to serialize identity payload: {e}");
                ResponseBuilder::json_error(
                    actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                    "server_error",
                    "An internal server error occurred",
                )
            }
        }
    }
}
