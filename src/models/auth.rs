//! Authentication error types
//!
//! One error type covers every way the sign-in callback can fail. Each
//! variant maps to an HTTP status and a stable machine-readable code so the
//! host can tell "try again" apart from "this service is misconfigured".

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::utils::responses::ResponseBuilder;

/// Errors surfaced by the sign-in callback
#[derive(Debug, Error)]
pub enum AuthError {
    /// Missing or invalid API key/secret or provider endpoint
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Callback leg reached without valid temporary credentials in the session
    #[error("Handshake state error: {0}")]
    HandshakeState(String),

    /// Network failure or unusable response from the provider
    #[error("Provider communication failed: {0}")]
    ProviderCommunication(String),

    /// Provider refused the consumer key, token or verifier
    #[error("Provider rejected the request: {0}")]
    ProviderRejection(String),

    /// The incoming request cannot be turned into a callback request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Session cookie could not be written
    #[error("Session error: {0}")]
    Session(String),
}

impl AuthError {
    /// Stable error code sent to clients
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration(_) | Self::Session(_) => "server_error",
            Self::HandshakeState(_) => "handshake_expired",
            Self::ProviderCommunication(_) => "bad_gateway",
            Self::ProviderRejection(_) => "authentication_failed",
            Self::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Client-facing description; internal details stay in the logs
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Configuration(_) | Self::Session(_) => "An internal server error occurred",
            Self::HandshakeState(_) => {
                "Your sign-in attempt expired or could not be verified. Please try signing in again."
            }
            Self::ProviderCommunication(_) => "Failed to communicate with Twitter",
            Self::ProviderRejection(_) => "Twitter did not accept the sign-in request",
            Self::InvalidRequest(_) => "The request is malformed or invalid",
        }
    }

    /// Whether the visitor can recover by starting the sign-in again
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::HandshakeState(_) | Self::ProviderRejection(_))
    }
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Configuration(_) | Self::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::HandshakeState(_) | Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::ProviderCommunication(_) => StatusCode::BAD_GATEWAY,
            Self::ProviderRejection(_) => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        ResponseBuilder::json_error(self.status_code(), self.code(), self.description())
    }
}
