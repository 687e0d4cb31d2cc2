//! Identity provider capability
//!
//! The callback handler is written against this trait so any OAuth1
//! provider can be plugged in by implementing the four handshake steps.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::models::AuthError;
use crate::oauth::credentials::{ClientCredentials, TemporaryCredentials, TokenCredentials};

/// Profile fields read from the provider after the handshake
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderUserProfile {
    /// Stable provider user id
    pub uid: String,
    /// Handle / screen name
    pub nickname: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub email: Option<String>,
}

/// Provider round-trip failures
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure or server-side error status
    #[error("{0}")]
    Communication(String),
    /// Provider refused the consumer key, token or verifier
    #[error("{0}")]
    Rejected(String),
    /// Response arrived but is not what the protocol requires
    #[error("{0}")]
    InvalidResponse(String),
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Communication(msg) => Self::ProviderCommunication(msg),
            ProviderError::InvalidResponse(msg) => {
                Self::ProviderCommunication(format!("invalid provider response: {msg}"))
            }
            ProviderError::Rejected(msg) => Self::ProviderRejection(msg),
        }
    }
}

/// Three-legged OAuth1 provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name for logging (e.g. "twitter")
    fn name(&self) -> &'static str;

    /// Obtain temporary credentials bound to `client.callback_uri`
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached, refuses the
    /// consumer credentials or does not confirm the callback
    async fn temporary_credentials(
        &self,
        client: &ClientCredentials,
    ) -> Result<TemporaryCredentials, ProviderError>;

    /// URL the visitor is redirected to for authorization; no network call
    fn authorization_url(&self, temporary: &TemporaryCredentials) -> Url;

    /// Exchange temporary credentials and verifier for token credentials
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or rejects the
    /// token/verifier
    async fn token_credentials(
        &self,
        client: &ClientCredentials,
        temporary: &TemporaryCredentials,
        verifier: &str,
    ) -> Result<TokenCredentials, ProviderError>;

    /// Fetch the authenticated user's profile
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached, rejects the token
    /// credentials or returns an unexpected body
    async fn fetch_profile(
        &self,
        client: &ClientCredentials,
        token: &TokenCredentials,
    ) -> Result<ProviderUserProfile, ProviderError>;
}
