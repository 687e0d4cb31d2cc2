// Twitter sign-in callback
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use log::error;
use std::sync::Arc;

use super::helpers::callback_request;
use crate::authentication::IdentityResponseFactory;
use crate::models::{AuthError, IdentityMapping};
use crate::oauth::{CallbackQuery, CallbackRequest, ClientCredentials, IdentityProvider, TemporaryCredentials};
use crate::session::{SessionManager, SessionStore, TEMPORARY_CREDENTIALS_KEY};
use crate::settings::{ProviderConfig, SettingsStore, TwitterAuthSettings};
use crate::utils::logging::LoggingHelper;
use crate::utils::responses::ResponseBuilder;

/// Settings prefix holding the provider's consumer credentials
pub const PROVIDER_SETTINGS_PREFIX: &str = "twitter";

/// Completes a three-legged OAuth1 sign-in on a single callback route.
///
/// Without `oauth_token` and `oauth_verifier` the request starts the
/// handshake: temporary credentials are stored in the session and the
/// visitor is redirected to the provider. With both present it finishes the
/// handshake and returns whatever the response factory builds for the
/// visitor's identity.
pub struct AuthCallbackHandler {
    config: ProviderConfig,
    provider: Arc<dyn IdentityProvider>,
    responses: Arc<dyn IdentityResponseFactory>,
    mapping: IdentityMapping,
}

impl AuthCallbackHandler {
    #[must_use]
    pub fn new(
        config: ProviderConfig,
        provider: Arc<dyn IdentityProvider>,
        responses: Arc<dyn IdentityResponseFactory>,
    ) -> Self {
        Self {
            config,
            provider,
            responses,
            mapping: IdentityMapping::default(),
        }
    }

    /// Read the consumer credentials from `twitter.api_key` and
    /// `twitter.api_secret`
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if either setting is missing or
    /// empty
    pub fn from_settings(
        settings: &dyn SettingsStore,
        provider: Arc<dyn IdentityProvider>,
        responses: Arc<dyn IdentityResponseFactory>,
    ) -> Result<Self, AuthError> {
        let config = ProviderConfig::from_store(settings, PROVIDER_SETTINGS_PREFIX)?;
        Ok(Self::new(config, provider, responses))
    }

    #[must_use]
    pub fn with_identity_mapping(mut self, mapping: IdentityMapping) -> Self {
        self.mapping = mapping;
        self
    }

    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Handle one callback request
    ///
    /// # Errors
    ///
    /// - `HandshakeState` if the callback leg finds no usable temporary
    ///   credentials in the session
    /// - `ProviderCommunication` / `ProviderRejection` if a provider call fails
    /// - `Session` if the temporary credentials cannot be encoded
    pub async fn handle(
        &self,
        request: &CallbackRequest,
        session: &dyn SessionStore,
    ) -> Result<HttpResponse, AuthError> {
        let client = self.config.client_credentials(request.callback_uri());

        match request.query.verification() {
            None => self.begin(&client, session).await,
            Some((token, verifier)) => self.complete(&client, session, token, verifier).await,
        }
    }

    async fn begin(
        &self,
        client: &ClientCredentials,
        session: &dyn SessionStore,
    ) -> Result<HttpResponse, AuthError> {
        let temporary = self.provider.temporary_credentials(client).await?;
        let encoded = temporary
            .encode()
            .map_err(|e| AuthError::Session(format!("Failed to encode temporary credentials: {e}")))?;
        session.put(TEMPORARY_CREDENTIALS_KEY, encoded);

        LoggingHelper::log_handshake_started(self.provider.name(), &client.callback_uri);
        let authorization_url = self.provider.authorization_url(&temporary);
        Ok(ResponseBuilder::redirect(authorization_url.as_str()))
    }

    async fn complete(
        &self,
        client: &ClientCredentials,
        session: &dyn SessionStore,
        token: &str,
        verifier: &str,
    ) -> Result<HttpResponse, AuthError> {
        LoggingHelper::log_callback_received(self.provider.name(), verifier.len());
        let temporary = Self::take_temporary_credentials(session, token)?;

        let token_credentials = self
            .provider
            .token_credentials(client, &temporary, verifier)
            .await?;
        let profile = self.provider.fetch_profile(client, &token_credentials).await?;

        let identity = self.mapping.normalize(&profile);
        LoggingHelper::log_handshake_completed(self.provider.name(), &self.mapping.identification_key);
        Ok(self.responses.make(identity).await)
    }

    /// Remove the stored temporary credentials; each entry is usable once
    fn take_temporary_credentials(
        session: &dyn SessionStore,
        token: &str,
    ) -> Result<TemporaryCredentials, AuthError> {
        let stored = session.remove(TEMPORARY_CREDENTIALS_KEY).ok_or_else(|| {
            AuthError::HandshakeState("no temporary credentials in session".to_string())
        })?;

        let temporary = TemporaryCredentials::decode(&stored).map_err(|e| {
            LoggingHelper::log_stale_handshake_state(&e.to_string());
            AuthError::HandshakeState(format!("stored temporary credentials are unreadable: {e}"))
        })?;

        if temporary.identifier != token {
            LoggingHelper::log_stale_handshake_state("oauth_token does not match");
            return Err(AuthError::HandshakeState(
                "returned oauth_token does not match the stored temporary credentials".to_string(),
            ));
        }

        Ok(temporary)
    }
}

/// `GET` callback route
///
/// Loads the visitor session from its cookie, runs the handler and writes
/// the session back, on error responses too.
pub async fn twitter_callback(
    req: HttpRequest,
    handler: web::Data<AuthCallbackHandler>,
    session_manager: web::Data<SessionManager>,
    settings: web::Data<TwitterAuthSettings>,
) -> HttpResponse {
    let session = session_manager.load(&req);

    let result = match callback_request(
        &req,
        CallbackQuery::from_query_string(req.query_string()),
        settings.application.redirect_base_url.as_deref(),
    ) {
        Ok(request) => handler.handle(&request, &session).await,
        Err(e) => Err(e),
    };

    let mut response = result.unwrap_or_else(|e| {
        LoggingHelper::log_handshake_failed(handler.provider_name(), &e);
        e.error_response()
    });

    if let Err(e) = session_manager.persist(&session, &mut response) {
        error!("Failed to persist session: {e}");
        return e.error_response();
    }
    response
}
