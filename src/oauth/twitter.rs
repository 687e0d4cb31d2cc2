//! Twitter OAuth 1.0a provider
//!
//! Endpoints:
//! - `POST {base}/oauth/request_token`
//! - `{base}/oauth/authenticate?oauth_token=...` (browser redirect)
//! - `POST {base}/oauth/access_token`
//! - `GET {base}/1.1/account/verify_credentials.json`

use async_trait::async_trait;
use log::debug;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use url::Url;

use crate::models::AuthError;
use crate::oauth::credentials::{ClientCredentials, TemporaryCredentials, TokenCredentials};
use crate::oauth::providers::{IdentityProvider, ProviderError, ProviderUserProfile};
use crate::oauth::signature::{parse_form_response, SigningRequest, TokenPair};
use crate::settings::ProviderConfig;

pub const DEFAULT_API_BASE_URL: &str = "https://api.twitter.com";

const REQUEST_TOKEN_PATH: &str = "/oauth/request_token";
const AUTHORIZE_PATH: &str = "/oauth/authenticate";
const ACCESS_TOKEN_PATH: &str = "/oauth/access_token";
const USER_DETAILS_PATH: &str = "/1.1/account/verify_credentials.json";

/// Longest slice of an error body kept in error messages
const ERROR_BODY_PREVIEW: usize = 200;

/// `verify_credentials` fields used by the identity mapping
#[derive(Debug, Deserialize)]
struct TwitterUser {
    id_str: String,
    screen_name: String,
    name: Option<String>,
    profile_image_url: Option<String>,
    email: Option<String>,
}

impl From<TwitterUser> for ProviderUserProfile {
    fn from(user: TwitterUser) -> Self {
        Self {
            uid: user.id_str,
            nickname: user.screen_name,
            name: user.name,
            image_url: user.profile_image_url,
            email: user.email,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TwitterProvider {
    http: reqwest::Client,
    request_token_url: Url,
    authorize_url: Url,
    access_token_url: Url,
    user_details_url: Url,
}

impl TwitterProvider {
    /// Provider against the public Twitter API
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new() -> Result<Self, AuthError> {
        Self::with_base_url(DEFAULT_API_BASE_URL)
    }

    /// Provider for the endpoint in `config`, or the public API when none is set
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL is invalid or the HTTP
    /// client cannot be built
    pub fn from_config(config: &ProviderConfig) -> Result<Self, AuthError> {
        Self::with_base_url(config.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL))
    }

    /// Provider against a custom API base (proxies, test servers)
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not an absolute http(s) URL or the
    /// HTTP client cannot be built
    pub fn with_base_url(base_url: &str) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("twitter-auth/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuthError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            request_token_url: endpoint(base_url, REQUEST_TOKEN_PATH)?,
            authorize_url: endpoint(base_url, AUTHORIZE_PATH)?,
            access_token_url: endpoint(base_url, ACCESS_TOKEN_PATH)?,
            user_details_url: endpoint(base_url, USER_DETAILS_PATH)?,
        })
    }

    /// Read a response body, turning non-success statuses into errors
    async fn read_body(response: reqwest::Response, step: &str) -> Result<String, ProviderError> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::Communication(format!("Failed to read {step} response: {e}"))
        })?;

        if status.is_success() {
            return Ok(body);
        }

        let preview: String = body.trim().chars().take(ERROR_BODY_PREVIEW).collect();
        let message = format!(
            "Received HTTP status code [{}] with message \"{preview}\" when getting {step}",
            status.as_u16()
        );
        if status.is_client_error() {
            Err(ProviderError::Rejected(message))
        } else {
            Err(ProviderError::Communication(message))
        }
    }

    fn communication_error(step: &str, err: &reqwest::Error) -> ProviderError {
        ProviderError::Communication(format!("Request for {step} failed: {err}"))
    }

    fn signing_error(step: &str, err: &anyhow::Error) -> ProviderError {
        ProviderError::Communication(format!("Failed to sign {step} request: {err}"))
    }
}

fn endpoint(base_url: &str, path: &str) -> Result<Url, AuthError> {
    let url = Url::parse(&format!("{}{path}", base_url.trim_end_matches('/')))
        .map_err(|e| AuthError::Configuration(format!("Invalid Twitter API base URL '{base_url}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AuthError::Configuration(format!(
            "Twitter API base URL must be http(s): {base_url}"
        )));
    }
    Ok(url)
}

/// Pull a token pair out of a form-encoded response body
fn token_pair(body: &str, step: &str) -> Result<(String, String), ProviderError> {
    let mut values = parse_form_response(body);

    if let Some(error) = values.remove("error") {
        return Err(ProviderError::Rejected(format!(
            "Error [{error}] returned when getting {step}"
        )));
    }

    let token = values
        .remove("oauth_token")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ProviderError::InvalidResponse(format!("Missing oauth_token in {step}")))?;
    let secret = values
        .remove("oauth_token_secret")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            ProviderError::InvalidResponse(format!("Missing oauth_token_secret in {step}"))
        })?;

    Ok((token, secret))
}

#[async_trait]
impl IdentityProvider for TwitterProvider {
    fn name(&self) -> &'static str {
        "twitter"
    }

    async fn temporary_credentials(
        &self,
        client: &ClientCredentials,
    ) -> Result<TemporaryCredentials, ProviderError> {
        const STEP: &str = "temporary credentials";

        let authorization = SigningRequest {
            method: "POST",
            url: self.request_token_url.as_str(),
            consumer_key: &client.identifier,
            consumer_secret: &client.secret,
            token: None,
            oauth_params: &[("oauth_callback", client.callback_uri.as_str())],
            request_params: &[],
        }
        .authorization_header()
        .map_err(|e| Self::signing_error(STEP, &e))?;

        debug!("Requesting Twitter temporary credentials for {}", client.callback_uri);
        let response = self
            .http
            .post(self.request_token_url.clone())
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| Self::communication_error(STEP, &e))?;
        let body = Self::read_body(response, STEP).await?;

        if parse_form_response(&body)
            .get("oauth_callback_confirmed")
            .map(String::as_str)
            != Some("true")
        {
            return Err(ProviderError::InvalidResponse(
                "Error in retrieving temporary credentials: callback not confirmed".to_string(),
            ));
        }

        let (identifier, secret) = token_pair(&body, STEP)?;
        Ok(TemporaryCredentials { identifier, secret })
    }

    fn authorization_url(&self, temporary: &TemporaryCredentials) -> Url {
        let mut url = self.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("oauth_token", &temporary.identifier);
        url
    }

    async fn token_credentials(
        &self,
        client: &ClientCredentials,
        temporary: &TemporaryCredentials,
        verifier: &str,
    ) -> Result<TokenCredentials, ProviderError> {
        const STEP: &str = "token credentials";

        let form = [("oauth_verifier", verifier)];
        let authorization = SigningRequest {
            method: "POST",
            url: self.access_token_url.as_str(),
            consumer_key: &client.identifier,
            consumer_secret: &client.secret,
            token: Some(TokenPair {
                token: &temporary.identifier,
                secret: &temporary.secret,
            }),
            oauth_params: &[],
            request_params: &form,
        }
        .authorization_header()
        .map_err(|e| Self::signing_error(STEP, &e))?;

        let response = self
            .http
            .post(self.access_token_url.clone())
            .header(AUTHORIZATION, authorization)
            .form(&form)
            .send()
            .await
            .map_err(|e| Self::communication_error(STEP, &e))?;
        let body = Self::read_body(response, STEP).await?;

        let (identifier, secret) = token_pair(&body, STEP)?;
        Ok(TokenCredentials { identifier, secret })
    }

    async fn fetch_profile(
        &self,
        client: &ClientCredentials,
        token: &TokenCredentials,
    ) -> Result<ProviderUserProfile, ProviderError> {
        const STEP: &str = "user details";

        let authorization = SigningRequest {
            method: "GET",
            url: self.user_details_url.as_str(),
            consumer_key: &client.identifier,
            consumer_secret: &client.secret,
            token: Some(TokenPair {
                token: &token.identifier,
                secret: &token.secret,
            }),
            oauth_params: &[],
            request_params: &[],
        }
        .authorization_header()
        .map_err(|e| Self::signing_error(STEP, &e))?;

        let response = self
            .http
            .get(self.user_details_url.clone())
            .header(AUTHORIZATION, authorization)
            .send()
            .await
            .map_err(|e| Self::communication_error(STEP, &e))?;
        let body = Self::read_body(response, STEP).await?;

        let user: TwitterUser = serde_json::from_str(&body)
            .map_err(|e| ProviderError::InvalidResponse(format!("Unexpected {STEP} body: {e}")))?;
        Ok(user.into())
    }
}
