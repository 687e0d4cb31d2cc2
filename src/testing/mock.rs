//! Stub collaborators for the callback handler

use actix_web::HttpResponse;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use url::Url;

use crate::authentication::IdentityResponseFactory;
use crate::models::NormalizedIdentity;
use crate::oauth::{
    ClientCredentials, IdentityProvider, ProviderError, ProviderUserProfile, TemporaryCredentials,
    TokenCredentials,
};
use crate::testing::fixtures::profile;

/// Authorization endpoint used by `StubIdentityProvider`
pub const STUB_AUTHORIZE_URL: &str = "https://provider.test/authorize";

/// Provider calls that can be counted or made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StubLeg {
    Temporary,
    Token,
    Profile,
}

#[derive(Debug, Clone, Copy)]
enum StubFailure {
    Communication,
    Rejected,
}

#[derive(Debug, Default)]
struct StubState {
    issued: usize,
    calls: HashMap<StubLeg, usize>,
    callback_uris: Vec<String>,
    last_exchange: Option<(TemporaryCredentials, String)>,
}

/// In-process provider
///
/// Issues `tmp-1`, `tmp-2`, ... as temporary credentials, accepts any
/// verifier and returns a fixed profile. Records the callback URI of every
/// call.
#[derive(Debug)]
pub struct StubIdentityProvider {
    profile: ProviderUserProfile,
    failures: HashMap<StubLeg, StubFailure>,
    state: Mutex<StubState>,
}

impl Default for StubIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StubIdentityProvider {
    #[must_use]
    pub fn new() -> Self {
        Self {
            profile: profile(),
            failures: HashMap::new(),
            state: Mutex::new(StubState::default()),
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: ProviderUserProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Fail `leg` as a transport error
    #[must_use]
    pub fn failing(mut self, leg: StubLeg) -> Self {
        self.failures.insert(leg, StubFailure::Communication);
        self
    }

    /// Fail `leg` as a provider rejection
    #[must_use]
    pub fn rejecting(mut self, leg: StubLeg) -> Self {
        self.failures.insert(leg, StubFailure::Rejected);
        self
    }

    #[must_use]
    pub fn calls(&self, leg: StubLeg) -> usize {
        self.lock().calls.get(&leg).copied().unwrap_or(0)
    }

    /// Callback URIs in call order
    #[must_use]
    pub fn callback_uris(&self) -> Vec<String> {
        self.lock().callback_uris.clone()
    }

    /// Temporary credentials and verifier of the last token exchange
    #[must_use]
    pub fn last_exchange(&self) -> Option<(TemporaryCredentials, String)> {
        self.lock().last_exchange.clone()
    }

    fn record(&self, leg: StubLeg, client: &ClientCredentials) -> Result<(), ProviderError> {
        {
            let mut state = self.lock();
            *state.calls.entry(leg).or_default() += 1;
            state.callback_uris.push(client.callback_uri.clone());
        }

        match self.failures.get(&leg) {
            Some(StubFailure::Communication) => Err(ProviderError::Communication(format!(
                "stub {leg:?} call failed"
            ))),
            Some(StubFailure::Rejected) => {
                Err(ProviderError::Rejected(format!("stub {leg:?} call rejected")))
            }
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for StubIdentityProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn temporary_credentials(
        &self,
        client: &ClientCredentials,
    ) -> Result<TemporaryCredentials, ProviderError> {
        self.record(StubLeg::Temporary, client)?;

        let mut state = self.lock();
        state.issued += 1;
        Ok(TemporaryCredentials::new(
            format!("tmp-{}", state.issued),
            format!("tmp-secret-{}", state.issued),
        ))
    }

    fn authorization_url(&self, temporary: &TemporaryCredentials) -> Url {
        let mut url = Url::parse(STUB_AUTHORIZE_URL).expect("stub authorize URL is valid");
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
        self.lock().last_exchange = Some((temporary.clone(), verifier.to_string()));
        self.record(StubLeg::Token, client)?;

        Ok(TokenCredentials {
            identifier: format!("token-for-{}", temporary.identifier),
            secret: "token-secret".to_string(),
        })
    }

    async fn fetch_profile(
        &self,
        client: &ClientCredentials,
        _token: &TokenCredentials,
    ) -> Result<ProviderUserProfile, ProviderError> {
        self.record(StubLeg::Profile, client)?;
        Ok(self.profile.clone())
    }
}

/// Response factory that records every identity it receives
#[derive(Debug, Default)]
pub struct RecordingResponseFactory {
    identities: Mutex<Vec<NormalizedIdentity>>,
}

impl RecordingResponseFactory {
    /// Header set on every response so tests can tell it was not replaced
    pub const MARKER_HEADER: &'static str = "x-recorded-identity";

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn identities(&self) -> Vec<NormalizedIdentity> {
        self.identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait(?Send)]
impl IdentityResponseFactory for RecordingResponseFactory {
    async fn make(&self, identity: NormalizedIdentity) -> HttpResponse {
        let response = HttpResponse::Ok()
            .insert_header((Self::MARKER_HEADER, "1"))
            .json(&identity);
        self.identities
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(identity);
        response
    }
}
