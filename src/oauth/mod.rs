//! OAuth1 sign-in module
//!
//! This module provides the callback request types, typed OAuth1
//! credentials, request signing, the provider capability trait and the
//! Twitter provider.

pub mod credentials;
pub mod providers;
pub mod signature;
pub mod twitter;

pub use credentials::{ClientCredentials, CredentialsCodecError, TemporaryCredentials, TokenCredentials};
pub use providers::{IdentityProvider, ProviderError, ProviderUserProfile};
pub use twitter::TwitterProvider;

use serde::Deserialize;
use url::Url;

/// Query parameters the provider appends when redirecting back
#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackQuery {
    pub oauth_token: Option<String>,
    pub oauth_verifier: Option<String>,
}

impl CallbackQuery {
    /// Parse a raw query string; a repeated parameter keeps its last value
    /// and unrelated parameters are ignored
    #[must_use]
    pub fn from_query_string(query: &str) -> Self {
        let mut parsed = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "oauth_token" => parsed.oauth_token = Some(value.into_owned()),
                "oauth_verifier" => parsed.oauth_verifier = Some(value.into_owned()),
                _ => {}
            }
        }
        parsed
    }

    /// Token and verifier when both are present and non-empty
    #[must_use]
    pub fn verification(&self) -> Option<(&str, &str)> {
        let token = self.oauth_token.as_deref().filter(|t| !t.is_empty())?;
        let verifier = self.oauth_verifier.as_deref().filter(|v| !v.is_empty())?;
        Some((token, verifier))
    }
}

/// The externally visible URI of the current request, when it differs from
/// what the server itself sees (mounted under a prefix, behind a proxy).
///
/// Host middleware attaches it as a request extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginalUri(pub Url);

/// Callback request as seen by the handler
#[derive(Debug, Clone)]
pub struct CallbackRequest {
    pub uri: Url,
    pub original_uri: Option<Url>,
    pub query: CallbackQuery,
}

impl CallbackRequest {
    #[must_use]
    pub fn new(uri: Url, original_uri: Option<Url>, query: CallbackQuery) -> Self {
        Self {
            uri,
            original_uri,
            query,
        }
    }

    /// Callback URI registered with the provider: the original URI (or the
    /// request URI) without its query string. Identical across both legs.
    #[must_use]
    pub fn callback_uri(&self) -> String {
        let mut uri = self.original_uri.as_ref().unwrap_or(&self.uri).clone();
        uri.set_query(None);
        uri.set_fragment(None);
        uri.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(value: &str) -> Url {
        Url::parse(value).unwrap()
    }

    #[test]
    fn test_query_string_last_value_wins() {
        let query = CallbackQuery::from_query_string(
            "oauth_token=a&denied=x&oauth_token=b&oauth_verifier=v%2B1",
        );
        assert_eq!(query.oauth_token.as_deref(), Some("b"));
        assert_eq!(query.oauth_verifier.as_deref(), Some("v+1"));

        assert_eq!(CallbackQuery::from_query_string(""), CallbackQuery::default());
    }

    #[test]
    fn test_verification_requires_both_params() {
        let query = CallbackQuery {
            oauth_token: Some("tok123".into()),
            oauth_verifier: Some("ver456".into()),
        };
        assert_eq!(query.verification(), Some(("tok123", "ver456")));

        let query = CallbackQuery {
            oauth_token: Some("tok123".into()),
            oauth_verifier: None,
        };
        assert_eq!(query.verification(), None);

        let query = CallbackQuery {
            oauth_token: None,
            oauth_verifier: Some("ver456".into()),
        };
        assert_eq!(query.verification(), None);

        assert_eq!(CallbackQuery::default().verification(), None);
    }

    #[test]
    fn test_empty_values_count_as_absent() {
        let query = CallbackQuery {
            oauth_token: Some(String::new()),
            oauth_verifier: Some("ver456".into()),
        };
        assert_eq!(query.verification(), None);
    }

    #[test]
    fn test_callback_uri_strips_query() {
        let request = CallbackRequest::new(
            url("http://forum.test/auth/twitter?oauth_token=a&oauth_verifier=b"),
            None,
            CallbackQuery::default(),
        );
        assert_eq!(request.callback_uri(), "http://forum.test/auth/twitter");
    }

    #[test]
    fn test_callback_uri_prefers_original_uri() {
        let request = CallbackRequest::new(
            url("http://127.0.0.1:8080/auth/twitter?x=1"),
            Some(url("https://forum.example.com/community/auth/twitter?x=1")),
            CallbackQuery::default(),
        );
        assert_eq!(
            request.callback_uri(),
            "https://forum.example.com/community/auth/twitter"
        );
    }

    #[test]
    fn test_callback_uri_identical_across_legs() {
        let first_leg = CallbackRequest::new(
            url("https://forum.example.com/auth/twitter"),
            None,
            CallbackQuery::default(),
        );
        let second_leg = CallbackRequest::new(
            url("https://forum.example.com/auth/twitter?oauth_token=tok123&oauth_verifier=ver456"),
            None,
            CallbackQuery::default(),
        );
        assert_eq!(first_leg.callback_uri(), second_leg.callback_uri());
    }
}
