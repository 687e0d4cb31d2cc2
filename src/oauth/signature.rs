//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1)

use anyhow::{Context, Result};
use base64::{engine::general_purpose, Engine as _};
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::collections::HashMap;

use crate::utils::crypto::generate_nonce;

type HmacSha1 = Hmac<Sha1>;

pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 percent-encoding: everything but unreserved characters
#[must_use]
pub fn percent_encode(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Current Unix timestamp as a string
#[must_use]
pub fn timestamp() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Token half of the signing key; absent while requesting temporary credentials
#[derive(Debug, Clone, Copy)]
pub struct TokenPair<'a> {
    pub token: &'a str,
    pub secret: &'a str,
}

/// Everything that goes into one signed request
#[derive(Debug)]
pub struct SigningRequest<'a> {
    pub method: &'a str,
    /// Base URL without query string
    pub url: &'a str,
    pub consumer_key: &'a str,
    pub consumer_secret: &'a str,
    pub token: Option<TokenPair<'a>>,
    /// Extra protocol parameters sent in the header (`oauth_callback`)
    pub oauth_params: &'a [(&'a str, &'a str)],
    /// Query or form-body parameters that take part in the signature only
    pub request_params: &'a [(&'a str, &'a str)],
}

impl SigningRequest<'_> {
    /// Build the `Authorization` header value with a fresh nonce and timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be signed
    pub fn authorization_header(&self) -> Result<String> {
        self.authorization_header_with(&generate_nonce(24), &timestamp())
    }

    /// Build the `Authorization` header value for a fixed nonce and timestamp
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be signed
    pub fn authorization_header_with(&self, nonce: &str, timestamp: &str) -> Result<String> {
        let mut header_params = self.protocol_params(nonce, timestamp);
        let signature = self.signature(&header_params)?;
        header_params.push(("oauth_signature".to_string(), signature));
        header_params.sort();

        let fields = header_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
            .collect::<Vec<_>>()
            .join(", ");

        Ok(format!("OAuth {fields}"))
    }

    /// Signature base string: `METHOD&url&params`
    #[must_use]
    pub fn base_string(&self, protocol_params: &[(String, String)]) -> String {
        let mut encoded: Vec<(String, String)> = protocol_params
            .iter()
            .map(|(k, v)| (percent_encode(k), percent_encode(v)))
            .chain(
                self.request_params
                    .iter()
                    .map(|(k, v)| (percent_encode(k), percent_encode(v))),
            )
            .collect();
        // Sorted by encoded name, then encoded value
        encoded.sort();

        let param_string = encoded
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");

        format!(
            "{}&{}&{}",
            self.method.to_uppercase(),
            percent_encode(self.url),
            percent_encode(&param_string)
        )
    }

    /// Sign the base string with `consumer_secret&token_secret`
    ///
    /// # Errors
    ///
    /// Returns an error if the HMAC key is rejected
    pub fn signature(&self, protocol_params: &[(String, String)]) -> Result<String> {
        let signing_key = format!(
            "{}&{}",
            percent_encode(self.consumer_secret),
            percent_encode(self.token.map_or("", |t| t.secret))
        );

        let mut mac = <HmacSha1 as Mac>::new_from_slice(signing_key.as_bytes())
            .context("Invalid HMAC key length")?;
        mac.update(self.base_string(protocol_params).as_bytes());

        Ok(general_purpose::STANDARD.encode(mac.finalize().into_bytes()))
    }

    fn protocol_params(&self, nonce: &str, timestamp: &str) -> Vec<(String, String)> {
        let mut params = vec![
            ("oauth_consumer_key".to_string(), self.consumer_key.to_string()),
            ("oauth_nonce".to_string(), nonce.to_string()),
            ("oauth_signature_method".to_string(), SIGNATURE_METHOD.to_string()),
            ("oauth_timestamp".to_string(), timestamp.to_string()),
            ("oauth_version".to_string(), OAUTH_VERSION.to_string()),
        ];
        if let Some(token) = self.token {
            params.push(("oauth_token".to_string(), token.token.to_string()));
        }
        for (k, v) in self.oauth_params {
            params.push(((*k).to_string(), (*v).to_string()));
        }
        params
    }
}

/// Parse a form-encoded token response (`oauth_token=..&oauth_token_secret=..`)
#[must_use]
pub fn parse_form_response(body: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(body.trim().as_bytes())
        .into_owned()
        .collect()
}
