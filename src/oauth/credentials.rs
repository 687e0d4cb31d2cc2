//! OAuth1 credential pairs
//!
//! `TemporaryCredentials` is the only credential that leaves the process
//! between requests, so it carries its own typed codec instead of being
//! stored as an opaque blob.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Consumer key/secret plus the callback URI for this request
#[derive(Clone)]
pub struct ClientCredentials {
    pub identifier: String,
    pub secret: String,
    pub callback_uri: String,
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("identifier", &self.identifier)
            .field("secret", &"[redacted]")
            .field("callback_uri", &self.callback_uri)
            .finish()
    }
}

/// Request token pair issued for the authorization redirect
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemporaryCredentials {
    pub identifier: String,
    pub secret: String,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("identifier", &self.identifier)
            .field("secret", &"[redacted]")
            .finish()
    }
}

/// Why a stored temporary credential value was refused
#[derive(Debug, thiserror::Error)]
pub enum CredentialsCodecError {
    #[error("malformed temporary credentials: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("temporary credentials are missing the {0}")]
    Empty(&'static str),
}

impl TemporaryCredentials {
    #[must_use]
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Encode for the session store
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails
    pub fn encode(&self) -> Result<String, CredentialsCodecError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a session value, rejecting anything that is not exactly a
    /// non-empty identifier/secret pair
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not valid JSON, has unexpected fields
    /// or carries an empty identifier or secret
    pub fn decode(value: &str) -> Result<Self, CredentialsCodecError> {
        let credentials: Self = serde_json::from_str(value)?;
        if credentials.identifier.is_empty() {
            return Err(CredentialsCodecError::Empty("identifier"));
        }
        if credentials.secret.is_empty() {
            return Err(CredentialsCodecError::Empty("secret"));
        }
        Ok(credentials)
    }
}

/// Access token pair; never persisted by this crate
#[derive(Clone, PartialEq, Eq)]
pub struct TokenCredentials {
    pub identifier: String,
    pub secret: String,
}

impl fmt::Debug for TokenCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentials")
            .field("identifier", &self.identifier)
            .field("secret", &"[redacted]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_accepts_encoded_value() {
        let credentials = TemporaryCredentials::new("tok123", "sekrit");
        let decoded = TemporaryCredentials::decode(&credentials.encode().unwrap()).unwrap();
        assert_eq!(decoded, credentials);
    }

    #[test]
    fn test_decode_rejects_foreign_shapes() {
        assert!(TemporaryCredentials::decode("").is_err());
        assert!(TemporaryCredentials::decode("not json").is_err());
        assert!(TemporaryCredentials::decode(r#"{"identifier":"a"}"#).is_err());
        assert!(TemporaryCredentials::decode(
            r#"{"identifier":"a","secret":"b","__class":"Evil"}"#
        )
        .is_err());
        // serialized PHP object from an older deployment
        assert!(TemporaryCredentials::decode(
            r#"O:49:"League\OAuth1\Client\Credentials\TemporaryCredentials":0:{}"#
        )
        .is_err());
    }

    #[test]
    fn test_decode_rejects_empty_fields() {
        let err = TemporaryCredentials::decode(r#"{"identifier":"","secret":"b"}"#).unwrap_err();
        assert!(err.to_string().contains("identifier"));

        let err = TemporaryCredentials::decode(r#"{"identifier":"a","secret":""}"#).unwrap_err();
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let output = format!("{:?}", TemporaryCredentials::new("visible", "hidden-value"));
        assert!(output.contains("visible"));
        assert!(!output.contains("hidden-value"));

        let output = format!(
            "{:?}",
            TokenCredentials {
                identifier: "id".into(),
                secret: "token-secret".into()
            }
        );
        assert!(!output.contains("token-secret"));
    }
}
