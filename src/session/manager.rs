//! Session Manager - encrypted cookie sessions
//!
//! The visitor session only has to survive the round trip to the provider,
//! so it lives in a single AES-256-GCM encrypted cookie instead of a
//! server-side store.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse};
use log::{debug, warn};
use std::collections::HashMap;

use crate::models::AuthError;
use crate::session::store::VisitorSession;
use crate::settings::TwitterAuthSettings;
use crate::utils::crypto::{decrypt_data, derive_encryption_key, encrypt_data};

/// Cookie holding the encrypted visitor session
pub const SESSION_COOKIE_NAME: &str = "twitter_auth_session";

/// Upper bound for the session cookie lifetime (one day)
pub const MAX_SESSION_MINUTES: u32 = 24 * 60;

#[derive(Clone)]
pub struct SessionManager {
    encryption_key: [u8; 32],
    cookie_secure: bool,
    max_age: Duration,
    cookie_path: String,
}

impl SessionManager {
    /// Lifetimes above `MAX_SESSION_MINUTES` are clamped to it
    #[must_use]
    pub fn new(key: &[u8], cookie_secure: bool, max_age_minutes: u64) -> Self {
        let minutes = u32::try_from(max_age_minutes)
            .map_or(MAX_SESSION_MINUTES, |minutes| minutes.min(MAX_SESSION_MINUTES));
        if u64::from(minutes) != max_age_minutes {
            warn!(
                "Session lifetime of {max_age_minutes} minutes exceeds the maximum, using {MAX_SESSION_MINUTES}"
            );
        }

        Self {
            encryption_key: derive_encryption_key(key),
            cookie_secure,
            max_age: Duration::minutes(i64::from(minutes)),
            cookie_path: "/".to_string(),
        }
    }

    #[must_use]
    pub fn from_settings(settings: &TwitterAuthSettings) -> Self {
        Self::new(
            settings.session.session_secret.as_bytes(),
            settings.cookies.secure,
            settings.session.temporary_state_minutes,
        )
    }

    /// Restrict the cookie to a path prefix
    #[must_use]
    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    /// Load the visitor session; a missing or undecryptable cookie yields an
    /// empty session
    #[must_use]
    pub fn load(&self, req: &HttpRequest) -> VisitorSession {
        let Some(cookie) = req.cookie(SESSION_COOKIE_NAME) else {
            debug!("No session cookie '{SESSION_COOKIE_NAME}' in request");
            return VisitorSession::new();
        };

        match decrypt_data::<HashMap<String, String>>(cookie.value(), &self.encryption_key) {
            Ok(values) => VisitorSession::from_values(values),
            Err(e) => {
                warn!("Discarding unreadable session cookie: {e}");
                VisitorSession::new()
            }
        }
    }

    /// Write the session back to the response if it changed
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be encrypted or the cookie
    /// header cannot be added
    pub fn persist(&self, session: &VisitorSession, response: &mut HttpResponse) -> Result<(), AuthError> {
        if !session.is_changed() {
            return Ok(());
        }

        let cookie = if session.is_empty() {
            self.expired_cookie()
        } else {
            self.session_cookie(&session.values())?
        };

        response
            .add_cookie(&cookie)
            .map_err(|e| AuthError::Session(format!("Failed to set session cookie: {e}")))
    }

    /// Encrypted session cookie for the given values
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails
    pub fn session_cookie(&self, values: &HashMap<String, String>) -> Result<Cookie<'static>, AuthError> {
        let value = encrypt_data(values, &self.encryption_key)
            .map_err(|e| AuthError::Session(format!("Failed to encrypt session: {e}")))?;

        Ok(self.cookie(value, self.max_age))
    }

    /// Cookie that removes the session from the browser
    #[must_use]
    pub fn expired_cookie(&self) -> Cookie<'static> {
        self.cookie(String::new(), Duration::ZERO)
    }

    #[must_use]
    pub const fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }

    // SameSite=Lax: the provider's redirect back is a cross-site top-level GET
    fn cookie(&self, value: String, max_age: Duration) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE_NAME, value)
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Lax)
            .path(self.cookie_path.clone())
            .max_age(max_age)
            .finish()
    }
}
