//! Pre-built test data

use crate::oauth::ProviderUserProfile;
use crate::session::SessionManager;
use crate::settings::{ProviderConfig, TwitterAuthSettings};

/// Session secret shared by fixtures so cookies survive between requests
pub const TEST_SESSION_SECRET: &str = "test_session_secret_32_chars_min";

/// Consumer credentials for tests
#[must_use]
pub fn client_config() -> ProviderConfig {
    ProviderConfig {
        api_key: "test-api-key".to_string(),
        api_secret: "test-api-secret".to_string(),
        api_base_url: None,
    }
}

/// The profile `StubIdentityProvider` returns by default
#[must_use]
pub fn profile() -> ProviderUserProfile {
    ProviderUserProfile {
        uid: "42".to_string(),
        nickname: "alice".to_string(),
        name: Some("Alice".to_string()),
        image_url: Some("https://img/x_normal.png".to_string()),
        email: None,
    }
}

/// Settings with test credentials and insecure cookies (tests run over http)
#[must_use]
pub fn test_settings() -> TwitterAuthSettings {
    let mut settings = TwitterAuthSettings::default();
    settings.twitter.api_key = "test-api-key".to_string();
    settings.twitter.api_secret = "test-api-secret".to_string();
    settings.session.session_secret = TEST_SESSION_SECRET.to_string();
    settings.cookies.secure = false;
    settings
}

#[must_use]
pub fn session_manager() -> SessionManager {
    SessionManager::from_settings(&test_settings())
}
