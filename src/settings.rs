use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

use crate::models::AuthError;
use crate::oauth::credentials::ClientCredentials;
use crate::oauth::twitter::DEFAULT_API_BASE_URL;
use crate::utils::crypto::generate_secret;

/// Environment variable naming a directory with an overriding `Settings.toml`
pub const SECRETS_DIR_ENV: &str = "TWITTER_AUTH_SECRETS_DIR";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TwitterAuthSettings {
    pub application: ApplicationSettings,
    pub twitter: TwitterSettings,
    pub session: SessionSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Public base URL when the service runs behind a proxy or under a prefix
    pub redirect_base_url: Option<String>,
    pub callback_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterSettings {
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub session_secret: String,
    /// How long temporary credentials survive between the two legs
    pub temporary_state_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            redirect_base_url: None,
            callback_path: "/auth/twitter".to_string(),
        }
    }
}

impl Default for TwitterSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_secret: String::new(), // Will be generated if empty
            temporary_state_minutes: 15,
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TwitterAuthSettings {
    /// Load settings from configuration files and environment variables,
    /// then initialize logging at the configured level
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - Logger initialization fails
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        env_logger::Builder::new()
            .parse_filters(&settings.logging.level)
            .try_init()?;

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `TWITTER_AUTH_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed
    fn load_base_settings() -> Result<Self, Box<dyn std::error::Error>> {
        let mut settings = Self::default();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_toml_file(&default_config_path)?;
            println!("✓ Loaded base settings from {}", default_config_path.display());
        }

        if let Ok(secrets_dir) = std::env::var(SECRETS_DIR_ENV) {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_toml_file(&secrets_path)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ {SECRETS_DIR_ENV} set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a settings file; missing sections and keys take their defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML
    pub fn from_toml_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let toml_content = fs::read_to_string(path)?;
        Ok(basic_toml::from_str(&toml_content)?)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_twitter_env_overrides(&mut settings.twitter);
        Self::apply_session_env_overrides(&mut settings.session);
        Self::apply_cookie_env_overrides(&mut settings.cookies);
        Self::apply_logging_env_overrides(&mut settings.logging);
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(redirect_base_url) = std::env::var("REDIRECT_BASE_URL") {
            app_settings.redirect_base_url =
                Some(redirect_base_url).filter(|url| !url.trim().is_empty());
        }
    }

    fn apply_twitter_env_overrides(twitter_settings: &mut TwitterSettings) {
        if let Ok(api_key) = std::env::var("TWITTER_API_KEY") {
            twitter_settings.api_key = api_key;
        }
        if let Ok(api_secret) = std::env::var("TWITTER_API_SECRET") {
            twitter_settings.api_secret = api_secret;
        }
        if let Ok(api_base_url) = std::env::var("TWITTER_API_BASE_URL") {
            twitter_settings.api_base_url = api_base_url;
        }
    }

    /// Apply environment overrides for session settings
    pub fn apply_session_env_overrides(session_settings: &mut SessionSettings) {
        if let Ok(value_str) = std::env::var("TEMPORARY_STATE_MINUTES") {
            if let Ok(value) = value_str.parse::<u64>() {
                session_settings.temporary_state_minutes = value;
            }
        }

        Self::handle_session_secret_override(session_settings);
    }

    fn handle_session_secret_override(session_settings: &mut SessionSettings) {
        let env_secret_set = std::env::var("SESSION_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                session_settings.session_secret = secret;
                true
            }
        });

        if !env_secret_set && session_settings.session_secret.is_empty() {
            session_settings.session_secret = generate_secret();
            Self::warn_about_generated_secret();
        }
    }

    fn warn_about_generated_secret() {
        eprintln!("⚠️  WARNING: Using auto-generated session secret");
        eprintln!("🔒 For production use, set the SESSION_SECRET environment variable");
        eprintln!("   or configure session_secret in Settings.toml");
        eprintln!("💡 Sign-ins in progress are lost on restart unless it is explicitly configured");
    }

    fn apply_cookie_env_overrides(cookie_settings: &mut CookieSettings) {
        if let Ok(cookie_secure_str) = std::env::var("COOKIE_SECURE") {
            if let Ok(cookie_secure) = cookie_secure_str.parse::<bool>() {
                cookie_settings.secure = cookie_secure;
            }
        }
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            logging_settings.level = log_level;
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }
}

/// Key-value configuration lookup
///
/// Keys are dotted `section.name` paths, e.g. `twitter.api_key`.
pub trait SettingsStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

impl SettingsStore for TwitterAuthSettings {
    fn get(&self, key: &str) -> Option<String> {
        match key {
            "twitter.api_key" => Some(self.twitter.api_key.clone()),
            "twitter.api_secret" => Some(self.twitter.api_secret.clone()),
            "twitter.api_base_url" => Some(self.twitter.api_base_url.clone()),
            "application.callback_path" => Some(self.application.callback_path.clone()),
            "application.redirect_base_url" => self.application.redirect_base_url.clone(),
            _ => None,
        }
    }
}

impl SettingsStore for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

/// Consumer credentials and endpoint for one provider, read once at startup
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: Option<String>,
}

impl ProviderConfig {
    /// Read `{prefix}.api_key`, `{prefix}.api_secret` and the optional
    /// `{prefix}.api_base_url`
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the key or secret is missing or
    /// blank
    pub fn from_store(store: &dyn SettingsStore, prefix: &str) -> Result<Self, AuthError> {
        let required = |name: &str| {
            let key = format!("{prefix}.{name}");
            store
                .get(&key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or_else(|| AuthError::Configuration(format!("Setting '{key}' is missing or empty")))
        };

        let api_key = required("api_key")?;
        let api_secret = required("api_secret")?;
        let api_base_url = store
            .get(&format!("{prefix}.api_base_url"))
            .filter(|value| !value.trim().is_empty());

        Ok(Self {
            api_key,
            api_secret,
            api_base_url,
        })
    }

    /// Client credentials for a request arriving at `callback_uri`
    #[must_use]
    pub fn client_credentials(&self, callback_uri: impl Into<String>) -> ClientCredentials {
        ClientCredentials {
            identifier: self.api_key.clone(),
            secret: self.api_secret.clone(),
            callback_uri: callback_uri.into(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[redacted]")
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose, Engine as _};
    use serial_test::serial;

    fn clean_env_vars() {
        for var in [
            "SESSION_SECRET",
            "TEMPORARY_STATE_MINUTES",
            "TWITTER_API_KEY",
            "TWITTER_API_SECRET",
            "TWITTER_API_BASE_URL",
            "REDIRECT_BASE_URL",
            "COOKIE_SECURE",
            "LOG_LEVEL",
            SECRETS_DIR_ENV,
        ] {
            std::env::remove_var(var);
        }
    }

    fn store(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = TwitterAuthSettings::default();
        assert_eq!(settings.session.session_secret, "");
        assert_eq!(settings.session.temporary_state_minutes, 15);
        assert_eq!(settings.application.callback_path, "/auth/twitter");
        assert_eq!(settings.twitter.api_base_url, DEFAULT_API_BASE_URL);
        assert!(settings.cookies.secure);
        assert_eq!(settings.get_bind_address(), "0.0.0.0:8080");
    }

    #[test]
    #[serial]
    fn test_session_secret_env_override() {
        clean_env_vars();

        let mut session_settings = SessionSettings {
            session_secret: "default-secret".to_string(),
            temporary_state_minutes: 15,
        };
        std::env::set_var("SESSION_SECRET", "env-override-secret");
        std::env::set_var("TEMPORARY_STATE_MINUTES", "5");

        TwitterAuthSettings::apply_session_env_overrides(&mut session_settings);

        assert_eq!(session_settings.session_secret, "env-override-secret");
        assert_eq!(session_settings.temporary_state_minutes, 5);
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_session_secret_auto_generation() {
        clean_env_vars();

        let mut session_settings = SessionSettings::default();
        TwitterAuthSettings::apply_session_env_overrides(&mut session_settings);

        let decoded = general_purpose::STANDARD
            .decode(&session_settings.session_secret)
            .unwrap();
        assert_eq!(decoded.len(), 32);
    }

    #[test]
    #[serial]
    fn test_invalid_numeric_override_is_ignored() {
        clean_env_vars();
        std::env::set_var("TEMPORARY_STATE_MINUTES", "soon");
        std::env::set_var("PORT", "eighty");

        let mut settings = TwitterAuthSettings::default();
        TwitterAuthSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.session.temporary_state_minutes, 15);
        assert_eq!(settings.application.port, 8080);
        std::env::remove_var("PORT");
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_twitter_env_overrides() {
        clean_env_vars();
        std::env::set_var("TWITTER_API_KEY", "env-key");
        std::env::set_var("TWITTER_API_SECRET", "env-secret");
        std::env::set_var("REDIRECT_BASE_URL", "https://forum.example.com");
        std::env::set_var("COOKIE_SECURE", "false");

        let mut settings = TwitterAuthSettings::default();
        TwitterAuthSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.twitter.api_key, "env-key");
        assert_eq!(settings.twitter.api_secret, "env-secret");
        assert_eq!(
            settings.application.redirect_base_url.as_deref(),
            Some("https://forum.example.com")
        );
        assert!(!settings.cookies.secure);
        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_secrets_dir_precedence() {
        clean_env_vars();
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(
            temp_dir.path().join("Settings.toml"),
            "[twitter]\napi_key = \"dir-key\"\napi_secret = \"dir-secret\"\n\n[session]\ntemporary_state_minutes = 3\n",
        )
        .unwrap();
        std::env::set_var(SECRETS_DIR_ENV, temp_dir.path());

        let settings = TwitterAuthSettings::load_base_settings().unwrap();

        assert_eq!(settings.twitter.api_key, "dir-key");
        assert_eq!(settings.session.temporary_state_minutes, 3);
        // Sections absent from the file keep their defaults
        assert_eq!(settings.application.callback_path, "/auth/twitter");
        clean_env_vars();
    }

    #[test]
    fn test_settings_store_keys() {
        let mut settings = TwitterAuthSettings::default();
        settings.twitter.api_key = "key".to_string();
        settings.twitter.api_secret = "secret".to_string();

        assert_eq!(SettingsStore::get(&settings, "twitter.api_key").as_deref(), Some("key"));
        assert_eq!(SettingsStore::get(&settings, "twitter.api_secret").as_deref(), Some("secret"));
        assert_eq!(SettingsStore::get(&settings, "twitter.unknown"), None);
    }

    #[test]
    fn test_provider_config_from_store() {
        let config = ProviderConfig::from_store(
            &store(&[("twitter.api_key", " key "), ("twitter.api_secret", "secret")]),
            "twitter",
        )
        .unwrap();

        assert_eq!(config.api_key, "key");
        assert_eq!(config.api_base_url, None);

        let client = config.client_credentials("https://forum.test/auth/twitter");
        assert_eq!(client.identifier, "key");
        assert_eq!(client.secret, "secret");
        assert_eq!(client.callback_uri, "https://forum.test/auth/twitter");
    }

    #[test]
    fn test_provider_config_rejects_missing_or_empty() {
        let missing_secret = store(&[("twitter.api_key", "key")]);
        assert!(matches!(
            ProviderConfig::from_store(&missing_secret, "twitter"),
            Err(AuthError::Configuration(_))
        ));

        let blank_key = store(&[("twitter.api_key", "  "), ("twitter.api_secret", "secret")]);
        assert!(matches!(
            ProviderConfig::from_store(&blank_key, "twitter"),
            Err(AuthError::Configuration(_))
        ));
    }

    #[test]
    fn test_provider_config_debug_redacts_secret() {
        let config = ProviderConfig::from_store(
            &store(&[("twitter.api_key", "key"), ("twitter.api_secret", "hunter2")]),
            "twitter",
        )
        .unwrap();

        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
