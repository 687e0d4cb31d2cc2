#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

/// Version of the twitter-auth service
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod authentication;
pub mod handlers;
pub mod models;
pub mod oauth;
pub mod session;
pub mod settings;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Re-export commonly used items
pub use authentication::{CompletionPageFactory, IdentityResponseFactory};
pub use handlers::{health, twitter_callback, AuthCallbackHandler};
pub use models::{AuthError, IdentityMapping, NormalizedIdentity};
pub use oauth::{CallbackQuery, CallbackRequest, IdentityProvider, OriginalUri, TwitterProvider};
pub use session::{SessionManager, SessionStore};
pub use settings::{ProviderConfig, SettingsStore, TwitterAuthSettings};
