//! Testing utilities for the sign-in handler
//!
//! Stubs for the handler's collaborators plus shared fixtures, available to
//! unit tests and (with the `testing` feature) to integration tests.
//!
//! ## Organization
//!
//! - [`fixtures`] - Provider config, profiles, settings and session manager
//! - [`mock`] - `StubIdentityProvider` and `RecordingResponseFactory`
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use twitter_auth::testing::{client_config, RecordingResponseFactory, StubIdentityProvider};
//!
//! let handler = AuthCallbackHandler::new(
//!     client_config(),
//!     Arc::new(StubIdentityProvider::new()),
//!     Arc::new(RecordingResponseFactory::new()),
//! );
//! ```

pub mod fixtures;
pub mod mock;

pub use fixtures::{client_config, profile, session_manager, test_settings, TEST_SESSION_SECRET};
pub use mock::{RecordingResponseFactory, StubIdentityProvider, StubLeg, STUB_AUTHORIZE_URL};
