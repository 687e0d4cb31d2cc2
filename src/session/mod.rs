//! Session Management Module
//!
//! The visitor session carries the temporary credentials between the two
//! legs of the sign-in handshake.
//!
//! # Modules
//!
//! - [`store`] - The `SessionStore` capability and the per-request session
//! - [`manager`] - Encrypted cookie loading and persistence

pub mod manager;
pub mod store;

pub use manager::{SessionManager, SESSION_COOKIE_NAME};
pub use store::{SessionStore, VisitorSession, TEMPORARY_CREDENTIALS_KEY};
