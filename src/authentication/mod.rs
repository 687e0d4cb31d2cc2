//! Authentication response module
//!
//! The callback handler hands the normalized identity to an
//! `IdentityResponseFactory`; the host decides what the browser sees.

pub mod completion;
pub mod traits;

pub use completion::CompletionPageFactory;
pub use traits::IdentityResponseFactory;
