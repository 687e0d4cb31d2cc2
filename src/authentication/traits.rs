//! Host-facing authentication traits

use actix_web::HttpResponse;
use async_trait::async_trait;

use crate::models::NormalizedIdentity;

/// Builds the host's HTTP response for a completed sign-in
///
/// Implementations decide whether to log the visitor in, offer account
/// registration or render a popup completion page. The callback handler
/// returns the produced response unchanged.
#[async_trait(?Send)]
pub trait IdentityResponseFactory: Send + Sync {
    async fn make(&self, identity: NormalizedIdentity) -> HttpResponse;
}
