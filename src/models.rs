use serde::{Deserialize, Serialize};

pub mod auth;
pub mod identity;

pub use auth::AuthError;
pub use identity::{IdentityMapping, NormalizedIdentity};

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
