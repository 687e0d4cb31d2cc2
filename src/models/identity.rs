//! Provider-agnostic identity handed to the host application

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::oauth::ProviderUserProfile;

/// Identification key used for Twitter accounts
pub const TWITTER_ID_KEY: &str = "twitter_id";

/// Size suffix Twitter appends to thumbnail avatar URLs
pub const TWITTER_AVATAR_SUFFIX: &str = "_normal";

/// Identity record passed to the host's response factory
///
/// - `identification`: stable external ids, keyed by provider
/// - `attributes`: best-effort profile data the host may store
/// - `suggestions`: hints the host may accept or override
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedIdentity {
    pub identification: BTreeMap<String, String>,
    pub attributes: BTreeMap<String, String>,
    pub suggestions: BTreeMap<String, String>,
}

/// Rules for turning a provider profile into a `NormalizedIdentity`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityMapping {
    pub identification_key: String,
    /// Removed from avatar URLs to get the full resolution image
    pub avatar_size_suffix: Option<String>,
}

impl Default for IdentityMapping {
    fn default() -> Self {
        Self::twitter()
    }
}

impl IdentityMapping {
    #[must_use]
    pub fn twitter() -> Self {
        Self {
            identification_key: TWITTER_ID_KEY.to_string(),
            avatar_size_suffix: Some(TWITTER_AVATAR_SUFFIX.to_string()),
        }
    }

    /// Build the identity for a fetched profile
    #[must_use]
    pub fn normalize(&self, profile: &ProviderUserProfile) -> NormalizedIdentity {
        let mut identity = NormalizedIdentity::default();

        identity
            .identification
            .insert(self.identification_key.clone(), profile.uid.clone());

        if let Some(image_url) = profile.image_url.as_deref().filter(|url| !url.is_empty()) {
            identity
                .attributes
                .insert("avatarUrl".to_string(), self.full_size_avatar(image_url));
        }

        identity
            .suggestions
            .insert("username".to_string(), profile.nickname.clone());

        identity
    }

    /// Strip every occurrence of the size suffix
    #[must_use]
    pub fn full_size_avatar(&self, image_url: &str) -> String {
        match self.avatar_size_suffix.as_deref() {
            Some(suffix) if !suffix.is_empty() => image_url.replace(suffix, ""),
            _ => image_url.to_string(),
        }
    }
}
