// Handshake logging in one place so no call site logs a token or secret
use log::{debug, info, warn};

use crate::models::AuthError;

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log provider configuration at startup
    pub fn log_provider_configured(provider: &str, api_base_url: &str, callback_path: &str) {
        info!("✅ {provider} sign-in configured (api: {api_base_url}, callback: {callback_path})");
    }

    /// Log the start of a handshake (temporary credentials issued)
    pub fn log_handshake_started(provider: &str, callback_uri: &str) {
        info!("🔄 Starting {provider} sign-in, callback: {callback_uri}");
    }

    /// Log the visitor returning from the provider
    pub fn log_callback_received(provider: &str, verifier_len: usize) {
        debug!("Received {provider} callback (verifier: {verifier_len} chars)");
    }

    /// Log a completed handshake
    pub fn log_handshake_completed(provider: &str, identification_key: &str) {
        info!("Completed {provider} sign-in, identity keyed by {identification_key}");
    }

    /// Log a failed handshake; details stay server-side
    pub fn log_handshake_failed(provider: &str, error: &AuthError) {
        if error.is_recoverable() {
            warn!("{provider} sign-in failed ({}): {error}", error.code());
        } else {
            log::error!("{provider} sign-in failed ({}): {error}", error.code());
        }
    }

    /// Log a session entry that could not be used
    pub fn log_stale_handshake_state(reason: &str) {
        warn!("Discarding temporary credentials from session: {reason}");
    }
}
