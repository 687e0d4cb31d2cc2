// HTTP handlers for the sign-in service
use actix_web::web;

pub mod callback;
pub mod health;
pub mod helpers;

pub use callback::{twitter_callback, AuthCallbackHandler, PROVIDER_SETTINGS_PREFIX};
pub use health::health;

/// Mount the callback route at `callback_path` and the health check at `/ping`
pub fn configure_routes(cfg: &mut web::ServiceConfig, callback_path: &str) {
    cfg.route(callback_path, web::get().to(twitter_callback))
        .route("/ping", web::get().to(health));
}
