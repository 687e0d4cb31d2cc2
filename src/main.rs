#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![deny(warnings)]
#![allow(clippy::multiple_crate_versions)]

use actix_web::{middleware::Logger, web, App, HttpServer};
use std::sync::Arc;
use twitter_auth::{
    authentication::CompletionPageFactory,
    handlers::{configure_routes, AuthCallbackHandler, PROVIDER_SETTINGS_PREFIX},
    oauth::{twitter::DEFAULT_API_BASE_URL, TwitterProvider},
    session::SessionManager,
    settings::{ProviderConfig, TwitterAuthSettings},
    utils::logging::LoggingHelper,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from Settings.toml and environment variables
    // This also loads .env file and initializes the logger
    let settings = TwitterAuthSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let config = ProviderConfig::from_store(&settings, PROVIDER_SETTINGS_PREFIX)
        .map_err(|e| std::io::Error::other(format!("Failed to initialize sign-in handler: {e}")))?;
    let provider = TwitterProvider::from_config(&config)
        .map_err(|e| std::io::Error::other(format!("Failed to initialize Twitter provider: {e}")))?;

    let api_base_url = config
        .api_base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let handler = AuthCallbackHandler::new(
        config,
        Arc::new(provider),
        Arc::new(CompletionPageFactory::new()),
    );

    LoggingHelper::log_provider_configured(
        handler.provider_name(),
        &api_base_url,
        &settings.application.callback_path,
    );
    start_server(handler, settings).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    handler: AuthCallbackHandler,
    settings: TwitterAuthSettings,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let callback_path = settings.application.callback_path.clone();
    let handler = web::Data::new(handler);
    let session_manager = web::Data::new(
        SessionManager::from_settings(&settings).with_cookie_path(callback_path.clone()),
    );
    let settings = web::Data::new(settings);

    HttpServer::new(move || {
        let callback_path = callback_path.clone();
        App::new()
            .app_data(handler.clone())
            .app_data(session_manager.clone())
            .app_data(settings.clone())
            .wrap(Logger::default())
            .configure(move |cfg| configure_routes(cfg, &callback_path))
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &TwitterAuthSettings) {
    let callback_path = &settings.application.callback_path;
    println!("Starting Twitter sign-in service on http://{bind_address}");
    println!();
    println!("Endpoints:");
    println!("  GET  {callback_path} - Start or complete Twitter sign-in");
    println!("  GET  /ping - Health check");
    println!();
    println!("Callback URL to register with Twitter:");
    match settings.application.redirect_base_url.as_deref() {
        Some(base) => println!("  {}{callback_path}", base.trim_end_matches('/')),
        None => println!("  http://{bind_address}{callback_path} (set redirect_base_url for public deployments)"),
    }
}
