use bluffpoker_web::logging::init_logging;
use bluffpoker_web::server::{AppContext, ServerConfig, WebServer};
use bluffpoker_web::settings::AppSettings;

#[tokio::main]
async fn main() {
    let settings = match AppSettings::from_env() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("invalid settings: {}", err);
            std::process::exit(2);
        }
    };

    init_logging(settings.log_json);

    let config = ServerConfig::from_settings(&settings);
    let context = AppContext::with_session_ttl(config, settings.session_ttl());
    let server = WebServer::from_context(context);

    let handle = match server.start().await {
        Ok(handle) => handle,
        Err(err) => {
            tracing::error!(error = %err, "failed to start server");
            std::process::exit(1);
        }
    };

    tracing::info!(addr = %handle.addr(), "bluffpoker server ready");

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }

    tracing::info!("shutting down");
    handle.shutdown().await;
}
