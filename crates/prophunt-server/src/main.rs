use tracing_subscriber::EnvFilter;

use prophunt_core::Arena;
use prophunt_server::build_app;
use prophunt_server::config::{LogFormat, ServerConfig};

#[tokio::main]
async fn main() {
    let config = ServerConfig::load();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    config.validate();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Prop hunt server starting");

    let arenas = if std::path::Path::new(&config.arenas_dir).is_dir() {
        match Arena::load_dir(&config.arenas_dir) {
            Ok(arenas) => arenas,
            Err(e) => {
                tracing::error!(dir = %config.arenas_dir, "Failed to load arenas: {e}");
                std::process::exit(1);
            }
        }
    } else {
        Vec::new()
    };
    tracing::info!(count = arenas.len(), "Arenas loaded");

    let listen_addr = config.listen_addr.clone();
    let (app, state) = build_app(config, arenas);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %listen_addr, "Failed to bind: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(addr = %listen_addr, "Listening");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {e}");
        }
        tracing::info!("Shutdown requested");
    };
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!("Server error: {e}");
    }

    state.tick.stop().await;
}
