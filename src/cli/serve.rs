use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::api;
use crate::cli::commands::ServeArgs;
use crate::config::load_config;
use crate::errors::RoofdeskError;

pub async fn handle_serve(args: ServeArgs) -> Result<(), RoofdeskError> {
    let mut config = load_config(args.config.as_deref()).await?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(db) = args.db {
        config.database.path = db;
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!(addr = %addr, db = %config.database.path.display(), "Starting API server");

    let state = api::create_app_state(config).await?;
    let app = api::build_router(state.clone());

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.shutdown.clone()))
        .await
        .map_err(|e| RoofdeskError::Internal(format!("Server error: {}", e)))?;

    state.shutdown();
    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Shutdown requested"),
        _ = token.cancelled() => {}
    }
}
