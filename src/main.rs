use std::{net::SocketAddr, sync::Arc};

use tracing::{error, info};
use tuberelay::{
    common::{AnyResult, logger},
    configs::Config,
    server::AppState,
    sources::youtube::YouTubeResolver,
    transport,
};

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;
    logger::init(&config);

    info!(
        "tuberelay {} (commit {}, built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("GIT_COMMIT_SHORT").unwrap_or("unknown"),
        option_env!("BUILD_TIME").unwrap_or("unknown"),
    );

    let resolver = YouTubeResolver::new(&config.youtube)?;
    info!("YouTube clients: {}", resolver.client_names().join(", "));

    let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = Arc::new(AppState::new(config, Arc::new(resolver)));

    let app = transport::http_server::router(state)
        .layer(tower_http::trace::TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Relay listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Failed to listen for shutdown signal: {}", e),
    }
}
