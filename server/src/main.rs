use std::time::Duration;

use axum::Router;
use dotenvy::dotenv;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use marquee_server::config::Config;
use marquee_server::routes::create_routes;
use marquee_server::state::AppState;

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("marquee_server=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    let addr = config.bind_addr;
    let state = AppState::new(config);
    tracing::info!(
        events = state.catalog.len(),
        payment_delay_ms = state.config.payment_delay.as_millis() as u64,
        "Catalog loaded"
    );

    let checkout = state.checkout.clone();
    let sweep_stop = CancellationToken::new();
    let sweep_period = state.config.checkout_ttl.min(Duration::from_secs(60));
    let sweeper = checkout.spawn_sweeper(sweep_period, sweep_stop.clone());
    let app: Router = create_routes(state);

    tracing::info!("🚀 Server running at http://{}", addr);

    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    sweep_stop.cancel();
    if let Err(e) = sweeper.await {
        tracing::error!("Session sweeper failed: {}", e);
    }
    checkout.shutdown().await;
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
