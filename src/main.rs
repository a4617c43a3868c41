// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc};

use vehicle_diagnostics::application::alert::AlertSink;
use vehicle_diagnostics::application::engine::DiagnosticEngine;
use vehicle_diagnostics::application::persistence::Persistence;
use vehicle_diagnostics::application::simulator::SensorSimulator;
use vehicle_diagnostics::infrastructure::alert_sink::TracingAlertSink;
use vehicle_diagnostics::infrastructure::config::{StorageBackend, load_app_config};
use vehicle_diagnostics::infrastructure::file_store::FileStore;
use vehicle_diagnostics::infrastructure::memory_store::MemoryStore;
use vehicle_diagnostics::presentation::app_state::AppState;
use vehicle_diagnostics::presentation::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = load_app_config()?;

    // Create persistence (infrastructure layer)
    let persistence: Arc<dyn Persistence> = match config.storage.backend {
        StorageBackend::File => Arc::new(FileStore::new(&config.storage.dir)),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    let alerts: Arc<dyn AlertSink> = Arc::new(TracingAlertSink::new());

    // Create the engine (application layer)
    let engine = DiagnosticEngine::load(
        persistence,
        Box::new(SensorSimulator::new(config.engine.seed)),
        alerts,
        config.engine.tick_interval(),
    )
    .await;
    if config.engine.autoconnect {
        engine.connect().await;
    }

    // Build router (presentation layer)
    let state = Arc::new(AppState { engine });
    let router = router(state);

    // Start server
    let addr: SocketAddr = config.server.addr.parse()?;
    tracing::info!("Starting vehicle-diagnostics service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
