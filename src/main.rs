use std::sync::Arc;

use agentic_tools_api::agents::AgentManager;
use agentic_tools_api::api::{self, OrchestrationApi};
use agentic_tools_api::config::AppConfig;
use agentic_tools_api::domain::capability::CapabilityRegistry;
use agentic_tools_api::infrastructure::capabilities;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = AppConfig::from_env().expect("Invalid configuration");
    let addr = config.listen_addr().expect("Invalid listen address");

    // Register capabilities
    let mut registry = CapabilityRegistry::new();
    capabilities::register_defaults(&mut registry, &config.capability_root)
        .expect("Failed to register built-in capabilities");
    tracing::info!(count = registry.len(), "Capabilities registered");

    let manager = AgentManager::new(Arc::new(registry), config.manager_config());
    let app = api::router(OrchestrationApi::new(manager.clone()));

    // Start server
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed");

    tracing::info!("Stopping agents");
    manager.shutdown().await;
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
