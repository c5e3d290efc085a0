// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;
pub mod orchestration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::{agents, capabilities, health, orchestration as calls};
pub use orchestration::OrchestrationApi;

/// Build the HTTP router over an orchestration API
pub fn router(api: OrchestrationApi) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Capability routes
        .route("/api/capabilities", get(capabilities::list_capabilities))
        .route("/api/capabilities/:name", get(capabilities::get_capability))
        .route(
            "/api/capabilities/:name/execute",
            post(capabilities::execute_capability),
        )
        .route("/api/categories", get(capabilities::list_categories))
        .route("/api/categories/:category", get(capabilities::get_category))
        // Agent routes
        .route(
            "/api/agents",
            post(agents::create_agent).get(agents::list_agents),
        )
        .route(
            "/api/agents/primary",
            post(agents::register_primary).get(agents::get_primary),
        )
        .route(
            "/api/agents/:id",
            get(agents::get_agent).delete(agents::terminate_agent),
        )
        .route("/api/agents/:id/tasks", post(agents::assign_task))
        .route("/api/agents/:id/reports", get(agents::get_reports))
        .route("/api/agents/:id/mailbox", get(agents::read_mailbox))
        .route("/api/hierarchies", post(agents::create_hierarchy))
        // Operations by name
        .route("/api/orchestration/:operation", post(calls::call_operation))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(api)
}
