use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::api::orchestration::OrchestrationApi;

/// Health check endpoint
///
/// GET /health
pub async fn health_check(State(api): State<OrchestrationApi>) -> Json<Value> {
    let manager = api.manager();
    let registry = manager.registry();

    Json(json!({
        "status": "healthy",
        "total_capabilities": registry.len(),
        "categories": registry.categories(),
        "total_agents": manager.list_agents().await.len(),
    }))
}
