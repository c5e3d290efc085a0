use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;

use crate::api::orchestration::OrchestrationApi;

/// Call an orchestration operation by name
///
/// POST /api/orchestration/:operation
///
/// Always answers 200; the payload carries success or failure.
pub async fn call_operation(
    State(api): State<OrchestrationApi>,
    Path(operation): Path<String>,
    body: Option<Json<Value>>,
) -> Json<Value> {
    let payload = body.map(|Json(payload)| payload).unwrap_or(Value::Null);
    Json(api.call(&operation, payload).await)
}
