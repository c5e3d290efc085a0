use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::errors::ApiError;
use crate::api::orchestration::{InvocationResponse, OrchestrationApi};
use crate::domain::capability::{CapabilityCategory, CapabilityDescriptor, Parameters};

/// Query string for capability listings
#[derive(Debug, Default, Deserialize)]
pub struct CapabilityQuery {
    /// Case-insensitive match on name or description
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CapabilityListResponse {
    pub capabilities: Vec<CapabilityDescriptor>,
    pub total_count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub category: CapabilityCategory,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub category: CapabilityCategory,
    pub capabilities: Vec<CapabilityDescriptor>,
}

/// List registered capabilities, optionally filtered by `q`
///
/// GET /api/capabilities
pub async fn list_capabilities(
    State(api): State<OrchestrationApi>,
    Query(query): Query<CapabilityQuery>,
) -> Json<CapabilityListResponse> {
    let registry = api.manager().registry();
    let capabilities: Vec<CapabilityDescriptor> = match query.q.as_deref() {
        Some(q) => registry
            .search(q)
            .iter()
            .map(|c| CapabilityDescriptor::of(c.as_ref()))
            .collect(),
        None => registry
            .all()
            .iter()
            .map(|c| CapabilityDescriptor::of(c.as_ref()))
            .collect(),
    };

    Json(CapabilityListResponse {
        total_count: capabilities.len(),
        capabilities,
    })
}

/// GET /api/capabilities/:name
pub async fn get_capability(
    State(api): State<OrchestrationApi>,
    Path(name): Path<String>,
) -> Result<Json<CapabilityDescriptor>, ApiError> {
    let capability = api
        .manager()
        .registry()
        .get(&name)
        .ok_or_else(|| ApiError::not_found(format!("Capability '{}' not found", name)))?;

    Ok(Json(CapabilityDescriptor::of(capability.as_ref())))
}

/// Invoke a capability directly with a JSON object of parameters
///
/// POST /api/capabilities/:name/execute
pub async fn execute_capability(
    State(api): State<OrchestrationApi>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<InvocationResponse>, ApiError> {
    let parameters: Parameters = match body {
        Value::Object(map) => map,
        Value::Null => Parameters::new(),
        _ => return Err(ApiError::bad_request("Parameters must be a JSON object")),
    };

    let response = api.invoke_capability(&name, parameters).await?;
    Ok(Json(response))
}

/// Categories that have at least one capability, with counts
///
/// GET /api/categories
pub async fn list_categories(State(api): State<OrchestrationApi>) -> Json<Vec<CategorySummary>> {
    let registry = api.manager().registry();
    let summaries = registry
        .categories()
        .into_iter()
        .map(|category| CategorySummary {
            category,
            count: registry.by_category(category).len(),
        })
        .collect();

    Json(summaries)
}

/// GET /api/categories/:category
pub async fn get_category(
    State(api): State<OrchestrationApi>,
    Path(category): Path<String>,
) -> Result<Json<CategoryResponse>, ApiError> {
    let category: CapabilityCategory = category.parse()?;
    let capabilities = api
        .manager()
        .registry()
        .by_category(category)
        .iter()
        .map(|c| CapabilityDescriptor::of(c.as_ref()))
        .collect();

    Ok(Json(CategoryResponse {
        category,
        capabilities,
    }))
}
