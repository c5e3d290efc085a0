use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use crate::api::orchestration::{
    AgentRef, AgentStatusResponse, AssignTaskRequest, AssignTaskResponse, CreateHierarchyRequest,
    CreateSubAgentRequest, CreateSubAgentResponse, FailureKind, HierarchyResponse,
    ListAgentsResponse, MailboxResponse, OrchestrationApi, PrimaryAgentResponse,
    RegisterPrimaryRequest, RegisterPrimaryResponse, TaskSpec, TerminateResponse,
};
use crate::domain::task::Report;

fn failure_status(kind: FailureKind) -> StatusCode {
    match kind {
        FailureKind::NotFound => StatusCode::NOT_FOUND,
        FailureKind::Rejected => StatusCode::CONFLICT,
        FailureKind::BadRequest => StatusCode::BAD_REQUEST,
    }
}

/// Create a sub-agent
///
/// POST /api/agents
pub async fn create_agent(
    State(api): State<OrchestrationApi>,
    Json(req): Json<CreateSubAgentRequest>,
) -> (StatusCode, Json<CreateSubAgentResponse>) {
    (StatusCode::CREATED, Json(api.create_sub_agent(req).await))
}

/// List every live agent
///
/// GET /api/agents
pub async fn list_agents(State(api): State<OrchestrationApi>) -> Json<ListAgentsResponse> {
    Json(api.list_all_agents().await)
}

/// Get one agent's status
///
/// GET /api/agents/:id
pub async fn get_agent(
    State(api): State<OrchestrationApi>,
    Path(id): Path<String>,
) -> (StatusCode, Json<AgentStatusResponse>) {
    let response = api.get_agent_status(AgentRef::parse(&id)).await;
    let status = match response {
        AgentStatusResponse::Found(_) => StatusCode::OK,
        AgentStatusResponse::NotFound(_) => StatusCode::NOT_FOUND,
    };

    (status, Json(response))
}

/// Terminate an agent
///
/// DELETE /api/agents/:id
pub async fn terminate_agent(
    State(api): State<OrchestrationApi>,
    Path(id): Path<String>,
) -> (StatusCode, Json<TerminateResponse>) {
    let response = api.terminate_agent(AgentRef::parse(&id)).await;
    let status = match &response {
        TerminateResponse::Terminated { .. } => StatusCode::OK,
        TerminateResponse::Failed(failure) => failure_status(failure.kind),
    };

    (status, Json(response))
}

/// Assign a task to an agent; execution continues in the background
///
/// POST /api/agents/:id/tasks
pub async fn assign_task(
    State(api): State<OrchestrationApi>,
    Path(id): Path<String>,
    Json(task): Json<TaskSpec>,
) -> (StatusCode, Json<AssignTaskResponse>) {
    let response = api
        .assign_task_to_agent(AssignTaskRequest {
            agent_id: AgentRef::parse(&id),
            task,
        })
        .await;
    let status = match &response {
        AssignTaskResponse::Assigned { .. } => StatusCode::ACCEPTED,
        AssignTaskResponse::Failed(failure) => failure_status(failure.kind),
    };

    (status, Json(response))
}

/// Reports produced by an agent, oldest first
///
/// GET /api/agents/:id/reports
pub async fn get_reports(
    State(api): State<OrchestrationApi>,
    Path(id): Path<String>,
) -> Json<Vec<Report>> {
    Json(api.get_agent_reports(AgentRef::parse(&id)).await)
}

/// Drain the reports delivered to an agent by its children
///
/// GET /api/agents/:id/mailbox
pub async fn read_mailbox(
    State(api): State<OrchestrationApi>,
    Path(id): Path<String>,
) -> (StatusCode, Json<MailboxResponse>) {
    let response = api.read_mailbox(AgentRef::parse(&id)).await;
    let status = match &response {
        MailboxResponse::Read { .. } => StatusCode::OK,
        MailboxResponse::Failed(failure) => failure_status(failure.kind),
    };

    (status, Json(response))
}

/// Register the external controller as the primary agent
///
/// POST /api/agents/primary
pub async fn register_primary(
    State(api): State<OrchestrationApi>,
    body: Option<Json<RegisterPrimaryRequest>>,
) -> (StatusCode, Json<RegisterPrimaryResponse>) {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    (StatusCode::CREATED, Json(api.register_as_primary_agent(req).await))
}

/// GET /api/agents/primary
pub async fn get_primary(
    State(api): State<OrchestrationApi>,
) -> (StatusCode, Json<PrimaryAgentResponse>) {
    let response = api.get_primary_agent_id().await;
    let status = match response {
        PrimaryAgentResponse::Found { .. } => StatusCode::OK,
        PrimaryAgentResponse::NotFound(_) => StatusCode::NOT_FOUND,
    };

    (status, Json(response))
}

/// Create a coordinator with its sub-agents
///
/// POST /api/hierarchies
pub async fn create_hierarchy(
    State(api): State<OrchestrationApi>,
    Json(req): Json<CreateHierarchyRequest>,
) -> (StatusCode, Json<HierarchyResponse>) {
    (StatusCode::CREATED, Json(api.create_agent_hierarchy(req).await))
}
