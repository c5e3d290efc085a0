// Orchestration API
//
// The operations an external controller calls. Every operation returns a
// structured payload, success or failure; nothing here returns an error to
// the caller.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::agents::{AgentError, AgentManager, AgentStatusSnapshot, HierarchyConfig, HierarchyMember};
use crate::domain::capability::{CapabilityError, Parameters};
use crate::domain::task::{Report, Task, TaskPriority};

/// Why an operation failed; drives the HTTP status, not serialised
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotFound,
    Rejected,
    BadRequest,
}

/// Failure payload: `{"status": "failed", "error": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Failure {
    pub status: &'static str,
    pub error: String,
    #[serde(skip)]
    pub kind: FailureKind,
}

impl Failure {
    fn new(kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            status: "failed",
            error: error.into(),
            kind,
        }
    }

    fn from_agent_error(err: &AgentError, context: String) -> Self {
        let kind = match err {
            AgentError::AgentNotFound(_) => FailureKind::NotFound,
            _ => FailureKind::Rejected,
        };
        Self::new(kind, format!("{context}: {err}"))
    }
}

/// Error payload without a status field: `{"error": ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotFound {
    pub error: String,
}

pub const AGENT_NOT_FOUND: &str = "Agent not found";
pub const NO_PRIMARY_AGENT: &str = "No primary agent registered";

/// Agent identifier as supplied by a caller
///
/// Agents are keyed by UUID. Any other string cannot name a live agent and
/// resolves like an unknown id instead of failing the request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum AgentRef {
    Id(Uuid),
    Unresolved(String),
}

impl AgentRef {
    pub fn parse(raw: &str) -> Self {
        Uuid::parse_str(raw)
            .map(AgentRef::Id)
            .unwrap_or_else(|_| AgentRef::Unresolved(raw.to_string()))
    }

    pub fn id(&self) -> Option<Uuid> {
        match self {
            AgentRef::Id(id) => Some(*id),
            AgentRef::Unresolved(_) => None,
        }
    }

    /// Parent id to record for a new agent
    ///
    /// An unresolved reference is recorded as the nil UUID, which no agent
    /// ever has, so the agent starts with an empty capability set.
    fn as_parent(&self) -> Uuid {
        match self {
            AgentRef::Id(id) => *id,
            AgentRef::Unresolved(raw) => {
                warn!(parent = %raw, "Parent id is not a UUID, recording it as unresolved");
                Uuid::nil()
            }
        }
    }
}

impl From<Uuid> for AgentRef {
    fn from(id: Uuid) -> Self {
        AgentRef::Id(id)
    }
}

impl fmt::Display for AgentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentRef::Id(id) => write!(f, "{id}"),
            AgentRef::Unresolved(raw) => f.write_str(raw),
        }
    }
}

fn unresolved_agent(context: String, agent: &AgentRef) -> Failure {
    Failure::new(
        FailureKind::NotFound,
        format!("{context}: {AGENT_NOT_FOUND}: {agent}"),
    )
}

// ===== Requests =====

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubAgentRequest {
    pub name: String,
    #[serde(default)]
    pub parent_agent_id: Option<AgentRef>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Task fields supplied by the caller
#[derive(Debug, Clone, Deserialize)]
pub struct TaskSpec {
    pub task_description: String,
    pub instructions: String,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignTaskRequest {
    pub agent_id: AgentRef,
    #[serde(flatten)]
    pub task: TaskSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentIdRequest {
    pub agent_id: AgentRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateHierarchyRequest {
    #[serde(flatten)]
    pub config: HierarchyConfig,
    #[serde(default)]
    pub parent_agent_id: Option<AgentRef>,
}

fn default_primary_name() -> String {
    "ExternalPrimaryAgent".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterPrimaryRequest {
    #[serde(default = "default_primary_name")]
    pub agent_name: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Default for RegisterPrimaryRequest {
    fn default() -> Self {
        Self {
            agent_name: default_primary_name(),
            description: None,
        }
    }
}

// ===== Responses =====

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateSubAgentResponse {
    pub agent_id: Uuid,
    pub name: String,
    pub status: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssignTaskResponse {
    Assigned {
        task_id: Uuid,
        agent_id: Uuid,
        status: &'static str,
        message: String,
    },
    Failed(Failure),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AgentStatusResponse {
    Found(AgentStatusSnapshot),
    NotFound(NotFound),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListAgentsResponse {
    pub agents: Vec<AgentStatusSnapshot>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TerminateResponse {
    Terminated {
        status: &'static str,
        message: String,
    },
    Failed(Failure),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyResponse {
    pub hierarchy_created: bool,
    pub coordinator_id: Uuid,
    pub agents: Vec<HierarchyMember>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegisterPrimaryResponse {
    pub agent_id: Uuid,
    pub name: String,
    pub status: &'static str,
    pub message: String,
    pub available_tools_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PrimaryAgentResponse {
    Found {
        primary_agent_id: Uuid,
        agent_info: AgentStatusSnapshot,
    },
    NotFound(NotFound),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MailboxResponse {
    Read {
        agent_id: Uuid,
        reports: Vec<Report>,
        count: usize,
    },
    Failed(Failure),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResponse {
    pub capability: String,
    pub parameters: Parameters,
    pub result: Value,
    pub success: bool,
}

/// Operations exposed to the external controller
///
/// Holds the manager it was constructed with; there is no process-wide
/// instance.
#[derive(Clone)]
pub struct OrchestrationApi {
    manager: AgentManager,
}

impl OrchestrationApi {
    pub fn new(manager: AgentManager) -> Self {
        Self { manager }
    }

    pub fn manager(&self) -> &AgentManager {
        &self.manager
    }

    pub async fn create_sub_agent(&self, req: CreateSubAgentRequest) -> CreateSubAgentResponse {
        let agent_id = self
            .manager
            .create_agent(
                req.name.clone(),
                req.parent_agent_id.as_ref().map(AgentRef::as_parent),
                req.description,
            )
            .await;

        CreateSubAgentResponse {
            agent_id,
            message: format!("Sub-agent '{}' created successfully with ID: {}", req.name, agent_id),
            name: req.name,
            status: "created",
        }
    }

    pub async fn assign_task_to_agent(&self, req: AssignTaskRequest) -> AssignTaskResponse {
        let TaskSpec {
            task_description,
            instructions,
            priority,
            metadata,
        } = req.task;
        let context = format!("Failed to assign task to agent {}", req.agent_id);
        let Some(agent_id) = req.agent_id.id() else {
            return AssignTaskResponse::Failed(unresolved_agent(context, &req.agent_id));
        };
        let task = Task::new(task_description.clone(), instructions, priority, metadata);

        match self.manager.assign_task(agent_id, task).await {
            Ok(task_id) => AssignTaskResponse::Assigned {
                task_id,
                agent_id,
                status: "assigned",
                message: format!("Task '{}' assigned to agent {}", task_description, agent_id),
            },
            Err(err) => AssignTaskResponse::Failed(Failure::from_agent_error(&err, context)),
        }
    }

    pub async fn get_agent_status(&self, agent: AgentRef) -> AgentStatusResponse {
        let snapshot = match agent.id() {
            Some(agent_id) => self.manager.get_agent_status(agent_id).await,
            None => None,
        };
        match snapshot {
            Some(snapshot) => AgentStatusResponse::Found(snapshot),
            None => AgentStatusResponse::NotFound(NotFound {
                error: AGENT_NOT_FOUND.to_string(),
            }),
        }
    }

    pub async fn get_agent_reports(&self, agent: AgentRef) -> Vec<Report> {
        match agent.id() {
            Some(agent_id) => self.manager.get_agent_reports(agent_id).await,
            None => Vec::new(),
        }
    }

    pub async fn list_all_agents(&self) -> ListAgentsResponse {
        let agents = self.manager.list_agents().await;
        ListAgentsResponse {
            total_count: agents.len(),
            agents,
        }
    }

    pub async fn terminate_agent(&self, agent: AgentRef) -> TerminateResponse {
        let context = format!("Failed to terminate agent {}", agent);
        let Some(agent_id) = agent.id() else {
            return TerminateResponse::Failed(unresolved_agent(context, &agent));
        };

        match self.manager.terminate_agent(agent_id).await {
            Ok(()) => TerminateResponse::Terminated {
                status: "terminated",
                message: format!("Agent {} terminated successfully", agent_id),
            },
            Err(err) => TerminateResponse::Failed(Failure::from_agent_error(&err, context)),
        }
    }

    pub async fn create_agent_hierarchy(&self, req: CreateHierarchyRequest) -> HierarchyResponse {
        let hierarchy = self
            .manager
            .create_hierarchy(
                &req.config,
                req.parent_agent_id.as_ref().map(AgentRef::as_parent),
            )
            .await;

        HierarchyResponse {
            hierarchy_created: true,
            coordinator_id: hierarchy.coordinator_id,
            message: format!(
                "Created agent hierarchy with {} agents",
                hierarchy.members.len()
            ),
            agents: hierarchy.members,
        }
    }

    pub async fn register_as_primary_agent(
        &self,
        req: RegisterPrimaryRequest,
    ) -> RegisterPrimaryResponse {
        let (agent_id, available_tools_count) = self
            .manager
            .register_as_primary(req.agent_name.clone(), req.description)
            .await;

        RegisterPrimaryResponse {
            agent_id,
            message: format!(
                "External agent '{}' registered as primary agent with ID: {}",
                req.agent_name, agent_id
            ),
            name: req.agent_name,
            status: "registered_as_primary",
            available_tools_count,
        }
    }

    pub async fn get_primary_agent_id(&self) -> PrimaryAgentResponse {
        let not_found = || {
            PrimaryAgentResponse::NotFound(NotFound {
                error: NO_PRIMARY_AGENT.to_string(),
            })
        };

        let Some(primary_agent_id) = self.manager.primary_agent_id().await else {
            return not_found();
        };
        // The primary may be terminated between the two reads.
        match self.manager.get_agent_status(primary_agent_id).await {
            Some(agent_info) => PrimaryAgentResponse::Found {
                primary_agent_id,
                agent_info,
            },
            None => not_found(),
        }
    }

    pub async fn read_mailbox(&self, agent: AgentRef) -> MailboxResponse {
        let Some(agent_id) = agent.id() else {
            return MailboxResponse::Failed(Failure::new(FailureKind::NotFound, AGENT_NOT_FOUND));
        };

        match self.manager.read_mailbox(agent_id).await {
            Ok(reports) => MailboxResponse::Read {
                agent_id,
                count: reports.len(),
                reports,
            },
            Err(AgentError::AgentNotFound(_)) => {
                MailboxResponse::Failed(Failure::new(FailureKind::NotFound, AGENT_NOT_FOUND))
            }
            Err(err) => MailboxResponse::Failed(Failure::new(FailureKind::Rejected, err.to_string())),
        }
    }

    /// Runs a registry capability outside any agent
    ///
    /// An invocation failure is folded into the payload; only an unknown
    /// capability name is returned as an error.
    pub async fn invoke_capability(
        &self,
        name: &str,
        parameters: Parameters,
    ) -> Result<InvocationResponse, CapabilityError> {
        let capability = self
            .manager
            .registry()
            .get(name)
            .ok_or_else(|| CapabilityError::NotFound(name.to_string()))?;

        let (result, success) = match capability.invoke(parameters.clone()).await {
            Ok(result) => {
                let success = result.get("error").is_none();
                (result, success)
            }
            Err(err) => (json!({ "error": err.to_string() }), false),
        };

        Ok(InvocationResponse {
            capability: name.to_string(),
            parameters,
            result,
            success,
        })
    }

    /// Calls an operation by name with a JSON payload
    ///
    /// This is the tool-call surface for controllers that address
    /// operations by name. Unknown operations and malformed payloads come
    /// back as failure payloads.
    pub async fn call(&self, operation: &str, payload: Value) -> Value {
        debug!(operation, "Orchestration call");
        let payload = if payload.is_null() { json!({}) } else { payload };

        match operation {
            "create_sub_agent" => match parse(payload) {
                Ok(req) => to_value(self.create_sub_agent(req).await),
                Err(failure) => to_value(failure),
            },
            "assign_task_to_agent" => match parse(payload) {
                Ok(req) => to_value(self.assign_task_to_agent(req).await),
                Err(failure) => to_value(failure),
            },
            "get_agent_status" => match parse::<AgentIdRequest>(payload) {
                Ok(req) => to_value(self.get_agent_status(req.agent_id).await),
                Err(failure) => to_value(failure),
            },
            "get_agent_reports" => match parse::<AgentIdRequest>(payload) {
                Ok(req) => to_value(self.get_agent_reports(req.agent_id).await),
                Err(_) => json!([]),
            },
            "list_all_agents" => to_value(self.list_all_agents().await),
            "terminate_agent" => match parse::<AgentIdRequest>(payload) {
                Ok(req) => to_value(self.terminate_agent(req.agent_id).await),
                Err(failure) => to_value(failure),
            },
            "create_agent_hierarchy" => match parse(payload) {
                Ok(req) => to_value(self.create_agent_hierarchy(req).await),
                Err(failure) => to_value(failure),
            },
            "register_as_primary_agent" => match parse(payload) {
                Ok(req) => to_value(self.register_as_primary_agent(req).await),
                Err(failure) => to_value(failure),
            },
            "get_primary_agent_id" => to_value(self.get_primary_agent_id().await),
            "read_mailbox" => match parse::<AgentIdRequest>(payload) {
                Ok(req) => to_value(self.read_mailbox(req.agent_id).await),
                Err(failure) => to_value(failure),
            },
            other => to_value(Failure::new(
                FailureKind::NotFound,
                format!("Unknown operation: {other}"),
            )),
        }
    }
}

fn parse<T: serde::de::DeserializeOwned>(payload: Value) -> Result<T, Failure> {
    serde_json::from_value(payload)
        .map_err(|err| Failure::new(FailureKind::BadRequest, format!("Invalid request: {err}")))
}

fn to_value<T: Serialize>(response: T) -> Value {
    serde_json::to_value(response).unwrap_or_else(|err| json!({ "error": err.to_string() }))
}
