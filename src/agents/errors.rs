use thiserror::Error;
use uuid::Uuid;

use crate::domain::agent::AgentStatus;
use crate::domain::capability::CapabilityError;

/// Errors that can occur in the agent system
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Agent not found: {0}")]
    AgentNotFound(Uuid),

    #[error("Agent {agent_id} is not idle (status: {status})")]
    AgentNotIdle { agent_id: Uuid, status: AgentStatus },

    #[error("Task {0} is already assigned")]
    TaskAlreadyAssigned(Uuid),

    #[error("Capability '{0}' not found")]
    CapabilityNotFound(String),

    #[error("Capability '{name}' failed: {source}")]
    CapabilityFailed {
        name: String,
        #[source]
        source: CapabilityError,
    },

    #[error("Task execution panicked: {0}")]
    ExecutionPanicked(String),

    #[error("{0}")]
    InvalidStateTransition(String),

    #[error("Message delivery failed: {0}")]
    MessageDeliveryFailed(String),

    #[error("Mailbox of agent {0} is being read elsewhere")]
    MailboxBusy(Uuid),
}

pub type AgentResult<T> = Result<T, AgentError>;
