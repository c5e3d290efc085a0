use serde::Serialize;
use uuid::Uuid;

use crate::domain::task::ReportStatus;

/// Domain events emitted over an agent's lifecycle
///
/// The manager publishes these to subscribers so callers can react to task
/// completion without polling.
///
/// # Example
/// ```
/// use agentic_tools_api::domain::agent::AgentEvent;
/// use uuid::Uuid;
///
/// let agent_id = Uuid::new_v4();
/// let event = AgentEvent::Terminated { agent_id };
/// assert_eq!(event.agent_id(), agent_id);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AgentEvent {
    /// Fired when an agent is allocated
    Created {
        agent_id: Uuid,
        name: String,
        parent_id: Option<Uuid>,
    },
    /// Fired when an agent is marked as the primary agent
    PrimaryRegistered { agent_id: Uuid },
    /// Fired when an agent accepts a task
    TaskAssigned { agent_id: Uuid, task_id: Uuid },
    /// Fired after the task's report is stored and delivered
    TaskFinished {
        agent_id: Uuid,
        task_id: Uuid,
        status: ReportStatus,
    },
    /// Fired when an agent is terminated
    Terminated { agent_id: Uuid },
}

impl AgentEvent {
    pub fn agent_id(&self) -> Uuid {
        match self {
            AgentEvent::Created { agent_id, .. } => *agent_id,
            AgentEvent::PrimaryRegistered { agent_id } => *agent_id,
            AgentEvent::TaskAssigned { agent_id, .. } => *agent_id,
            AgentEvent::TaskFinished { agent_id, .. } => *agent_id,
            AgentEvent::Terminated { agent_id } => *agent_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_finished_event_exposes_agent() {
        let agent_id = Uuid::new_v4();
        let event = AgentEvent::TaskFinished {
            agent_id,
            task_id: Uuid::new_v4(),
            status: ReportStatus::Failed,
        };

        assert_eq!(event.agent_id(), agent_id);
    }

    #[test]
    fn events_serialize_with_tag() {
        let event = AgentEvent::PrimaryRegistered {
            agent_id: Uuid::nil(),
        };
        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["event"], "primary_registered");
        assert_eq!(value["agent_id"], Uuid::nil().to_string());
    }
}
