use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::agent::{Agent, AgentStatus};
use crate::domain::task::ReportStatus;

/// Point-in-time view of one agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentStatusSnapshot {
    pub agent_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: AgentStatus,
    pub parent_agent_id: Option<Uuid>,
    pub current_task: Option<Uuid>,
    pub completed_tasks_count: usize,
    /// Outcome of the most recently finished task
    pub last_outcome: Option<ReportStatus>,
    pub available_tools: Vec<String>,
}

impl From<&Agent> for AgentStatusSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            agent_id: agent.id(),
            name: agent.name().to_string(),
            description: agent.description().map(str::to_string),
            status: agent.status(),
            parent_agent_id: agent.parent_id(),
            current_task: agent.current_task(),
            completed_tasks_count: agent.completed_tasks().len(),
            last_outcome: agent.last_outcome(),
            available_tools: agent.capabilities().names(),
        }
    }
}

fn default_coordinator() -> String {
    "Coordinator".to_string()
}

/// Shape of a coordinator plus its sub-agents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyConfig {
    #[serde(default = "default_coordinator")]
    pub coordinator: String,
    #[serde(default)]
    pub sub_agents: Vec<SubAgentConfig>,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            coordinator: default_coordinator(),
            sub_agents: Vec::new(),
        }
    }
}

/// One sub-agent entry; missing fields get generated defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubAgentConfig {
    pub name: Option<String>,
    pub role: Option<String>,
}

/// Role recorded for the coordinator of a hierarchy
pub const COORDINATOR_ROLE: &str = "coordinator";
/// Role given to sub-agents configured without one
pub const DEFAULT_ROLE: &str = "general";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HierarchyMember {
    pub agent_id: Uuid,
    pub name: String,
    pub role: String,
    pub parent_agent_id: Option<Uuid>,
}

/// Result of building a hierarchy; coordinator first
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hierarchy {
    pub coordinator_id: Uuid,
    pub members: Vec<HierarchyMember>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::capability::CapabilitySet;
    use serde_json::json;

    #[test]
    fn snapshot_reflects_fresh_agent() {
        let (agent, _) = Agent::new("Solo".to_string(), None, None, CapabilitySet::empty());
        let snapshot = AgentStatusSnapshot::from(&agent);

        assert_eq!(snapshot.agent_id, agent.id());
        assert_eq!(snapshot.status, AgentStatus::Idle);
        assert_eq!(snapshot.completed_tasks_count, 0);
        assert!(snapshot.available_tools.is_empty());
        assert!(snapshot.last_outcome.is_none());
    }

    #[test]
    fn hierarchy_config_defaults() {
        let config: HierarchyConfig =
            serde_json::from_value(json!({"sub_agents": [{"name": "Tester"}, {}]})).unwrap();

        assert_eq!(config.coordinator, "Coordinator");
        assert_eq!(config.sub_agents.len(), 2);
        assert_eq!(config.sub_agents[0].name.as_deref(), Some("Tester"));
        assert!(config.sub_agents[1].role.is_none());
    }
}
