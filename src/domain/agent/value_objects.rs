use serde::{Deserialize, Serialize};

/// Represents the lifecycle status of an agent
///
/// # Status Transitions
/// ```text
/// Idle -> Busy -> Completed -> Idle
///              `-> Failed ----> Idle
/// (any) -> Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    /// Agent is free and accepts a task assignment
    Idle,
    /// Agent is executing exactly one task
    Busy,
    /// Agent's last task finished successfully
    Completed,
    /// Agent's last task failed
    Failed,
    /// Agent was terminated; irreversible
    Terminated,
}

impl AgentStatus {
    /// Checks if a transition from current status to next status is valid
    ///
    /// # Valid Transitions
    /// - Idle -> Busy
    /// - Busy -> Completed
    /// - Busy -> Failed
    /// - Completed -> Idle
    /// - Failed -> Idle
    /// - any non-terminated status -> Terminated
    ///
    /// # Example
    /// ```
    /// use agentic_tools_api::domain::agent::AgentStatus;
    ///
    /// assert!(AgentStatus::Idle.can_transition_to(AgentStatus::Busy));
    /// assert!(!AgentStatus::Idle.can_transition_to(AgentStatus::Completed));
    /// ```
    pub fn can_transition_to(&self, next: AgentStatus) -> bool {
        use AgentStatus::*;
        matches!(
            (self, next),
            (Idle, Busy)
                | (Busy, Completed)
                | (Busy, Failed)
                | (Completed, Idle)
                | (Failed, Idle)
                | (Idle | Busy | Completed | Failed, Terminated)
        )
    }

    /// Whether the agent accepts a new task in this status
    pub fn accepts_tasks(&self) -> bool {
        matches!(self, AgentStatus::Idle)
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "idle"),
            AgentStatus::Busy => write!(f, "busy"),
            AgentStatus::Completed => write!(f, "completed"),
            AgentStatus::Failed => write!(f, "failed"),
            AgentStatus::Terminated => write!(f, "terminated"),
        }
    }
}
