use super::events::AgentEvent;
use super::value_objects::AgentStatus;
use crate::domain::capability::CapabilitySet;
use crate::domain::task::{ReportStatus, Task};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Agent aggregate root
///
/// An orchestration unit that executes one delegated task at a time using
/// the capabilities it was given when it was created.
///
/// # Invariants
/// - The parent identifier never changes after creation
/// - At most one current task, and only while `Busy`
/// - The capability set is a snapshot and is never refreshed
/// - Completed-task history is append-only
/// - Status transitions follow `AgentStatus::can_transition_to`
///
/// # Example
/// ```
/// use agentic_tools_api::domain::agent::{Agent, AgentStatus};
/// use agentic_tools_api::domain::capability::CapabilitySet;
///
/// let (agent, _event) = Agent::new("Reviewer".to_string(), None, None, CapabilitySet::empty());
///
/// assert_eq!(agent.status(), AgentStatus::Idle);
/// assert_eq!(agent.completed_tasks().len(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Agent {
    id: Uuid,
    name: String,
    description: Option<String>,
    parent_id: Option<Uuid>,
    status: AgentStatus,
    current_task: Option<Uuid>,
    completed_tasks: Vec<Task>,
    capabilities: CapabilitySet,
    last_outcome: Option<ReportStatus>,
    running: bool,
    created_at: DateTime<Utc>,
}

impl Agent {
    /// Creates a new idle Agent
    ///
    /// # Arguments
    /// * `name` - Display name
    /// * `description` - Optional free-form description
    /// * `parent_id` - Agent this one reports to, if any
    /// * `capabilities` - Capability snapshot the agent may use
    pub fn new(
        name: String,
        description: Option<String>,
        parent_id: Option<Uuid>,
        capabilities: CapabilitySet,
    ) -> (Self, AgentEvent) {
        let agent = Self {
            id: Uuid::new_v4(),
            name,
            description,
            parent_id,
            status: AgentStatus::Idle,
            current_task: None,
            completed_tasks: Vec::new(),
            capabilities,
            last_outcome: None,
            running: false,
            created_at: Utc::now(),
        };

        let event = AgentEvent::Created {
            agent_id: agent.id,
            name: agent.name.clone(),
            parent_id: agent.parent_id,
        };

        (agent, event)
    }

    /// Marks the background execution context as started
    pub fn mark_running(&mut self) {
        self.running = true;
    }

    /// Accepts a task (Idle -> Busy)
    ///
    /// # Returns
    /// * `Ok(AgentEvent)` - TaskAssigned event
    /// * `Err(String)` - If the agent is not idle
    pub fn begin_task(&mut self, task_id: Uuid) -> Result<AgentEvent, String> {
        self.transition(AgentStatus::Busy)?;
        self.current_task = Some(task_id);

        Ok(AgentEvent::TaskAssigned {
            agent_id: self.id,
            task_id,
        })
    }

    /// Records the outcome of the current task (Busy -> Completed | Failed)
    ///
    /// Successfully finished tasks are appended to the completed history.
    ///
    /// # Returns
    /// * `Ok(AgentEvent)` - TaskFinished event
    /// * `Err(String)` - If the agent is not busy with this task
    pub fn finish_task(&mut self, task: &Task, outcome: ReportStatus) -> Result<AgentEvent, String> {
        if self.current_task != Some(task.id()) {
            return Err(format!(
                "Agent {} is not executing task {}",
                self.id,
                task.id()
            ));
        }

        let next = match outcome {
            ReportStatus::Completed => AgentStatus::Completed,
            ReportStatus::Failed => AgentStatus::Failed,
        };
        self.transition(next)?;

        self.current_task = None;
        self.last_outcome = Some(outcome);
        if outcome == ReportStatus::Completed {
            self.completed_tasks.push(task.clone());
        }

        Ok(AgentEvent::TaskFinished {
            agent_id: self.id,
            task_id: task.id(),
            status: outcome,
        })
    }

    /// Makes the agent available again (Completed | Failed -> Idle)
    pub fn reset(&mut self) -> Result<(), String> {
        self.transition(AgentStatus::Idle)
    }

    /// Terminates the agent; irreversible
    pub fn terminate(&mut self) -> Result<AgentEvent, String> {
        self.transition(AgentStatus::Terminated)?;
        self.running = false;

        Ok(AgentEvent::Terminated { agent_id: self.id })
    }

    fn transition(&mut self, next: AgentStatus) -> Result<(), String> {
        if !self.status.can_transition_to(next) {
            return Err(format!(
                "Invalid state transition from {} to {}",
                self.status, next
            ));
        }
        self.status = next;
        Ok(())
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parent_id(&self) -> Option<Uuid> {
        self.parent_id
    }

    pub fn status(&self) -> AgentStatus {
        self.status
    }

    pub fn current_task(&self) -> Option<Uuid> {
        self.current_task
    }

    pub fn completed_tasks(&self) -> &[Task] {
        &self.completed_tasks
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn last_outcome(&self) -> Option<ReportStatus> {
        self.last_outcome
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::TaskPriority;
    use serde_json::Map;

    fn new_agent() -> Agent {
        Agent::new("Worker".to_string(), None, None, CapabilitySet::empty()).0
    }

    fn new_task() -> Task {
        Task::new("Do it", "echo: hi", TaskPriority::Medium, Map::new())
    }

    #[test]
    fn new_agent_is_idle_with_created_event() {
        let parent = Uuid::new_v4();
        let (agent, event) = Agent::new(
            "Child".to_string(),
            Some("helper".to_string()),
            Some(parent),
            CapabilitySet::empty(),
        );

        assert_eq!(agent.status(), AgentStatus::Idle);
        assert_eq!(agent.parent_id(), Some(parent));
        assert_eq!(agent.description(), Some("helper"));
        assert!(agent.current_task().is_none());
        assert!(!agent.is_running());
        match event {
            AgentEvent::Created {
                agent_id,
                name,
                parent_id,
            } => {
                assert_eq!(agent_id, agent.id());
                assert_eq!(name, "Child");
                assert_eq!(parent_id, Some(parent));
            }
            _ => panic!("Expected Created event"),
        }
    }

    #[test]
    fn begin_task_requires_idle() {
        let mut agent = new_agent();
        let task = new_task();

        assert!(agent.begin_task(task.id()).is_ok());
        assert_eq!(agent.status(), AgentStatus::Busy);
        assert_eq!(agent.current_task(), Some(task.id()));

        let second = agent.begin_task(Uuid::new_v4());
        assert!(second.is_err());
        assert_eq!(agent.current_task(), Some(task.id()));
    }

    #[test]
    fn successful_task_goes_to_history() {
        let mut agent = new_agent();
        let task = new_task();
        agent.begin_task(task.id()).unwrap();

        let event = agent.finish_task(&task, ReportStatus::Completed).unwrap();

        assert_eq!(agent.status(), AgentStatus::Completed);
        assert_eq!(agent.completed_tasks().len(), 1);
        assert_eq!(agent.last_outcome(), Some(ReportStatus::Completed));
        assert!(agent.current_task().is_none());
        assert_eq!(
            event,
            AgentEvent::TaskFinished {
                agent_id: agent.id(),
                task_id: task.id(),
                status: ReportStatus::Completed,
            }
        );
    }

    #[test]
    fn failed_task_is_not_added_to_history() {
        let mut agent = new_agent();
        let task = new_task();
        agent.begin_task(task.id()).unwrap();

        agent.finish_task(&task, ReportStatus::Failed).unwrap();

        assert_eq!(agent.status(), AgentStatus::Failed);
        assert!(agent.completed_tasks().is_empty());
        assert_eq!(agent.last_outcome(), Some(ReportStatus::Failed));
    }

    #[test]
    fn finish_rejects_foreign_task() {
        let mut agent = new_agent();
        let task = new_task();
        agent.begin_task(task.id()).unwrap();

        let other = new_task();
        assert!(agent.finish_task(&other, ReportStatus::Completed).is_err());
        assert_eq!(agent.status(), AgentStatus::Busy);
    }

    #[test]
    fn reset_makes_agent_reusable() {
        let mut agent = new_agent();
        let task = new_task();
        agent.begin_task(task.id()).unwrap();
        agent.finish_task(&task, ReportStatus::Completed).unwrap();

        agent.reset().unwrap();

        assert_eq!(agent.status(), AgentStatus::Idle);
        assert!(agent.begin_task(Uuid::new_v4()).is_ok());
    }

    #[test]
    fn reset_from_idle_is_invalid() {
        let mut agent = new_agent();
        assert!(agent.reset().is_err());
    }

    #[test]
    fn terminate_is_irreversible() {
        let mut agent = new_agent();
        agent.mark_running();

        agent.terminate().unwrap();

        assert_eq!(agent.status(), AgentStatus::Terminated);
        assert!(!agent.is_running());
        assert!(agent.terminate().is_err());
        assert!(agent.begin_task(Uuid::new_v4()).is_err());
    }
}
