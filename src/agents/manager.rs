use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::errors::{AgentError, AgentResult};
use super::messages::Mailbox;
use super::types::{
    AgentStatusSnapshot, Hierarchy, HierarchyConfig, HierarchyMember, COORDINATOR_ROLE,
    DEFAULT_ROLE,
};
use super::worker::{AgentWorker, WorkerHandle};
use crate::domain::agent::{Agent, AgentEvent};
use crate::domain::capability::{CapabilityRegistry, CapabilitySet};
use crate::domain::task::{Report, Task};

/// Tunables for the agent manager
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    /// Unread child reports kept per agent
    pub mailbox_capacity: usize,
    /// Lifecycle events buffered for slow subscribers
    pub event_buffer: usize,
    /// How long termination waits for a worker to stop
    pub shutdown_grace: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 64,
            event_buffer: 256,
            shutdown_grace: Duration::from_secs(1),
        }
    }
}

/// Registered agent plus its runtime plumbing
struct AgentEntry {
    agent: Agent,
    mailbox: Mailbox,
    worker: WorkerHandle,
}

/// Tables owned by the manager, keyed by identifier
#[derive(Default)]
struct ManagerState {
    agents: HashMap<Uuid, AgentEntry>,
    /// Registration order of live agents
    order: Vec<Uuid>,
    tasks: HashMap<Uuid, Task>,
    reports: HashMap<Uuid, Vec<Report>>,
    primary_agent_id: Option<Uuid>,
}

/// State shared between the manager and its workers
///
/// A single lock serialises every mutation and gives readers a consistent
/// snapshot. It is never held across a capability invocation.
pub(crate) struct Shared {
    state: RwLock<ManagerState>,
    events: broadcast::Sender<AgentEvent>,
    config: ManagerConfig,
}

impl Shared {
    fn publish(&self, event: AgentEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    /// Stores a finished task's report, then delivers it to the parent
    ///
    /// The report is appended to the store even if the agent was terminated
    /// while the task was running.
    pub(crate) async fn record_outcome(&self, task: Task, report: Report, parent_id: Option<Uuid>) {
        let agent_id = report.agent_id;
        let task_id = task.id();
        let status = report.status;

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        state.reports.entry(agent_id).or_default().push(report.clone());

        let mut finished = None;
        if let Some(entry) = state.agents.get_mut(&agent_id) {
            match entry.agent.finish_task(&task, status) {
                Ok(event) => finished = Some(event),
                Err(err) => warn!(%agent_id, %task_id, error = %err, "Could not record task outcome"),
            }
        } else {
            debug!(%agent_id, %task_id, "Agent terminated before its task finished");
        }
        state.tasks.insert(task_id, task);

        if let Some(parent_id) = parent_id {
            match state.agents.get(&parent_id) {
                Some(parent) => {
                    if let Err(err) = parent.mailbox.deliver(report) {
                        warn!(%agent_id, %parent_id, error = %err, "Report not delivered to parent");
                    }
                }
                None => debug!(%agent_id, %parent_id, "Parent is gone, report kept in store only"),
            }
        }

        if let Some(entry) = state.agents.get_mut(&agent_id) {
            if let Err(err) = entry.agent.reset() {
                warn!(%agent_id, error = %err, "Could not return agent to idle");
            }
        }
        drop(guard);

        info!(%agent_id, %task_id, %status, "Task finished");
        self.publish(finished.unwrap_or(AgentEvent::TaskFinished {
            agent_id,
            task_id,
            status,
        }));
    }
}

/// Root coordinator of all agents
///
/// Owns the agent table, task table, report store, and the identity of the
/// primary agent. Cheap to clone; clones share the same tables.
#[derive(Clone)]
pub struct AgentManager {
    shared: Arc<Shared>,
    registry: Arc<CapabilityRegistry>,
}

impl AgentManager {
    pub fn new(registry: Arc<CapabilityRegistry>, config: ManagerConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer.max(1));
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(ManagerState::default()),
                events,
                config,
            }),
            registry,
        }
    }

    /// The full capability registry
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Subscribes to lifecycle events from this point on
    pub fn subscribe(&self) -> broadcast::Receiver<AgentEvent> {
        self.shared.events.subscribe()
    }

    /// Creates a sub-agent and starts its worker
    ///
    /// Capabilities are copied from the parent when it is given and live.
    /// Without a parent they are copied from the primary agent, if any. A
    /// parent identifier that does not resolve yields an empty set.
    pub async fn create_agent(
        &self,
        name: impl Into<String>,
        parent_id: Option<Uuid>,
        description: Option<String>,
    ) -> Uuid {
        let mut state = self.shared.state.write().await;

        let capabilities = match parent_id {
            Some(parent) => state
                .agents
                .get(&parent)
                .map(|entry| entry.agent.capabilities().clone())
                .unwrap_or_default(),
            None => state
                .primary_agent_id
                .and_then(|primary| state.agents.get(&primary))
                .map(|entry| entry.agent.capabilities().clone())
                .unwrap_or_default(),
        };

        let (agent_id, event) =
            self.insert_agent(&mut state, name.into(), description, parent_id, capabilities);
        drop(state);

        self.shared.publish(event);
        agent_id
    }

    /// Registers the external controller as the primary agent
    ///
    /// The primary is the only agent granted the entire registry. A previous
    /// primary stays registered as an ordinary agent.
    ///
    /// # Returns
    /// The new agent id and the number of capabilities granted
    pub async fn register_as_primary(
        &self,
        name: impl Into<String>,
        description: Option<String>,
    ) -> (Uuid, usize) {
        let capabilities = self.registry.snapshot();
        let granted = capabilities.len();

        let mut state = self.shared.state.write().await;
        let (agent_id, event) =
            self.insert_agent(&mut state, name.into(), description, None, capabilities);
        state.primary_agent_id = Some(agent_id);
        drop(state);

        info!(%agent_id, capabilities = granted, "Primary agent registered");
        self.shared.publish(event);
        self.shared.publish(AgentEvent::PrimaryRegistered { agent_id });
        (agent_id, granted)
    }

    fn insert_agent(
        &self,
        state: &mut ManagerState,
        name: String,
        description: Option<String>,
        parent_id: Option<Uuid>,
        capabilities: CapabilitySet,
    ) -> (Uuid, AgentEvent) {
        let (mut agent, event) = Agent::new(name, description, parent_id, capabilities);
        let agent_id = agent.id();

        let worker = AgentWorker::new(
            agent_id,
            agent.name().to_string(),
            parent_id,
            agent.capabilities().clone(),
            Arc::downgrade(&self.shared),
        )
        .spawn();
        agent.mark_running();

        info!(
            %agent_id,
            name = agent.name(),
            parent_id = ?parent_id,
            capabilities = agent.capabilities().len(),
            "Agent created"
        );

        state.agents.insert(
            agent_id,
            AgentEntry {
                agent,
                mailbox: Mailbox::new(self.shared.config.mailbox_capacity),
                worker,
            },
        );
        state.order.push(agent_id);
        state.reports.entry(agent_id).or_default();

        (agent_id, event)
    }

    /// Assigns a task to an idle agent and schedules it
    ///
    /// Returns as soon as the agent is marked busy; execution happens on the
    /// agent's worker. On error nothing is changed.
    ///
    /// # Returns
    /// * `Ok(Uuid)` - The task id
    /// * `Err(AgentError)` - Unknown agent, agent not idle, or task already owned
    pub async fn assign_task(&self, agent_id: Uuid, mut task: Task) -> AgentResult<Uuid> {
        let task_id = task.id();
        let mut guard = self.shared.state.write().await;
        let state = &mut *guard;

        let entry = state
            .agents
            .get_mut(&agent_id)
            .ok_or(AgentError::AgentNotFound(agent_id))?;

        let status = entry.agent.status();
        if !status.accepts_tasks() {
            return Err(AgentError::AgentNotIdle { agent_id, status });
        }
        task.assign_to(agent_id)
            .map_err(|_| AgentError::TaskAlreadyAssigned(task_id))?;

        // The worker cannot record an outcome before this lock is released.
        entry.worker.dispatch(task.clone())?;
        let event = entry
            .agent
            .begin_task(task_id)
            .map_err(AgentError::InvalidStateTransition)?;
        state.tasks.insert(task_id, task);
        drop(guard);

        info!(%agent_id, %task_id, "Task assigned");
        self.shared.publish(event);
        Ok(task_id)
    }

    /// Status snapshot of a live agent
    pub async fn get_agent_status(&self, agent_id: Uuid) -> Option<AgentStatusSnapshot> {
        let state = self.shared.state.read().await;
        state
            .agents
            .get(&agent_id)
            .map(|entry| AgentStatusSnapshot::from(&entry.agent))
    }

    /// Report history for an agent id, oldest first
    ///
    /// Empty for ids that never produced a report, including unknown ids.
    /// History survives termination.
    pub async fn get_agent_reports(&self, agent_id: Uuid) -> Vec<Report> {
        let state = self.shared.state.read().await;
        state.reports.get(&agent_id).cloned().unwrap_or_default()
    }

    /// Task table lookup
    pub async fn get_task(&self, task_id: Uuid) -> Option<Task> {
        let state = self.shared.state.read().await;
        state.tasks.get(&task_id).cloned()
    }

    /// Snapshots of every live agent in registration order
    pub async fn list_agents(&self) -> Vec<AgentStatusSnapshot> {
        let state = self.shared.state.read().await;
        state
            .order
            .iter()
            .filter_map(|id| state.agents.get(id))
            .map(|entry| AgentStatusSnapshot::from(&entry.agent))
            .collect()
    }

    pub async fn primary_agent_id(&self) -> Option<Uuid> {
        self.shared.state.read().await.primary_agent_id
    }

    /// Terminates an agent and removes it from the registry
    ///
    /// Its reports stay in the store. A task already running is not aborted
    /// and may still append a report afterwards. Terminating the primary
    /// clears the primary identity.
    pub async fn terminate_agent(&self, agent_id: Uuid) -> AgentResult<()> {
        let mut state = self.shared.state.write().await;

        let mut entry = state
            .agents
            .remove(&agent_id)
            .ok_or(AgentError::AgentNotFound(agent_id))?;
        state.order.retain(|id| *id != agent_id);
        if state.primary_agent_id == Some(agent_id) {
            state.primary_agent_id = None;
            info!(%agent_id, "Primary agent cleared");
        }
        drop(state);

        let event = entry
            .agent
            .terminate()
            .map_err(AgentError::InvalidStateTransition)?;
        let AgentEntry { worker, mailbox, .. } = entry;
        worker.shutdown(self.shared.config.shutdown_grace).await;
        drop(mailbox);

        info!(%agent_id, "Agent terminated");
        self.shared.publish(event);
        Ok(())
    }

    /// Terminates every live agent
    pub async fn shutdown(&self) {
        let ids: Vec<Uuid> = self.shared.state.read().await.order.clone();
        for agent_id in ids {
            // Another caller may have terminated it first.
            if let Err(err) = self.terminate_agent(agent_id).await {
                debug!(%agent_id, error = %err, "Skipping agent during shutdown");
            }
        }
    }

    /// Creates a coordinator and one sub-agent per config entry
    ///
    /// The coordinator is parented to `parent_id`; every sub-agent is
    /// parented to the coordinator.
    pub async fn create_hierarchy(
        &self,
        config: &HierarchyConfig,
        parent_id: Option<Uuid>,
    ) -> Hierarchy {
        let coordinator_id = self
            .create_agent(config.coordinator.clone(), parent_id, None)
            .await;

        let mut members = vec![HierarchyMember {
            agent_id: coordinator_id,
            name: config.coordinator.clone(),
            role: COORDINATOR_ROLE.to_string(),
            parent_agent_id: parent_id,
        }];

        for sub_agent in &config.sub_agents {
            let name = sub_agent
                .name
                .clone()
                .unwrap_or_else(|| format!("SubAgent_{}", members.len()));
            let role = sub_agent
                .role
                .clone()
                .unwrap_or_else(|| DEFAULT_ROLE.to_string());

            let agent_id = self
                .create_agent(name.clone(), Some(coordinator_id), None)
                .await;
            members.push(HierarchyMember {
                agent_id,
                name,
                role,
                parent_agent_id: Some(coordinator_id),
            });
        }

        info!(%coordinator_id, agents = members.len(), "Agent hierarchy created");
        Hierarchy {
            coordinator_id,
            members,
        }
    }

    /// Takes all unread child reports from an agent's mailbox
    pub async fn read_mailbox(&self, agent_id: Uuid) -> AgentResult<Vec<Report>> {
        let reader = {
            let state = self.shared.state.read().await;
            state
                .agents
                .get(&agent_id)
                .map(|entry| entry.mailbox.reader())
                .ok_or(AgentError::AgentNotFound(agent_id))?
        };
        reader.drain(agent_id)
    }

    /// Waits for the next child report delivered to an agent
    ///
    /// Returns `None` for unknown agents, or once the agent is terminated and
    /// its mailbox is empty.
    pub async fn next_report(&self, agent_id: Uuid) -> Option<Report> {
        let reader = {
            let state = self.shared.state.read().await;
            state.agents.get(&agent_id)?.mailbox.reader()
        };
        reader.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentStatus;
    use crate::domain::capability::{
        Capability, CapabilityCategory, CapabilityResult, Parameters,
    };
    use crate::domain::task::{ReportStatus, TaskPriority};
    use async_trait::async_trait;
    use serde_json::{json, Map, Value};

    struct Echo(&'static str);

    #[async_trait]
    impl Capability for Echo {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            "Echoes parameters"
        }

        fn category(&self) -> CapabilityCategory {
            CapabilityCategory::Documentation
        }

        async fn invoke(&self, parameters: Parameters) -> CapabilityResult<Value> {
            Ok(Value::Object(parameters))
        }
    }

    fn manager() -> AgentManager {
        let mut registry = CapabilityRegistry::new();
        registry.register(Arc::new(Echo("capA")));
        registry.register(Arc::new(Echo("capB")));
        AgentManager::new(Arc::new(registry), ManagerConfig::default())
    }

    fn task(instructions: &str) -> Task {
        Task::new("test", instructions, TaskPriority::Medium, Map::new())
    }

    async fn wait_finished(
        events: &mut broadcast::Receiver<AgentEvent>,
        task_id: Uuid,
    ) -> ReportStatus {
        loop {
            if let AgentEvent::TaskFinished {
                task_id: finished,
                status,
                ..
            } = events.recv().await.unwrap()
            {
                if finished == task_id {
                    return status;
                }
            }
        }
    }

    #[tokio::test]
    async fn agent_without_parent_or_primary_has_no_capabilities() {
        let manager = manager();
        let id = manager.create_agent("Lonely", None, None).await;

        let status = manager.get_agent_status(id).await.unwrap();
        assert_eq!(status.status, AgentStatus::Idle);
        assert!(status.available_tools.is_empty());
        assert!(manager.get_agent_reports(id).await.is_empty());
    }

    #[tokio::test]
    async fn agent_inherits_from_primary() {
        let manager = manager();
        let (primary, granted) = manager.register_as_primary("Controller", None).await;
        let child = manager.create_agent("Child", None, None).await;

        assert_eq!(granted, 2);
        assert_eq!(manager.primary_agent_id().await, Some(primary));
        let status = manager.get_agent_status(child).await.unwrap();
        assert_eq!(status.available_tools, vec!["capA", "capB"]);
        assert_eq!(status.parent_agent_id, None);
    }

    #[tokio::test]
    async fn unknown_parent_yields_empty_capabilities() {
        let manager = manager();
        manager.register_as_primary("Controller", None).await;
        let unknown_parent = Uuid::new_v4();

        let child = manager.create_agent("Orphan", Some(unknown_parent), None).await;

        let status = manager.get_agent_status(child).await.unwrap();
        assert!(status.available_tools.is_empty());
        assert_eq!(status.parent_agent_id, Some(unknown_parent));
    }

    #[tokio::test]
    async fn assign_to_unknown_agent_fails() {
        let manager = manager();
        let err = manager
            .assign_task(Uuid::new_v4(), task("capA: {}"))
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::AgentNotFound(_)));
    }

    #[tokio::test]
    async fn completed_task_is_reported_and_agent_is_reusable() {
        let manager = manager();
        manager.register_as_primary("Controller", None).await;
        let agent = manager.create_agent("Worker", None, None).await;
        let mut events = manager.subscribe();

        let task_id = manager
            .assign_task(agent, task("capA: {\"x\":1}"))
            .await
            .unwrap();
        assert_eq!(wait_finished(&mut events, task_id).await, ReportStatus::Completed);

        let reports = manager.get_agent_reports(agent).await;
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].result, Some(json!({"x": 1})));

        let status = manager.get_agent_status(agent).await.unwrap();
        assert_eq!(status.status, AgentStatus::Idle);
        assert_eq!(status.completed_tasks_count, 1);
        assert_eq!(status.last_outcome, Some(ReportStatus::Completed));

        let stored = manager.get_task(task_id).await.unwrap();
        assert_eq!(stored.agent_id(), Some(agent));
        assert!(stored.is_finished());

        let second = manager.assign_task(agent, task("capB: {}")).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn child_report_reaches_parent_mailbox() {
        let manager = manager();
        manager.register_as_primary("Controller", None).await;
        let parent = manager.create_agent("Parent", None, None).await;
        let child = manager.create_agent("Child", Some(parent), None).await;
        let mut events = manager.subscribe();

        let task_id = manager.assign_task(child, task("capB: {}")).await.unwrap();
        wait_finished(&mut events, task_id).await;

        let mailbox = manager.read_mailbox(parent).await.unwrap();
        assert_eq!(mailbox.len(), 1);
        assert_eq!(mailbox[0].task_id, task_id);
        assert!(manager.read_mailbox(parent).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn terminating_primary_clears_it() {
        let manager = manager();
        let (primary, _) = manager.register_as_primary("Controller", None).await;

        manager.terminate_agent(primary).await.unwrap();

        assert_eq!(manager.primary_agent_id().await, None);
        assert!(manager.get_agent_status(primary).await.is_none());
        let later = manager.create_agent("Later", None, None).await;
        assert!(manager
            .get_agent_status(later)
            .await
            .unwrap()
            .available_tools
            .is_empty());
    }

    #[tokio::test]
    async fn shutdown_terminates_everything() {
        let manager = manager();
        manager.create_agent("A", None, None).await;
        manager.create_agent("B", None, None).await;

        manager.shutdown().await;

        assert!(manager.list_agents().await.is_empty());
    }
}
