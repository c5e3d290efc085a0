use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Priority attached to a task
///
/// Advisory metadata only. An agent runs one task at a time, so there is
/// no queue for priority to reorder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "low"),
            TaskPriority::Medium => write!(f, "medium"),
            TaskPriority::High => write!(f, "high"),
            TaskPriority::Critical => write!(f, "critical"),
        }
    }
}

/// A unit of delegated work
///
/// # Invariants
/// - The owning agent is set exactly once, at assignment
/// - `result` is present only on success, `error` only on failure
/// - `completed_at` is absent until the task finishes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    id: Uuid,
    description: String,
    instructions: String,
    priority: TaskPriority,
    agent_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    result: Option<Value>,
    error: Option<String>,
    metadata: Map<String, Value>,
}

impl Task {
    /// Creates a new, unassigned task with a fresh identifier
    pub fn new(
        description: impl Into<String>,
        instructions: impl Into<String>,
        priority: TaskPriority,
        metadata: Map<String, Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            instructions: instructions.into(),
            priority,
            agent_id: None,
            created_at: Utc::now(),
            completed_at: None,
            result: None,
            error: None,
            metadata,
        }
    }

    /// Records the owning agent
    ///
    /// # Returns
    /// * `Err(String)` - If the task already belongs to an agent
    pub fn assign_to(&mut self, agent_id: Uuid) -> Result<(), String> {
        if let Some(owner) = self.agent_id {
            return Err(format!("Task {} is already assigned to agent {}", self.id, owner));
        }
        self.agent_id = Some(agent_id);
        Ok(())
    }

    /// Marks the task finished successfully
    pub fn complete(&mut self, result: Option<Value>) {
        self.completed_at = Some(Utc::now());
        self.result = result;
        self.error = None;
    }

    /// Marks the task failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.completed_at = Some(Utc::now());
        self.result = None;
        self.error = Some(error.into());
    }

    // ===== Getters =====

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn agent_id(&self) -> Option<Uuid> {
        self.agent_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn is_finished(&self) -> bool {
        self.completed_at.is_some()
    }
}
