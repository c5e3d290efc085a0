//! Shared fixtures for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use agentic_tools_api::agents::{AgentManager, ManagerConfig};
use agentic_tools_api::domain::agent::AgentEvent;
use agentic_tools_api::domain::capability::{
    Capability, CapabilityCategory, CapabilityError, CapabilityRegistry, CapabilityResult,
    Parameters,
};
use agentic_tools_api::domain::task::{ReportStatus, Task, TaskPriority};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::{broadcast, Semaphore};
use uuid::Uuid;

/// Returns its parameters unchanged
pub struct Echo(pub &'static str);

#[async_trait]
impl Capability for Echo {
    fn name(&self) -> &str {
        self.0
    }

    fn description(&self) -> &str {
        "Echoes its parameters"
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::CodeAnalysis
    }

    async fn invoke(&self, parameters: Parameters) -> CapabilityResult<Value> {
        Ok(Value::Object(parameters))
    }
}

/// Blocks until the test releases a permit
pub struct Gate {
    permits: Arc<Semaphore>,
}

impl Gate {
    pub fn new() -> (Self, Arc<Semaphore>) {
        let permits = Arc::new(Semaphore::new(0));
        (
            Self {
                permits: Arc::clone(&permits),
            },
            permits,
        )
    }
}

#[async_trait]
impl Capability for Gate {
    fn name(&self) -> &str {
        "gate"
    }

    fn description(&self) -> &str {
        "Waits until released"
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::SystemMonitoring
    }

    async fn invoke(&self, _parameters: Parameters) -> CapabilityResult<Value> {
        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|err| CapabilityError::Execution(err.to_string()))?;
        permit.forget();
        Ok(json!({"released": true}))
    }
}

/// Always fails
pub struct Broken;

#[async_trait]
impl Capability for Broken {
    fn name(&self) -> &str {
        "broken"
    }

    fn description(&self) -> &str {
        "Fails every invocation"
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::GitOperations
    }

    async fn invoke(&self, _parameters: Parameters) -> CapabilityResult<Value> {
        Err(CapabilityError::Execution("repository is locked".to_string()))
    }
}

/// Panics on every invocation
pub struct Panics;

#[async_trait]
impl Capability for Panics {
    fn name(&self) -> &str {
        "panics"
    }

    fn description(&self) -> &str {
        "Panics inside the capability"
    }

    fn category(&self) -> CapabilityCategory {
        CapabilityCategory::CodeQuality
    }

    async fn invoke(&self, _parameters: Parameters) -> CapabilityResult<Value> {
        panic!("capability blew up")
    }
}

pub struct Fixture {
    pub manager: AgentManager,
    pub gate: Arc<Semaphore>,
}

pub fn config() -> ManagerConfig {
    ManagerConfig {
        shutdown_grace: Duration::from_millis(50),
        ..ManagerConfig::default()
    }
}

pub fn fixture_with(config: ManagerConfig) -> Fixture {
    let (gate, permits) = Gate::new();
    let mut registry = CapabilityRegistry::new();
    registry.register(Arc::new(Echo("capA")));
    registry.register(Arc::new(Echo("capB")));
    registry.register(Arc::new(gate));
    registry.register(Arc::new(Broken));

    Fixture {
        manager: AgentManager::new(Arc::new(registry), config),
        gate: permits,
    }
}

pub fn fixture() -> Fixture {
    fixture_with(config())
}

pub fn task(instructions: &str) -> Task {
    Task::new("integration task", instructions, TaskPriority::Medium, Map::new())
}

/// Waits for the `TaskFinished` event of one task
pub async fn wait_finished(
    events: &mut broadcast::Receiver<AgentEvent>,
    task_id: Uuid,
) -> ReportStatus {
    let wait = async {
        loop {
            match events.recv().await {
                Ok(AgentEvent::TaskFinished {
                    task_id: finished,
                    status,
                    ..
                }) if finished == task_id => return status,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event channel closed"),
            }
        }
    };

    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .expect("task did not finish in time")
}
