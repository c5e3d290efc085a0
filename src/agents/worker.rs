use std::sync::Weak;
use std::time::{Duration, Instant};

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::errors::{AgentError, AgentResult};
use super::interpreter::InstructionInterpreter;
use super::manager::Shared;
use super::messages::WorkerCommand;
use crate::domain::capability::CapabilitySet;
use crate::domain::task::{Report, Task};

/// Background execution context of one agent
///
/// Owns its own copy of the agent's capabilities and runs one task at a
/// time. Dropping the command sender is the stop signal.
pub(crate) struct AgentWorker {
    agent_id: Uuid,
    name: String,
    parent_id: Option<Uuid>,
    capabilities: CapabilitySet,
    shared: Weak<Shared>,
}

impl AgentWorker {
    pub(crate) fn new(
        agent_id: Uuid,
        name: String,
        parent_id: Option<Uuid>,
        capabilities: CapabilitySet,
        shared: Weak<Shared>,
    ) -> Self {
        Self {
            agent_id,
            name,
            parent_id,
            capabilities,
            shared,
        }
    }

    /// Starts the worker loop on the runtime
    pub(crate) fn spawn(self) -> WorkerHandle {
        let agent_id = self.agent_id;
        // One slot is enough: a task is only dispatched to an idle agent.
        let (commands, receiver) = mpsc::channel(1);
        let join = tokio::spawn(self.run(receiver));

        WorkerHandle {
            agent_id,
            commands,
            join,
        }
    }

    async fn run(self, mut commands: mpsc::Receiver<WorkerCommand>) {
        debug!(agent_id = %self.agent_id, "Worker started");

        while let Some(command) = commands.recv().await {
            match command {
                WorkerCommand::Execute(task) => self.execute(task).await,
            }
        }

        debug!(agent_id = %self.agent_id, "Worker stopped");
    }

    async fn execute(&self, mut task: Task) {
        info!(agent_id = %self.agent_id, task_id = %task.id(), "Executing task");
        let started = Instant::now();

        // A panicking capability surfaces here as a JoinError.
        let capabilities = self.capabilities.clone();
        let instructions = task.instructions().to_string();
        let outcome = tokio::spawn(async move {
            InstructionInterpreter::new(&capabilities)
                .run(&instructions)
                .await
        })
        .await
        .unwrap_or_else(|err| Err(AgentError::ExecutionPanicked(err.to_string())));
        let execution_time = started.elapsed().as_secs_f64();

        let report = match outcome {
            Ok(result) => {
                task.complete(result.clone());
                Report::completed(self.agent_id, &self.name, task.id(), result, execution_time)
            }
            Err(err) => {
                warn!(agent_id = %self.agent_id, task_id = %task.id(), error = %err, "Task failed");
                let message = err.to_string();
                task.fail(message.clone());
                Report::failed(self.agent_id, &self.name, task.id(), message, execution_time)
            }
        };

        match self.shared.upgrade() {
            Some(shared) => shared.record_outcome(task, report, self.parent_id).await,
            None => debug!(agent_id = %self.agent_id, "Manager dropped, discarding report"),
        }
    }
}

/// Manager-side handle to a running worker
#[derive(Debug)]
pub(crate) struct WorkerHandle {
    agent_id: Uuid,
    commands: mpsc::Sender<WorkerCommand>,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Hands a task to the worker without waiting
    pub(crate) fn dispatch(&self, task: Task) -> AgentResult<()> {
        self.commands
            .try_send(WorkerCommand::Execute(task))
            .map_err(|err| {
                let reason = match err {
                    TrySendError::Full(_) => "worker already has a pending task",
                    TrySendError::Closed(_) => "worker has stopped",
                };
                AgentError::MessageDeliveryFailed(format!("agent {}: {}", self.agent_id, reason))
            })
    }

    /// Signals the worker to stop and waits up to `grace` for it to finish
    ///
    /// An in-flight task is not aborted. If it outlives the grace period the
    /// worker is left to finish on its own and may still record a report.
    pub(crate) async fn shutdown(self, grace: Duration) {
        let WorkerHandle {
            agent_id,
            commands,
            mut join,
        } = self;
        drop(commands);

        match tokio::time::timeout(grace, &mut join).await {
            Ok(Ok(())) => debug!(%agent_id, "Worker joined"),
            Ok(Err(err)) => warn!(%agent_id, error = %err, "Worker ended abnormally"),
            Err(_) => warn!(%agent_id, ?grace, "Worker still busy after grace period, detaching"),
        }
    }
}
