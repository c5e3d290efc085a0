// Agent message passing
//
// Commands flow from the manager to an agent's worker loop; reports flow from
// a child agent into its parent's mailbox.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TryRecvError, error::TrySendError};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::errors::{AgentError, AgentResult};
use crate::domain::task::{Report, Task};

/// Instructions delivered to an agent's worker loop
#[derive(Debug)]
pub enum WorkerCommand {
    Execute(Task),
}

/// Bounded inbox of reports from an agent's children
///
/// Delivery never waits: when the mailbox is full the report is refused and
/// stays available only through the report store.
#[derive(Debug)]
pub struct Mailbox {
    sender: mpsc::Sender<Report>,
    reader: MailboxReader,
}

impl Mailbox {
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        Self {
            sender,
            reader: MailboxReader {
                receiver: Arc::new(Mutex::new(receiver)),
            },
        }
    }

    pub fn deliver(&self, report: Report) -> AgentResult<()> {
        self.sender.try_send(report).map_err(|err| match err {
            TrySendError::Full(report) => AgentError::MessageDeliveryFailed(format!(
                "mailbox full, dropped report for task {}",
                report.task_id
            )),
            TrySendError::Closed(report) => AgentError::MessageDeliveryFailed(format!(
                "mailbox closed, dropped report for task {}",
                report.task_id
            )),
        })
    }

    /// Reading half that outlives a lock on the agent table
    ///
    /// Holding a reader does not keep the mailbox open: once the owning agent
    /// is dropped, `recv` returns the remaining reports and then `None`.
    pub fn reader(&self) -> MailboxReader {
        self.reader.clone()
    }
}

#[derive(Debug, Clone)]
pub struct MailboxReader {
    receiver: Arc<Mutex<mpsc::Receiver<Report>>>,
}

impl MailboxReader {
    /// Takes every unread report without waiting
    pub fn drain(&self, agent_id: Uuid) -> AgentResult<Vec<Report>> {
        let mut receiver = self
            .receiver
            .try_lock()
            .map_err(|_| AgentError::MailboxBusy(agent_id))?;

        let mut reports = Vec::new();
        loop {
            match receiver.try_recv() {
                Ok(report) => reports.push(report),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        Ok(reports)
    }

    /// Waits for the next report
    pub async fn recv(&self) -> Option<Report> {
        self.receiver.lock().await.recv().await
    }
}
