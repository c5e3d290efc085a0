// Agent orchestration modules
//
// This module contains the orchestration core: the manager that owns every
// agent, the per-agent workers that execute delegated tasks, and the
// interpreter that turns task instructions into capability invocations.

pub mod errors;
pub mod interpreter;
pub mod manager;
pub mod messages;
pub mod types;
mod worker;

// Re-export main types
pub use errors::{AgentError, AgentResult};
pub use interpreter::{Instruction, InstructionInterpreter};
pub use manager::{AgentManager, ManagerConfig};
pub use messages::{Mailbox, MailboxReader};
pub use types::{AgentStatusSnapshot, Hierarchy, HierarchyConfig, HierarchyMember, SubAgentConfig};
