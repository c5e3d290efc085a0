// Task domain module
// Contains the task entity and the report produced when it finishes

#![allow(clippy::module_inception)]

pub mod report;
pub mod task;

pub use report::{Report, ReportStatus};
pub use task::{Task, TaskPriority};
