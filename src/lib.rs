//! Agentic Tools API Library
//!
//! This library provides the agent orchestration core: the agent manager,
//! per-agent task execution over a capability registry, the orchestration
//! API exposed to an external controller, and its HTTP adapter.

pub mod agents;
pub mod api;
pub mod config;
pub mod domain;
pub mod infrastructure;
