// HTTP handlers, one module per resource

pub mod agents;
pub mod capabilities;
pub mod health;
pub mod orchestration;
