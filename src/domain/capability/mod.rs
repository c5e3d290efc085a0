// Capability domain module
// The seam between the orchestration core and the concrete capabilities

#![allow(clippy::module_inception)]

pub mod capability;
pub mod registry;

pub use capability::{
    Capability, CapabilityCategory, CapabilityDescriptor, CapabilityError, CapabilityResult,
    ParameterSpec, Parameters,
};
pub use registry::{CapabilityRegistry, CapabilitySet};
