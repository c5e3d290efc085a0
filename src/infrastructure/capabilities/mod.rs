// Built-in capabilities registered by the binary

pub mod file_operations;

use std::path::Path;

use tracing::info;

use crate::domain::capability::{CapabilityRegistry, CapabilityResult};
pub use file_operations::{file_capabilities, ListDirectory, ReadFile, WriteFile, Workspace};

/// Registers every built-in capability, file access confined to `root`
pub fn register_defaults(registry: &mut CapabilityRegistry, root: &Path) -> CapabilityResult<()> {
    let workspace = Workspace::new(root)?;
    info!(root = %workspace.root().display(), "Registering built-in capabilities");

    for capability in file_capabilities(workspace) {
        registry.register(capability);
    }
    Ok(())
}
