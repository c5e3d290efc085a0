use std::collections::HashMap;
use std::sync::Arc;

use super::capability::{Capability, CapabilityCategory};

/// Catalogue of every capability the process exposes
///
/// Built once at start-up and then shared read-only. Registering a name that
/// already exists replaces the earlier capability in place.
#[derive(Clone, Default)]
pub struct CapabilityRegistry {
    capabilities: Vec<Arc<dyn Capability>>,
    by_name: HashMap<String, usize>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, capability: Arc<dyn Capability>) {
        let name = capability.name().to_string();
        match self.by_name.get(&name) {
            Some(&index) => self.capabilities[index] = capability,
            None => {
                self.by_name.insert(name, self.capabilities.len());
                self.capabilities.push(capability);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Capability>> {
        self.by_name
            .get(name)
            .map(|&index| Arc::clone(&self.capabilities[index]))
    }

    /// All capabilities in registration order
    pub fn all(&self) -> &[Arc<dyn Capability>] {
        &self.capabilities
    }

    pub fn by_category(&self, category: CapabilityCategory) -> Vec<Arc<dyn Capability>> {
        self.capabilities
            .iter()
            .filter(|capability| capability.category() == category)
            .cloned()
            .collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.capabilities
            .iter()
            .map(|capability| capability.name().to_string())
            .collect()
    }

    /// Categories that have at least one capability, in first-seen order
    pub fn categories(&self) -> Vec<CapabilityCategory> {
        let mut categories = Vec::new();
        for capability in &self.capabilities {
            let category = capability.category();
            if !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    /// Case-insensitive substring search over name and description
    pub fn search(&self, query: &str) -> Vec<Arc<dyn Capability>> {
        let query = query.to_lowercase();
        self.capabilities
            .iter()
            .filter(|capability| {
                capability.name().to_lowercase().contains(&query)
                    || capability.description().to_lowercase().contains(&query)
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }

    /// Copies the whole registry into an agent-owned capability set
    pub fn snapshot(&self) -> CapabilitySet {
        self.capabilities.iter().cloned().collect()
    }
}

impl std::fmt::Debug for CapabilityRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityRegistry")
            .field("capabilities", &self.names())
            .finish()
    }
}

/// The capabilities one agent may use
///
/// Taken as a copy when the agent is created. Later changes to the source it
/// was copied from are not visible here.
#[derive(Clone, Default)]
pub struct CapabilitySet {
    capabilities: Vec<Arc<dyn Capability>>,
}

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Exact-name lookup
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Capability>> {
        self.capabilities
            .iter()
            .find(|capability| capability.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.capabilities
            .iter()
            .map(|capability| capability.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}

impl FromIterator<Arc<dyn Capability>> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Capability>>>(iter: I) -> Self {
        Self {
            capabilities: iter.into_iter().collect(),
        }
    }
}

impl std::fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}
