use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use thiserror::Error;

use crate::bridge::capability::{CapabilityDescriptor, CapabilityName};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("capability {name} is registered more than once")]
    DuplicateCapability { name: CapabilityName },
}

/// Write side of the plugin registry. Only exists during the registration
/// phase of startup; [`PluginRegistrar::finish`] freezes it.
#[derive(Debug, Default)]
pub struct PluginRegistrar {
    entries: HashMap<CapabilityName, CapabilityDescriptor>,
}

impl PluginRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a descriptor under its name.
    ///
    /// A name that is already taken is rejected and the existing entry is
    /// left as it was: the first registration wins, every later one fails.
    pub fn register(&mut self, descriptor: CapabilityDescriptor) -> Result<(), RegistryError> {
        match self.entries.entry(descriptor.name().clone()) {
            Entry::Occupied(existing) => Err(RegistryError::DuplicateCapability {
                name: existing.key().clone(),
            }),
            Entry::Vacant(slot) => {
                tracing::debug!(capability = %descriptor.name(), "capability registered");
                slot.insert(descriptor);
                Ok(())
            }
        }
    }

    pub fn finish(self) -> PluginRegistry {
        PluginRegistry {
            entries: Arc::new(self.entries),
        }
    }
}

/// Read-only capability lookup shared with the renderer and the dispatch
/// thread. Cloning shares the same frozen map.
#[derive(Debug, Clone)]
pub struct PluginRegistry {
    entries: Arc<HashMap<CapabilityName, CapabilityDescriptor>>,
}

impl PluginRegistry {
    pub fn resolve(&self, name: &str) -> Option<&CapabilityDescriptor> {
        self.entries.get(&CapabilityName::from(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<CapabilityName> {
        let mut names: Vec<CapabilityName> = self.entries.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &CapabilityDescriptor> {
        self.entries.values()
    }

    pub fn summary(&self) -> String {
        if self.entries.is_empty() {
            return "capabilities: none registered".to_string();
        }

        let names: Vec<String> = self.names().iter().map(ToString::to_string).collect();
        format!("capabilities: {}", names.join(", "))
    }
}
