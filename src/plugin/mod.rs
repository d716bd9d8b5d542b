//! Native capabilities this application exposes to its embedded content.

pub mod system;

pub use system::System;

use crate::bridge::capability::CapabilityDescriptor;
use crate::bridge::registry::{PluginRegistrar, RegistryError};

/// Register every capability of the application. Runs during the
/// registration phase of [`crate::activity::HostActivity::on_start`].
pub fn register_all(registrar: &mut PluginRegistrar, system: System) -> Result<(), RegistryError> {
    registrar.register(CapabilityDescriptor::new(system))?;
    Ok(())
}
