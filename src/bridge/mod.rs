pub mod capability;
pub mod dispatch;
pub mod host;
pub mod registry;
pub mod renderer;

pub use capability::{Capability, CapabilityDescriptor, CapabilityError, CapabilityName};
pub use dispatch::{BridgeDispatcher, CallError, CallOutcome, CapabilityCall};
pub use host::{BridgeError, BridgeHost, SavedState};
pub use registry::{PluginRegistrar, PluginRegistry, RegistryError};
pub use renderer::{LoadReport, Renderer};
