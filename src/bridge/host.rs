use serde_json::Value;
use thiserror::Error;

use crate::bridge::registry::PluginRegistry;

/// Snapshot handed back by the platform when an activity is recreated.
/// The activity forwards it to the base routine without looking inside.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SavedState(Value);

impl SavedState {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bridge host is already running")]
    AlreadyRunning,

    #[error("bridge host is not running")]
    NotRunning,

    #[error("failed to spawn bridge dispatch thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("host event channel closed")]
    ChannelClosed,
}

/// The base routine that owns renderer creation and content load.
///
/// It only accepts a finished [`PluginRegistry`], so a caller cannot start
/// the bridge before the registration phase has produced one.
pub trait BridgeHost {
    /// Create the renderer, attach it, and schedule content load.
    ///
    /// Implementations must not begin loading content before this call
    /// returns.
    fn start_bridge_host(
        &mut self,
        saved_state: Option<SavedState>,
        plugins: PluginRegistry,
    ) -> Result<(), BridgeError>;

    /// Tear down the renderer and release the registry.
    fn stop_bridge_host(&mut self) {}
}
