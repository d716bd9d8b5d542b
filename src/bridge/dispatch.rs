use std::fmt;
use std::sync::mpsc;
use std::thread;

use serde_json::Value;
use thiserror::Error;

use crate::bridge::capability::CapabilityError;
use crate::bridge::host::BridgeError;
use crate::bridge::registry::PluginRegistry;

/// A call from embedded content into a native capability.
#[derive(Debug, Clone, PartialEq)]
pub struct CapabilityCall {
    /// Bridge session that issued the call.
    pub session: u64,
    pub id: u64,
    pub capability: String,
    pub method: String,
    pub args: Value,
}

impl fmt::Display for CapabilityCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}.{}", self.id, self.capability, self.method)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CallError {
    #[error("capability not registered: {0}")]
    NotRegistered(String),

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub call: CapabilityCall,
    pub result: Result<Value, CallError>,
}

impl CallOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    pub fn summary(&self) -> String {
        match &self.result {
            Ok(value) => format!("{} -> {value}", self.call),
            Err(err) => format!("{} failed: {err}", self.call),
        }
    }
}

/// Resolve a call by name and run it on the calling thread.
pub fn invoke(plugins: &PluginRegistry, call: CapabilityCall) -> CallOutcome {
    let result = match plugins.resolve(&call.capability) {
        Some(descriptor) => descriptor
            .invoke(&call.method, &call.args)
            .map_err(CallError::from),
        None => Err(CallError::NotRegistered(call.capability.clone())),
    };

    CallOutcome { call, result }
}

/// Runs capability calls on a dedicated thread and reports outcomes on the
/// host's event channel.
pub struct BridgeDispatcher {
    calls: Option<mpsc::Sender<CapabilityCall>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl BridgeDispatcher {
    pub fn spawn<T>(plugins: PluginRegistry, events: mpsc::Sender<T>) -> Result<Self, BridgeError>
    where
        T: From<CallOutcome> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<CapabilityCall>();

        let worker = thread::Builder::new()
            .name("axion-bridge".to_string())
            .spawn(move || {
                for call in rx {
                    tracing::debug!(%call, "dispatching capability call");
                    let outcome = invoke(&plugins, call);
                    if let Err(err) = &outcome.result {
                        tracing::warn!(call = %outcome.call, "capability call failed: {err}");
                    }
                    if events.send(T::from(outcome)).is_err() {
                        break;
                    }
                }
                tracing::debug!("bridge dispatcher stopped");
            })?;

        Ok(Self {
            calls: Some(tx),
            worker: Some(worker),
        })
    }

    pub fn submit(&self, call: CapabilityCall) -> Result<(), BridgeError> {
        let calls = self.calls.as_ref().ok_or(BridgeError::NotRunning)?;
        calls.send(call).map_err(|_| BridgeError::ChannelClosed)
    }
}

impl Drop for BridgeDispatcher {
    fn drop(&mut self) {
        // Closing the call channel ends the worker loop.
        self.calls.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("bridge dispatcher panicked");
            }
        }
    }
}
