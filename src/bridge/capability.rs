use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

/// Unique key a capability is registered and resolved under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CapabilityName(String);

impl CapabilityName {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CapabilityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CapabilityName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CapabilityError {
    #[error("{capability} has no method {method}")]
    UnknownMethod { capability: String, method: String },

    #[error("invalid arguments for {method}: {reason}")]
    InvalidArgs { method: String, reason: String },

    #[error("{0}")]
    Failed(String),
}

/// A native capability exposed to embedded content.
///
/// Handlers are invoked from the bridge dispatch thread, so they must be
/// shareable across threads.
pub trait Capability: Send + Sync {
    /// Name the capability is registered under.
    fn name(&self) -> &str;

    /// Methods content may call. Used for discovery and the window listing.
    fn methods(&self) -> &[&'static str];

    fn invoke(&self, method: &str, args: &Value) -> Result<Value, CapabilityError>;
}

/// Name plus handler. Immutable once built; owned by the registry after
/// registration.
#[derive(Clone)]
pub struct CapabilityDescriptor {
    name: CapabilityName,
    handler: Arc<dyn Capability>,
}

impl CapabilityDescriptor {
    pub fn new<C>(handler: C) -> Self
    where
        C: Capability + 'static,
    {
        let name = CapabilityName::new(handler.name());
        Self {
            name,
            handler: Arc::new(handler),
        }
    }

    pub fn name(&self) -> &CapabilityName {
        &self.name
    }

    pub fn methods(&self) -> &[&'static str] {
        self.handler.methods()
    }

    pub fn invoke(&self, method: &str, args: &Value) -> Result<Value, CapabilityError> {
        self.handler.invoke(method, args)
    }
}

impl fmt::Debug for CapabilityDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityDescriptor")
            .field("name", &self.name)
            .field("methods", &self.methods())
            .finish()
    }
}
