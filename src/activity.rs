//! Host activity lifecycle: register native capabilities, then hand the
//! finished registry to the bridge host.

use thiserror::Error;

use crate::bridge::host::{BridgeError, BridgeHost, SavedState};
use crate::bridge::registry::{PluginRegistrar, RegistryError};

/// Lifecycle states of one activity instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivityState {
    #[default]
    Created,
    /// Capabilities are being inserted into the registrar.
    Registering,
    /// The base routine has been handed the finished registry.
    Delegated,
    /// The base routine returned with content load scheduled.
    Running,
    /// Startup aborted; the instance cannot be started again.
    Failed,
    Destroyed,
}

impl ActivityState {
    pub fn label(&self) -> &'static str {
        match self {
            ActivityState::Created => "CREATED",
            ActivityState::Registering => "REGISTERING",
            ActivityState::Delegated => "DELEGATED",
            ActivityState::Running => "RUNNING",
            ActivityState::Failed => "FAILED",
            ActivityState::Destroyed => "DESTROYED",
        }
    }
}

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("activity already started (state {})", .state.label())]
    AlreadyStarted { state: ActivityState },

    #[error("plugin registration failed: {0}")]
    Registration(#[from] RegistryError),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

type RegisterFn = Box<dyn Fn(&mut PluginRegistrar) -> Result<(), RegistryError>>;

/// Owns the startup sequence of the single native window.
///
/// The application's capability set is supplied up front as a registration
/// function; [`HostActivity::on_start`] always runs it to completion before
/// the base routine is called.
pub struct HostActivity<B> {
    base: B,
    register: RegisterFn,
    state: ActivityState,
}

impl<B: BridgeHost> HostActivity<B> {
    pub fn new<F>(base: B, register: F) -> Self
    where
        F: Fn(&mut PluginRegistrar) -> Result<(), RegistryError> + 'static,
    {
        Self {
            base,
            register: Box::new(register),
            state: ActivityState::Created,
        }
    }

    pub fn state(&self) -> ActivityState {
        self.state
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut B {
        &mut self.base
    }

    /// Platform start callback. Runs once per instance.
    pub fn on_start(&mut self, saved_state: Option<SavedState>) -> Result<(), ActivityError> {
        if self.state != ActivityState::Created {
            return Err(ActivityError::AlreadyStarted { state: self.state });
        }

        self.state = ActivityState::Registering;
        let mut registrar = PluginRegistrar::new();
        if let Err(err) = (self.register)(&mut registrar) {
            tracing::error!("plugin registration failed: {err}");
            self.state = ActivityState::Failed;
            return Err(err.into());
        }
        let plugins = registrar.finish();
        tracing::info!("{}", plugins.summary());

        self.state = ActivityState::Delegated;
        if let Err(err) = self.base.start_bridge_host(saved_state, plugins) {
            tracing::error!("bridge host failed to start: {err}");
            self.state = ActivityState::Failed;
            return Err(err.into());
        }

        self.state = ActivityState::Running;
        Ok(())
    }

    /// Platform destroy callback. Releases the renderer and the registry.
    pub fn on_destroy(&mut self) {
        if self.state == ActivityState::Destroyed {
            return;
        }

        self.base.stop_bridge_host();
        self.state = ActivityState::Destroyed;
        tracing::debug!("activity destroyed");
    }
}
