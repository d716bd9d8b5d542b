use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;

use crate::bridge::dispatch::BridgeDispatcher;
use crate::bridge::host::{BridgeError, BridgeHost, SavedState};
use crate::bridge::registry::PluginRegistry;
use crate::bridge::renderer::{LoadReport, Renderer};
use crate::content::{ContentError, ContentSource};
use crate::msg::Msg;

/// Sessions are unique for the life of the process, so messages left over
/// from a destroyed host never match a newer one.
static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Bridge host for the terminal window.
///
/// Renderer creation happens inside `start_bridge_host`; content load is
/// posted to the event loop and only runs after startup has returned.
pub struct WindowBridgeHost {
    events: mpsc::Sender<Msg>,
    source: ContentSource,
    renderer: Option<Renderer>,
    dispatcher: Option<BridgeDispatcher>,
}

impl WindowBridgeHost {
    pub fn new(events: mpsc::Sender<Msg>, source: ContentSource) -> Self {
        Self {
            events,
            source,
            renderer: None,
            dispatcher: None,
        }
    }

    pub fn renderer(&self) -> Option<&Renderer> {
        self.renderer.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.renderer.is_some()
    }

    /// True when `session` belongs to the renderer attached right now.
    pub fn is_current(&self, session: u64) -> bool {
        self.renderer
            .as_ref()
            .is_some_and(|renderer| renderer.session() == session)
    }

    /// Load the page and hand its startup calls to the dispatch thread.
    ///
    /// Returns `None` for a load request from another session, or when this
    /// session's page is already loaded: each started host loads once.
    pub fn load_content(&mut self, session: u64) -> Result<Option<LoadReport>, WindowError> {
        let renderer = self.renderer.as_mut().ok_or(BridgeError::NotRunning)?;
        let dispatcher = self.dispatcher.as_ref().ok_or(BridgeError::NotRunning)?;

        if renderer.session() != session {
            tracing::debug!(session, current = renderer.session(), "ignoring stale content load");
            return Ok(None);
        }
        if renderer.page().is_some() {
            tracing::debug!(session, "content already loaded");
            return Ok(None);
        }

        let report = renderer.load_content()?;
        for call in &report.calls {
            dispatcher.submit(call.clone())?;
        }

        Ok(Some(report))
    }
}

impl BridgeHost for WindowBridgeHost {
    fn start_bridge_host(
        &mut self,
        saved_state: Option<SavedState>,
        plugins: PluginRegistry,
    ) -> Result<(), BridgeError> {
        if self.is_running() {
            return Err(BridgeError::AlreadyRunning);
        }

        let session = NEXT_SESSION.fetch_add(1, Ordering::Relaxed);
        let dispatcher = BridgeDispatcher::spawn(plugins.clone(), self.events.clone())?;
        let renderer = Renderer::new(session, plugins, saved_state, self.source.clone());
        tracing::debug!(
            session,
            source = %self.source,
            restored = renderer.saved_state().is_some(),
            "renderer attached"
        );

        self.renderer = Some(renderer);
        self.dispatcher = Some(dispatcher);

        self.events
            .send(Msg::LoadContent { session })
            .map_err(|_| BridgeError::ChannelClosed)
    }

    fn stop_bridge_host(&mut self) {
        // Dispatcher first: its drop joins the worker that still reads the
        // registry.
        self.dispatcher.take();
        self.renderer.take();
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WindowError {
    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error(transparent)]
    Content(#[from] ContentError),
}
