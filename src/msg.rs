use crossterm::event::KeyEvent;

use crate::bridge::dispatch::CallOutcome;

/// All possible messages that drive state transitions.
#[derive(Debug)]
pub enum Msg {
    // -- Input events (raw)
    Key(KeyEvent),
    Resize(u16, u16),

    // -- Bridge
    /// Posted by the bridge host once startup has returned. Only the host
    /// running `session` acts on it.
    LoadContent { session: u64 },
    CallCompleted(CallOutcome),

    // -- Lifecycle
    /// Destroy and recreate the activity, as a configuration change would.
    Recreate,

    // -- System
    Tick,
    Quit,
}

impl From<CallOutcome> for Msg {
    fn from(outcome: CallOutcome) -> Self {
        Msg::CallCompleted(outcome)
    }
}
