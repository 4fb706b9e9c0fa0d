use std::fmt;

use serde::Serialize;

/// Lifecycle of one training session as seen from the UI side.
///
/// ```text
/// Idle -> Configuring -> Ready -> Training <-> Stopped -> Idle
/// ```
///
/// `Idle` means no worker is attached. The worker channel closing sends any
/// state back to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    /// Worker attached, waiting for `ModuleReady`.
    Configuring,
    Ready,
    Training,
    Stopped,
}

impl SessionState {
    /// Whether the layer list may change. Everything but a running
    /// training session.
    pub fn can_relayout(self) -> bool {
        !matches!(self, SessionState::Training)
    }

    /// Whether commands can be sent to the worker right now.
    pub fn worker_ready(self) -> bool {
        matches!(
            self,
            SessionState::Ready | SessionState::Training | SessionState::Stopped
        )
    }

    pub fn is_training(self) -> bool {
        self == SessionState::Training
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Idle => "idle",
            SessionState::Configuring => "configuring",
            SessionState::Ready => "ready",
            SessionState::Training => "training",
            SessionState::Stopped => "stopped",
        };
        f.write_str(label)
    }
}
