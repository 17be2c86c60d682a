use std::fmt;

/// Lifecycle of a [`ProcessRuntime`](crate::ProcessRuntime).
///
/// ```text
/// Created ──initialize──► Initialized ──start──► Running ──stop──► Stopping ──► Stopped
///    │                        │
///    └────────stop────────────┴──────────────────────────────────────────────► Stopped
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeState {
    Created,
    Initialized,
    Running,
    Stopping,
    Stopped,
}

impl RuntimeState {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeState::Created => "created",
            RuntimeState::Initialized => "initialized",
            RuntimeState::Running => "running",
            RuntimeState::Stopping => "stopping",
            RuntimeState::Stopped => "stopped",
        }
    }

    /// True once `stop` has been requested.
    pub fn is_terminal(&self) -> bool {
        matches!(self, RuntimeState::Stopping | RuntimeState::Stopped)
    }
}

impl fmt::Display for RuntimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}
