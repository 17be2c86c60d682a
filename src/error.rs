//! Error types used by the eventvisor runtime and application handlers.
//!
//! This module defines three error enums:
//!
//! - [`RuntimeError`]: contract violations and lifecycle misuse of the runtime itself.
//! - [`SignalError`]: failures of the signal bridge (single-flight violation, install failure).
//! - [`HandlerError`]: failures returned by application handlers.
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging.
//!
//! Handler failures never escalate: the dispatch loop reports them and continues.
//! Closing the queue is not an error either; `post` simply returns `false`.

use thiserror::Error;

use crate::core::RuntimeState;
use crate::events::SignalNo;

/// # Errors produced by the runtime.
///
/// Every variant is a programmer error surfaced to the caller immediately;
/// none of them is retried internally.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Tried to register a handler for the reserved wake signal.
    #[error("signal {signal} is reserved for internal wake-ups and cannot be registered")]
    ReservedSignal {
        /// The rejected signal number.
        signal: SignalNo,
    },

    /// Lifecycle operation called in the wrong state.
    #[error("cannot {op} while runtime is {state}")]
    InvalidState {
        /// Operation that was attempted (`initialize`, `start`, ...).
        op: &'static str,
        /// State observed at the time of the call.
        state: RuntimeState,
    },

    /// Application initialization hook failed.
    #[error("initialization failed: {error}")]
    InitFailed {
        /// The underlying error message.
        error: String,
    },

    /// Signal bridge failure.
    #[error(transparent)]
    Signal(#[from] SignalError),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventvisor::RuntimeError;
    ///
    /// let err = RuntimeError::ReservedSignal { signal: eventvisor::WAKE_SIGNAL };
    /// assert_eq!(err.as_label(), "runtime_reserved_signal");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::ReservedSignal { .. } => "runtime_reserved_signal",
            RuntimeError::InvalidState { .. } => "runtime_invalid_state",
            RuntimeError::InitFailed { .. } => "runtime_init_failed",
            RuntimeError::Signal(e) => e.as_label(),
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::ReservedSignal { signal } => format!("reserved signal: {signal}"),
            RuntimeError::InvalidState { op, state } => format!("invalid state: {op} in {state}"),
            RuntimeError::InitFailed { error } => format!("init failed: {error}"),
            RuntimeError::Signal(e) => e.as_message(),
        }
    }

    /// True for errors caused by breaking an API contract (as opposed to environment failures).
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            RuntimeError::ReservedSignal { .. }
                | RuntimeError::InvalidState { .. }
                | RuntimeError::Signal(SignalError::WaitInProgress)
        )
    }
}

/// # Errors produced by the signal bridge.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// A second `wait` was started while another one was still in progress.
    #[error("signal wait already in progress")]
    WaitInProgress,

    /// The OS refused to install a handler for this signal.
    #[error("cannot install handler for signal {signal}: {reason}")]
    Install {
        /// The signal number.
        signal: SignalNo,
        /// The underlying OS error.
        reason: String,
    },

    /// The signal source has no way to observe this signal on this platform.
    #[error("signal {signal} is not supported on this platform")]
    Unsupported {
        /// The signal number.
        signal: SignalNo,
    },
}

impl SignalError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            SignalError::WaitInProgress => "signal_wait_in_progress",
            SignalError::Install { .. } => "signal_install_failed",
            SignalError::Unsupported { .. } => "signal_unsupported",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            SignalError::WaitInProgress => "concurrent wait rejected".to_string(),
            SignalError::Install { signal, reason } => format!("install {signal}: {reason}"),
            SignalError::Unsupported { signal } => format!("unsupported signal {signal}"),
        }
    }
}

/// # Errors returned by application handlers.
///
/// Both variants are contained at the dispatch loop and reported; the
/// distinction only changes the label seen by report subscribers.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Handler failed while processing this event.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler hit a condition it considers unrecoverable.
    #[error("fatal handler error: {error}")]
    Fatal {
        /// The underlying error message.
        error: String,
    },
}

impl HandlerError {
    /// Shorthand for [`HandlerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail {
            error: error.into(),
        }
    }

    /// Shorthand for [`HandlerError::Fatal`].
    pub fn fatal(error: impl Into<String>) -> Self {
        HandlerError::Fatal {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use eventvisor::HandlerError;
    ///
    /// assert_eq!(HandlerError::fail("boom").as_label(), "handler_failed");
    /// assert!(HandlerError::fatal("nope").is_fatal());
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Fatal { .. } => "handler_fatal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Fatal { error } => format!("fatal: {error}"),
        }
    }

    /// Indicates whether the handler flagged the failure as unrecoverable.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HandlerError::Fatal { .. })
    }
}
