//! # Diagnostic reports emitted by the runtime.
//!
//! The [`ReportKind`] enum classifies reports across four categories:
//! - **Lifecycle**: runtime state transitions (initialized, started, stop requested, stopped)
//! - **Dispatch**: handler outcome per event (finished with timing, missing, failed, panicked)
//! - **Producers**: timer and signal bookkeeping (started, stopped, install failures)
//! - **Subscribers**: delivery problems of report sinks themselves (overflow, panic)
//!
//! The [`Report`] struct carries additional metadata such as timestamps, the
//! handler kind and routing key, elapsed time and a reason.
//!
//! ## Ordering guarantees
//! Each report has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use eventvisor::{HandlerKind, Report, ReportKind};
//!
//! let r = Report::new(ReportKind::HandlerFinished)
//!     .with_handler(HandlerKind::Message)
//!     .with_key("ping")
//!     .with_elapsed(Duration::from_millis(3));
//!
//! assert_eq!(r.kind, ReportKind::HandlerFinished);
//! assert_eq!(r.key.as_deref(), Some("ping"));
//! assert_eq!(r.elapsed_ms, Some(3));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::core::RuntimeState;
use crate::events::HandlerKind;

/// Global sequence counter for report ordering.
static REPORT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of diagnostic reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    // === Lifecycle ===
    /// `initialize` completed.
    ///
    /// Sets: `state`
    RuntimeInitialized,

    /// Dispatch and signal loops are running.
    ///
    /// Sets: `state`
    RuntimeStarted,

    /// `stop` was called (or the runtime was dropped while running).
    ///
    /// Sets: `state`
    StopRequested,

    /// Dispatch loop returned; no more handlers will run.
    ///
    /// Sets: `state`
    RuntimeStopped,

    // === Dispatch ===
    /// A handler was registered (insert-or-replace).
    ///
    /// Sets: `handler`, `key`
    HandlerRegistered,

    /// A handler returned; carries its wall time.
    ///
    /// Sets: `handler`, `key`, `elapsed_ms`
    HandlerFinished,

    /// No handler registered for the event's key; the event was dropped.
    ///
    /// Sets: `handler`, `key`
    HandlerMissing,

    /// A handler returned an error. The loop continues.
    ///
    /// Sets: `handler`, `key`, `reason`
    HandlerFailed,

    /// A handler panicked. The panic was caught and the loop continues.
    ///
    /// Sets: `handler`, `key`, `reason`
    HandlerPanicked,

    // === Producers ===
    /// A one-shot timer was armed (possibly replacing an older one with the same id).
    ///
    /// Sets: `key`, `delay_ms`
    TimerStarted,

    /// A timer was cancelled (best-effort).
    ///
    /// Sets: `key`
    TimerStopped,

    /// All timers were cancelled and the scheduler refuses new ones.
    TimersCleared,

    /// An event could not be enqueued because the queue is shut down.
    ///
    /// Sets: `handler`, `key`
    PostRejected,

    /// An application signal was observed and enqueued.
    ///
    /// Sets: `key`
    SignalReceived,

    /// The signal source refused to install a handler.
    ///
    /// Sets: `key`, `reason`
    SignalInstallFailed,

    /// The signal wait loop terminated abnormally.
    ///
    /// Sets: `reason`
    SignalWaitFailed,

    // === Subscribers ===
    /// Subscriber panicked during report processing.
    ///
    /// Sets: `key` (subscriber name), `reason`
    SubscriberPanicked,

    /// Subscriber dropped a report (queue full or worker closed).
    ///
    /// Sets: `key` (subscriber name), `reason`
    SubscriberOverflow,
}

/// Diagnostic report with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`ReportKind`]
#[derive(Clone, Debug)]
pub struct Report {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Report classification.
    pub kind: ReportKind,

    /// Routing table involved, if any.
    pub handler: Option<HandlerKind>,
    /// Routing key (message name, timer id, signal number) or subscriber name.
    pub key: Option<Arc<str>>,
    /// Handler wall time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Timer delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (errors, panic messages, overflow details).
    pub reason: Option<Arc<str>>,
    /// Runtime state at the time of the report (lifecycle reports only).
    pub state: Option<RuntimeState>,
}

impl Report {
    /// Creates a new report of the given kind with current timestamp and next sequence number.
    pub fn new(kind: ReportKind) -> Self {
        Self {
            seq: REPORT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            handler: None,
            key: None,
            elapsed_ms: None,
            delay_ms: None,
            reason: None,
            state: None,
        }
    }

    /// Attaches the handler kind.
    #[inline]
    pub fn with_handler(mut self, kind: HandlerKind) -> Self {
        self.handler = Some(kind);
        self
    }

    /// Attaches a routing key.
    #[inline]
    pub fn with_key(mut self, key: impl Into<Arc<str>>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches handler wall time (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        self.elapsed_ms = Some(compact_ms(d));
        self
    }

    /// Attaches a timer delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        self.delay_ms = Some(compact_ms(d));
        self
    }

    /// Attaches the runtime state.
    #[inline]
    pub fn with_state(mut self, state: RuntimeState) -> Self {
        self.state = Some(state);
        self
    }

    /// Creates a subscriber overflow report.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Report::new(ReportKind::SubscriberOverflow)
            .with_key(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic report.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Report::new(ReportKind::SubscriberPanicked)
            .with_key(subscriber)
            .with_reason(info)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, ReportKind::SubscriberOverflow)
    }

    /// True for reports describing a handler that did not complete normally.
    #[inline]
    pub fn is_handler_failure(&self) -> bool {
        matches!(
            self.kind,
            ReportKind::HandlerFailed | ReportKind::HandlerPanicked
        )
    }
}

fn compact_ms(d: Duration) -> u32 {
    d.as_millis().min(u128::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Report::new(ReportKind::TimersCleared);
        let b = Report::new(ReportKind::TimersCleared);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_durations_saturate() {
        let r = Report::new(ReportKind::TimerStarted).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(r.delay_ms, Some(u32::MAX));
    }

    #[test]
    fn test_failure_classification() {
        assert!(Report::new(ReportKind::HandlerPanicked).is_handler_failure());
        assert!(!Report::new(ReportKind::HandlerMissing).is_handler_failure());
        assert!(Report::subscriber_overflow("log", "full").is_subscriber_overflow());
    }
}
