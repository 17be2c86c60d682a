//! # Application events routed by the runtime.
//!
//! An [`Event`] is the unit flowing through the [`EventQueue`](crate::EventQueue).
//! It is a closed sum type with exactly three variants:
//! - [`Event::Message`]: a named application message with an immutable payload;
//! - [`Event::TimerFired`]: a one-shot timer registered via [`TimerScheduler`](crate::TimerScheduler) expired;
//! - [`Event::Signal`]: an OS (or programmatically raised) signal was observed.
//!
//! Routing keys are the message name, the [`TimerId`] and the [`SignalNo`].
//!
//! ## Example
//! ```rust
//! use eventvisor::{Event, HandlerKind};
//!
//! let ev = Event::message("ping", b"hello".to_vec());
//! assert_eq!(ev.kind(), HandlerKind::Message);
//! assert_eq!(ev.key(), "ping");
//!
//! let ev = Event::timer(7);
//! assert_eq!(ev.key(), "7");
//! ```

use std::fmt;
use std::sync::Arc;

/// Caller-assigned opaque timer identifier.
///
/// Uniqueness and scoping are the caller's responsibility.
pub type TimerId = u64;

/// Signal number (e.g. `SIGTERM = 15` on Unix).
pub type SignalNo = i32;

/// Immutable shared byte buffer carried by messages.
pub type Payload = Arc<[u8]>;

/// Which routing table an event (or handler) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    Message,
    Timer,
    Signal,
}

impl HandlerKind {
    /// Returns a short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerKind::Message => "message",
            HandlerKind::Timer => "timer",
            HandlerKind::Signal => "signal",
        }
    }
}

impl fmt::Display for HandlerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Named application message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// Routing name.
    pub name: Arc<str>,
    /// Message body (shared, never mutated).
    pub payload: Payload,
}

/// Expired one-shot timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerEvent {
    pub timer_id: TimerId,
}

/// Observed signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalEvent {
    pub signal: SignalNo,
}

/// Event flowing through the queue; exactly one variant is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Message(MessageEvent),
    TimerFired(TimerEvent),
    Signal(SignalEvent),
}

impl Event {
    /// Creates a message event.
    pub fn message(name: impl Into<Arc<str>>, payload: impl Into<Payload>) -> Self {
        Event::Message(MessageEvent {
            name: name.into(),
            payload: payload.into(),
        })
    }

    /// Creates a "timer fired" event.
    #[inline]
    pub fn timer(timer_id: TimerId) -> Self {
        Event::TimerFired(TimerEvent { timer_id })
    }

    /// Creates a signal event.
    #[inline]
    pub fn signal(signal: SignalNo) -> Self {
        Event::Signal(SignalEvent { signal })
    }

    /// Returns the routing table this event is dispatched through.
    pub fn kind(&self) -> HandlerKind {
        match self {
            Event::Message(_) => HandlerKind::Message,
            Event::TimerFired(_) => HandlerKind::Timer,
            Event::Signal(_) => HandlerKind::Signal,
        }
    }

    /// Returns the routing key rendered as text (name, timer id or signal number).
    pub fn key(&self) -> String {
        match self {
            Event::Message(m) => m.name.to_string(),
            Event::TimerFired(t) => t.timer_id.to_string(),
            Event::Signal(s) => s.signal.to_string(),
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Message(m) => write!(f, "message[{}] ({} bytes)", m.name, m.payload.len()),
            Event::TimerFired(t) => write!(f, "timer[{}]", t.timer_id),
            Event::Signal(s) => write!(f, "signal[{}]", s.signal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_pick_variant() {
        assert_eq!(Event::timer(3), Event::TimerFired(TimerEvent { timer_id: 3 }));
        assert_eq!(Event::signal(15), Event::Signal(SignalEvent { signal: 15 }));
        match Event::message("ping", vec![1u8, 2, 3]) {
            Event::Message(m) => {
                assert_eq!(&*m.name, "ping");
                assert_eq!(&*m.payload, &[1u8, 2, 3]);
            }
            other => panic!("unexpected variant: {other:?}"),
        }
    }

    #[test]
    fn test_kind_and_key() {
        assert_eq!(Event::message("a", Vec::<u8>::new()).kind(), HandlerKind::Message);
        assert_eq!(Event::timer(42).kind(), HandlerKind::Timer);
        assert_eq!(Event::signal(2).kind(), HandlerKind::Signal);
        assert_eq!(Event::signal(-1).key(), "-1");
    }

    #[test]
    fn test_payload_is_shared_not_copied() {
        let ev = Event::message("blob", vec![0u8; 64]);
        let copy = ev.clone();
        match (ev, copy) {
            (Event::Message(a), Event::Message(b)) => assert!(Arc::ptr_eq(&a.payload, &b.payload)),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Event::message("x", vec![1u8, 2]).to_string(), "message[x] (2 bytes)");
        assert_eq!(Event::timer(9).to_string(), "timer[9]");
    }
}
