//! # Weak handle to a running runtime.
//!
//! Handlers stored in the routing tables often need to post follow-up events,
//! re-arm timers or stop the process. Capturing the `Arc<ProcessRuntime>` in
//! a handler would form a cycle (runtime → table → handler → runtime), so
//! handlers capture a [`RuntimeHandle`] instead. Every call is a no-op
//! (returning `false` where it returns anything) once the runtime is gone.

use std::sync::{Arc, Weak};
use std::time::Duration;

use crate::events::{Event, Payload, SignalNo, TimerId};

use super::runtime::ProcessRuntime;
use super::state::RuntimeState;

/// Cloneable, non-owning handle to a [`ProcessRuntime`].
#[derive(Clone, Debug)]
pub struct RuntimeHandle {
    inner: Weak<ProcessRuntime>,
}

impl RuntimeHandle {
    pub(crate) fn new(inner: Weak<ProcessRuntime>) -> Self {
        Self { inner }
    }

    /// Upgrades to a strong reference if the runtime still exists.
    pub fn upgrade(&self) -> Option<Arc<ProcessRuntime>> {
        self.inner.upgrade()
    }

    /// See [`ProcessRuntime::post`].
    pub fn post(&self, event: Event) -> bool {
        self.upgrade().is_some_and(|rt| rt.post(event))
    }

    /// See [`ProcessRuntime::post_message`].
    pub fn post_message(&self, name: impl Into<Arc<str>>, payload: impl Into<Payload>) -> bool {
        self.post(Event::message(name, payload))
    }

    /// See [`ProcessRuntime::start_timer`].
    pub fn start_timer(&self, timer_id: TimerId, delay: Duration) -> bool {
        self.upgrade()
            .is_some_and(|rt| rt.start_timer(timer_id, delay))
    }

    /// See [`ProcessRuntime::stop_timer`].
    pub fn stop_timer(&self, timer_id: TimerId) -> bool {
        self.upgrade().is_some_and(|rt| rt.stop_timer(timer_id))
    }

    /// See [`ProcessRuntime::raise`].
    pub fn raise(&self, signal: SignalNo) {
        if let Some(rt) = self.upgrade() {
            rt.raise(signal);
        }
    }

    /// See [`ProcessRuntime::stop`].
    pub fn stop(&self) {
        if let Some(rt) = self.upgrade() {
            rt.stop();
        }
    }

    /// See [`ProcessRuntime::is_running`].
    pub fn is_running(&self) -> bool {
        self.upgrade().is_some_and(|rt| rt.is_running())
    }

    /// Current state, or `None` once the runtime is gone.
    pub fn state(&self) -> Option<RuntimeState> {
        self.upgrade().map(|rt| rt.state())
    }
}
