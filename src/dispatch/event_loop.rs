//! # Single-consumer dispatch loop.
//!
//! [`EventLoop`] pulls events from one [`EventQueue`] and hands each of them to
//! an injected [`OnEvent`] implementation, one at a time.
//!
//! ## Event flow
//! ```text
//! while keep_running() {
//!   ├─► queue.pop(poll)
//!   │     ├─ Timeout ─► re-check keep_running
//!   │     ├─ Closed  ─► exit (nothing will ever arrive again)
//!   │     └─ Ok(ev)  ─► on_event(ev)  (caught: Err → HandlerFailed,
//!   │                                          panic → HandlerPanicked)
//!   └─► next
//! }
//! ```
//!
//! ## Rules
//! - Handlers run **sequentially**: the next event is popped only after the
//!   previous handler future resolved.
//! - A failing or panicking handler **never** terminates the loop.
//! - `shutdown` closes the queue, so a blocked `pop` returns promptly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;

use crate::error::HandlerError;
use crate::events::{Event, EventQueue, PopError};
use crate::reports::{Bus, Report, ReportKind};

/// Per-event handler invoked by the loop.
#[async_trait]
pub trait OnEvent: Send + Sync + 'static {
    /// Handle one event. Errors are reported by the loop, not propagated.
    async fn on_event(&self, event: Event) -> Result<(), HandlerError>;
}

/// Pulls from one queue and invokes an [`OnEvent`] for every event.
pub struct EventLoop {
    queue: Arc<EventQueue>,
    handler: Arc<dyn OnEvent>,
    bus: Bus,
}

impl EventLoop {
    /// Creates a loop over `queue`; failures are reported on `bus`.
    pub fn new(queue: Arc<EventQueue>, handler: Arc<dyn OnEvent>, bus: Bus) -> Self {
        Self {
            queue,
            handler,
            bus,
        }
    }

    /// The queue this loop consumes.
    pub fn queue(&self) -> &Arc<EventQueue> {
        &self.queue
    }

    /// Enqueues an event for this loop. `false` once the queue is shut down.
    pub fn post(&self, event: Event) -> bool {
        self.queue.post(event)
    }

    /// Runs until `keep_running` returns `false` or the queue is closed and drained.
    ///
    /// `poll` bounds each wait so `keep_running` is re-evaluated at least that
    /// often; `None` waits indefinitely (only shutdown or an event wakes it).
    ///
    /// Returns the number of events handed to the handler.
    pub async fn run<F>(&self, keep_running: F, poll: Option<Duration>) -> u64
    where
        F: Fn() -> bool,
    {
        let mut handled = 0u64;
        while keep_running() {
            match self.queue.pop(poll).await {
                Ok(ev) => {
                    self.dispatch(ev).await;
                    handled += 1;
                }
                Err(PopError::Timeout) => continue,
                Err(PopError::Closed) => break,
            }
        }
        handled
    }

    /// Invokes the handler for a single event, containing any failure.
    pub async fn dispatch(&self, event: Event) {
        let kind = event.kind();
        let key = event.key();

        let fut = self.handler.on_event(event);
        match std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                self.bus.publish(
                    Report::new(ReportKind::HandlerFailed)
                        .with_handler(kind)
                        .with_key(key)
                        .with_reason(err.to_string()),
                );
            }
            Err(panic_err) => {
                self.bus.publish(
                    Report::new(ReportKind::HandlerPanicked)
                        .with_handler(kind)
                        .with_key(key)
                        .with_reason(crate::panic_message(&*panic_err)),
                );
            }
        }
    }

    /// Closes the queue; a blocked `run` returns once buffered events are drained.
    pub fn shutdown(&self) {
        self.queue.shutdown();
    }

    /// True once the queue is shut down.
    pub fn is_shutdown(&self) -> bool {
        self.queue.is_shutdown()
    }
}
