//! # eventvisor
//!
//! **Eventvisor** is a serialized event-dispatch runtime for long-running
//! processes built on tokio.
//!
//! A process reacts to three kinds of asynchronous occurrences (application
//! messages, expiring one-shot timers, OS signals) through one queue and one
//! consumer: handlers never run concurrently with each other, a failing or
//! panicking handler never stops the loop, and shutdown is a single call.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   application code        TimerScheduler             SignalBridge
//!   post()/post_message()   (one task per timer)       (polls a signal slot)
//!          │                        │                          │
//!          │                        │ TimerFired{id}           │ Signal{n}
//!          ▼                        ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                    EventQueue (FIFO, closable)                    │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                      ┌────────────────────────┐
//!                      │  EventLoop (1 consumer)│── Err/panic ──► HandlerFailed /
//!                      └───────────┬────────────┘                 HandlerPanicked
//!                                  ▼
//!                      ┌────────────────────────┐
//!                      │ Router (3 HandlerTable)│── no handler ─► HandlerMissing
//!                      └───────────┬────────────┘
//!                                  ▼
//!                      handler(arg).await ───────── elapsed ────► HandlerFinished
//!
//! Every component publishes Reports:
//!   ... ── publish(Report) ──► Bus ──► report_listener ──► SubscriberSet
//!                                                    ┌─────────┼─────────┐
//!                                                    ▼         ▼         ▼
//!                                               LogWriter   custom    custom
//! ```
//!
//! ### Lifecycle
//! ```text
//! Created ──initialize(process)──► Initialized ──start().await──► Running
//!                                                                   │ stop()
//!                                                                   ▼
//!                                                   Stopped ◄── Stopping
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                          |
//! |-------------------|-----------------------------------------------------------------|---------------------------------------------|
//! | **Runtime**       | Registration, routing and lifecycle of one process.             | [`ProcessRuntime`], [`Process`]             |
//! | **Events**        | Tagged union flowing through one FIFO queue.                    | [`Event`], [`EventQueue`]                   |
//! | **Dispatch**      | Single-consumer loop with failure containment.                  | [`EventLoop`], [`EventWorker`]              |
//! | **Timers**        | One-shot timers with replace and best-effort cancel.            | [`TimerScheduler`]                          |
//! | **Signals**       | OS signals turned into events; mockable source.                 | [`SignalBridge`], [`SignalSource`]          |
//! | **Subscriber API**| Hook into runtime reports (logging, metrics, test probes).      | [`Subscribe`], [`Report`]                   |
//! | **Errors**        | Typed errors for contract violations and handlers.              | [`RuntimeError`], [`HandlerError`]          |
//! | **Configuration** | Resolved scalar settings.                                       | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use eventvisor::{Config, HandlerError, Process, ProcessRuntime, TimerEvent};
//!
//! struct Countdown;
//!
//! impl Process for Countdown {
//!     fn on_initialize(&self, rt: &ProcessRuntime) -> Result<(), HandlerError> {
//!         let handle = rt.handle();
//!         rt.on_timer(1, move |t: TimerEvent| {
//!             let handle = handle.clone();
//!             async move {
//!                 println!("timer {} fired", t.timer_id);
//!                 handle.stop();
//!                 Ok::<_, HandlerError>(())
//!             }
//!         });
//!         rt.start_timer(1, Duration::from_millis(20));
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn eventvisor::Subscribe>> = vec![Arc::new(eventvisor::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn eventvisor::Subscribe>> = Vec::new();
//!
//!     let rt = ProcessRuntime::builder(Config::default())
//!         .with_subscribers(subs)
//!         .build();
//!     rt.initialize(Arc::new(Countdown))?;
//!     rt.start().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod dispatch;
mod error;
mod events;
mod handlers;
mod reports;
mod signals;
mod subscribers;
mod timers;

// ---- Public re-exports ----

pub use crate::core::{Config, Process, ProcessRuntime, RuntimeBuilder, RuntimeHandle, RuntimeState};
pub use dispatch::{EventLoop, EventWorker, OnEvent};
pub use error::{HandlerError, RuntimeError, SignalError};
pub use events::{
    Event, EventQueue, HandlerKind, MessageEvent, Payload, PopError, SignalEvent, SignalNo,
    TimerEvent, TimerId,
};
pub use handlers::{BoxHandlerFuture, Handler, HandlerFn, HandlerRef, HandlerTable};
pub use reports::{Bus, Report, ReportKind};
pub use signals::{
    OsSignals, SignalBridge, SignalSlot, SignalSource, WAKE_SIGNAL, WeakSignalSlot,
};
pub use subscribers::{Subscribe, SubscriberSet};
pub use timers::TimerScheduler;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;

/// Best-effort text of a caught panic payload.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
