//! Event dispatch: the single-consumer loop and its background worker.
//!
//! - [`EventLoop`]: pops from one queue and calls an [`OnEvent`], containing failures;
//! - [`EventWorker`]: runs an `EventLoop` on a dedicated task with start/stop.

mod event_loop;
mod worker;

pub use event_loop::{EventLoop, OnEvent};
pub use worker::EventWorker;
