//! Application events and the queue that carries them.
//!
//! ## Contents
//! - [`Event`] and its payload structs ([`MessageEvent`], [`TimerEvent`], [`SignalEvent`])
//! - [`EventQueue`] closable FIFO shared by all producers and the single consumer
//!
//! ## Quick reference
//! - **Producers**: `ProcessRuntime::post`, `TimerScheduler` firing tasks,
//!   the runtime's signal wait loop.
//! - **Consumer**: exactly one `EventLoop` per queue.

mod event;
mod queue;

pub use event::{Event, HandlerKind, MessageEvent, Payload, SignalEvent, SignalNo, TimerEvent, TimerId};
pub use queue::{EventQueue, PopError};
