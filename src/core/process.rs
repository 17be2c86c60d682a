//! # Application hooks.
//!
//! A [`Process`] is the application plugged into a
//! [`ProcessRuntime`]: it registers its handlers and arms its first timers in
//! [`on_initialize`](Process::on_initialize) and releases resources in
//! [`on_stop`](Process::on_stop).
//!
//! ## Example
//! ```rust
//! use eventvisor::{HandlerError, MessageEvent, Process, ProcessRuntime};
//!
//! struct Echo;
//!
//! impl Process for Echo {
//!     fn on_initialize(&self, rt: &ProcessRuntime) -> Result<(), HandlerError> {
//!         rt.on_message("echo", |msg: MessageEvent| async move {
//!             println!("{}", String::from_utf8_lossy(&msg.payload));
//!             Ok::<_, HandlerError>(())
//!         });
//!         Ok(())
//!     }
//! }
//! ```

use crate::error::HandlerError;

use super::runtime::ProcessRuntime;

/// Application plugged into a runtime.
pub trait Process: Send + Sync + 'static {
    /// Called once by [`ProcessRuntime::initialize`].
    ///
    /// An error aborts initialization; the runtime stays `Created`.
    fn on_initialize(&self, rt: &ProcessRuntime) -> Result<(), HandlerError>;

    /// Called once by [`ProcessRuntime::stop`], after the running flag is
    /// cleared and before the queue is shut down.
    fn on_stop(&self, _rt: &ProcessRuntime) {}
}
