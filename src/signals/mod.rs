//! Signal handling: OS source, shared slot and the polling bridge.
//!
//! ## Contents
//! - [`SignalBridge`] single-flight polling wait + [`WAKE_SIGNAL`]
//! - [`SignalSource`] injectable installer of OS-level handlers
//! - [`SignalSlot`] last-write-wins cell fed by the source
//! - [`OsSignals`] tokio-backed source for real OS signals

mod bridge;
mod os;
mod source;

pub use bridge::{SignalBridge, WAKE_SIGNAL};
pub use os::OsSignals;
pub use source::{SignalSlot, SignalSource, WeakSignalSlot};
