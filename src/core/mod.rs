//! Runtime core: routing, registration and lifecycle.
//!
//! The public entry point is [`ProcessRuntime`], built with [`RuntimeBuilder`]
//! and driven by an application [`Process`].
//!
//! Internal modules:
//! - [`router`]: maps events to handlers by variant and key, reports timing;
//! - [`runtime`]: owns queue, dispatch loop, timers and signal bridge;
//! - [`builder`]: wires the report bus to subscribers;
//! - [`handle`]: weak handle for use inside handlers.

mod builder;
mod config;
mod handle;
mod process;
mod router;
mod runtime;
mod state;

pub use builder::RuntimeBuilder;
pub use config::Config;
pub use handle::RuntimeHandle;
pub use process::Process;
pub use runtime::ProcessRuntime;
pub use state::RuntimeState;
