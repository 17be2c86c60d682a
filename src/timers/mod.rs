//! One-shot timers.
//!
//! - [`TimerScheduler`]: arms timers keyed by [`TimerId`](crate::TimerId);
//!   replace-on-duplicate-id, best-effort cancellation, no delivery after `stop_all`.

mod scheduler;

pub use scheduler::TimerScheduler;
