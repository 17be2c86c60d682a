//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging report sinks (log files,
//! metrics, test probes) into the runtime. Each subscriber is driven by a
//! dedicated worker loop fed by a bounded queue owned by the
//! [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) – they do **not** block the
//!   dispatch loop nor other subscribers.
//! - Each subscriber **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, reports for that
//!   subscriber are **dropped** and a `SubscriberOverflow` report is published.
//!
//! ## Example
//! ```rust
//! use eventvisor::{Report, ReportKind, Subscribe};
//!
//! struct SlowHandlers;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for SlowHandlers {
//!     async fn on_report(&self, r: &Report) {
//!         if r.kind == ReportKind::HandlerFinished && r.elapsed_ms.unwrap_or(0) > 100 {
//!             eprintln!("slow handler: {:?}", r.key);
//!         }
//!     }
//!     fn name(&self) -> &'static str { "slow-handlers" }
//! }
//! ```

use async_trait::async_trait;

use crate::reports::Report;

/// Contract for report subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single report for this subscriber.
    async fn on_report(&self, report: &Report);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
