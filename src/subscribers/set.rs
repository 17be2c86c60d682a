//! # Non-blocking report fan-out to multiple subscribers.
//!
//! Provides [`SubscriberSet`]: distributes reports to multiple subscribers
//! concurrently without blocking the publisher.
//!
//! ## Architecture
//! ```text
//! emit(report)
//!     │
//!     ├──► [queue 1] ──► worker 1 ──► subscriber1.on_report()
//!     │    (bounded)         └──────► panic → SubscriberPanicked
//!     ├──► [queue 2] ──► worker 2 ──► subscriber2.on_report()
//!     └──► [queue N] ──► worker N ──► subscriberN.on_report()
//! ```
//!
//! ## Rules
//! - **No cross-subscriber ordering**: subscriber A may process report N while B processes N+5
//! - **Overflow**: report dropped for that subscriber only, `SubscriberOverflow` published
//! - **Non-blocking**: `emit()` returns immediately (uses `try_send`)
//! - **Isolation**: slow/panicking subscriber doesn't affect others
//! - **Per-subscriber FIFO**: each subscriber sees reports in order

use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::reports::{Bus, Report};
use crate::subscribers::Subscribe;

/// Per-subscriber channel metadata.
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Report>>,
}

/// Fan-out coordinator for multiple report subscribers.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker task per subscriber.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>, bus: Bus) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Report>>(cap);
            let bus_for_worker = bus.clone();

            let handle = tokio::spawn(async move {
                while let Some(report) = rx.recv().await {
                    let fut = sub.on_report(report.as_ref());

                    if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await
                    {
                        let info = crate::panic_message(&*panic_err);
                        bus_for_worker.publish(Report::subscriber_panicked(sub.name(), info));
                    }
                }
            });
            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }
        Self {
            channels,
            workers,
            bus,
        }
    }

    /// Emits a report to all subscribers (clones the report once).
    pub fn emit(&self, report: &Report) {
        self.emit_arc(Arc::new(report.clone()));
    }

    /// Emits a pre-allocated `Arc<Report>` to all subscribers.
    ///
    /// Overflow reports are never re-published when they overflow themselves.
    pub fn emit_arc(&self, report: Arc<Report>) {
        let is_overflow = report.is_subscriber_overflow();

        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&report)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    if !is_overflow {
                        self.bus
                            .publish(Report::subscriber_overflow(channel.name, "full"));
                    }
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    if !is_overflow {
                        self.bus
                            .publish(Report::subscriber_overflow(channel.name, "closed"));
                    }
                }
            }
        }
    }

    /// Gracefully shuts down all subscriber workers.
    ///
    /// 1. Drops all channel senders (workers see channel closed)
    /// 2. Awaits all worker tasks to finish
    pub async fn shutdown(self) {
        drop(self.channels);

        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::ReportKind;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Recorder(Mutex<Vec<ReportKind>>);

    #[async_trait]
    impl Subscribe for Recorder {
        async fn on_report(&self, r: &Report) {
            self.0.lock().unwrap().push(r.kind);
        }
        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    struct Exploder;

    #[async_trait]
    impl Subscribe for Exploder {
        async fn on_report(&self, _r: &Report) {
            panic!("kaboom");
        }
        fn name(&self) -> &'static str {
            "exploder"
        }
    }

    #[tokio::test]
    async fn test_fan_out_keeps_order_and_isolates_panics() {
        let bus = Bus::new(16);
        let mut bus_rx = bus.subscribe();
        let rec = Arc::new(Recorder(Mutex::new(Vec::new())));
        let subs: Vec<Arc<dyn Subscribe>> = vec![rec.clone(), Arc::new(Exploder)];
        let set = SubscriberSet::new(subs, bus);
        assert_eq!(set.len(), 2);

        set.emit(&Report::new(ReportKind::HandlerMissing));
        set.emit(&Report::new(ReportKind::HandlerFinished));

        let panicked = tokio::time::timeout(Duration::from_secs(5), bus_rx.recv())
            .await
            .expect("panic report expected")
            .expect("bus open");
        assert_eq!(panicked.kind, ReportKind::SubscriberPanicked);
        assert_eq!(panicked.key.as_deref(), Some("exploder"));
        assert_eq!(panicked.reason.as_deref(), Some("kaboom"));

        set.shutdown().await;
        assert_eq!(
            *rec.0.lock().unwrap(),
            vec![ReportKind::HandlerMissing, ReportKind::HandlerFinished]
        );
    }
}
