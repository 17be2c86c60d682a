//! # One-shot timers that fire into an event queue.
//!
//! [`TimerScheduler`] arms named one-shot timers. Each timer is one lightweight
//! tokio task that sleeps for its delay and then posts a caller-supplied event
//! into the shared [`EventQueue`].
//!
//! ## Lifecycle
//! ```text
//! start(id, delay, ev)
//!   ├─► under lock: refuse if shut down, else replace the record for id
//!   └─► spawn:
//!         select { cancelled → exit, sleep(delay) → continue }
//!         if scheduler shut down or record cancelled → exit
//!         queue.post(ev)
//!         remove own record (generation must still match)
//!
//! stop(id)   ─► remove record, cancel its token (no join)
//! stop_all() ─► shutdown flag, cancel + clear every record (no join)
//! ```
//!
//! ## Cancellation is best-effort
//! `stop`/`stop_all` never wait for the firing task. A task that already passed
//! its final check when the cancellation lands may still deliver its event.
//! Callers must tolerate at most one delivery after cancel. After `stop_all`,
//! no task posts once it observes the shutdown flag, and new timers are refused.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::events::{Event, EventQueue, TimerId};
use crate::reports::{Bus, Report, ReportKind};

/// Bookkeeping for one in-flight timer.
struct TimerRecord {
    /// Distinguishes this arming from later ones with the same id.
    generation: u64,
    /// Cancels the sleeping task.
    cancel: CancellationToken,
}

/// State shared between the scheduler and its firing tasks.
struct Shared {
    queue: Arc<EventQueue>,
    bus: Bus,
    timers: Mutex<HashMap<TimerId, TimerRecord>>,
    shutdown: AtomicBool,
    next_generation: AtomicU64,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, HashMap<TimerId, TimerRecord>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Removes the record for `id` only if it still belongs to `generation`.
    fn remove_if_current(&self, id: TimerId, generation: u64) {
        let mut timers = self.lock();
        if timers.get(&id).is_some_and(|r| r.generation == generation) {
            timers.remove(&id);
        }
    }
}

/// Registers one-shot timers that post events into a queue.
pub struct TimerScheduler {
    shared: Arc<Shared>,
}

impl TimerScheduler {
    /// Creates a scheduler posting into `queue`; bookkeeping is reported on `bus`.
    pub fn new(queue: Arc<EventQueue>, bus: Bus) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue,
                bus,
                timers: Mutex::new(HashMap::new()),
                shutdown: AtomicBool::new(false),
                next_generation: AtomicU64::new(1),
            }),
        }
    }

    /// Arms timer `id` to post `event` after `delay`, replacing any timer with the same id.
    ///
    /// Returns `false` (and arms nothing) once [`stop_all`](Self::stop_all) was called.
    /// Must be called from within a tokio runtime.
    pub fn start(&self, id: TimerId, delay: Duration, event: Event) -> bool {
        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        {
            let mut timers = self.shared.lock();
            // stop_all sets the flag before draining under this lock
            if self.is_shutdown() {
                return false;
            }
            if let Some(old) = timers.insert(
                id,
                TimerRecord {
                    generation,
                    cancel: cancel.clone(),
                },
            ) {
                old.cancel.cancel();
            }
        }

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = time::sleep(delay) => {}
            }
            if shared.shutdown.load(Ordering::Acquire) || cancel.is_cancelled() {
                return;
            }

            let kind = event.kind();
            if !shared.queue.post(event) {
                shared.bus.publish(
                    Report::new(ReportKind::PostRejected)
                        .with_handler(kind)
                        .with_key(id.to_string()),
                );
            }
            shared.remove_if_current(id, generation);
        });

        self.shared.bus.publish(
            Report::new(ReportKind::TimerStarted)
                .with_key(id.to_string())
                .with_delay(delay),
        );
        true
    }

    /// Cancels timer `id` without waiting for its task (best-effort).
    ///
    /// Returns `true` if a record existed.
    pub fn stop(&self, id: TimerId) -> bool {
        let removed = self.shared.lock().remove(&id);
        match removed {
            Some(record) => {
                record.cancel.cancel();
                self.shared
                    .bus
                    .publish(Report::new(ReportKind::TimerStopped).with_key(id.to_string()));
                true
            }
            None => false,
        }
    }

    /// Cancels every timer and refuses new ones. Does not wait for in-flight tasks.
    pub fn stop_all(&self) {
        if self.shared.shutdown.swap(true, Ordering::AcqRel) {
            return;
        }
        let drained: Vec<TimerRecord> = {
            let mut timers = self.shared.lock();
            timers.drain().map(|(_, r)| r).collect()
        };
        for record in drained {
            record.cancel.cancel();
        }
        self.shared.bus.publish(Report::new(ReportKind::TimersCleared));
    }

    /// True if timer `id` is armed and has not fired yet.
    pub fn is_active(&self, id: TimerId) -> bool {
        self.shared.lock().contains_key(&id)
    }

    /// Number of armed timers.
    pub fn len(&self) -> usize {
        self.shared.lock().len()
    }

    /// True if no timer is armed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once [`stop_all`](Self::stop_all) was called.
    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }
}

impl Drop for TimerScheduler {
    fn drop(&mut self) {
        self.stop_all();
    }
}
