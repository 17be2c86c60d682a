//! # Signal-to-event bridge.
//!
//! [`SignalBridge`] blocks (with polling granularity) until one of the
//! subscribed signals has been observed and returns its number. The runtime's
//! signal loop turns every non-wake result into an [`Event::Signal`](crate::Event).
//!
//! ## Wait cycle
//! ```text
//! wait(signals, poll)
//!   ├─► single-flight check (second concurrent call → WaitInProgress)
//!   ├─► install not-yet-installed signals via SignalSource (failures reported once)
//!   └─► loop {
//!         slot.take() ─► Some(n) → return n
//!         sleep(poll)
//!       }
//! ```
//!
//! ## Wake signal
//! [`WAKE_SIGNAL`] is outside every OS signal range and is never installed at
//! OS level. It is only ever [`raise`](SignalBridge::raise)d to unblock a
//! pending `wait` so the caller can re-read its subscription set. Callers must
//! not treat it as an application signal.
//!
//! ## Weak guarantees
//! Delivery is last-write-wins with no queue: two different signals raised
//! inside one poll window collapse to the later one.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time;

use crate::error::SignalError;
use crate::events::SignalNo;
use crate::reports::{Bus, Report, ReportKind};

use super::os::OsSignals;
use super::source::{SignalSlot, SignalSource};

/// Reserved signal number used only to wake a pending [`SignalBridge::wait`].
pub const WAKE_SIGNAL: SignalNo = 10_002;

/// Minimum poll interval accepted by [`SignalBridge::wait`].
const MIN_POLL: Duration = Duration::from_millis(1);

/// Clears the single-flight flag when a wait returns or is dropped.
struct WaitGuard<'a>(&'a AtomicBool);

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Polls a [`SignalSlot`] fed by a [`SignalSource`].
pub struct SignalBridge {
    slot: SignalSlot,
    source: Arc<dyn SignalSource>,
    /// Signals already handed to the source (successfully or not).
    installed: Mutex<HashSet<SignalNo>>,
    waiting: AtomicBool,
    bus: Bus,
}

impl SignalBridge {
    /// Creates a bridge over `source`; install failures are reported on `bus`.
    pub fn new(source: Arc<dyn SignalSource>, bus: Bus) -> Self {
        Self {
            slot: SignalSlot::new(),
            source,
            installed: Mutex::new(HashSet::new()),
            waiting: AtomicBool::new(false),
            bus,
        }
    }

    /// Creates a bridge over real OS signals.
    pub fn with_os_signals(bus: Bus) -> Self {
        Self::new(Arc::new(OsSignals::new()), bus)
    }

    /// Waits until any signal lands in the slot and returns it.
    ///
    /// - `signals` not yet installed are handed to the source first;
    /// - the slot is checked every `poll` (at least 1ms);
    /// - the result may be [`WAKE_SIGNAL`] or a signal outside `signals`
    ///   (anything raised on this bridge); filtering is the caller's job.
    ///
    /// # Errors
    /// [`SignalError::WaitInProgress`] if another `wait` on this bridge has
    /// not returned yet. The running wait is unaffected.
    pub async fn wait(&self, signals: &[SignalNo], poll: Duration) -> Result<SignalNo, SignalError> {
        if self
            .waiting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(SignalError::WaitInProgress);
        }
        let _guard = WaitGuard(&self.waiting);

        self.install_missing(signals);

        let poll = poll.max(MIN_POLL);
        loop {
            if let Some(n) = self.slot.take() {
                return Ok(n);
            }
            time::sleep(poll).await;
        }
    }

    /// Deposits `signal` into the slot (last write wins). `0` is ignored.
    pub fn raise(&self, signal: SignalNo) {
        self.slot.deposit(signal);
    }

    /// Raises [`WAKE_SIGNAL`].
    pub fn wake(&self) {
        self.raise(WAKE_SIGNAL);
    }

    /// True while a `wait` is in progress.
    pub fn is_waiting(&self) -> bool {
        self.waiting.load(Ordering::Acquire)
    }

    /// True if `signal` was handed to the source (whether or not it succeeded).
    pub fn is_installed(&self, signal: SignalNo) -> bool {
        self.installed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&signal)
    }

    fn install_missing(&self, signals: &[SignalNo]) {
        let mut installed = self.installed.lock().unwrap_or_else(PoisonError::into_inner);
        for &signal in signals {
            if signal == WAKE_SIGNAL || signal == 0 || !installed.insert(signal) {
                continue;
            }
            if let Err(e) = self.source.install(signal, self.slot.clone()) {
                self.bus.publish(
                    Report::new(ReportKind::SignalInstallFailed)
                        .with_key(signal.to_string())
                        .with_reason(e.to_string()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records install calls; refuses signal 9.
    #[derive(Default)]
    struct Manual {
        calls: Mutex<Vec<SignalNo>>,
    }

    impl SignalSource for Manual {
        fn install(&self, signal: SignalNo, _slot: SignalSlot) -> Result<(), SignalError> {
            self.calls.lock().unwrap().push(signal);
            if signal == 9 {
                return Err(SignalError::Install {
                    signal,
                    reason: "refused".into(),
                });
            }
            Ok(())
        }
    }

    fn bridge() -> (Arc<Manual>, Arc<SignalBridge>, Bus) {
        let source = Arc::new(Manual::default());
        let bus = Bus::new(16);
        let bridge = Arc::new(SignalBridge::new(source.clone(), bus.clone()));
        (source, bridge, bus)
    }

    #[tokio::test(start_paused = true)]
    async fn test_returns_raised_signal() {
        let (_, bridge, _) = bridge();
        let waiter = {
            let b = Arc::clone(&bridge);
            tokio::spawn(async move { b.wait(&[15], Duration::from_millis(200)).await })
        };
        tokio::task::yield_now().await;
        assert!(bridge.is_waiting());

        bridge.raise(15);
        assert_eq!(waiter.await.unwrap(), Ok(15));
        assert!(!bridge.is_waiting());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_wait_is_rejected_first_unaffected() {
        let (_, bridge, _) = bridge();
        let first = {
            let b = Arc::clone(&bridge);
            tokio::spawn(async move { b.wait(&[2], Duration::from_millis(50)).await })
        };
        tokio::task::yield_now().await;

        assert_eq!(
            bridge.wait(&[2], Duration::from_millis(50)).await,
            Err(SignalError::WaitInProgress)
        );
        assert!(bridge.is_waiting());

        bridge.wake();
        assert_eq!(first.await.unwrap(), Ok(WAKE_SIGNAL));

        // flag released: a fresh wait is accepted again
        bridge.raise(2);
        assert_eq!(bridge.wait(&[2], Duration::from_millis(50)).await, Ok(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_signals_in_one_window_collapse() {
        let (_, bridge, _) = bridge();
        bridge.raise(10);
        bridge.raise(12);
        assert_eq!(bridge.wait(&[10, 12], Duration::from_millis(100)).await, Ok(12));

        let second = time::timeout(
            Duration::from_millis(500),
            bridge.wait(&[10, 12], Duration::from_millis(100)),
        )
        .await;
        assert!(second.is_err(), "the earlier signal must be lost");
    }

    #[tokio::test(start_paused = true)]
    async fn test_installs_once_and_never_the_wake_signal() {
        let (source, bridge, bus) = bridge();
        let mut rx = bus.subscribe();

        bridge.raise(1);
        assert_eq!(bridge.wait(&[1, 9, WAKE_SIGNAL], Duration::from_millis(10)).await, Ok(1));
        bridge.raise(1);
        assert_eq!(bridge.wait(&[1, 9, WAKE_SIGNAL], Duration::from_millis(10)).await, Ok(1));

        assert_eq!(*source.calls.lock().unwrap(), vec![1, 9]);
        assert!(bridge.is_installed(9));
        assert!(!bridge.is_installed(WAKE_SIGNAL));

        let r = rx.recv().await.unwrap();
        assert_eq!(r.kind, ReportKind::SignalInstallFailed);
        assert_eq!(r.key.as_deref(), Some("9"));
    }

    #[test]
    fn test_wake_signal_outside_os_range() {
        assert!(WAKE_SIGNAL > 128);
    }
}
