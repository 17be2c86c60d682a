//! # ProcessRuntime: routing, registration and lifecycle.
//!
//! [`ProcessRuntime`] composes the event queue, the dispatch loop, the timer
//! scheduler and the signal bridge, and owns the three routing tables.
//!
//! ## Architecture
//! ```text
//! producers                                   consumer
//!   post()/post_message() ──┐
//!   timer tasks ────────────┼──► EventQueue ──► EventLoop ──► Router ──► handler
//!   signal loop ────────────┘
//!        ▲
//!        └── SignalBridge.wait(signal table keys + WAKE_SIGNAL)
//! ```
//!
//! ## Lifecycle
//! ```text
//! initialize(process) : Created → Initialized, process.on_initialize(rt)
//! start().await       : Initialized → Running
//!                       ├─► spawn signal loop
//!                       ├─► EventLoop::run(while running)        (blocks here)
//!                       └─► join signal loop → Stopped
//! stop()              : running = false
//!                       ├─► raise WAKE_SIGNAL (unblocks the signal loop)
//!                       ├─► process.on_stop(rt)
//!                       ├─► cancel all timers
//!                       └─► shut the queue down (unblocks the dispatch loop)
//! drop                : stop()
//! ```
//!
//! ## Rules
//! - Handlers never run concurrently: one event is handled at a time.
//! - Registration is insert-or-replace and wakes the signal loop so a new
//!   signal subscription is honored promptly.
//! - [`WAKE_SIGNAL`] can't be registered and is never routed to a handler.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use eventvisor::{Config, HandlerError, MessageEvent, Process, ProcessRuntime};
//!
//! struct App;
//!
//! impl Process for App {
//!     fn on_initialize(&self, rt: &ProcessRuntime) -> Result<(), HandlerError> {
//!         let handle = rt.handle();
//!         rt.on_message("ping", move |msg: MessageEvent| {
//!             let handle = handle.clone();
//!             async move {
//!                 assert_eq!(&*msg.payload, b"hello");
//!                 handle.stop();
//!                 Ok::<_, HandlerError>(())
//!             }
//!         });
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), eventvisor::RuntimeError> {
//!     let rt = ProcessRuntime::builder(Config::default()).build();
//!     rt.initialize(Arc::new(App))?;
//!     rt.post_message("ping", b"hello".to_vec());
//!     rt.start().await
//! }
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::dispatch::{EventLoop, OnEvent};
use crate::error::{HandlerError, RuntimeError};
use crate::events::{
    Event, EventQueue, HandlerKind, MessageEvent, Payload, SignalEvent, SignalNo, TimerEvent,
    TimerId,
};
use crate::handlers::{HandlerFn, HandlerRef};
use crate::reports::{Bus, Report, ReportKind};
use crate::signals::{SignalBridge, SignalSource, WAKE_SIGNAL};
use crate::timers::TimerScheduler;

use super::builder::RuntimeBuilder;
use super::config::Config;
use super::handle::RuntimeHandle;
use super::process::Process;
use super::router::Router;
use super::state::RuntimeState;

/// Event-driven runtime of one process.
pub struct ProcessRuntime {
    cfg: Config,
    state: Mutex<RuntimeState>,
    running: Arc<AtomicBool>,

    queue: Arc<EventQueue>,
    router: Arc<Router>,
    event_loop: EventLoop,
    timers: TimerScheduler,
    bridge: Arc<SignalBridge>,

    bus: Bus,
    process: Mutex<Option<Arc<dyn Process>>>,
    this: Weak<ProcessRuntime>,
}

impl ProcessRuntime {
    /// Returns a builder for a runtime with the given configuration.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    /// Builds a runtime with no report subscribers and real OS signals.
    pub fn new(cfg: Config) -> Arc<Self> {
        RuntimeBuilder::new(cfg).build()
    }

    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        source: Arc<dyn SignalSource>,
        this: Weak<ProcessRuntime>,
    ) -> Self {
        let queue = Arc::new(EventQueue::new());
        let router = Arc::new(Router::new(bus.clone()));
        let on_event: Arc<dyn OnEvent> = router.clone();

        Self {
            event_loop: EventLoop::new(Arc::clone(&queue), on_event, bus.clone()),
            timers: TimerScheduler::new(Arc::clone(&queue), bus.clone()),
            bridge: Arc::new(SignalBridge::new(source, bus.clone())),
            state: Mutex::new(RuntimeState::Created),
            running: Arc::new(AtomicBool::new(false)),
            process: Mutex::new(None),
            queue,
            router,
            bus,
            cfg,
            this,
        }
    }

    // === Registration ===

    /// Routes messages named `name` to `handler`, replacing any earlier one.
    pub fn register_message_handler(
        &self,
        name: impl Into<Arc<str>>,
        handler: HandlerRef<MessageEvent>,
    ) {
        let name: Arc<str> = name.into();
        self.router.messages().insert(Arc::clone(&name), handler);
        self.registered(HandlerKind::Message, name);
    }

    /// Routes firings of timer `timer_id` to `handler`, replacing any earlier one.
    pub fn register_timer_handler(&self, timer_id: TimerId, handler: HandlerRef<TimerEvent>) {
        self.router.timers().insert(timer_id, handler);
        self.registered(HandlerKind::Timer, timer_id.to_string().into());
    }

    /// Routes `signal` to `handler`, replacing any earlier one.
    ///
    /// The signal is subscribed at OS level by the signal loop within one
    /// poll interval (immediately if the loop is waiting).
    ///
    /// # Errors
    /// [`RuntimeError::ReservedSignal`] for [`WAKE_SIGNAL`]; nothing is registered.
    pub fn register_signal_handler(
        &self,
        signal: SignalNo,
        handler: HandlerRef<SignalEvent>,
    ) -> Result<(), RuntimeError> {
        if signal == WAKE_SIGNAL {
            return Err(RuntimeError::ReservedSignal { signal });
        }
        self.router.signals().insert(signal, handler);
        self.registered(HandlerKind::Signal, signal.to_string().into());
        Ok(())
    }

    /// Registers a closure as the handler for messages named `name`.
    pub fn on_message<F, Fut>(&self, name: impl Into<Arc<str>>, f: F)
    where
        F: Fn(MessageEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.register_message_handler(name, HandlerFn::arc(f));
    }

    /// Registers a closure as the handler for timer `timer_id`.
    pub fn on_timer<F, Fut>(&self, timer_id: TimerId, f: F)
    where
        F: Fn(TimerEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.register_timer_handler(timer_id, HandlerFn::arc(f));
    }

    /// Registers a closure as the handler for `signal`.
    ///
    /// # Errors
    /// Same as [`register_signal_handler`](Self::register_signal_handler).
    pub fn on_signal<F, Fut>(&self, signal: SignalNo, f: F) -> Result<(), RuntimeError>
    where
        F: Fn(SignalEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        self.register_signal_handler(signal, HandlerFn::arc(f))
    }

    fn registered(&self, kind: HandlerKind, key: Arc<str>) {
        self.bus.publish(
            Report::new(ReportKind::HandlerRegistered)
                .with_handler(kind)
                .with_key(key),
        );
        self.bridge.wake();
    }

    // === Producers ===

    /// Enqueues `event`. Returns `false` once the runtime is stopping.
    pub fn post(&self, event: Event) -> bool {
        self.queue.post(event)
    }

    /// Enqueues a message event.
    pub fn post_message(&self, name: impl Into<Arc<str>>, payload: impl Into<Payload>) -> bool {
        self.post(Event::message(name, payload))
    }

    /// Arms timer `timer_id` to fire a [`TimerEvent`] after `delay`.
    ///
    /// An armed timer with the same id is replaced. Returns `false` once the
    /// runtime is stopping. Must be called from within a tokio runtime.
    pub fn start_timer(&self, timer_id: TimerId, delay: Duration) -> bool {
        self.timers.start(timer_id, delay, Event::timer(timer_id))
    }

    /// Like [`start_timer`](Self::start_timer) but posts an arbitrary `event` on expiry.
    pub fn schedule(&self, timer_id: TimerId, delay: Duration, event: Event) -> bool {
        self.timers.start(timer_id, delay, event)
    }

    /// Cancels timer `timer_id` (best-effort: at most one more delivery may follow).
    pub fn stop_timer(&self, timer_id: TimerId) -> bool {
        self.timers.stop(timer_id)
    }

    /// Deposits `signal` as if the OS had delivered it.
    pub fn raise(&self, signal: SignalNo) {
        self.bridge.raise(signal);
    }

    // === Lifecycle ===

    /// Runs the application's initialization hook.
    ///
    /// # Errors
    /// - [`RuntimeError::InvalidState`] unless the runtime is `Created`
    /// - [`RuntimeError::InitFailed`] if the hook fails; the runtime stays `Created`
    pub fn initialize(&self, process: Arc<dyn Process>) -> Result<(), RuntimeError> {
        {
            let state = self.lock_state();
            let mut slot = self.lock_process();
            if *state != RuntimeState::Created || slot.is_some() {
                return Err(RuntimeError::InvalidState {
                    op: "initialize",
                    state: *state,
                });
            }
            *slot = Some(Arc::clone(&process));
        }

        if let Err(e) = process.on_initialize(self) {
            self.lock_process().take();
            return Err(RuntimeError::InitFailed {
                error: e.to_string(),
            });
        }

        let mut state = self.lock_state();
        if *state != RuntimeState::Created {
            // stopped while the hook ran
            return Err(RuntimeError::InvalidState {
                op: "initialize",
                state: *state,
            });
        }
        *state = RuntimeState::Initialized;
        drop(state);

        self.bus.publish(
            Report::new(ReportKind::RuntimeInitialized).with_state(RuntimeState::Initialized),
        );
        Ok(())
    }

    /// Runs the signal loop and the dispatch loop until [`stop`](Self::stop).
    ///
    /// Events posted before `start` are handled once it runs.
    ///
    /// # Errors
    /// [`RuntimeError::InvalidState`] unless the runtime is `Initialized`.
    pub async fn start(&self) -> Result<(), RuntimeError> {
        {
            let mut state = self.lock_state();
            if *state != RuntimeState::Initialized {
                return Err(RuntimeError::InvalidState {
                    op: "start",
                    state: *state,
                });
            }
            self.running.store(true, Ordering::Release);
            *state = RuntimeState::Running;
        }
        self.bus
            .publish(Report::new(ReportKind::RuntimeStarted).with_state(RuntimeState::Running));

        let signals = self.spawn_signal_loop();
        self.event_loop
            .run(
                || self.running.load(Ordering::Acquire),
                self.cfg.dispatch_timeout(),
            )
            .await;

        self.running.store(false, Ordering::Release);
        self.bridge.wake();
        if let Err(e) = signals.await {
            self.bus.publish(
                Report::new(ReportKind::SignalWaitFailed).with_reason(e.to_string()),
            );
        }

        *self.lock_state() = RuntimeState::Stopped;
        self.bus
            .publish(Report::new(ReportKind::RuntimeStopped).with_state(RuntimeState::Stopped));
        Ok(())
    }

    /// Requests shutdown. Idempotent; never blocks on handlers or timers.
    ///
    /// A running [`start`](Self::start) returns after the handler in progress
    /// (if any) completes. Events still queued are not handled.
    pub fn stop(&self) {
        let next = {
            let mut state = self.lock_state();
            let next = match *state {
                RuntimeState::Running => RuntimeState::Stopping,
                RuntimeState::Created | RuntimeState::Initialized => RuntimeState::Stopped,
                RuntimeState::Stopping | RuntimeState::Stopped => return,
            };
            self.running.store(false, Ordering::Release);
            *state = next;
            next
        };
        self.bus
            .publish(Report::new(ReportKind::StopRequested).with_state(next));

        self.bridge.wake();
        let process = self.lock_process().take();
        if let Some(process) = process {
            process.on_stop(self);
        }
        self.timers.stop_all();
        self.queue.shutdown();

        if next == RuntimeState::Stopped {
            self.bus
                .publish(Report::new(ReportKind::RuntimeStopped).with_state(next));
        }
    }

    // === Observers ===

    /// True between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RuntimeState {
        *self.lock_state()
    }

    /// Configuration this runtime was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Number of events waiting to be handled.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// True if timer `timer_id` is armed.
    pub fn is_timer_active(&self, timer_id: TimerId) -> bool {
        self.timers.is_active(timer_id)
    }

    /// Signal numbers that currently have a handler.
    pub fn signal_subscriptions(&self) -> Vec<SignalNo> {
        self.router.signals().keys()
    }

    /// Weak handle usable from inside handlers.
    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle::new(self.this.clone())
    }

    /// Receiver of every report published after this call.
    pub fn subscribe_reports(&self) -> broadcast::Receiver<Report> {
        self.bus.subscribe()
    }

    fn spawn_signal_loop(&self) -> JoinHandle<()> {
        let bridge = Arc::clone(&self.bridge);
        let router = Arc::clone(&self.router);
        let queue = Arc::clone(&self.queue);
        let running = Arc::clone(&self.running);
        let bus = self.bus.clone();
        let poll = self.cfg.signal_poll_clamped();

        tokio::spawn(async move {
            while running.load(Ordering::Acquire) {
                let mut subscribed = router.signals().keys();
                subscribed.push(WAKE_SIGNAL);

                match bridge.wait(&subscribed, poll).await {
                    Ok(WAKE_SIGNAL) => continue,
                    Ok(signal) => {
                        if !running.load(Ordering::Acquire) {
                            break;
                        }
                        let kind = if queue.post(Event::signal(signal)) {
                            ReportKind::SignalReceived
                        } else {
                            ReportKind::PostRejected
                        };
                        bus.publish(
                            Report::new(kind)
                                .with_handler(HandlerKind::Signal)
                                .with_key(signal.to_string()),
                        );
                    }
                    Err(e) => {
                        bus.publish(
                            Report::new(ReportKind::SignalWaitFailed).with_reason(e.to_string()),
                        );
                        break;
                    }
                }
            }
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, RuntimeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_process(&self) -> MutexGuard<'_, Option<Arc<dyn Process>>> {
        self.process.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ProcessRuntime {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SignalError;
    use crate::signals::SignalSlot;

    struct NoOs;

    impl SignalSource for NoOs {
        fn install(&self, _signal: SignalNo, _slot: SignalSlot) -> Result<(), SignalError> {
            Ok(())
        }
    }

    struct Noop;

    impl Process for Noop {
        fn on_initialize(&self, _rt: &ProcessRuntime) -> Result<(), HandlerError> {
            Ok(())
        }
    }

    struct Broken;

    impl Process for Broken {
        fn on_initialize(&self, _rt: &ProcessRuntime) -> Result<(), HandlerError> {
            Err(HandlerError::fail("no config"))
        }
    }

    fn runtime() -> Arc<ProcessRuntime> {
        ProcessRuntime::builder(Config::default())
            .with_signal_source(Arc::new(NoOs))
            .build()
    }

    #[tokio::test]
    async fn test_wake_signal_cannot_be_registered() {
        let rt = runtime();
        let err = rt
            .on_signal(WAKE_SIGNAL, |_s: SignalEvent| async { Ok::<_, HandlerError>(()) })
            .unwrap_err();
        assert!(matches!(err, RuntimeError::ReservedSignal { signal } if signal == WAKE_SIGNAL));
        assert!(err.is_contract_violation());
        assert!(rt.signal_subscriptions().is_empty());
    }

    #[tokio::test]
    async fn test_lifecycle_order_is_enforced() {
        let rt = runtime();
        assert_eq!(rt.state(), RuntimeState::Created);

        let err = rt.start().await.unwrap_err();
        assert!(matches!(err, RuntimeError::InvalidState { op: "start", .. }));

        rt.initialize(Arc::new(Noop)).unwrap();
        assert_eq!(rt.state(), RuntimeState::Initialized);
        assert!(matches!(
            rt.initialize(Arc::new(Noop)),
            Err(RuntimeError::InvalidState { op: "initialize", .. })
        ));
    }

    #[tokio::test]
    async fn test_failed_init_stays_created() {
        let rt = runtime();
        let err = rt.initialize(Arc::new(Broken)).unwrap_err();
        assert_eq!(err.as_label(), "runtime_init_failed");
        assert_eq!(rt.state(), RuntimeState::Created);
        rt.initialize(Arc::new(Noop)).unwrap();
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let rt = runtime();
        rt.initialize(Arc::new(Noop)).unwrap();
        rt.stop();
        assert_eq!(rt.state(), RuntimeState::Stopped);
        assert!(!rt.post_message("late", Vec::<u8>::new()));
        assert!(!rt.start_timer(1, Duration::from_millis(5)));
        assert!(rt.start().await.is_err());
        rt.stop();
    }

    #[tokio::test]
    async fn test_registration_reports_and_replaces() {
        let rt = runtime();
        let mut rx = rt.subscribe_reports();

        rt.on_timer(4, |_t: TimerEvent| async { Ok::<_, HandlerError>(()) });
        rt.on_timer(4, |_t: TimerEvent| async { Ok::<_, HandlerError>(()) });

        for _ in 0..2 {
            let r = rx.recv().await.unwrap();
            assert_eq!(r.kind, ReportKind::HandlerRegistered);
            assert_eq!(r.handler, Some(HandlerKind::Timer));
            assert_eq!(r.key.as_deref(), Some("4"));
        }
        assert_eq!(rt.router.timers().len(), 1);
    }

    #[tokio::test]
    async fn test_handle_does_not_keep_runtime_alive() {
        let rt = runtime();
        let handle = rt.handle();
        assert!(handle.post(Event::timer(1)));
        drop(rt);
        assert!(!handle.post(Event::timer(1)));
        assert!(!handle.is_running());
    }
}
