//! # Event routing.
//!
//! [`Router`] owns the three routing tables and implements [`OnEvent`]: it
//! switches on the event variant, looks the handler up by key and invokes it.
//!
//! ```text
//! on_event(ev)
//!   ├─ Message    ─► messages[name]    ─┐
//!   ├─ TimerFired ─► timers[timer_id]  ─┼─► None    → HandlerMissing, Ok
//!   └─ Signal     ─► signals[signal]   ─┘   Some(h) → h(arg), HandlerFinished{elapsed}, h's result
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::dispatch::OnEvent;
use crate::error::HandlerError;
use crate::events::{Event, HandlerKind, MessageEvent, SignalEvent, SignalNo, TimerEvent, TimerId};
use crate::handlers::{HandlerRef, HandlerTable};
use crate::reports::{Bus, Report, ReportKind};

pub(crate) struct Router {
    messages: HandlerTable<Arc<str>, MessageEvent>,
    timers: HandlerTable<TimerId, TimerEvent>,
    signals: HandlerTable<SignalNo, SignalEvent>,
    bus: Bus,
}

impl Router {
    pub(crate) fn new(bus: Bus) -> Self {
        Self {
            messages: HandlerTable::new(),
            timers: HandlerTable::new(),
            signals: HandlerTable::new(),
            bus,
        }
    }

    pub(crate) fn messages(&self) -> &HandlerTable<Arc<str>, MessageEvent> {
        &self.messages
    }

    pub(crate) fn timers(&self) -> &HandlerTable<TimerId, TimerEvent> {
        &self.timers
    }

    pub(crate) fn signals(&self) -> &HandlerTable<SignalNo, SignalEvent> {
        &self.signals
    }

    pub(crate) async fn dispatch_message(&self, msg: MessageEvent) -> Result<(), HandlerError> {
        let handler = self.messages.get(&msg.name);
        let key = msg.name.to_string();
        self.invoke(HandlerKind::Message, key, handler, msg).await
    }

    pub(crate) async fn dispatch_timer(&self, timer: TimerEvent) -> Result<(), HandlerError> {
        let handler = self.timers.get(&timer.timer_id);
        let key = timer.timer_id.to_string();
        self.invoke(HandlerKind::Timer, key, handler, timer).await
    }

    pub(crate) async fn dispatch_signal(&self, sig: SignalEvent) -> Result<(), HandlerError> {
        let handler = self.signals.get(&sig.signal);
        let key = sig.signal.to_string();
        self.invoke(HandlerKind::Signal, key, handler, sig).await
    }

    async fn invoke<A: Send + 'static>(
        &self,
        kind: HandlerKind,
        key: String,
        handler: Option<HandlerRef<A>>,
        arg: A,
    ) -> Result<(), HandlerError> {
        let Some(handler) = handler else {
            self.bus.publish(
                Report::new(ReportKind::HandlerMissing)
                    .with_handler(kind)
                    .with_key(key),
            );
            return Ok(());
        };

        let started = Instant::now();
        let res = handler.call(arg).await;
        self.bus.publish(
            Report::new(ReportKind::HandlerFinished)
                .with_handler(kind)
                .with_key(key)
                .with_elapsed(started.elapsed()),
        );
        res
    }
}

#[async_trait]
impl OnEvent for Router {
    async fn on_event(&self, event: Event) -> Result<(), HandlerError> {
        match event {
            Event::Message(msg) => self.dispatch_message(msg).await,
            Event::TimerFired(timer) => self.dispatch_timer(timer).await,
            Event::Signal(sig) => self.dispatch_signal(sig).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::HandlerFn;
    use std::sync::Mutex;

    #[tokio::test]
    async fn test_routes_by_variant_and_key() {
        let bus = Bus::new(16);
        let router = Router::new(bus.clone());
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));

        let s = Arc::clone(&seen);
        router.messages().insert(
            Arc::from("ping"),
            HandlerFn::arc(move |m: MessageEvent| {
                let s = Arc::clone(&s);
                async move {
                    s.lock().unwrap().push(format!("msg:{}", m.payload.len()));
                    Ok::<_, HandlerError>(())
                }
            }),
        );
        let s = Arc::clone(&seen);
        router.timers().insert(
            7,
            HandlerFn::arc(move |t: TimerEvent| {
                let s = Arc::clone(&s);
                async move {
                    s.lock().unwrap().push(format!("timer:{}", t.timer_id));
                    Ok::<_, HandlerError>(())
                }
            }),
        );
        let s = Arc::clone(&seen);
        router.signals().insert(
            15,
            HandlerFn::arc(move |e: SignalEvent| {
                let s = Arc::clone(&s);
                async move {
                    s.lock().unwrap().push(format!("signal:{}", e.signal));
                    Ok::<_, HandlerError>(())
                }
            }),
        );

        router.on_event(Event::message("ping", vec![1u8, 2, 3])).await.unwrap();
        router.on_event(Event::timer(7)).await.unwrap();
        router.on_event(Event::signal(15)).await.unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["msg:3".to_string(), "timer:7".into(), "signal:15".into()]
        );
    }

    #[tokio::test]
    async fn test_missing_handler_is_reported_not_failed() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let router = Router::new(bus);

        assert!(router.on_event(Event::message("nobody", Vec::<u8>::new())).await.is_ok());

        let r = rx.recv().await.unwrap();
        assert_eq!(r.kind, ReportKind::HandlerMissing);
        assert_eq!(r.handler, Some(HandlerKind::Message));
        assert_eq!(r.key.as_deref(), Some("nobody"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_timing_reported_and_error_returned() {
        let bus = Bus::new(16);
        let mut rx = bus.subscribe();
        let router = Router::new(bus);
        router.timers().insert(
            3,
            HandlerFn::arc(|_t: TimerEvent| async { Err::<(), _>(HandlerError::fail("nope")) }),
        );

        let res = router.on_event(Event::timer(3)).await;
        assert!(matches!(res, Err(HandlerError::Fail { .. })));

        let r = rx.recv().await.unwrap();
        assert_eq!(r.kind, ReportKind::HandlerFinished);
        assert_eq!(r.key.as_deref(), Some("3"));
        assert!(r.elapsed_ms.is_some());
    }
}
