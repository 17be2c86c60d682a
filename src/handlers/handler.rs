//! # Handler abstraction and function-backed implementation.
//!
//! A [`Handler<A>`] receives one routed argument (`MessageEvent`, `TimerEvent`
//! or `SignalEvent`) and returns a boxed future resolving to
//! `Result<(), HandlerError>`. The shared handle type is [`HandlerRef<A>`],
//! an `Arc<dyn Handler<A>>` stored in the runtime's routing tables.
//!
//! [`HandlerFn`] wraps a closure `F: Fn(A) -> Fut`, producing a fresh future
//! per invocation. No hidden state is shared between invocations; capture an
//! `Arc<...>` explicitly if the handler needs state.
//!
//! ## Example
//! ```rust
//! use eventvisor::{HandlerError, HandlerFn, HandlerRef, MessageEvent};
//!
//! let h: HandlerRef<MessageEvent> = HandlerFn::arc(|msg: MessageEvent| async move {
//!     if msg.payload.is_empty() {
//!         return Err(HandlerError::fail("empty payload"));
//!     }
//!     Ok(())
//! });
//! # let _ = h;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::HandlerError;

/// Boxed future returned by [`Handler::call`].
pub type BoxHandlerFuture = Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send + 'static>>;

/// Shared handler handle stored in routing tables.
pub type HandlerRef<A> = Arc<dyn Handler<A>>;

/// # Caller-supplied callback bound to a routing key.
///
/// Handlers of one runtime never run concurrently with each other; the
/// dispatch loop awaits each returned future before taking the next event.
pub trait Handler<A>: Send + Sync + 'static {
    /// Starts handling `arg`.
    fn call(&self, arg: A) -> BoxHandlerFuture;
}

/// Function-backed handler implementation.
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

impl<A, F, Fut> Handler<A> for HandlerFn<F>
where
    A: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    fn call(&self, arg: A) -> BoxHandlerFuture {
        Box::pin((self.f)(arg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::TimerEvent;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[tokio::test]
    async fn test_fresh_future_per_call() {
        let seen = Arc::new(AtomicU64::new(0));
        let h: HandlerRef<TimerEvent> = {
            let seen = Arc::clone(&seen);
            HandlerFn::arc(move |t: TimerEvent| {
                let seen = Arc::clone(&seen);
                async move {
                    seen.fetch_add(t.timer_id, Ordering::SeqCst);
                    Ok::<_, HandlerError>(())
                }
            })
        };

        h.call(TimerEvent { timer_id: 2 }).await.unwrap();
        h.call(TimerEvent { timer_id: 5 }).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_error_is_returned() {
        let h: HandlerRef<TimerEvent> =
            HandlerFn::arc(|_t: TimerEvent| async { Err::<(), _>(HandlerError::fail("nope")) });
        assert_eq!(
            h.call(TimerEvent { timer_id: 1 }).await,
            Err(HandlerError::fail("nope"))
        );
    }
}
