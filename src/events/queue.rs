//! # Closable FIFO event queue.
//!
//! [`EventQueue`] is the single shared structure between every producer
//! (application `post` calls, timer tasks, the signal wait loop) and the one
//! dispatch consumer.
//!
//! ## Architecture
//! ```text
//! Producers (many):                       Consumer (one per loop):
//!   post() ──┐
//!   timers ──┼──► Mutex<VecDeque<Event>> ──► pop(timeout) ──► EventLoop
//!   signals ─┘        + Notify (wake)
//! ```
//!
//! ## Rules
//! - **FIFO**: insertion order is preserved; capacity is unbounded.
//! - **One-way shutdown**: after [`EventQueue::shutdown`] every `post` returns `false`.
//! - **Drain before close**: `pop` keeps returning buffered events after shutdown and
//!   only then reports [`PopError::Closed`].
//! - **Prompt wake**: `shutdown` wakes every blocked `pop`.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Notify;
use tokio::time::{self, Instant};

use super::event::Event;

/// Why [`EventQueue::pop`] returned without an event.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopError {
    /// The wait elapsed with the queue still empty.
    #[error("pop timed out")]
    Timeout,
    /// The queue is shut down and fully drained.
    #[error("queue closed")]
    Closed,
}

/// Thread-safe FIFO of [`Event`]s with timed async pop and closable shutdown.
#[derive(Debug, Default)]
pub struct EventQueue {
    items: Mutex<VecDeque<Event>>,
    closed: AtomicBool,
    notify: Notify,
}

impl EventQueue {
    /// Creates an empty, open queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues `event`.
    ///
    /// Returns `false` (without enqueueing) once the queue is shut down.
    pub fn post(&self, event: Event) -> bool {
        {
            let mut items = self.lock();
            // checked under the lock so shutdown() and post() cannot interleave
            if self.closed.load(Ordering::Acquire) {
                return false;
            }
            items.push_back(event);
        }
        self.notify.notify_one();
        true
    }

    /// Waits for the next event.
    ///
    /// - `timeout = None` waits indefinitely, as does a timeout too large to
    ///   be represented as a deadline;
    /// - returns [`PopError::Timeout`] when the wait elapses;
    /// - returns [`PopError::Closed`] once shut down **and** empty.
    pub async fn pop(&self, timeout: Option<Duration>) -> Result<Event, PopError> {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // register interest before inspecting state, so a post/shutdown
            // racing with the check below still wakes us
            notified.as_mut().enable();

            if let Some(ev) = self.try_pop()? {
                return Ok(ev);
            }

            match deadline {
                None => notified.await,
                Some(at) => {
                    if time::timeout_at(at, notified).await.is_err() {
                        // one last look: an event may have landed right at the deadline
                        return match self.try_pop()? {
                            Some(ev) => Ok(ev),
                            None => Err(PopError::Timeout),
                        };
                    }
                }
            }
        }
    }

    /// Takes the head without waiting.
    ///
    /// `Ok(None)` means "empty but still open".
    pub fn try_pop(&self) -> Result<Option<Event>, PopError> {
        let mut items = self.lock();
        match items.pop_front() {
            Some(ev) => Ok(Some(ev)),
            None if self.closed.load(Ordering::Acquire) => Err(PopError::Closed),
            None => Ok(None),
        }
    }

    /// Closes the queue and wakes every blocked waiter. Idempotent.
    pub fn shutdown(&self) {
        {
            let _items = self.lock();
            self.closed.store(true, Ordering::Release);
        }
        self.notify.notify_waiters();
    }

    /// Number of buffered events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no events are buffered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// True once [`shutdown`](Self::shutdown) has been called.
    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Event>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_fifo_order() {
        let q = EventQueue::new();
        for id in 0..100u64 {
            assert!(q.post(Event::timer(id)));
        }
        assert_eq!(q.len(), 100);
        for id in 0..100u64 {
            assert_eq!(q.pop(None).await, Ok(Event::timer(id)));
        }
        assert!(q.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_times_out_on_empty_queue() {
        let q = EventQueue::new();
        let started = Instant::now();
        assert_eq!(q.pop(Some(Duration::from_millis(50))).await, Err(PopError::Timeout));
        assert!(started.elapsed() >= Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_unrepresentable_timeout_waits_indefinitely() {
        let q = Arc::new(EventQueue::new());
        assert!(q.post(Event::timer(1)));
        assert_eq!(q.pop(Some(Duration::MAX)).await, Ok(Event::timer(1)));

        let waiter = {
            let q = Arc::clone(&q);
            tokio::spawn(async move { q.pop(Some(Duration::MAX)).await })
        };
        tokio::task::yield_now().await;
        assert!(q.post(Event::timer(2)));

        let res = time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter must wake on post")
            .expect("waiter must not panic");
        assert_eq!(res, Ok(Event::timer(2)));
    }

    #[tokio::test]
    async fn test_post_after_shutdown_is_rejected() {
        let q = EventQueue::new();
        q.shutdown();
        assert!(q.is_shutdown());
        assert!(!q.post(Event::signal(1)));
        assert!(q.is_empty());
    }

    #[tokio::test]
    async fn test_drains_buffered_events_before_closed() {
        let q = EventQueue::new();
        assert!(q.post(Event::timer(1)));
        assert!(q.post(Event::timer(2)));
        q.shutdown();
        q.shutdown();

        assert_eq!(q.pop(None).await, Ok(Event::timer(1)));
        assert_eq!(q.pop(Some(Duration::from_millis(10))).await, Ok(Event::timer(2)));
        assert_eq!(q.pop(None).await, Err(PopError::Closed));
        assert_eq!(q.try_pop(), Err(PopError::Closed));
    }

    #[tokio::test]
    async fn test_shutdown_wakes_blocked_waiter() {
        let q = Arc::new(EventQueue::new());
        let waiter = {
            let q = Arc::clone(&q);
            tokio::spawn(async move { q.pop(None).await })
        };
        tokio::task::yield_now().await;
        q.shutdown();

        let res = time::timeout(Duration::from_secs(5), waiter)
            .await
            .expect("waiter must wake promptly")
            .expect("waiter must not panic");
        assert_eq!(res, Err(PopError::Closed));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_producers_keep_per_producer_order() {
        let q = Arc::new(EventQueue::new());
        let mut producers = Vec::new();
        for p in 0..4u64 {
            let q = Arc::clone(&q);
            producers.push(tokio::spawn(async move {
                for i in 0..250u64 {
                    assert!(q.post(Event::timer(p * 1_000 + i)));
                }
            }));
        }
        for h in producers {
            h.await.expect("producer panicked");
        }

        let mut last = [None::<u64>; 4];
        for _ in 0..1_000 {
            let Ok(Event::TimerFired(t)) = q.pop(Some(Duration::from_secs(1))).await else {
                panic!("expected a timer event");
            };
            let producer = (t.timer_id / 1_000) as usize;
            if let Some(prev) = last[producer] {
                assert!(t.timer_id > prev, "per-producer FIFO violated");
            }
            last[producer] = Some(t.timer_id);
        }
        assert!(q.is_empty());
    }
}
