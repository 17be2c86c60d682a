//! # Background worker driving one [`EventLoop`].
//!
//! [`EventWorker`] owns a dedicated tokio task that runs an [`EventLoop`]
//! until stopped. Several workers over *different* queues may run side by side;
//! each queue still has exactly one consumer.
//!
//! ```text
//! start() ──► tokio::spawn(loop.run(|| running, poll))
//! stop()  ──► running = false ─► queue.shutdown() ─► join
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use super::event_loop::EventLoop;
use crate::events::Event;

/// Runs an [`EventLoop`] on its own task.
pub struct EventWorker {
    event_loop: Arc<EventLoop>,
    running: Arc<AtomicBool>,
    poll: Option<Duration>,
    join: Mutex<Option<JoinHandle<u64>>>,
}

impl EventWorker {
    /// Wraps `event_loop`; `poll` bounds each queue wait (`None` = indefinitely).
    pub fn new(event_loop: EventLoop, poll: Option<Duration>) -> Self {
        Self {
            event_loop: Arc::new(event_loop),
            running: Arc::new(AtomicBool::new(false)),
            poll,
            join: Mutex::new(None),
        }
    }

    /// Spawns the consumer task.
    ///
    /// Returns `false` if the worker is already running or its queue is closed.
    pub fn start(&self) -> bool {
        if self.event_loop.is_shutdown() {
            return false;
        }
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }

        let lp = Arc::clone(&self.event_loop);
        let running = Arc::clone(&self.running);
        let poll = self.poll;
        let handle = tokio::spawn(async move {
            lp.run(|| running.load(Ordering::Acquire), poll).await
        });

        *self.join.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    /// Stops the consumer and waits for it to exit.
    ///
    /// Returns the number of events the worker handled. Idempotent.
    pub async fn stop(&self) -> u64 {
        self.running.store(false, Ordering::Release);
        self.event_loop.shutdown();

        let handle = self.join.lock().unwrap_or_else(PoisonError::into_inner).take();
        match handle {
            Some(h) => h.await.unwrap_or(0),
            None => 0,
        }
    }

    /// Enqueues an event for this worker.
    pub fn post(&self, event: Event) -> bool {
        self.event_loop.post(event)
    }

    /// True between `start` and `stop`.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

impl Drop for EventWorker {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        self.event_loop.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::OnEvent;
    use crate::error::HandlerError;
    use crate::events::EventQueue;
    use crate::reports::Bus;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicU64;

    #[derive(Default)]
    struct Sum(AtomicU64);

    #[async_trait]
    impl OnEvent for Sum {
        async fn on_event(&self, event: Event) -> Result<(), HandlerError> {
            if let Event::TimerFired(t) = event {
                self.0.fetch_add(t.timer_id, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_start_post_stop() {
        let sum = Arc::new(Sum::default());
        let worker = EventWorker::new(
            EventLoop::new(Arc::new(EventQueue::new()), sum.clone(), Bus::new(4)),
            Some(Duration::from_millis(20)),
        );
        assert!(worker.start());
        assert!(!worker.start());
        assert!(worker.is_running());

        for id in 1..=4 {
            assert!(worker.post(Event::timer(id)));
        }
        while sum.0.load(Ordering::SeqCst) < 10 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        assert_eq!(worker.stop().await, 4);
        assert!(!worker.is_running());
        assert!(!worker.post(Event::timer(100)));
        assert!(!worker.start());
        assert_eq!(worker.stop().await, 0);
    }
}
