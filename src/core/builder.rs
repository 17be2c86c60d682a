use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;

use crate::reports::Bus;
use crate::signals::{OsSignals, SignalSource};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::config::Config;
use super::runtime::ProcessRuntime;

/// Builder for a [`ProcessRuntime`] with optional report subscribers and signal source.
pub struct RuntimeBuilder {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    source: Option<Arc<dyn SignalSource>>,
}

impl RuntimeBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            source: None,
        }
    }

    /// Sets report subscribers (log sinks, metrics, test probes).
    ///
    /// Each subscriber gets its own worker task with a bounded queue.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Replaces the OS signal source (default: [`OsSignals`]).
    pub fn with_signal_source(mut self, source: Arc<dyn SignalSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Builds the runtime in the `Created` state.
    ///
    /// Spawns the report listener when subscribers are set, so it must then be
    /// called from within a tokio runtime.
    pub fn build(self) -> Arc<ProcessRuntime> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        if !self.subscribers.is_empty() {
            let subs = SubscriberSet::new(self.subscribers, bus.clone());
            report_listener(&bus, subs);
        }

        let source: Arc<dyn SignalSource> = match self.source {
            Some(source) => source,
            None => Arc::new(OsSignals::new()),
        };
        let cfg = self.cfg;
        Arc::new_cyclic(|this| ProcessRuntime::new_internal(cfg, bus, source, this.clone()))
    }
}

/// Forwards every bus report to the subscriber set (fire-and-forget).
fn report_listener(bus: &Bus, subs: SubscriberSet) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(report) => subs.emit(&report),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        subs.shutdown().await;
    });
}
