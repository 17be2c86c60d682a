//! # Example: timers
//!
//! A heartbeat timer re-arms itself every 200ms, a watchdog timer is armed
//! for 2s and then replaced with a shorter one, and a third timer is armed
//! and cancelled before it fires.
//!
//! ## Flow
//! ```text
//! start_timer(HEARTBEAT, 200ms) ─► heartbeat ─► start_timer(HEARTBEAT, 200ms) ...
//! start_timer(WATCHDOG, 2s)
//! start_timer(WATCHDOG, 1s)     ─► replaces the 2s timer ─► watchdog ─► stop()
//! start_timer(NEVER, 500ms)
//! stop_timer(NEVER)             ─► never fires (best-effort)
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example timers
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use eventvisor::{
    Config, HandlerError, LogWriter, Process, ProcessRuntime, Subscribe, TimerEvent, TimerId,
};

const HEARTBEAT: TimerId = 1;
const WATCHDOG: TimerId = 2;
const NEVER: TimerId = 3;

#[derive(Default)]
struct Clockwork {
    beats: Arc<AtomicU32>,
}

impl Process for Clockwork {
    fn on_initialize(&self, rt: &ProcessRuntime) -> Result<(), HandlerError> {
        let handle = rt.handle();
        let beats = Arc::clone(&self.beats);
        rt.on_timer(HEARTBEAT, move |_t: TimerEvent| {
            let handle = handle.clone();
            let beats = Arc::clone(&beats);
            async move {
                let n = beats.fetch_add(1, Ordering::Relaxed) + 1;
                println!("[demo] heartbeat #{n}");
                handle.start_timer(HEARTBEAT, Duration::from_millis(200));
                Ok::<_, HandlerError>(())
            }
        });

        let handle = rt.handle();
        rt.on_timer(WATCHDOG, move |_t: TimerEvent| {
            let handle = handle.clone();
            async move {
                println!("[demo] watchdog expired, stopping");
                handle.stop();
                Ok::<_, HandlerError>(())
            }
        });

        rt.on_timer(NEVER, |_t: TimerEvent| async {
            Err::<(), _>(HandlerError::fatal("cancelled timer fired"))
        });

        rt.start_timer(HEARTBEAT, Duration::from_millis(200));
        rt.start_timer(WATCHDOG, Duration::from_secs(2));
        rt.start_timer(WATCHDOG, Duration::from_secs(1));
        rt.start_timer(NEVER, Duration::from_millis(500));
        rt.stop_timer(NEVER);
        Ok(())
    }

    fn on_stop(&self, _rt: &ProcessRuntime) {
        println!("[demo] {} heartbeats", self.beats.load(Ordering::Relaxed));
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let rt = ProcessRuntime::builder(Config::default())
        .with_subscribers(subs)
        .build();

    rt.initialize(Arc::new(Clockwork::default()))?;
    rt.start().await?;

    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
