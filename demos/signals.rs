//! # Example: signals
//!
//! Turns OS signals into events. `SIGHUP` is handled as "reload", `SIGINT`
//! and `SIGTERM` stop the process. The demo raises `SIGHUP` itself once and
//! stops after 10 seconds if nothing else happens.
//!
//! ## Flow
//! ```text
//! OS signal ─► OsSignals ─► SignalSlot ─► SignalBridge.wait ─► Event::Signal ─► handler
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example signals
//! # then, from another terminal:
//! kill -HUP <pid>    # reload
//! kill -TERM <pid>   # stop
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventvisor::{
    Config, HandlerError, LogWriter, Process, ProcessRuntime, SignalEvent, Subscribe, TimerEvent,
};

const SIGHUP: i32 = 1;
const SIGINT: i32 = 2;
const SIGTERM: i32 = 15;
const DEADLINE: u64 = 1;

struct Daemon;

impl Process for Daemon {
    fn on_initialize(&self, rt: &ProcessRuntime) -> Result<(), HandlerError> {
        rt.on_signal(SIGHUP, |s: SignalEvent| async move {
            println!("[demo] signal {}: reloading", s.signal);
            Ok::<_, HandlerError>(())
        })
        .map_err(|e| HandlerError::fail(e.to_string()))?;

        for signal in [SIGINT, SIGTERM] {
            let handle = rt.handle();
            rt.on_signal(signal, move |s: SignalEvent| {
                let handle = handle.clone();
                async move {
                    println!("[demo] signal {}: stopping", s.signal);
                    handle.stop();
                    Ok::<_, HandlerError>(())
                }
            })
            .map_err(|e| HandlerError::fail(e.to_string()))?;
        }

        let handle = rt.handle();
        rt.on_timer(DEADLINE, move |_t: TimerEvent| {
            let handle = handle.clone();
            async move {
                println!("[demo] deadline reached");
                handle.stop();
                Ok::<_, HandlerError>(())
            }
        });
        rt.start_timer(DEADLINE, Duration::from_secs(10));
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("[demo] pid {}", std::process::id());

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let rt = ProcessRuntime::builder(Config::default())
        .with_subscribers(subs)
        .build();
    rt.initialize(Arc::new(Daemon))?;

    let handle = rt.handle();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        handle.raise(SIGHUP);
    });

    rt.start().await?;
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
