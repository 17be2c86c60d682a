//! # Example: ping_pong
//!
//! Two message handlers bounce a counter back and forth until it reaches a
//! limit, then the process stops itself.
//!
//! Demonstrates how to:
//! - Implement [`Process`] to register handlers at initialization.
//! - Post follow-up events from inside a handler via [`RuntimeHandle`].
//! - Attach the built-in [`LogWriter`] to see runtime reports.
//!
//! ## Flow
//! ```text
//! post("ping", 0)
//!   └─► ping(n) ─► post("pong", n+1)
//!                    └─► pong(n) ─► post("ping", n+1) ... until n == LIMIT ─► stop()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example ping_pong
//! ```

use std::sync::Arc;
use std::time::Duration;

use eventvisor::{
    Config, HandlerError, LogWriter, MessageEvent, Process, ProcessRuntime, RuntimeHandle,
    Subscribe,
};

const LIMIT: u32 = 6;

struct PingPong;

fn counter(msg: &MessageEvent) -> Result<u32, HandlerError> {
    let bytes = <[u8; 4]>::try_from(&msg.payload[..])
        .map_err(|_| HandlerError::fail("payload is not a u32"))?;
    Ok(u32::from_be_bytes(bytes))
}

fn bounce(handle: &RuntimeHandle, to: &'static str, n: u32) {
    if n >= LIMIT {
        println!("[demo] limit reached, stopping");
        handle.stop();
    } else {
        handle.post_message(to, (n + 1).to_be_bytes().to_vec());
    }
}

impl Process for PingPong {
    fn on_initialize(&self, rt: &ProcessRuntime) -> Result<(), HandlerError> {
        for (name, reply) in [("ping", "pong"), ("pong", "ping")] {
            let handle = rt.handle();
            rt.on_message(name, move |msg: MessageEvent| {
                let handle = handle.clone();
                async move {
                    let n = counter(&msg)?;
                    println!("[demo] {} {n}", msg.name);
                    bounce(&handle, reply, n);
                    Ok::<_, HandlerError>(())
                }
            });
        }
        Ok(())
    }

    fn on_stop(&self, _rt: &ProcessRuntime) {
        println!("[demo] on_stop");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let rt = ProcessRuntime::builder(Config::default())
        .with_subscribers(subs)
        .build();

    rt.initialize(Arc::new(PingPong))?;
    rt.post_message("ping", 0u32.to_be_bytes().to_vec());
    rt.start().await?;

    // let the log subscriber flush
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
