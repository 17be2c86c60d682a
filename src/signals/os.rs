//! Cross-platform OS signal source.
//!
//! [`OsSignals`] forwards real OS signals into a [`SignalSlot`] using tokio's
//! signal listeners, one forwarding task per installed signal.
//!
//! ## Unix
//! Any signal tokio accepts can be installed. tokio refuses the ones that
//! cannot be handled safely (`SIGKILL`, `SIGSTOP`, `SIGILL`, `SIGFPE`,
//! `SIGSEGV`); those fail with [`SignalError::Install`].
//!
//! Once installed, a handler stays for the process lifetime: the default
//! action (e.g. terminate on `SIGTERM`) no longer happens.
//!
//! Forwarding tasks hold the slot weakly. Once the owning bridge is dropped,
//! a task exits on the next delivery of its signal; until then it stays parked.
//!
//! ## Windows
//! Only `SIGINT` (Ctrl-C, number 2) is supported.

use crate::error::SignalError;
use crate::events::SignalNo;

use super::source::{SignalSlot, SignalSource};

/// Signal source backed by the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsSignals;

impl OsSignals {
    pub fn new() -> Self {
        Self
    }
}

impl SignalSource for OsSignals {
    fn install(&self, signal: SignalNo, slot: SignalSlot) -> Result<(), SignalError> {
        install(signal, slot)
    }
}

#[cfg(unix)]
fn install(signal: SignalNo, slot: SignalSlot) -> Result<(), SignalError> {
    use tokio::signal::unix::{SignalKind, signal as listen};

    let mut stream = listen(SignalKind::from_raw(signal)).map_err(|e| SignalError::Install {
        signal,
        reason: e.to_string(),
    })?;

    let slot = slot.downgrade();
    tokio::spawn(async move {
        while stream.recv().await.is_some() {
            let Some(slot) = slot.upgrade() else { break };
            slot.deposit(signal);
        }
    });
    Ok(())
}

#[cfg(not(unix))]
fn install(signal: SignalNo, slot: SignalSlot) -> Result<(), SignalError> {
    const SIGINT: SignalNo = 2;

    if signal != SIGINT {
        return Err(SignalError::Unsupported { signal });
    }
    let slot = slot.downgrade();
    tokio::spawn(async move {
        while tokio::signal::ctrl_c().await.is_ok() {
            let Some(slot) = slot.upgrade() else { break };
            slot.deposit(signal);
        }
    });
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uncatchable_signal_is_rejected() {
        // SIGKILL
        let err = OsSignals::new().install(9, SignalSlot::new()).unwrap_err();
        assert_eq!(err.as_label(), "signal_install_failed");
    }
}
