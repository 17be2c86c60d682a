//! # LogWriter: simple report printer
//!
//! A minimal subscriber that prints incoming [`Report`]s to stdout.
//! Use it for tests or demos; production deployments plug their own sink.
//!
//! ## Example output
//! ```text
//! [runtime-started]
//! [handler-registered] kind=message key="ping"
//! [handler-finished] kind=message key="ping" elapsed=3ms
//! [handler-missing] kind=timer key="7"
//! [handler-failed] kind=message key="ping" err="handler failed: boom"
//! [timer-started] key="7" delay=50ms
//! [stop-requested]
//! [runtime-stopped]
//! ```

use async_trait::async_trait;

use crate::reports::{Report, ReportKind};
use crate::subscribers::Subscribe;

/// Report writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn render(r: &Report) -> String {
        let kind = r.handler.map(|k| k.as_label()).unwrap_or("-");
        let key = r.key.as_deref().unwrap_or("-");
        let reason = r.reason.as_deref().unwrap_or("-");

        match r.kind {
            ReportKind::RuntimeInitialized => "[runtime-initialized]".to_string(),
            ReportKind::RuntimeStarted => "[runtime-started]".to_string(),
            ReportKind::StopRequested => "[stop-requested]".to_string(),
            ReportKind::RuntimeStopped => "[runtime-stopped]".to_string(),
            ReportKind::HandlerRegistered => {
                format!("[handler-registered] kind={kind} key={key:?}")
            }
            ReportKind::HandlerFinished => format!(
                "[handler-finished] kind={kind} key={key:?} elapsed={}ms",
                r.elapsed_ms.unwrap_or(0)
            ),
            ReportKind::HandlerMissing => format!("[handler-missing] kind={kind} key={key:?}"),
            ReportKind::HandlerFailed => {
                format!("[handler-failed] kind={kind} key={key:?} err={reason:?}")
            }
            ReportKind::HandlerPanicked => {
                format!("[handler-panicked] kind={kind} key={key:?} info={reason:?}")
            }
            ReportKind::TimerStarted => format!(
                "[timer-started] key={key:?} delay={}ms",
                r.delay_ms.unwrap_or(0)
            ),
            ReportKind::TimerStopped => format!("[timer-stopped] key={key:?}"),
            ReportKind::TimersCleared => "[timers-cleared]".to_string(),
            ReportKind::PostRejected => format!("[post-rejected] kind={kind} key={key:?}"),
            ReportKind::SignalReceived => format!("[signal-received] signal={key}"),
            ReportKind::SignalInstallFailed => {
                format!("[signal-install-failed] signal={key} err={reason:?}")
            }
            ReportKind::SignalWaitFailed => format!("[signal-wait-failed] err={reason:?}"),
            ReportKind::SubscriberOverflow => {
                format!("[subscriber-overflow] subscriber={key:?} reason={reason:?}")
            }
            ReportKind::SubscriberPanicked => {
                format!("[subscriber-panicked] subscriber={key} info={reason}")
            }
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_report(&self, r: &Report) {
        println!("{}", Self::render(r));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::HandlerKind;
    use std::time::Duration;

    #[test]
    fn test_render_handler_lines() {
        let r = Report::new(ReportKind::HandlerFinished)
            .with_handler(HandlerKind::Message)
            .with_key("ping")
            .with_elapsed(Duration::from_millis(3));
        assert_eq!(
            LogWriter::render(&r),
            "[handler-finished] kind=message key=\"ping\" elapsed=3ms"
        );

        let r = Report::new(ReportKind::HandlerMissing)
            .with_handler(HandlerKind::Timer)
            .with_key("7");
        assert_eq!(LogWriter::render(&r), "[handler-missing] kind=timer key=\"7\"");
    }

    #[test]
    fn test_render_lifecycle() {
        assert_eq!(
            LogWriter::render(&Report::new(ReportKind::StopRequested)),
            "[stop-requested]"
        );
    }
}
