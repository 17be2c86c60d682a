//! Diagnostic reports: types and broadcast bus.
//!
//! This is the runtime's logger boundary. The core never formats or writes
//! log lines itself; it publishes [`Report`]s and lets subscribers decide.
//!
//! ## Contents
//! - [`ReportKind`], [`Report`] classification and metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Mapping to the logger contract
//! | Logger call             | Report                                       |
//! |-------------------------|----------------------------------------------|
//! | handler timing          | [`ReportKind::HandlerFinished`] + `elapsed_ms` |
//! | missing handler         | [`ReportKind::HandlerMissing`]               |
//! | exception (typed)       | [`ReportKind::HandlerFailed`]                |
//! | exception (untyped)     | [`ReportKind::HandlerPanicked`]              |

mod bus;
mod report;

pub use bus::Bus;
pub use report::{Report, ReportKind};
