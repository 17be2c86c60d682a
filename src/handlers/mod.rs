//! # Handler abstractions and routing tables.
//!
//! This module provides the handler-related types:
//! - [`Handler`] - trait for async handlers of one routed argument
//! - [`HandlerFn`] - closure-backed handler implementation
//! - [`HandlerRef`] - shared reference to a handler (`Arc<dyn Handler<A>>`)
//! - [`HandlerTable`] - insert-or-replace key → handler mapping

mod handler;
mod table;

pub use handler::{BoxHandlerFuture, Handler, HandlerFn, HandlerRef};
pub use table::HandlerTable;
