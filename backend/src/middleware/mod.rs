//! Request middleware.
//!
//! Purpose: attach request-scoped concerns, currently the trace identifier.

pub mod trace;

pub use trace::Trace;
