//! Request middleware.
//!
//! Tracing is the only cross-cutting concern handled here; session handling
//! comes from `actix-session`.

pub mod trace;

pub use trace::Trace;
