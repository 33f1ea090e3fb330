//! Roastlens binary crate internals.
//!
//! Exposed as a library so the HTTP router can be driven in integration
//! tests without a process or a loaded model.

pub mod cli;
pub mod logging;
pub mod server;
