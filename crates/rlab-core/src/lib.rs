#![forbid(unsafe_code)]

//! Core: terminal lifecycle, input events, and geometry.

pub mod event;
pub mod geometry;
pub mod logging;
pub mod terminal_session;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, error, info, trace, warn};
