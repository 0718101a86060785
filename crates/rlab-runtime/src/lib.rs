#![forbid(unsafe_code)]

//! Runtime for Render Lab.
//!
//! - [`program`]: the `Model` trait, `Cmd`, and the terminal `Program` loop.
//! - [`simulator`]: a headless `ProgramSimulator` for tests.
//! - [`hooks`]: render counters, reactive state, memo and callback gates.
//! - [`state_persistence`]: preference storage backends.

pub mod hooks;
pub mod program;
pub mod simulator;
pub mod state_persistence;

pub use hooks::{PassId, RenderCx};
pub use program::{Cmd, Model, Program, ProgramConfig};
pub use simulator::ProgramSimulator;
#[cfg(feature = "state-persistence")]
pub use state_persistence::FileStorage;
pub use state_persistence::{
    Entries, MemoryStorage, StateRegistry, StorageBackend, StorageError, StorageResult,
};
