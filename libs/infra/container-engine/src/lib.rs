//! Typed adapter over the local container daemon (Docker Engine API via
//! `bollard`). Every workspace container is created on a single internal
//! bridge network with no host port publications — the reverse proxy is
//! the only path into a workspace.

mod engine;
mod errors;
mod types;

pub use engine::ContainerEngine;
pub use errors::EngineError;
pub use types::{ContainerSpec, EngineHandle, CPU_PERIOD_MICROS, DEFAULT_STOP_TIMEOUT_SECONDS};
