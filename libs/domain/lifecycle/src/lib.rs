//! The workspace lifecycle state machine: create, start, stop, delete.
//!
//! Concurrency within a single workspace is serialized by the persistence
//! gateway's row-level lock (`SELECT ... FOR UPDATE`) taken inside the
//! transaction that performs each check-and-mutate, so a concurrent
//! `start` and `delete` on the same workspace cannot interleave.

mod errors;
mod manager;
mod types;

pub use errors::LifecycleError;
pub use manager::LifecycleManager;
pub use types::{DEFAULT_WORKSPACE_IMAGE, MAX_WORKSPACES_PER_OWNER};
