pub mod config;
pub mod error;
pub mod handlers;
pub mod kernel;
pub mod middleware;
pub mod rate_limit;
pub mod routes;
pub mod state;

/// Re-exports the pieces `main.rs` and integration tests under `tests/`
/// need, so neither has to reach into individual modules.
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::ApiError;
    pub use crate::kernel::Kernel;
    pub use crate::routes::build_router;
    pub use crate::state::AppState;
}
