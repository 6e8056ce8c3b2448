use control_plane_container_engine::EngineError;
use control_plane_db::DbError;
use control_plane_models::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("a workspace with this name already exists")]
    NameConflict,

    #[error("owner has reached the workspace limit")]
    LimitReached,

    #[error("no active entitlement")]
    Unentitled,

    #[error("invalid resource limits: {0}")]
    InvalidLimits(#[from] ValidationError),

    #[error("workspace not found")]
    NotFound,

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Db(#[from] DbError),
}
