use control_plane_container_engine::EngineError;
use control_plane_db::DbError;
use control_plane_models::RuntimeState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("missing workspace credential")]
    AuthRequired,

    #[error("invalid workspace credential")]
    AuthFailed,

    #[error("no active entitlement")]
    Unentitled,

    #[error("workspace is not running (state: {0:?})")]
    NotRunning(RuntimeState),

    #[error("workspace container is unreachable")]
    Unreachable,

    #[error("upstream connection failed: {0}")]
    UpstreamUnreachable(String),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
