use control_plane_db::DbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("webhook signature missing, malformed, or mismatched")]
    InvalidSignature,

    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),

    #[error(transparent)]
    Db(#[from] DbError),
}
