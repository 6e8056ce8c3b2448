use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database connection error: {0}")]
    Connection(String),

    #[error("schema migration failed: {0}")]
    Migration(String),

    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),

    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("record not found")]
    NotFound,
}

impl DbError {
    /// `sqlx::Error::Database` carries the driver's error code; Postgres
    /// uses `23505` for unique-violation. Repositories use this to turn a
    /// duplicate insert into a `Conflict` (or, for the payment-event
    /// ledger, into a deliberate no-op — see `PaymentEventRepository`).
    pub fn is_unique_violation(err: &sqlx::Error) -> bool {
        matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
    }
}
