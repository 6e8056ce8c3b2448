use std::future::Future;
use std::time::{Duration, Instant};

use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::{Pool, Transaction};
use tracing::{info, instrument, warn};

use crate::errors::DbError;

/// Queries slower than this are logged at `warn`, per the base contract.
pub const SLOW_QUERY_THRESHOLD: Duration = Duration::from_secs(1);

/// The persistence gateway: a pooled connection to Postgres plus a
/// transaction-scope helper. Every mutating operation that needs to
/// check-then-act on a single row (the workspace lifecycle manager, the
/// subscription state machine) goes through `begin()` and takes the
/// row-level lock itself with `SELECT ... FOR UPDATE`.
#[derive(Clone)]
pub struct Gateway {
    pool: Pool<Postgres>,
}

impl Gateway {
    #[instrument(skip(database_url))]
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| DbError::Connection(e.to_string()))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| DbError::Migration(e.to_string()))?;

        info!("database pool connected and schema migrated");
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Wraps a pool that is already connected and migrated — the shape
    /// `#[sqlx::test]` hands callers directly, so integration tests don't
    /// need a real `DATABASE_URL`.
    pub fn from_pool(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Opens a transaction. The caller is responsible for committing; a
    /// transaction dropped without a commit rolls back (sqlx's `Drop` impl
    /// issues `ROLLBACK` on the underlying connection), which also covers
    /// the "client disconnects mid-request" case.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, DbError> {
        self.pool.begin().await.map_err(DbError::Query)
    }
}

/// Times `fut` and logs a warning if it exceeds `SLOW_QUERY_THRESHOLD`.
/// Repositories wrap their query calls in this rather than relying on a
/// connection-level hook, since sqlx has no query-interceptor API.
pub async fn timed<F, T>(label: &str, fut: F) -> T
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let result = fut.await;
    let elapsed = start.elapsed();
    if elapsed > SLOW_QUERY_THRESHOLD {
        warn!(query = label, elapsed_ms = elapsed.as_millis(), "slow query");
    }
    result
}
