use control_plane_models::User;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::errors::DbError;
use crate::pool::timed;

pub struct UserRepository;

impl UserRepository {
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        email: &str,
        password_digest: &str,
    ) -> Result<User, DbError> {
        timed(
            "users.insert",
            sqlx::query_as::<_, User>(
                r#"
                INSERT INTO users (id, email, password_digest)
                VALUES ($1, $2, $3)
                RETURNING id, email, password_digest, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(email)
            .bind(password_digest)
            .fetch_one(executor),
        )
        .await
        .map_err(|e| {
            if DbError::is_unique_violation(&e) {
                DbError::Conflict("email already registered".to_string())
            } else {
                DbError::Query(e)
            }
        })
    }

    pub async fn find_by_email<'e>(
        executor: impl PgExecutor<'e>,
        email: &str,
    ) -> Result<Option<User>, DbError> {
        timed(
            "users.find_by_email",
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, password_digest, created_at, updated_at
                FROM users WHERE email = $1
                "#,
            )
            .bind(email)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Option<User>, DbError> {
        timed(
            "users.find_by_id",
            sqlx::query_as::<_, User>(
                r#"
                SELECT id, email, password_digest, created_at, updated_at
                FROM users WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }
}
