use control_plane_models::{RuntimeState, Workspace};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::errors::DbError;
use crate::pool::timed;

pub struct NewWorkspace<'a> {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: &'a str,
    pub proxy_credential: &'a str,
    pub cpu_quota: f64,
    pub memory_bytes: i64,
}

pub struct WorkspaceRepository;

impl WorkspaceRepository {
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        new: NewWorkspace<'_>,
    ) -> Result<Workspace, DbError> {
        timed(
            "workspaces.insert",
            sqlx::query_as::<_, Workspace>(
                r#"
                INSERT INTO workspaces
                    (id, owner_id, name, runtime_state, proxy_credential, cpu_quota, memory_bytes)
                VALUES ($1, $2, $3, 'stopped', $4, $5, $6)
                RETURNING id, owner_id, name, engine_handle, runtime_state, proxy_credential,
                          cpu_quota, memory_bytes, created_at, updated_at, last_started_at
                "#,
            )
            .bind(new.id)
            .bind(new.owner_id)
            .bind(new.name)
            .bind(new.proxy_credential)
            .bind(new.cpu_quota)
            .bind(new.memory_bytes)
            .fetch_one(executor),
        )
        .await
        .map_err(|e| {
            if DbError::is_unique_violation(&e) {
                DbError::Conflict("a workspace with this name already exists".to_string())
            } else {
                DbError::Query(e)
            }
        })
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Option<Workspace>, DbError> {
        timed(
            "workspaces.find_by_id",
            sqlx::query_as::<_, Workspace>(
                r#"
                SELECT id, owner_id, name, engine_handle, runtime_state, proxy_credential,
                       cpu_quota, memory_bytes, created_at, updated_at, last_started_at
                FROM workspaces WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    /// Locks the workspace row for the duration of the caller's transaction.
    /// Callers serialize start/stop/delete transitions on this lock: the
    /// lifecycle manager always opens a transaction via `Gateway::begin`,
    /// calls this, decides the next state in memory, then calls
    /// `update_runtime_state` before committing.
    pub async fn find_by_id_for_update<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Option<Workspace>, DbError> {
        timed(
            "workspaces.find_by_id_for_update",
            sqlx::query_as::<_, Workspace>(
                r#"
                SELECT id, owner_id, name, engine_handle, runtime_state, proxy_credential,
                       cpu_quota, memory_bytes, created_at, updated_at, last_started_at
                FROM workspaces WHERE id = $1
                FOR UPDATE
                "#,
            )
            .bind(id)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    pub async fn count_by_owner<'e>(
        executor: impl PgExecutor<'e>,
        owner_id: Uuid,
    ) -> Result<i64, DbError> {
        let row: (i64,) = timed(
            "workspaces.count_by_owner",
            sqlx::query_as("SELECT COUNT(*) FROM workspaces WHERE owner_id = $1")
                .bind(owner_id)
                .fetch_one(executor),
        )
        .await
        .map_err(DbError::Query)?;
        Ok(row.0)
    }

    pub async fn list_by_owner<'e>(
        executor: impl PgExecutor<'e>,
        owner_id: Uuid,
    ) -> Result<Vec<Workspace>, DbError> {
        timed(
            "workspaces.list_by_owner",
            sqlx::query_as::<_, Workspace>(
                r#"
                SELECT id, owner_id, name, engine_handle, runtime_state, proxy_credential,
                       cpu_quota, memory_bytes, created_at, updated_at, last_started_at
                FROM workspaces WHERE owner_id = $1
                ORDER BY created_at DESC
                "#,
            )
            .bind(owner_id)
            .fetch_all(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    /// Looked up on every proxied request, so this stays a single indexed
    /// equality lookup with no lock.
    pub async fn find_by_proxy_credential<'e>(
        executor: impl PgExecutor<'e>,
        proxy_credential: &str,
    ) -> Result<Option<Workspace>, DbError> {
        timed(
            "workspaces.find_by_proxy_credential",
            sqlx::query_as::<_, Workspace>(
                r#"
                SELECT id, owner_id, name, engine_handle, runtime_state, proxy_credential,
                       cpu_quota, memory_bytes, created_at, updated_at, last_started_at
                FROM workspaces WHERE proxy_credential = $1
                "#,
            )
            .bind(proxy_credential)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    pub async fn update_runtime_state<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        runtime_state: RuntimeState,
        engine_handle: Option<&str>,
    ) -> Result<Workspace, DbError> {
        let touch_started_at = runtime_state == RuntimeState::Running;
        timed(
            "workspaces.update_runtime_state",
            sqlx::query_as::<_, Workspace>(
                r#"
                UPDATE workspaces
                SET runtime_state = $2,
                    engine_handle = COALESCE($3, engine_handle),
                    updated_at = now(),
                    last_started_at = CASE WHEN $4 THEN now() ELSE last_started_at END
                WHERE id = $1
                RETURNING id, owner_id, name, engine_handle, runtime_state, proxy_credential,
                          cpu_quota, memory_bytes, created_at, updated_at, last_started_at
                "#,
            )
            .bind(id)
            .bind(runtime_state)
            .bind(engine_handle)
            .bind(touch_started_at)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)?
        .ok_or(DbError::NotFound)
    }

    pub async fn delete<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<(), DbError> {
        let result = timed(
            "workspaces.delete",
            sqlx::query("DELETE FROM workspaces WHERE id = $1")
                .bind(id)
                .execute(executor),
        )
        .await
        .map_err(DbError::Query)?;
        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }
        Ok(())
    }
}
