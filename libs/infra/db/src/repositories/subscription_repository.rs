use chrono::{DateTime, Utc};
use control_plane_models::{Subscription, SubscriptionState};
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::errors::DbError;
use crate::pool::timed;

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        user_id: Uuid,
        plan_id: &str,
        provider_subscription_id: Option<&str>,
    ) -> Result<Subscription, DbError> {
        timed(
            "subscriptions.insert",
            sqlx::query_as::<_, Subscription>(
                r#"
                INSERT INTO subscriptions (id, user_id, provider_subscription_id, state, plan_id)
                VALUES ($1, $2, $3, 'pending', $4)
                RETURNING id, user_id, provider_subscription_id, state, plan_id,
                          period_start, period_end, cancelled_at, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(user_id)
            .bind(provider_subscription_id)
            .bind(plan_id)
            .fetch_one(executor),
        )
        .await
        .map_err(|e| {
            if DbError::is_unique_violation(&e) {
                DbError::Conflict(
                    "user already has a pending or active subscription".to_string(),
                )
            } else {
                DbError::Query(e)
            }
        })
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Option<Subscription>, DbError> {
        timed(
            "subscriptions.find_by_id",
            sqlx::query_as::<_, Subscription>(
                r#"
                SELECT id, user_id, provider_subscription_id, state, plan_id,
                       period_start, period_end, cancelled_at, created_at, updated_at
                FROM subscriptions WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    /// Locks the subscription row for the caller's transaction. The
    /// subscription state machine always locks before validating a
    /// transition, so two webhook deliveries racing on the same
    /// subscription serialize instead of interleaving.
    pub async fn find_by_id_for_update<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Option<Subscription>, DbError> {
        timed(
            "subscriptions.find_by_id_for_update",
            sqlx::query_as::<_, Subscription>(
                r#"
                SELECT id, user_id, provider_subscription_id, state, plan_id,
                       period_start, period_end, cancelled_at, created_at, updated_at
                FROM subscriptions WHERE id = $1
                FOR UPDATE
                "#,
            )
            .bind(id)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    pub async fn find_by_provider_subscription_id<'e>(
        executor: impl PgExecutor<'e>,
        provider_subscription_id: &str,
    ) -> Result<Option<Subscription>, DbError> {
        timed(
            "subscriptions.find_by_provider_subscription_id",
            sqlx::query_as::<_, Subscription>(
                r#"
                SELECT id, user_id, provider_subscription_id, state, plan_id,
                       period_start, period_end, cancelled_at, created_at, updated_at
                FROM subscriptions WHERE provider_subscription_id = $1
                "#,
            )
            .bind(provider_subscription_id)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    /// The non-terminal subscription for a user, if any. Workspace creation
    /// and the reverse proxy both call this to decide entitlement; the
    /// partial unique index guarantees at most one row matches.
    pub async fn find_current_for_user<'e>(
        executor: impl PgExecutor<'e>,
        user_id: Uuid,
    ) -> Result<Option<Subscription>, DbError> {
        timed(
            "subscriptions.find_current_for_user",
            sqlx::query_as::<_, Subscription>(
                r#"
                SELECT id, user_id, provider_subscription_id, state, plan_id,
                       period_start, period_end, cancelled_at, created_at, updated_at
                FROM subscriptions
                WHERE user_id = $1 AND state NOT IN ('cancelled', 'expired')
                "#,
            )
            .bind(user_id)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    /// Applies a validated state transition. Callers decide `next_state`
    /// and the period/cancellation fields in memory (see
    /// `control_plane_subscriptions`) after locking the row with
    /// `find_by_id_for_update`; this is the write half of that sequence.
    #[allow(clippy::too_many_arguments)]
    pub async fn apply_transition<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        next_state: SubscriptionState,
        period_start: Option<DateTime<Utc>>,
        period_end: Option<DateTime<Utc>>,
        cancelled_at: Option<DateTime<Utc>>,
    ) -> Result<Subscription, DbError> {
        timed(
            "subscriptions.apply_transition",
            sqlx::query_as::<_, Subscription>(
                r#"
                UPDATE subscriptions
                SET state = $2,
                    period_start = COALESCE($3, period_start),
                    period_end = COALESCE($4, period_end),
                    cancelled_at = COALESCE($5, cancelled_at),
                    updated_at = now()
                WHERE id = $1
                RETURNING id, user_id, provider_subscription_id, state, plan_id,
                          period_start, period_end, cancelled_at, created_at, updated_at
                "#,
            )
            .bind(id)
            .bind(next_state)
            .bind(period_start)
            .bind(period_end)
            .bind(cancelled_at)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)?
        .ok_or(DbError::NotFound)
    }
}
