use control_plane_models::PaymentEvent;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::errors::DbError;
use crate::pool::timed;

/// The insert is the idempotency check: a unique violation on
/// `provider_event_id` means this delivery has already been recorded, not
/// that anything is wrong.
pub enum InsertOutcome {
    Inserted(PaymentEvent),
    Duplicate,
}

pub struct PaymentEventRepository;

impl PaymentEventRepository {
    #[allow(clippy::too_many_arguments)]
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        subscription_id: Option<Uuid>,
        provider_event_id: &str,
        event_type: &str,
        provider_payment_id: Option<&str>,
        amount_minor_units: Option<i64>,
        currency: Option<&str>,
        raw_payload: serde_json::Value,
    ) -> Result<InsertOutcome, DbError> {
        let result = timed(
            "payment_events.insert",
            sqlx::query_as::<_, PaymentEvent>(
                r#"
                INSERT INTO payment_events
                    (id, subscription_id, provider_event_id, event_type,
                     provider_payment_id, amount_minor_units, currency, raw_payload)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING id, subscription_id, provider_event_id, event_type,
                          provider_payment_id, amount_minor_units, currency, raw_payload, created_at
                "#,
            )
            .bind(id)
            .bind(subscription_id)
            .bind(provider_event_id)
            .bind(event_type)
            .bind(provider_payment_id)
            .bind(amount_minor_units)
            .bind(currency)
            .bind(raw_payload)
            .fetch_one(executor),
        )
        .await;

        match result {
            Ok(event) => Ok(InsertOutcome::Inserted(event)),
            Err(e) if DbError::is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
            Err(e) => Err(DbError::Query(e)),
        }
    }

    pub async fn find_by_provider_event_id<'e>(
        executor: impl PgExecutor<'e>,
        provider_event_id: &str,
    ) -> Result<Option<PaymentEvent>, DbError> {
        timed(
            "payment_events.find_by_provider_event_id",
            sqlx::query_as::<_, PaymentEvent>(
                r#"
                SELECT id, subscription_id, provider_event_id, event_type,
                       provider_payment_id, amount_minor_units, currency, raw_payload, created_at
                FROM payment_events WHERE provider_event_id = $1
                "#,
            )
            .bind(provider_event_id)
            .fetch_optional(executor),
        )
        .await
        .map_err(DbError::Query)
    }

    pub async fn list_by_subscription<'e>(
        executor: impl PgExecutor<'e>,
        subscription_id: Uuid,
    ) -> Result<Vec<PaymentEvent>, DbError> {
        timed(
            "payment_events.list_by_subscription",
            sqlx::query_as::<_, PaymentEvent>(
                r#"
                SELECT id, subscription_id, provider_event_id, event_type,
                       provider_payment_id, amount_minor_units, currency, raw_payload, created_at
                FROM payment_events WHERE subscription_id = $1
                ORDER BY created_at ASC
                "#,
            )
            .bind(subscription_id)
            .fetch_all(executor),
        )
        .await
        .map_err(DbError::Query)
    }
}
