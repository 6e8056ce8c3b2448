use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A verified webhook body, recorded exactly once. This table is
/// append-only: it is simultaneously the audit log and the idempotency
/// ledger keyed by `provider_event_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PaymentEvent {
    pub id: Uuid,
    pub subscription_id: Option<Uuid>,
    pub provider_event_id: String,
    pub event_type: String,
    pub provider_payment_id: Option<String>,
    pub amount_minor_units: Option<i64>,
    pub currency: Option<String>,
    pub raw_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
