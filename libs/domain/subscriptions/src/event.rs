use chrono::{DateTime, Utc};
use serde::Deserialize;

/// The subset of a provider webhook body this service reads. Unknown
/// fields are ignored; `raw_payload` (captured by the caller before
/// deserializing) is what actually gets stored in the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event_type: String,
    pub provider_event_id: String,
    pub provider_subscription_id: Option<String>,
    pub provider_payment_id: Option<String>,
    pub amount_minor_units: Option<i64>,
    pub currency: Option<String>,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
}
