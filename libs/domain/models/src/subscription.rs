use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionState {
    Pending,
    Active,
    PastDue,
    Cancelled,
    Expired,
}

impl SubscriptionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionState::Pending => "pending",
            SubscriptionState::Active => "active",
            SubscriptionState::PastDue => "past_due",
            SubscriptionState::Cancelled => "cancelled",
            SubscriptionState::Expired => "expired",
        }
    }

    /// `cancelled` and `expired` are terminal: no event ever moves a
    /// subscription out of them. A new subscription is required instead.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubscriptionState::Cancelled | SubscriptionState::Expired)
    }

    /// Whether `self -> next` is an allowed transition per the state table
    /// in the subscription state machine design.
    pub fn can_transition_to(&self, next: SubscriptionState) -> bool {
        use SubscriptionState::*;
        if self.is_terminal() {
            return false;
        }
        matches!(
            (self, next),
            (Pending, Active)
                | (Active, PastDue)
                | (Active, Cancelled)
                | (Active, Expired)
                | (PastDue, Active)
                | (PastDue, Cancelled)
                | (PastDue, Expired)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_subscription_id: Option<String>,
    pub state: SubscriptionState,
    pub plan_id: String,
    pub period_start: Option<DateTime<Utc>>,
    pub period_end: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    /// A user is entitled iff a row exists with `state = active` and
    /// `period_end > now`. This is the single gate workspace creation and
    /// the reverse proxy both check.
    pub fn is_entitled(&self, now: DateTime<Utc>) -> bool {
        self.state == SubscriptionState::Active && self.period_end.is_some_and(|end| end > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn terminal_states_accept_no_further_transitions() {
        assert!(!SubscriptionState::Cancelled.can_transition_to(SubscriptionState::Active));
        assert!(!SubscriptionState::Expired.can_transition_to(SubscriptionState::Active));
    }

    #[test]
    fn allowed_transitions_match_the_state_table() {
        assert!(SubscriptionState::Pending.can_transition_to(SubscriptionState::Active));
        assert!(SubscriptionState::Active.can_transition_to(SubscriptionState::PastDue));
        assert!(SubscriptionState::Active.can_transition_to(SubscriptionState::Cancelled));
        assert!(SubscriptionState::Active.can_transition_to(SubscriptionState::Expired));
        assert!(SubscriptionState::PastDue.can_transition_to(SubscriptionState::Active));
        assert!(SubscriptionState::PastDue.can_transition_to(SubscriptionState::Cancelled));
        assert!(SubscriptionState::PastDue.can_transition_to(SubscriptionState::Expired));
    }

    #[test]
    fn rejects_transitions_not_in_the_table() {
        assert!(!SubscriptionState::Pending.can_transition_to(SubscriptionState::PastDue));
        assert!(!SubscriptionState::Pending.can_transition_to(SubscriptionState::Cancelled));
        assert!(!SubscriptionState::Active.can_transition_to(SubscriptionState::Pending));
    }

    fn sample(state: SubscriptionState, period_end: Option<DateTime<Utc>>) -> Subscription {
        Subscription {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            provider_subscription_id: Some("sub_1".to_string()),
            state,
            plan_id: "pro".to_string(),
            period_start: Some(Utc::now() - Duration::days(1)),
            period_end,
            cancelled_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn entitled_only_when_active_and_period_end_in_the_future() {
        let now = Utc::now();
        assert!(sample(SubscriptionState::Active, Some(now + Duration::days(1))).is_entitled(now));
        assert!(!sample(SubscriptionState::Active, Some(now - Duration::days(1))).is_entitled(now));
        assert!(!sample(SubscriptionState::PastDue, Some(now + Duration::days(1))).is_entitled(now));
        assert!(!sample(SubscriptionState::Active, None).is_entitled(now));
    }
}
