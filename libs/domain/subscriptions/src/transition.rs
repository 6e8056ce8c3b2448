use control_plane_models::SubscriptionState;

/// What applying an event to a non-terminal subscription should do. The
/// caller is responsible for checking `current.is_terminal()` first and
/// skipping this entirely when it's true: terminal states are sticky and
/// record every event to the ledger without ever calling this function's
/// result back into the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub next_state: Option<SubscriptionState>,
    pub refresh_period: bool,
    pub set_cancelled_at: bool,
    pub triggers_stop: bool,
}

impl TransitionOutcome {
    const NONE: Self = Self {
        next_state: None,
        refresh_period: false,
        set_cancelled_at: false,
        triggers_stop: false,
    };

    pub fn is_noop(&self) -> bool {
        *self == Self::NONE
    }
}

/// The event → transition table from the subscription state machine
/// design. `current` must already be known non-terminal.
pub fn decide(event_type: &str, current: SubscriptionState) -> TransitionOutcome {
    match event_type {
        "subscription.activated" => {
            if current.can_transition_to(SubscriptionState::Active) {
                TransitionOutcome {
                    next_state: Some(SubscriptionState::Active),
                    refresh_period: true,
                    ..TransitionOutcome::NONE
                }
            } else {
                TransitionOutcome::NONE
            }
        }
        "subscription.charged" => TransitionOutcome {
            refresh_period: true,
            ..TransitionOutcome::NONE
        },
        "subscription.completed" => {
            if current.can_transition_to(SubscriptionState::Expired) {
                TransitionOutcome {
                    next_state: Some(SubscriptionState::Expired),
                    triggers_stop: true,
                    ..TransitionOutcome::NONE
                }
            } else {
                TransitionOutcome::NONE
            }
        }
        "subscription.cancelled" => {
            if current.can_transition_to(SubscriptionState::Cancelled) {
                TransitionOutcome {
                    next_state: Some(SubscriptionState::Cancelled),
                    set_cancelled_at: true,
                    triggers_stop: true,
                    ..TransitionOutcome::NONE
                }
            } else {
                TransitionOutcome::NONE
            }
        }
        "subscription.pending" | "subscription.halted" | "subscription.paused" => {
            if current.can_transition_to(SubscriptionState::PastDue) {
                TransitionOutcome {
                    next_state: Some(SubscriptionState::PastDue),
                    ..TransitionOutcome::NONE
                }
            } else {
                TransitionOutcome::NONE
            }
        }
        "subscription.resumed" => {
            if current.can_transition_to(SubscriptionState::Active) {
                TransitionOutcome {
                    next_state: Some(SubscriptionState::Active),
                    ..TransitionOutcome::NONE
                }
            } else {
                TransitionOutcome::NONE
            }
        }
        // "payment.failed" and anything unrecognized: recorded in the
        // ledger by the caller, never mutate the row.
        _ => TransitionOutcome::NONE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activated_moves_pending_to_active_and_refreshes_period() {
        let outcome = decide("subscription.activated", SubscriptionState::Pending);
        assert_eq!(outcome.next_state, Some(SubscriptionState::Active));
        assert!(outcome.refresh_period);
    }

    #[test]
    fn activated_is_a_noop_when_already_active() {
        let outcome = decide("subscription.activated", SubscriptionState::Active);
        assert!(outcome.is_noop());
    }

    #[test]
    fn charged_never_changes_state_but_always_refreshes_period() {
        for state in [SubscriptionState::Active, SubscriptionState::PastDue] {
            let outcome = decide("subscription.charged", state);
            assert_eq!(outcome.next_state, None);
            assert!(outcome.refresh_period);
        }
    }

    #[test]
    fn completed_moves_to_expired_and_triggers_stop() {
        let outcome = decide("subscription.completed", SubscriptionState::Active);
        assert_eq!(outcome.next_state, Some(SubscriptionState::Expired));
        assert!(outcome.triggers_stop);
    }

    #[test]
    fn cancelled_takes_priority_and_sets_cancelled_at() {
        let outcome = decide("subscription.cancelled", SubscriptionState::PastDue);
        assert_eq!(outcome.next_state, Some(SubscriptionState::Cancelled));
        assert!(outcome.set_cancelled_at);
        assert!(outcome.triggers_stop);
    }

    #[test]
    fn halted_and_paused_move_active_to_past_due() {
        for event in ["subscription.pending", "subscription.halted", "subscription.paused"] {
            let outcome = decide(event, SubscriptionState::Active);
            assert_eq!(outcome.next_state, Some(SubscriptionState::PastDue));
        }
        let outcome = decide("subscription.halted", SubscriptionState::Pending);
        assert!(outcome.is_noop());
    }

    #[test]
    fn resumed_moves_past_due_to_active() {
        let outcome = decide("subscription.resumed", SubscriptionState::PastDue);
        assert_eq!(outcome.next_state, Some(SubscriptionState::Active));
    }

    #[test]
    fn payment_failed_and_unknown_events_never_mutate() {
        assert!(decide("payment.failed", SubscriptionState::Active).is_noop());
        assert!(decide("some.unknown.event", SubscriptionState::Active).is_noop());
    }
}
