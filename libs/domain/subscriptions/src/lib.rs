//! The subscription state machine: webhook signature verification,
//! event-driven transitions, and the payment-event ledger that doubles as
//! an idempotency guard.
//!
//! Processing algorithm per inbound webhook: verify signature -> insert
//! idempotent ledger row -> lock subscription row -> validate transition
//! -> apply and commit -> run post-commit side effects. See
//! `SubscriptionProcessor::process_webhook`.

mod errors;
mod event;
mod processor;
mod signature;
mod transition;

pub use errors::SubscriptionError;
pub use event::WebhookEvent;
pub use processor::SubscriptionProcessor;
pub use signature::verify_webhook_signature;
pub use transition::{decide, TransitionOutcome};
