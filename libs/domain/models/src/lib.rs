//! Entity types shared by every layer of the control plane.
//!
//! This crate holds no I/O: it is the vocabulary the persistence gateway,
//! the lifecycle manager, the subscription state machine and the HTTP
//! surface all speak so that a `Workspace` or a `Subscription` means the
//! same thing everywhere.

pub mod payment_event;
pub mod subscription;
pub mod user;
pub mod validation;
pub mod workspace;

pub use payment_event::PaymentEvent;
pub use subscription::{Subscription, SubscriptionState};
pub use user::User;
pub use validation::ValidationError;
pub use workspace::{ResourceLimits, RuntimeState, Workspace};
