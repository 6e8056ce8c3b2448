mod payment_event_repository;
mod subscription_repository;
mod user_repository;
mod workspace_repository;

pub use payment_event_repository::{InsertOutcome, PaymentEventRepository};
pub use subscription_repository::SubscriptionRepository;
pub use user_repository::UserRepository;
pub use workspace_repository::{NewWorkspace, WorkspaceRepository};
