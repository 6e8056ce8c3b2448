pub mod errors;
pub mod pool;
pub mod repositories;

pub use errors::DbError;
pub use pool::{timed, Gateway, SLOW_QUERY_THRESHOLD};
pub use repositories::{
    InsertOutcome, NewWorkspace, PaymentEventRepository, SubscriptionRepository, UserRepository,
    WorkspaceRepository,
};
