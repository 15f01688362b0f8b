mod query;
mod subscriptions;

pub use query::{AggregateQuery, Assignment, SubscriptionFilter, UpdateError, UpdateSet};
pub use subscriptions::SubscriptionRepo;
