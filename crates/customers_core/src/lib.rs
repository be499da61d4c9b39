//! Core customer logic: idempotent upsert, transactional wrapping, change
//! events and the read cache they keep current.

pub mod cache;
pub mod config;
pub mod db;
pub mod event;
pub mod logging;
pub mod model;
pub mod repo;
pub mod runtime;
pub mod service;

pub use cache::read_cache::ReadCache;
pub use config::CoreConfig;
pub use db::{Database, DbError};
pub use event::{
    ChangeEvent, ChangePublisher, EventBus, LoggingSubscriber, Subscriber, SubscriberError,
};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::customer::{Customer, CustomerId};
pub use repo::customer_repo::{
    CustomerRepository, RepoError, RepoResult, SqliteCustomerRepository,
};
pub use runtime::{CustomerApi, CustomerRuntime, DEMO_CUSTOMERS};
pub use service::customer_service::{
    CustomerError, CustomerOperations, CustomerResult, CustomerService,
};
pub use service::transactional::{BindTarget, SqliteCustomerBinder, Transactional, TxMode};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
