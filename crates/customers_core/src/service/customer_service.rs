//! Customer upsert engine.
//!
//! # Responsibility
//! - Perform the idempotent write keyed by customer name.
//! - Re-read the canonical record by id and announce it as a change.
//!
//! # Invariants
//! - Re-adding an existing name keeps its id and only updates `subscribed`.
//! - Returned records always come from a read by id after the write.
//! - Lookups never return placeholder records.

use crate::event::{ChangeEvent, ChangePublisher, SubscriberError};
use crate::model::customer::{Customer, CustomerId};
use crate::repo::customer_repo::{CustomerRepository, RepoError};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CustomerResult<T> = Result<T, CustomerError>;

/// Error taxonomy for customer operations.
#[derive(Debug)]
pub enum CustomerError {
    /// Storage or connectivity failure unrelated to the upsert semantics.
    Storage(RepoError),
    /// Missing/unusable generated key or a read-back miss after a write.
    Integrity(String),
    /// Lookup by id found no row.
    NotFound(CustomerId),
    /// A change subscriber failed.
    Subscriber(SubscriberError),
}

impl Display for CustomerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "storage error: {err}"),
            Self::Integrity(details) => write!(f, "integrity error: {details}"),
            Self::NotFound(id) => write!(f, "customer not found: {id}"),
            Self::Subscriber(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CustomerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Subscriber(err) => Some(err),
            Self::Integrity(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for CustomerError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::MissingGeneratedKey | RepoError::InvalidGeneratedKey(_) => {
                Self::Integrity(value.to_string())
            }
            other => Self::Storage(other),
        }
    }
}

impl From<crate::db::DbError> for CustomerError {
    fn from(value: crate::db::DbError) -> Self {
        Self::Storage(RepoError::Db(value))
    }
}

impl From<rusqlite::Error> for CustomerError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(RepoError::from(value))
    }
}

impl From<SubscriberError> for CustomerError {
    fn from(value: SubscriberError) -> Self {
        Self::Subscriber(value)
    }
}

/// Operation set exposed to adapters (HTTP, GraphQL, CLI).
pub trait CustomerOperations {
    /// Inserts `name` or updates its `subscribed` flag; returns the stored record.
    fn add(&self, name: &str, subscribed: bool) -> CustomerResult<Customer>;
    fn find_by_id(&self, id: CustomerId) -> CustomerResult<Customer>;
    /// Returns every customer ordered by id ascending.
    fn all(&self) -> CustomerResult<Vec<Customer>>;
}

/// Upsert engine over a repository and a change publisher.
pub struct CustomerService<'p, R: CustomerRepository> {
    repo: R,
    publisher: &'p dyn ChangePublisher,
}

impl<'p, R: CustomerRepository> CustomerService<'p, R> {
    pub fn new(repo: R, publisher: &'p dyn ChangePublisher) -> Self {
        Self { repo, publisher }
    }
}

impl<R: CustomerRepository> CustomerOperations for CustomerService<'_, R> {
    fn add(&self, name: &str, subscribed: bool) -> CustomerResult<Customer> {
        let id = self.repo.upsert_customer(name, subscribed)?;
        info!("event=customer_upsert module=service status=ok customer_id={id}");

        let customer = match self.repo.get_customer(id)? {
            Some(customer) => customer,
            None => {
                error!(
                    "event=customer_upsert module=service status=error error_code=read_back_miss customer_id={id}"
                );
                return Err(CustomerError::Integrity(format!(
                    "customer {id} not found in read-back after upsert"
                )));
            }
        };

        let event = ChangeEvent::new(customer.clone()).ok_or_else(|| {
            CustomerError::Integrity(format!("customer {id} read back without an id"))
        })?;
        self.publisher.emit(event)?;
        Ok(customer)
    }

    fn find_by_id(&self, id: CustomerId) -> CustomerResult<Customer> {
        self.repo
            .get_customer(id)?
            .ok_or(CustomerError::NotFound(id))
    }

    fn all(&self) -> CustomerResult<Vec<Customer>> {
        Ok(self.repo.list_customers()?)
    }
}

#[cfg(test)]
mod tests {
    use super::{CustomerError, CustomerOperations, CustomerService};
    use crate::event::{ChangeEvent, ChangePublisher, SubscriberError};
    use crate::model::customer::{Customer, CustomerId};
    use crate::repo::customer_repo::{CustomerRepository, RepoError, RepoResult};
    use std::cell::RefCell;

    /// Repository whose upsert reports a fixed key without storing anything.
    struct DetachedKeyRepo {
        key: Option<CustomerId>,
    }

    impl CustomerRepository for DetachedKeyRepo {
        fn upsert_customer(&self, _name: &str, _subscribed: bool) -> RepoResult<CustomerId> {
            self.key.ok_or(RepoError::MissingGeneratedKey)
        }

        fn get_customer(&self, _id: CustomerId) -> RepoResult<Option<Customer>> {
            Ok(None)
        }

        fn list_customers(&self) -> RepoResult<Vec<Customer>> {
            Ok(Vec::new())
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: RefCell<Vec<ChangeEvent>>,
    }

    impl ChangePublisher for Recorder {
        fn emit(&self, event: ChangeEvent) -> Result<(), SubscriberError> {
            self.events.borrow_mut().push(event);
            Ok(())
        }
    }

    #[test]
    fn missing_generated_key_is_an_integrity_error() {
        let recorder = Recorder::default();
        let service = CustomerService::new(
            DetachedKeyRepo { key: None },
            &recorder,
        );

        let err = service.add("Maria", true).unwrap_err();
        assert!(matches!(err, CustomerError::Integrity(_)));
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn read_back_miss_is_an_integrity_error_and_publishes_nothing() {
        let recorder = Recorder::default();
        let service = CustomerService::new(DetachedKeyRepo { key: Some(42) }, &recorder);

        let err = service.add("Maria", true).unwrap_err();
        match err {
            CustomerError::Integrity(details) => assert!(details.contains("42")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn find_by_id_miss_is_not_found() {
        let recorder = Recorder::default();
        let service = CustomerService::new(DetachedKeyRepo { key: Some(1) }, &recorder);
        assert!(matches!(
            service.find_by_id(9),
            Err(CustomerError::NotFound(9))
        ));
    }
}
