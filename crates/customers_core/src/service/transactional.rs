//! Transaction decorator for the customer operation set.
//!
//! # Responsibility
//! - Run every delegated call inside exactly one SQLite transaction.
//! - Commit on success, roll back on failure, and hand back the target's
//!   result or error untouched.
//! - Dispatch change events only after the transaction committed.
//!
//! # Invariants
//! - Each call owns a private connection and transaction; nothing is shared
//!   between concurrent callers.
//! - The target is delegated to once per call; there are no retries.
//! - Events raised by a rolled-back call are discarded.
//! - Write calls hold the write gate from begin until their events are
//!   dispatched, so subscribers see writes in commit order.

use crate::db::Database;
use crate::event::{ChangeEvent, ChangePublisher, EventBus, SubscriberError};
use crate::model::customer::{Customer, CustomerId};
use crate::repo::customer_repo::SqliteCustomerRepository;
use crate::service::customer_service::{CustomerOperations, CustomerResult, CustomerService};
use log::{debug, warn};
use parking_lot::Mutex;
use rusqlite::{Connection, TransactionBehavior};
use std::cell::RefCell;
use std::sync::Arc;
use std::time::Instant;

/// Lock mode used when the transaction begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxMode {
    /// Deferred: no write lock until the first write.
    Read,
    /// Immediate: takes the write lock on begin so commit cannot hit a
    /// lock upgrade conflict.
    Write,
}

impl TxMode {
    fn behavior(self) -> TransactionBehavior {
        match self {
            Self::Read => TransactionBehavior::Deferred,
            Self::Write => TransactionBehavior::Immediate,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Builds the wrapped target on top of one call's transaction.
///
/// The target sees a plain `&Connection` and a publisher; it never begins,
/// commits or rolls back anything itself.
pub trait BindTarget {
    type Target<'a>: CustomerOperations;

    fn bind<'a>(
        &self,
        conn: &'a Connection,
        publisher: &'a dyn ChangePublisher,
    ) -> CustomerResult<Self::Target<'a>>;
}

/// Binds [`CustomerService`] over [`SqliteCustomerRepository`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SqliteCustomerBinder;

impl BindTarget for SqliteCustomerBinder {
    type Target<'a> = CustomerService<'a, SqliteCustomerRepository<'a>>;

    fn bind<'a>(
        &self,
        conn: &'a Connection,
        publisher: &'a dyn ChangePublisher,
    ) -> CustomerResult<Self::Target<'a>> {
        let repo = SqliteCustomerRepository::try_new(conn)?;
        Ok(CustomerService::new(repo, publisher))
    }
}

/// Per-call buffer that holds events until the transaction commits.
#[derive(Debug, Default)]
pub struct PendingEvents {
    events: RefCell<Vec<ChangeEvent>>,
}

impl PendingEvents {
    fn take(&self) -> Vec<ChangeEvent> {
        self.events.take()
    }
}

impl ChangePublisher for PendingEvents {
    fn emit(&self, event: ChangeEvent) -> Result<(), SubscriberError> {
        self.events.borrow_mut().push(event);
        Ok(())
    }
}

/// Transactional wrapper exposing the same [`CustomerOperations`] as its target.
///
/// Subscribers must not issue writes through the same wrapper: the write
/// gate is still held while they run.
pub struct Transactional<B: BindTarget> {
    db: Database,
    bus: Arc<EventBus>,
    binder: B,
    write_gate: Mutex<()>,
}

impl<B: BindTarget> Transactional<B> {
    pub fn new(db: Database, bus: Arc<EventBus>, binder: B) -> Self {
        Self {
            db,
            bus,
            binder,
            write_gate: Mutex::new(()),
        }
    }

    /// Runs `work` against a target bound to a fresh transaction.
    ///
    /// Commits when `work` returns `Ok`, rolls back and returns the identical
    /// error otherwise. Begin/commit failures surface as storage errors. Once
    /// committed, buffered events are dispatched on the bus before returning;
    /// a subscriber failure at that point is reported but the write stays.
    ///
    /// [`TxMode::Write`] calls are serialized from begin through dispatch.
    /// Two writers to the same row therefore reach subscribers in the order
    /// they committed, and the last event a subscriber sees is the stored row.
    pub fn run_in_transaction<T>(
        &self,
        mode: TxMode,
        work: impl FnOnce(&B::Target<'_>) -> CustomerResult<T>,
    ) -> CustomerResult<T> {
        let _write_guard = match mode {
            TxMode::Write => Some(self.write_gate.lock()),
            TxMode::Read => None,
        };
        let started_at = Instant::now();
        let mut conn = self.db.connect()?;
        let pending = PendingEvents::default();

        let tx = conn.transaction_with_behavior(mode.behavior())?;
        let target = self.binder.bind(&tx, &pending)?;
        let outcome = work(&target);
        drop(target);

        let value = match outcome {
            Ok(value) => {
                tx.commit()?;
                value
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=transaction module=service status=error mode={} error_code=rollback_failed error={}",
                        mode.label(),
                        rollback_err
                    );
                }
                debug!(
                    "event=transaction module=service status=rolled_back mode={} duration_ms={} error={}",
                    mode.label(),
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        debug!(
            "event=transaction module=service status=committed mode={} duration_ms={}",
            mode.label(),
            started_at.elapsed().as_millis()
        );

        for event in pending.take() {
            self.bus.publish(&event)?;
        }
        Ok(value)
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn database(&self) -> &Database {
        &self.db
    }
}

impl<B: BindTarget> CustomerOperations for Transactional<B> {
    fn add(&self, name: &str, subscribed: bool) -> CustomerResult<Customer> {
        self.run_in_transaction(TxMode::Write, |target| target.add(name, subscribed))
    }

    fn find_by_id(&self, id: CustomerId) -> CustomerResult<Customer> {
        self.run_in_transaction(TxMode::Read, |target| target.find_by_id(id))
    }

    fn all(&self) -> CustomerResult<Vec<Customer>> {
        self.run_in_transaction(TxMode::Read, |target| target.all())
    }
}

#[cfg(test)]
mod tests {
    use super::{PendingEvents, TxMode};
    use crate::event::{ChangeEvent, ChangePublisher};
    use crate::model::customer::Customer;

    #[test]
    fn pending_events_buffer_until_taken() {
        let pending = PendingEvents::default();
        let event = ChangeEvent::new(Customer::persisted(1, "Maria", true)).unwrap();
        pending.emit(event.clone()).unwrap();

        assert_eq!(pending.take(), vec![event]);
        assert!(pending.take().is_empty());
    }

    #[test]
    fn write_mode_takes_lock_on_begin() {
        assert_eq!(TxMode::Write.label(), "write");
        assert!(matches!(
            TxMode::Write.behavior(),
            rusqlite::TransactionBehavior::Immediate
        ));
    }
}
