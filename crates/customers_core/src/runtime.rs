//! Wiring for one customers process.
//!
//! # Responsibility
//! - Build the database handle, the event bus, the read cache and the
//!   transactional service once, and hand out references to them.
//! - Seed demo customers at startup.
//!
//! # Invariants
//! - The read cache is the first subscriber, so it is current before any
//!   other subscriber observes an event.
//! - The cache only mirrors writes made through this runtime since it was
//!   built; it never reads storage.

use crate::cache::read_cache::ReadCache;
use crate::config::CoreConfig;
use crate::db::Database;
use crate::event::{EventBus, LoggingSubscriber, Subscriber};
use crate::model::customer::Customer;
use crate::service::customer_service::{CustomerError, CustomerOperations, CustomerResult};
use crate::service::transactional::{SqliteCustomerBinder, Transactional};
use log::info;
use std::sync::Arc;

/// Customers added by [`CustomerRuntime::seed_demo_customers`].
pub const DEMO_CUSTOMERS: &[(&str, bool)] = &[("Maria", true), ("Ernie", false)];

/// Transactional customer service backed by SQLite.
pub type CustomerApi = Transactional<SqliteCustomerBinder>;

pub struct CustomerRuntime {
    customers: CustomerApi,
    cache: Arc<ReadCache>,
    bus: Arc<EventBus>,
}

impl CustomerRuntime {
    /// Opens the configured database and wires all components.
    pub fn open(config: &CoreConfig) -> CustomerResult<Self> {
        let db = Database::open(&config.db_path)?;
        Ok(Self::with_database(db))
    }

    pub fn with_database(db: Database) -> Self {
        let bus = Arc::new(EventBus::new());
        let cache = Arc::new(ReadCache::new());
        let cache_subscriber: Arc<dyn Subscriber> = cache.clone();
        bus.subscribe(cache_subscriber);
        bus.subscribe(Arc::new(LoggingSubscriber));

        let customers = Transactional::new(db, Arc::clone(&bus), SqliteCustomerBinder);
        Self {
            customers,
            cache,
            bus,
        }
    }

    /// Transactional entry point for `add`, `find_by_id` and `all`.
    pub fn customers(&self) -> &CustomerApi {
        &self.customers
    }

    pub fn cache(&self) -> &Arc<ReadCache> {
        &self.cache
    }

    /// Shared bus; external components may subscribe here.
    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Adds every `(name, subscribed)` pair and checks storage lists them all.
    ///
    /// Returns the stored records in input order.
    pub fn seed_customers(&self, entries: &[(&str, bool)]) -> CustomerResult<Vec<Customer>> {
        let mut seeded = Vec::with_capacity(entries.len());
        for (name, subscribed) in entries {
            seeded.push(self.customers.add(name, *subscribed)?);
        }

        let stored = self.customers.all()?;
        if let Some(missing) = seeded.iter().find(|customer| !stored.contains(customer)) {
            return Err(CustomerError::Integrity(format!(
                "seeded customer {:?} missing from storage listing",
                missing.id()
            )));
        }

        info!(
            "event=customers_seeded module=runtime status=ok count={}",
            seeded.len()
        );
        Ok(seeded)
    }

    pub fn seed_demo_customers(&self) -> CustomerResult<Vec<Customer>> {
        self.seed_customers(DEMO_CUSTOMERS)
    }
}
