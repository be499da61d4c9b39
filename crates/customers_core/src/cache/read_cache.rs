//! Identifier-ordered customer cache fed by change events.
//!
//! # Responsibility
//! - Keep one entry per customer id, replaced on every change event.
//! - Serve ordered snapshots without touching storage.
//!
//! # Invariants
//! - Last write wins per id.
//! - Entries are never evicted; the cache grows with the customer table.
//! - Snapshots are point-in-time copies ordered by id ascending.

use crate::event::{ChangeEvent, Subscriber, SubscriberError};
use crate::model::customer::{Customer, CustomerId};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// Concurrent, deduplicated, id-ordered customer snapshot.
#[derive(Debug, Default)]
pub struct ReadCache {
    entries: RwLock<BTreeMap<CustomerId, Customer>>,
}

impl ReadCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the entry for `customer.id()`.
    ///
    /// Unsaved customers carry no id and are ignored.
    pub fn apply(&self, customer: Customer) -> bool {
        let Some(id) = customer.id() else {
            return false;
        };
        self.entries.write().insert(id, customer);
        true
    }

    /// Returns all cached customers ordered by id ascending.
    pub fn snapshot(&self) -> Vec<Customer> {
        self.entries.read().values().cloned().collect()
    }

    pub fn get(&self, id: CustomerId) -> Option<Customer> {
        self.entries.read().get(&id).cloned()
    }

    pub fn contains(&self, id: CustomerId) -> bool {
        self.entries.read().contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Subscriber for ReadCache {
    fn name(&self) -> &str {
        "read_cache"
    }

    fn on_change(&self, event: &ChangeEvent) -> Result<(), SubscriberError> {
        self.apply(event.customer().clone());
        Ok(())
    }
}
