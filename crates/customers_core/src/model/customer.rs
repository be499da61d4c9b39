//! Customer domain record.
//!
//! # Responsibility
//! - Define the canonical record written by the upsert path and mirrored by
//!   the read cache.
//!
//! # Invariants
//! - `name` uniquely determines `id` once persisted.
//! - `id` is `None` only before first persistence and never changes afterwards.

use serde::{Deserialize, Serialize};

/// Storage-assigned customer identifier.
///
/// SQLite integer keys are widened to `i64` on read.
pub type CustomerId = i64;

/// Canonical customer record.
///
/// Fields are read through accessors; the id is fixed by the constructor
/// that built the record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Customer {
    id: Option<CustomerId>,
    name: String,
    subscribed: bool,
}

impl Customer {
    /// Creates a customer that has not been persisted yet.
    pub fn new(name: impl Into<String>, subscribed: bool) -> Self {
        Self {
            id: None,
            name: name.into(),
            subscribed,
        }
    }

    /// Creates a customer as read back from storage.
    pub fn persisted(id: CustomerId, name: impl Into<String>, subscribed: bool) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            subscribed,
        }
    }

    /// Storage-assigned id; `None` before first persistence.
    pub fn id(&self) -> Option<CustomerId> {
        self.id
    }

    /// Unique upsert key.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
