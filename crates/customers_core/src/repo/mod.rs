//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage collaborator contract used by the upsert path.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Writes use a single insert-or-update statement keyed by customer name.
//! - Repository APIs report missing generated keys as semantic errors, not
//!   as transport errors.

pub mod customer_repo;
