//! Customer domain model.
//!
//! # Invariants
//! - Every persisted customer is identified by a stable `CustomerId`.
//! - Customers are never deleted by core.

pub mod customer;
