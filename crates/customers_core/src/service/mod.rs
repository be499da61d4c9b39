//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the customer operation set.
//! - Wrap that operation set in per-call transactions without the business
//!   logic knowing about them.

pub mod customer_service;
pub mod transactional;
