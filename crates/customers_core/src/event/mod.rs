//! In-process change notifications.
//!
//! # Responsibility
//! - Carry snapshots of committed customer writes to registered subscribers.
//! - Keep dispatch synchronous so callers observe subscriber effects before
//!   a write call returns.
//!
//! # Invariants
//! - Subscribers run in registration order on the publisher's stack.
//! - The bus is an explicit object shared by `Arc`; there is no global bus.

pub mod bus;
pub mod subscribers;

pub use bus::{
    ChangeEvent, ChangePublisher, EventBus, FnSubscriber, Subscriber, SubscriberError,
};
pub use subscribers::LoggingSubscriber;
