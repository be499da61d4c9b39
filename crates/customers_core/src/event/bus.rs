//! Synchronous publish/subscribe channel for customer changes.

use crate::model::customer::{Customer, CustomerId};
use log::{debug, warn};
use parking_lot::RwLock;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Immutable snapshot of a customer taken when its write committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    customer: Customer,
    id: CustomerId,
}

impl ChangeEvent {
    /// Wraps a persisted customer.
    ///
    /// Returns `None` for customers without an id; only persisted records
    /// can be announced.
    pub fn new(customer: Customer) -> Option<Self> {
        let id = customer.id()?;
        Some(Self { customer, id })
    }

    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }
}

/// Failure raised by one subscriber while handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberError {
    pub subscriber: String,
    pub customer_id: CustomerId,
    pub message: String,
}

impl SubscriberError {
    pub fn new(
        subscriber: impl Into<String>,
        customer_id: CustomerId,
        message: impl Into<String>,
    ) -> Self {
        Self {
            subscriber: subscriber.into(),
            customer_id,
            message: message.into(),
        }
    }
}

impl Display for SubscriberError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "subscriber `{}` failed for customer {}: {}",
            self.subscriber, self.customer_id, self.message
        )
    }
}

impl Error for SubscriberError {}

/// Handler registered on an [`EventBus`].
///
/// Handlers must return promptly; the write that produced the event waits
/// for them.
pub trait Subscriber: Send + Sync {
    /// Stable name used in logs and errors.
    fn name(&self) -> &str;
    fn on_change(&self, event: &ChangeEvent) -> Result<(), SubscriberError>;
}

/// Sink for change events produced by a write path.
///
/// The bus publishes on emit; the transactional wrapper supplies a buffering
/// implementation that publishes after commit.
pub trait ChangePublisher {
    fn emit(&self, event: ChangeEvent) -> Result<(), SubscriberError>;
}

/// Adapts a closure into a [`Subscriber`].
pub struct FnSubscriber<F> {
    name: String,
    handler: F,
}

impl<F> FnSubscriber<F>
where
    F: Fn(&ChangeEvent) -> Result<(), SubscriberError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, handler: F) -> Self {
        Self {
            name: name.into(),
            handler,
        }
    }
}

impl<F> Subscriber for FnSubscriber<F>
where
    F: Fn(&ChangeEvent) -> Result<(), SubscriberError> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_change(&self, event: &ChangeEvent) -> Result<(), SubscriberError> {
        (self.handler)(event)
    }
}

/// Ordered, synchronous fan-out of [`ChangeEvent`]s.
#[derive(Default)]
pub struct EventBus {
    subscribers: RwLock<Vec<Arc<dyn Subscriber>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber after all existing ones.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) {
        debug!(
            "event=subscriber_registered module=event status=ok subscriber={}",
            subscriber.name()
        );
        self.subscribers.write().push(subscriber);
    }

    /// Registers a closure subscriber after all existing ones.
    pub fn subscribe_fn<F>(&self, name: impl Into<String>, handler: F)
    where
        F: Fn(&ChangeEvent) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.subscribe(Arc::new(FnSubscriber::new(name, handler)));
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Delivers `event` to every subscriber in registration order.
    ///
    /// Stops at the first failure and returns it; later subscribers do not
    /// see the event.
    pub fn publish(&self, event: &ChangeEvent) -> Result<(), SubscriberError> {
        // Copy the list so handlers may subscribe without holding the lock.
        let subscribers = self.subscribers.read().clone();
        for subscriber in &subscribers {
            if let Err(err) = subscriber.on_change(event) {
                warn!(
                    "event=change_dispatch module=event status=error subscriber={} customer_id={} error={}",
                    subscriber.name(),
                    event.id(),
                    err
                );
                return Err(err);
            }
        }

        debug!(
            "event=change_dispatch module=event status=ok customer_id={} subscribers={}",
            event.id(),
            subscribers.len()
        );
        Ok(())
    }
}

impl ChangePublisher for EventBus {
    fn emit(&self, event: ChangeEvent) -> Result<(), SubscriberError> {
        self.publish(&event)
    }
}

impl Debug for EventBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
