//! Built-in subscribers.

use super::bus::{ChangeEvent, Subscriber, SubscriberError};
use log::info;

/// Logs every committed customer change.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingSubscriber;

impl Subscriber for LoggingSubscriber {
    fn name(&self) -> &str {
        "change_log"
    }

    fn on_change(&self, event: &ChangeEvent) -> Result<(), SubscriberError> {
        let customer = event.customer();
        info!(
            "event=customer_changed module=event status=ok customer_id={} subscribed={}",
            event.id(),
            customer.subscribed()
        );
        Ok(())
    }
}
