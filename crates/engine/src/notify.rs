//! Notification sink interface.
//!
//! The engine emits an event after each committed state transition.
//! Notifications are best-effort: a sink must not fail the triggering
//! operation, so the trait is fire-and-forget by signature.

use crate::Transaction;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyEvent {
    Created,
    Approved,
    Rejected,
    Cancelled,
    Returned,
}

impl NotifyEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Returned => "returned",
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, event: NotifyEvent, transaction: &Transaction);
}

/// Default sink: writes the event to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, event: NotifyEvent, transaction: &Transaction) {
        tracing::info!(
            event = event.as_str(),
            tx_number = %transaction.tx_number,
            item_id = %transaction.item_id,
            user_id = %transaction.user_id,
            quantity = transaction.quantity,
            "transaction event"
        );
    }
}
