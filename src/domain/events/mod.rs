//! Domain events
use rust_decimal::Decimal;
use serde::Serialize;
use crate::domain::aggregates::OrderId;
use crate::domain::value_objects::format_brl;

/// Token identifying one finalize attempt. Answers carrying an older token
/// are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct AttemptId(pub(crate) u64);

impl AttemptId {
    pub fn value(&self) -> u64 { self.0 }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum CheckoutEvent {
    CartEmpty,
    AlreadyInProgress { attempt: AttemptId },
    HandedOff { attempt: AttemptId, uri: String, total: Decimal },
    HandoffFailed { attempt: AttemptId, reason: String },
    ConfirmationRequested { attempt: AttemptId },
    Committed { attempt: AttemptId, order_id: OrderId, total: Decimal },
    Discarded { attempt: AttemptId },
    Abandoned { attempt: AttemptId },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum NotificationLevel { Info, Success, Error }

/// User-facing message derived from a checkout event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl CheckoutEvent {
    /// Abandonment and internal transitions are silent.
    pub fn notification(&self) -> Option<Notification> {
        let (level, message) = match self {
            Self::CartEmpty => (NotificationLevel::Error, "Your cart is empty. Add items before finalizing the order.".to_string()),
            Self::HandoffFailed { reason, .. } => (NotificationLevel::Error, format!("Could not open the messaging app: {reason}")),
            Self::Committed { order_id, total, .. } => (NotificationLevel::Success, format!("Order {order_id} confirmed. Total {}", format_brl(*total))),
            Self::Discarded { .. } => (NotificationLevel::Info, "Order not sent. Your cart was kept so you can try again.".to_string()),
            Self::AlreadyInProgress { .. } | Self::HandedOff { .. } | Self::ConfirmationRequested { .. } | Self::Abandoned { .. } => return None,
        };
        Some(Notification { level, message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_events() {
        assert!(CheckoutEvent::Abandoned { attempt: AttemptId(1) }.notification().is_none());
        assert!(CheckoutEvent::ConfirmationRequested { attempt: AttemptId(1) }.notification().is_none());
        let n = CheckoutEvent::CartEmpty.notification().unwrap();
        assert_eq!(n.level, NotificationLevel::Error);
    }
}
