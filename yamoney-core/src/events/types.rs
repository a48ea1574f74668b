//! Event type definitions for asynchronous payment consumers.
//!
//! Events are ephemeral. They carry identifiers rather than the full record,
//! so consumers that need more re-fetch the payment from the store.

use crate::entities::{Payment, PaymentStatus};

/// Which signal produced the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Process,
    Completed,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Process => write!(f, "payment_process"),
            SignalKind::Completed => write!(f, "payment_completed"),
        }
    }
}

/// Event emitted for every payment signal a forwarder is connected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentEvent {
    pub kind: SignalKind,
    pub payment_id: i64,
    pub shop_id: i64,
    pub order_number: String,
    pub status: PaymentStatus,
}

impl PaymentEvent {
    pub fn new(kind: SignalKind, payment: &Payment) -> Self {
        Self {
            kind,
            payment_id: payment.id,
            shop_id: payment.shop_id,
            order_number: payment.order_number.clone(),
            status: payment.status,
        }
    }
}
