//! Event channel factory and the signal-to-channel bridge.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::types::{PaymentEvent, SignalKind};
use crate::entities::Payment;
use crate::signals::{PaymentReceiver, PaymentSignals};

/// Default buffer size for event channels.
///
/// This provides enough buffer to handle bursts while keeping memory bounded.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Sender handle for PaymentEvent events.
pub type PaymentEventSender = mpsc::Sender<PaymentEvent>;
/// Receiver handle for PaymentEvent events.
pub type PaymentEventReceiver = mpsc::Receiver<PaymentEvent>;

/// Create a new PaymentEvent channel.
///
/// Returns a (sender, receiver) pair. Multiple forwarders can share clones
/// of the returned sender.
pub fn payment_event_channel() -> (PaymentEventSender, PaymentEventReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// A receiver that turns a signal into a [`PaymentEvent`] on a channel.
///
/// Sending never blocks the dispatching request. A full or closed channel
/// is reported as a receiver failure.
pub struct EventForwarder {
    kind: SignalKind,
    sender: PaymentEventSender,
}

impl EventForwarder {
    pub fn new(kind: SignalKind, sender: PaymentEventSender) -> Self {
        Self { kind, sender }
    }
}

impl PaymentReceiver for EventForwarder {
    fn receive(&self, payment: &Payment) -> anyhow::Result<()> {
        self.sender
            .try_send(PaymentEvent::new(self.kind, payment))
            .map_err(|e| anyhow::anyhow!("failed to forward {} event: {}", self.kind, e))
    }
}

impl PaymentSignals {
    /// Connect forwarders for both signals to `sender`.
    pub fn forward_to(&mut self, sender: PaymentEventSender) {
        self.payment_process.connect(Arc::new(EventForwarder::new(
            SignalKind::Process,
            sender.clone(),
        )));
        self.payment_completed
            .connect(Arc::new(EventForwarder::new(SignalKind::Completed, sender)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaymentDefaults;
    use crate::entities::payment::now_utc;
    use crate::entities::{NewPayment, PaymentStatus};
    use rust_decimal::Decimal;
    use url::Url;

    fn payment(status: PaymentStatus) -> Payment {
        let defaults = PaymentDefaults::new(
            3,
            4,
            Url::parse("https://example.com/ok").unwrap(),
            Url::parse("https://example.com/fail").unwrap(),
        );
        let mut new = NewPayment::new(Decimal::from(9), &defaults);
        new.status = status;
        new.order_number = "order-9".to_string();
        new.into_payment(42, now_utc())
    }

    #[tokio::test]
    async fn test_forwarder_delivers_events() {
        let (tx, mut rx) = payment_event_channel();
        let mut signals = PaymentSignals::default();
        signals.forward_to(tx);

        payment(PaymentStatus::Processed).send_signals(&signals).unwrap();
        payment(PaymentStatus::Success).send_signals(&signals).unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.kind, SignalKind::Process);
        assert_eq!(first.payment_id, 42);
        assert_eq!(first.shop_id, 3);
        assert_eq!(first.order_number, "order-9");

        let second = rx.recv().await.unwrap();
        assert_eq!(second.kind, SignalKind::Completed);
        assert_eq!(second.status, PaymentStatus::Success);
    }

    #[test]
    fn test_closed_channel_is_a_receiver_failure() {
        let (tx, rx) = payment_event_channel();
        drop(rx);
        let mut signals = PaymentSignals::default();
        signals.forward_to(tx);

        let err = payment(PaymentStatus::Processed)
            .send_signals(&signals)
            .unwrap_err();
        assert_eq!(err.signal, "payment_process");
    }
}
