//! Synchronous notification of payment status to registered receivers.
//!
//! The application connects receivers once at startup, then shares the
//! [`PaymentSignals`] behind an `Arc`. Dispatch runs every receiver in
//! registration order on the caller's task; the first receiver error stops
//! the dispatch and is returned to the caller.

use std::sync::Arc;

use thiserror::Error;

use crate::entities::Payment;

pub const PAYMENT_PROCESS: &str = "payment_process";
pub const PAYMENT_COMPLETED: &str = "payment_completed";

/// Something that wants to hear about a payment.
pub trait PaymentReceiver: Send + Sync {
    fn receive(&self, payment: &Payment) -> anyhow::Result<()>;
}

struct FnReceiver<F>(F);

impl<F> PaymentReceiver for FnReceiver<F>
where
    F: Fn(&Payment) -> anyhow::Result<()> + Send + Sync,
{
    fn receive(&self, payment: &Payment) -> anyhow::Result<()> {
        (self.0)(payment)
    }
}

/// A receiver failed while handling a signal.
#[derive(Debug, Error)]
#[error("{signal} receiver #{index} failed: {cause:#}")]
pub struct SignalError {
    pub signal: &'static str,
    pub index: usize,
    pub cause: anyhow::Error,
}

/// A named list of receivers.
pub struct Signal {
    name: &'static str,
    receivers: Vec<Arc<dyn PaymentReceiver>>,
}

impl Signal {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            receivers: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn connect(&mut self, receiver: Arc<dyn PaymentReceiver>) {
        self.receivers.push(receiver);
    }

    /// Connect a closure as a receiver.
    pub fn connect_fn<F>(&mut self, f: F)
    where
        F: Fn(&Payment) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.receivers.push(Arc::new(FnReceiver(f)));
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers.len()
    }

    /// Deliver `payment` to every receiver, stopping at the first error.
    pub fn send(&self, payment: &Payment) -> Result<(), SignalError> {
        tracing::debug!(
            signal = self.name,
            payment_id = payment.id,
            receivers = self.receivers.len(),
            "Dispatching payment signal"
        );
        for (index, receiver) in self.receivers.iter().enumerate() {
            receiver
                .receive(payment)
                .map_err(|cause| SignalError {
                    signal: self.name,
                    index,
                    cause,
                })?;
        }
        Ok(())
    }
}

/// The two signals emitted by [`Payment::send_signals`].
pub struct PaymentSignals {
    /// Fired for payments in the `processed` state.
    pub payment_process: Signal,
    /// Fired for payments in the `success` state.
    pub payment_completed: Signal,
}

impl Default for PaymentSignals {
    fn default() -> Self {
        Self {
            payment_process: Signal::new(PAYMENT_PROCESS),
            payment_completed: Signal::new(PAYMENT_COMPLETED),
        }
    }
}
