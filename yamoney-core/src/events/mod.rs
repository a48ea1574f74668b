//! Channel-based delivery of payment signals.
//!
//! Signal receivers run synchronously inside the request that changed the
//! payment. Consumers that would rather work off the request path connect an
//! [`EventForwarder`] and read [`PaymentEvent`]s from a channel instead.

pub mod channels;
pub mod types;

pub use channels::{
    DEFAULT_CHANNEL_BUFFER, EventForwarder, PaymentEventReceiver, PaymentEventSender,
    payment_event_channel,
};
pub use types::{PaymentEvent, SignalKind};
