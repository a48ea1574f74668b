use thiserror::Error;

use crate::signals::SignalError;

/// Errors raised while creating, storing or dispatching payments.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// A field failed validation.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// The (shop_id, order_number) pair is already taken.
    #[error("payment for shop {shop_id} with order number {order_number} already exists")]
    Duplicate { shop_id: i64, order_number: String },

    /// No stored payment has this id.
    #[error("payment not found: {0}")]
    NotFound(i64),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Signal(#[from] SignalError),
}

impl PaymentError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        PaymentError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
