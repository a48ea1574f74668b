//! Storage of payment records.
//!
//! [`PaymentStore`] is the seam between the notification handling and the
//! backing storage. [`PgPaymentStore`] keeps records in PostgreSQL;
//! [`MemoryPaymentStore`] keeps them in process and is used by tests and the
//! server's `--in-memory` mode. Both enforce the (shop_id, order_number)
//! uniqueness constraint.

mod memory;
mod postgres;

pub use memory::MemoryPaymentStore;
pub use postgres::PgPaymentStore;

use async_trait::async_trait;

use crate::entities::{NewPayment, Payment};
use crate::error::PaymentError;

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Validate and insert a payment, returning the stored record.
    ///
    /// Fails with [`PaymentError::Duplicate`] when the (shop_id, order_number)
    /// pair is already taken.
    async fn insert(&self, payment: NewPayment) -> Result<Payment, PaymentError>;

    async fn get_by_order(
        &self,
        shop_id: i64,
        order_number: &str,
    ) -> Result<Option<Payment>, PaymentError>;

    /// Validate and overwrite the record with the same id.
    async fn save(&self, payment: &Payment) -> Result<(), PaymentError>;

    /// Every payment, newest first.
    async fn list(&self) -> Result<Vec<Payment>, PaymentError>;

    /// Distinct shop ids, ascending.
    async fn used_shop_ids(&self) -> Result<Vec<i64>, PaymentError>;

    /// Distinct storefront numbers, ascending.
    async fn used_scids(&self) -> Result<Vec<i64>, PaymentError>;
}
