use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::PaymentStore;
use crate::entities::payment::now_utc;
use crate::entities::{NewPayment, Payment};
use crate::error::PaymentError;

/// A thread-safe in-memory payment store.
///
/// Uses `Arc<RwLock<..>>` to allow shared concurrent access. Ids are assigned
/// sequentially starting at 1.
#[derive(Default, Clone)]
pub struct MemoryPaymentStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    payments: Vec<Payment>,
}

impl Inner {
    fn order_taken(&self, shop_id: i64, order_number: &str, except_id: Option<i64>) -> bool {
        self.payments.iter().any(|p| {
            p.shop_id == shop_id && p.order_number == order_number && Some(p.id) != except_id
        })
    }
}

impl MemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for MemoryPaymentStore {
    async fn insert(&self, payment: NewPayment) -> Result<Payment, PaymentError> {
        payment.validate()?;
        let mut inner = self.inner.write().await;
        if inner.order_taken(payment.shop_id, &payment.order_number, None) {
            return Err(PaymentError::Duplicate {
                shop_id: payment.shop_id,
                order_number: payment.order_number,
            });
        }
        inner.last_id += 1;
        let stored = payment.into_payment(inner.last_id, now_utc());
        inner.payments.push(stored.clone());
        Ok(stored)
    }

    async fn get_by_order(
        &self,
        shop_id: i64,
        order_number: &str,
    ) -> Result<Option<Payment>, PaymentError> {
        let inner = self.inner.read().await;
        Ok(inner
            .payments
            .iter()
            .find(|p| p.shop_id == shop_id && p.order_number == order_number)
            .cloned())
    }

    async fn save(&self, payment: &Payment) -> Result<(), PaymentError> {
        payment.validate()?;
        let mut inner = self.inner.write().await;
        if inner.order_taken(payment.shop_id, &payment.order_number, Some(payment.id)) {
            return Err(PaymentError::Duplicate {
                shop_id: payment.shop_id,
                order_number: payment.order_number.clone(),
            });
        }
        let slot = inner
            .payments
            .iter_mut()
            .find(|p| p.id == payment.id)
            .ok_or(PaymentError::NotFound(payment.id))?;
        *slot = payment.clone();
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Payment>, PaymentError> {
        let inner = self.inner.read().await;
        let mut payments = inner.payments.clone();
        // Ids break ties between records created within the same instant.
        payments.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        Ok(payments)
    }

    async fn used_shop_ids(&self) -> Result<Vec<i64>, PaymentError> {
        let inner = self.inner.read().await;
        let ids: BTreeSet<i64> = inner.payments.iter().map(|p| p.shop_id).collect();
        Ok(ids.into_iter().collect())
    }

    async fn used_scids(&self) -> Result<Vec<i64>, PaymentError> {
        let inner = self.inner.read().await;
        let ids: BTreeSet<i64> = inner.payments.iter().map(|p| p.scid).collect();
        Ok(ids.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PaymentDefaults;
    use crate::entities::PaymentStatus;
    use rust_decimal::Decimal;
    use url::Url;

    fn defaults(shop_id: i64, scid: i64) -> PaymentDefaults {
        PaymentDefaults::new(
            shop_id,
            scid,
            Url::parse("https://example.com/success/").unwrap(),
            Url::parse("https://example.com/fail/").unwrap(),
        )
    }

    fn new_payment(shop_id: i64, scid: i64, order_number: &str) -> NewPayment {
        let mut p = NewPayment::new(Decimal::from(100), &defaults(shop_id, scid));
        p.order_number = order_number.to_string();
        p
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = MemoryPaymentStore::new();
        let stored = store.insert(new_payment(1, 10, "a")).await.unwrap();
        assert_eq!(stored.id, 1);
        assert_eq!(stored.status, PaymentStatus::Processed);

        let found = store.get_by_order(1, "a").await.unwrap().unwrap();
        assert_eq!(found, stored);
        assert!(store.get_by_order(2, "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_order_number_is_rejected() {
        let store = MemoryPaymentStore::new();
        store.insert(new_payment(1, 10, "a")).await.unwrap();

        let err = store.insert(new_payment(1, 11, "a")).await.unwrap_err();
        assert!(matches!(
            err,
            PaymentError::Duplicate { shop_id: 1, ref order_number } if order_number == "a"
        ));

        // Same order number under another shop is a different payment.
        store.insert(new_payment(2, 10, "a")).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_save_updates_record() {
        let store = MemoryPaymentStore::new();
        let mut stored = store.insert(new_payment(1, 10, "a")).await.unwrap();
        stored.status = PaymentStatus::Success;
        stored.invoice_id = Some(99);
        store.save(&stored).await.unwrap();

        let found = store.get_by_order(1, "a").await.unwrap().unwrap();
        assert!(found.is_payed());
        assert_eq!(found.invoice_id, Some(99));
    }

    #[tokio::test]
    async fn test_save_cannot_steal_order_number() {
        let store = MemoryPaymentStore::new();
        store.insert(new_payment(1, 10, "a")).await.unwrap();
        let mut second = store.insert(new_payment(1, 10, "b")).await.unwrap();
        second.order_number = "a".to_string();
        assert!(matches!(
            store.save(&second).await,
            Err(PaymentError::Duplicate { .. })
        ));
    }

    #[tokio::test]
    async fn test_save_unknown_id() {
        let store = MemoryPaymentStore::new();
        let mut stored = store.insert(new_payment(1, 10, "a")).await.unwrap();
        stored.id = 500;
        stored.order_number = "z".to_string();
        assert!(matches!(
            store.save(&stored).await,
            Err(PaymentError::NotFound(500))
        ));
    }

    #[tokio::test]
    async fn test_insert_validates() {
        let store = MemoryPaymentStore::new();
        let mut p = new_payment(1, 10, "a");
        p.fail_url = "nope".to_string();
        assert!(matches!(
            store.insert(p).await,
            Err(PaymentError::Validation { field: "fail_url", .. })
        ));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_used_ids_are_distinct() {
        let store = MemoryPaymentStore::new();
        for (shop_id, scid, order) in [(5, 50, "a"), (5, 51, "b"), (3, 50, "c"), (5, 50, "d")] {
            store.insert(new_payment(shop_id, scid, order)).await.unwrap();
        }
        assert_eq!(Payment::get_used_shop_ids(&store).await.unwrap(), vec![3, 5]);
        assert_eq!(Payment::get_used_scids(&store).await.unwrap(), vec![50, 51]);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryPaymentStore::new();
        for order in ["a", "b", "c"] {
            store.insert(new_payment(1, 1, order)).await.unwrap();
        }
        let orders: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.order_number)
            .collect();
        assert_eq!(orders, vec!["c", "b", "a"]);
    }
}
