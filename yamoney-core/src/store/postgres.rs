use async_trait::async_trait;
use sqlx::PgPool;

use super::PaymentStore;
use crate::entities::{NewPayment, Payment};
use crate::error::PaymentError;

/// PostgreSQL-backed payment store over the `yandex_money_payment` table.
#[derive(Clone)]
pub struct PgPaymentStore {
    pub pool: PgPool,
}

impl PgPaymentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-constraint violation onto [`PaymentError::Duplicate`].
fn map_unique_violation(err: sqlx::Error, shop_id: i64, order_number: &str) -> PaymentError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => PaymentError::Duplicate {
            shop_id,
            order_number: order_number.to_owned(),
        },
        _ => PaymentError::Database(err),
    }
}

#[async_trait]
impl PaymentStore for PgPaymentStore {
    #[tracing::instrument(skip_all, err, name = "SQL:InsertPayment")]
    async fn insert(&self, payment: NewPayment) -> Result<Payment, PaymentError> {
        payment.validate()?;
        sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO yandex_money_payment (
                user_id, shop_id, scid, customer_number, order_amount,
                article_id, payment_type, order_number, cps_email, cps_phone,
                success_url, fail_url, status, invoice_id, shop_amount,
                order_currency, shop_currency, performed_datetime
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            RETURNING
                id, user_id, pub_date, shop_id, scid, customer_number, order_amount,
                article_id, payment_type, order_number, cps_email, cps_phone,
                success_url, fail_url, status, invoice_id, shop_amount,
                order_currency, shop_currency, performed_datetime
            "#,
        )
        .bind(payment.user_id)
        .bind(payment.shop_id)
        .bind(payment.scid)
        .bind(&payment.customer_number)
        .bind(payment.order_amount)
        .bind(payment.article_id)
        .bind(payment.payment_type)
        .bind(&payment.order_number)
        .bind(&payment.cps_email)
        .bind(&payment.cps_phone)
        .bind(&payment.success_url)
        .bind(&payment.fail_url)
        .bind(payment.status)
        .bind(payment.invoice_id)
        .bind(payment.shop_amount)
        .bind(payment.order_currency)
        .bind(payment.shop_currency)
        .bind(payment.performed_datetime)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, payment.shop_id, &payment.order_number))
    }

    #[tracing::instrument(skip_all, err, name = "SQL:GetPaymentByOrder")]
    async fn get_by_order(
        &self,
        shop_id: i64,
        order_number: &str,
    ) -> Result<Option<Payment>, PaymentError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            SELECT
                id, user_id, pub_date, shop_id, scid, customer_number, order_amount,
                article_id, payment_type, order_number, cps_email, cps_phone,
                success_url, fail_url, status, invoice_id, shop_amount,
                order_currency, shop_currency, performed_datetime
            FROM yandex_money_payment
            WHERE shop_id = $1 AND order_number = $2
            "#,
        )
        .bind(shop_id)
        .bind(order_number)
        .fetch_optional(&self.pool)
        .await?;
        Ok(payment)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:SavePayment")]
    async fn save(&self, payment: &Payment) -> Result<(), PaymentError> {
        payment.validate()?;
        let result = sqlx::query(
            r#"
            UPDATE yandex_money_payment SET
                user_id = $2,
                shop_id = $3,
                scid = $4,
                customer_number = $5,
                order_amount = $6,
                article_id = $7,
                payment_type = $8,
                order_number = $9,
                cps_email = $10,
                cps_phone = $11,
                success_url = $12,
                fail_url = $13,
                status = $14,
                invoice_id = $15,
                shop_amount = $16,
                order_currency = $17,
                shop_currency = $18,
                performed_datetime = $19
            WHERE id = $1
            "#,
        )
        .bind(payment.id)
        .bind(payment.user_id)
        .bind(payment.shop_id)
        .bind(payment.scid)
        .bind(&payment.customer_number)
        .bind(payment.order_amount)
        .bind(payment.article_id)
        .bind(payment.payment_type)
        .bind(&payment.order_number)
        .bind(&payment.cps_email)
        .bind(&payment.cps_phone)
        .bind(&payment.success_url)
        .bind(&payment.fail_url)
        .bind(payment.status)
        .bind(payment.invoice_id)
        .bind(payment.shop_amount)
        .bind(payment.order_currency)
        .bind(payment.shop_currency)
        .bind(payment.performed_datetime)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, payment.shop_id, &payment.order_number))?;

        if result.rows_affected() == 0 {
            return Err(PaymentError::NotFound(payment.id));
        }
        Ok(())
    }

    #[tracing::instrument(skip_all, err, name = "SQL:ListPayments")]
    async fn list(&self) -> Result<Vec<Payment>, PaymentError> {
        let payments = sqlx::query_as::<_, Payment>(
            r#"
            SELECT
                id, user_id, pub_date, shop_id, scid, customer_number, order_amount,
                article_id, payment_type, order_number, cps_email, cps_phone,
                success_url, fail_url, status, invoice_id, shop_amount,
                order_currency, shop_currency, performed_datetime
            FROM yandex_money_payment
            ORDER BY pub_date DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:UsedShopIds")]
    async fn used_shop_ids(&self) -> Result<Vec<i64>, PaymentError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT shop_id FROM yandex_money_payment ORDER BY shop_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    #[tracing::instrument(skip_all, err, name = "SQL:UsedScids")]
    async fn used_scids(&self) -> Result<Vec<i64>, PaymentError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT DISTINCT scid FROM yandex_money_payment ORDER BY scid",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
