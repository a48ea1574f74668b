//! Handling of the provider's `checkOrder` and `paymentAviso` callbacks.
//!
//! # Lifecycle
//!
//! 1. `checkOrder` finds or creates the payment (status `processed`) and fires
//!    `payment_process`. A payment already in a terminal state, or one whose
//!    stored amount differs from the callback, is refused.
//! 2. `paymentAviso` finds or creates the payment, marks it `success`, records
//!    the provider's invoice and net amount, and fires `payment_completed`.
//!    A repeated aviso for a paid order is acknowledged without firing again.
//!
//! Signature (`md5`) verification is not performed here.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;
use yamoney_sdk::objects::{NoticeAction, NoticePayload, NoticeResponse, ResultCode};

use crate::config::PaymentDefaults;
use crate::entities::payment::{is_valid_email, is_valid_phone, now_utc};
use crate::entities::{NewPayment, Payment, PaymentStatus};
use crate::error::PaymentError;
use crate::signals::PaymentSignals;
use crate::store::PaymentStore;

/// Why a notification was not accepted.
#[derive(Debug, Error)]
pub enum NoticeError {
    #[error("notification is for shop {got}, this shop is {expected}")]
    UnknownShop { expected: i64, got: i64 },

    #[error("{got} request sent to the {expected} endpoint")]
    WrongAction {
        expected: NoticeAction,
        got: NoticeAction,
    },

    #[error("order refused: {0}")]
    Refused(String),

    #[error("payment for order {0} has already failed")]
    AlreadyFailed(String),

    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl NoticeError {
    /// Provider result code for this failure.
    pub fn code(&self) -> ResultCode {
        match self {
            NoticeError::Refused(_) => ResultCode::Refused,
            _ => ResultCode::BadRequest,
        }
    }

    /// Text safe to return to the provider.
    fn public_message(&self) -> String {
        match self {
            NoticeError::Payment(PaymentError::Database(_))
            | NoticeError::Payment(PaymentError::Signal(_))
            | NoticeError::Payment(PaymentError::NotFound(_)) => "internal error".to_string(),
            other => other.to_string(),
        }
    }
}

/// Applies provider notifications to stored payments.
#[derive(Clone)]
pub struct NoticeHandler {
    store: Arc<dyn PaymentStore>,
    signals: Arc<PaymentSignals>,
    defaults: Arc<RwLock<PaymentDefaults>>,
}

impl NoticeHandler {
    pub fn new(
        store: Arc<dyn PaymentStore>,
        signals: Arc<PaymentSignals>,
        defaults: Arc<RwLock<PaymentDefaults>>,
    ) -> Self {
        Self {
            store,
            signals,
            defaults,
        }
    }

    /// Process a notification received on the `endpoint` route and build the answer.
    pub async fn handle(&self, endpoint: NoticeAction, payload: NoticePayload) -> NoticeResponse {
        let shop_id = payload.shop_id;
        let invoice_id = payload.invoice_id;

        let result = if payload.action != endpoint {
            Err(NoticeError::WrongAction {
                expected: endpoint,
                got: payload.action,
            })
        } else {
            match endpoint {
                NoticeAction::CheckOrder => self.check_order(&payload).await,
                NoticeAction::PaymentAviso => self.payment_aviso(&payload).await,
            }
        };

        match result {
            Ok(payment) => {
                tracing::info!(
                    action = %endpoint,
                    payment_id = payment.id,
                    shop_id,
                    order_number = %payment.order_number,
                    status = %payment.status,
                    "Notification accepted"
                );
                NoticeResponse::new(endpoint, ResultCode::Success, shop_id, invoice_id)
            }
            Err(e) => {
                match &e {
                    NoticeError::Payment(PaymentError::Database(_))
                    | NoticeError::Payment(PaymentError::Signal(_)) => {
                        tracing::error!(action = %endpoint, shop_id, error = %e, "Notification processing failed");
                    }
                    _ => {
                        tracing::warn!(action = %endpoint, shop_id, error = %e, "Notification rejected");
                    }
                }
                NoticeResponse::new(endpoint, e.code(), shop_id, invoice_id)
                    .with_message(e.public_message())
            }
        }
    }

    /// Pre-payment validation: make sure the order exists and can still be paid.
    pub async fn check_order(&self, payload: &NoticePayload) -> Result<Payment, NoticeError> {
        self.ensure_shop(payload).await?;
        let (mut payment, created) = self.get_or_create(payload).await?;

        if payment.status.is_terminal() {
            return Err(NoticeError::Refused(format!(
                "payment is already {}",
                payment.status
            )));
        }

        if !created {
            if payment.order_amount != payload.order_sum_amount {
                payment.status = PaymentStatus::Fail;
                self.store.save(&payment).await?;
                return Err(NoticeError::Refused(format!(
                    "order amount {} does not match {}",
                    payload.order_sum_amount, payment.order_amount
                )));
            }
            apply_payload(&mut payment, payload);
            self.store.save(&payment).await?;
        }

        payment
            .send_signals(&self.signals)
            .map_err(PaymentError::from)?;
        Ok(payment)
    }

    /// Payment confirmation: mark the order paid and notify receivers.
    pub async fn payment_aviso(&self, payload: &NoticePayload) -> Result<Payment, NoticeError> {
        self.ensure_shop(payload).await?;
        let (mut payment, _) = self.get_or_create(payload).await?;

        if payment.status == PaymentStatus::Success {
            tracing::debug!(payment_id = payment.id, "Repeated aviso for a paid order");
            return Ok(payment);
        }
        if !payment.status.can_transition_to(PaymentStatus::Success) {
            return Err(NoticeError::AlreadyFailed(payment.order_number));
        }
        if payment.order_amount != payload.order_sum_amount {
            tracing::warn!(
                payment_id = payment.id,
                expected = %payment.order_amount,
                received = %payload.order_sum_amount,
                "Aviso amount differs from the order amount"
            );
        }

        apply_payload(&mut payment, payload);
        payment.status = PaymentStatus::Success;
        if payload.shop_sum_amount.is_some() {
            payment.shop_amount = payload.shop_sum_amount;
        }
        if let Some(currency) = payload.shop_sum_currency_paycash {
            payment.shop_currency = Some(currency.into());
        }
        payment.performed_datetime = Some(now_utc());
        self.store.save(&payment).await?;

        payment
            .send_signals(&self.signals)
            .map_err(PaymentError::from)?;
        Ok(payment)
    }

    async fn ensure_shop(&self, payload: &NoticePayload) -> Result<(), NoticeError> {
        let expected = self.defaults.read().await.shop_id;
        if payload.shop_id != expected {
            return Err(NoticeError::UnknownShop {
                expected,
                got: payload.shop_id,
            });
        }
        Ok(())
    }

    /// Look the payment up by (shop_id, order_number), creating it if absent.
    ///
    /// The flag is `true` when this call created the record.
    async fn get_or_create(&self, payload: &NoticePayload) -> Result<(Payment, bool), NoticeError> {
        if let Some(order_number) = payload.order_number() {
            if let Some(existing) = self.store.get_by_order(payload.shop_id, order_number).await? {
                return Ok((existing, false));
            }
        }

        let new = self.new_payment(payload).await;
        match self.store.insert(new).await {
            Ok(payment) => Ok((payment, true)),
            // A concurrent notification created it first.
            Err(PaymentError::Duplicate {
                shop_id,
                order_number,
            }) => {
                let existing = self
                    .store
                    .get_by_order(shop_id, &order_number)
                    .await?
                    .ok_or_else(|| PaymentError::Duplicate {
                        shop_id,
                        order_number: order_number.clone(),
                    })?;
                Ok((existing, false))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn new_payment(&self, payload: &NoticePayload) -> NewPayment {
        let mut new = {
            let defaults = self.defaults.read().await;
            NewPayment::new(payload.order_sum_amount, &defaults)
        };
        new.shop_id = payload.shop_id;
        if let Some(order_number) = payload.order_number() {
            new.order_number = order_number.to_owned();
        }
        if let Some(customer_number) = payload.customer_number() {
            new.customer_number = customer_number.to_owned();
        }
        new.article_id = payload.shop_article_id;
        new.invoice_id = payload.invoice_id;
        if let Some(payment_type) = payload.payment_type {
            new.payment_type = payment_type.into();
        }
        if let Some(currency) = payload.order_sum_currency_paycash {
            new.order_currency = currency.into();
        }
        new.cps_email = payer_email(payload).map(str::to_owned);
        new.cps_phone = payer_phone(payload).map(str::to_owned);
        new
    }
}

/// Copy the descriptive fields a later notification may fill in or correct.
fn apply_payload(payment: &mut Payment, payload: &NoticePayload) {
    if payload.invoice_id.is_some() {
        payment.invoice_id = payload.invoice_id;
    }
    if payload.shop_article_id.is_some() {
        payment.article_id = payload.shop_article_id;
    }
    if let Some(payment_type) = payload.payment_type {
        payment.payment_type = payment_type.into();
    }
    if let Some(currency) = payload.order_sum_currency_paycash {
        payment.order_currency = currency.into();
    }
    if let Some(customer_number) = payload.customer_number() {
        payment.customer_number = customer_number.to_owned();
    }
    if let Some(email) = payer_email(payload) {
        payment.cps_email = Some(email.to_owned());
    }
    if let Some(phone) = payer_phone(payload) {
        payment.cps_phone = Some(phone.to_owned());
    }
}

/// Payer contacts are informational; one the record cannot hold is dropped
/// rather than failing the notification.
fn payer_email(payload: &NoticePayload) -> Option<&str> {
    let email = payload.email()?;
    if is_valid_email(email) {
        Some(email)
    } else {
        tracing::warn!(shop_id = payload.shop_id, email, "Ignoring unusable payer email");
        None
    }
}

fn payer_phone(payload: &NoticePayload) -> Option<&str> {
    let phone = payload.phone()?;
    if is_valid_phone(phone) {
        Some(phone)
    } else {
        tracing::warn!(shop_id = payload.shop_id, phone, "Ignoring unusable payer phone");
        None
    }
}
