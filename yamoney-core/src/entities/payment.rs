//! The payment record and its lifecycle helpers.

use rust_decimal::Decimal;
use time::{OffsetDateTime, PrimitiveDateTime};
use uuid::Uuid;
use validator::{Validate, ValidateEmail, ValidationError};

use crate::config::PaymentDefaults;
use crate::entities::{Currency, PaymentStatus, PaymentType};
use crate::error::PaymentError;
use crate::signals::{PaymentSignals, SignalError};
use crate::store::PaymentStore;

/// Upper bound (exclusive) of the integer part of an amount: 15 digits, 2 of them decimal.
const MAX_AMOUNT_INTEGER: i64 = 10_000_000_000_000;
const AMOUNT_DECIMAL_PLACES: u32 = 2;
const MAX_TOKEN_LEN: u64 = 64;
const MAX_EMAIL_LEN: u64 = 100;
const MAX_PHONE_LEN: u64 = 15;
/// Column width of `success_url` / `fail_url`.
pub const MAX_URL_LEN: u64 = 200;

/// A payment as stored in the `yandex_money_payment` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Payment {
    pub id: i64,
    /// Owning user in the host application, if any. Not owned by this record.
    pub user_id: Option<i64>,
    pub pub_date: PrimitiveDateTime,

    pub shop_id: i64,
    pub scid: i64,
    pub customer_number: String,
    pub order_amount: Decimal,

    pub article_id: Option<i64>,
    pub payment_type: PaymentType,
    pub order_number: String,
    pub cps_email: Option<String>,
    pub cps_phone: Option<String>,
    pub success_url: String,
    pub fail_url: String,

    pub status: PaymentStatus,
    /// Transaction number assigned by the provider.
    pub invoice_id: Option<i64>,
    /// Amount credited to the shop, net of the provider's fee.
    pub shop_amount: Option<Decimal>,
    pub order_currency: Currency,
    pub shop_currency: Option<Currency>,
    pub performed_datetime: Option<PrimitiveDateTime>,
}

impl Payment {
    pub fn is_payed(&self) -> bool {
        self.status == PaymentStatus::Success
    }

    /// Notify subscribers about the current status.
    ///
    /// `processed` fires `payment_process`, `success` fires `payment_completed`,
    /// `fail` fires nothing. Receivers run in order and the first failure aborts
    /// the dispatch.
    pub fn send_signals(&self, signals: &PaymentSignals) -> Result<(), SignalError> {
        match self.status {
            PaymentStatus::Processed => signals.payment_process.send(self),
            PaymentStatus::Success => signals.payment_completed.send(self),
            PaymentStatus::Fail => Ok(()),
        }
    }

    /// Distinct shop ids across every stored payment.
    pub async fn get_used_shop_ids<S>(store: &S) -> Result<Vec<i64>, PaymentError>
    where
        S: PaymentStore + ?Sized,
    {
        store.used_shop_ids().await
    }

    /// Distinct storefront numbers across every stored payment.
    pub async fn get_used_scids<S>(store: &S) -> Result<Vec<i64>, PaymentError>
    where
        S: PaymentStore + ?Sized,
    {
        store.used_scids().await
    }

    pub fn validate(&self) -> Result<(), PaymentError> {
        Fields {
            shop_id: self.shop_id,
            scid: self.scid,
            article_id: self.article_id,
            invoice_id: self.invoice_id,
            customer_number: &self.customer_number,
            order_number: &self.order_number,
            order_amount: self.order_amount,
            shop_amount: self.shop_amount,
            cps_email: self.cps_email.as_deref(),
            cps_phone: self.cps_phone.as_deref(),
            success_url: &self.success_url,
            fail_url: &self.fail_url,
        }
        .check()
    }
}

impl std::fmt::Display for Payment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[Payment id={}, order_number={}, payment_type={}, status={}]",
            self.id, self.order_number, self.payment_type, self.status
        )
    }
}

/// Data for inserting a new payment.
///
/// `id` and `pub_date` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPayment {
    pub user_id: Option<i64>,
    pub shop_id: i64,
    pub scid: i64,
    pub customer_number: String,
    pub order_amount: Decimal,
    pub article_id: Option<i64>,
    pub payment_type: PaymentType,
    pub order_number: String,
    pub cps_email: Option<String>,
    pub cps_phone: Option<String>,
    pub success_url: String,
    pub fail_url: String,
    pub status: PaymentStatus,
    pub invoice_id: Option<i64>,
    pub shop_amount: Option<Decimal>,
    pub order_currency: Currency,
    pub shop_currency: Option<Currency>,
    pub performed_datetime: Option<PrimitiveDateTime>,
}

impl NewPayment {
    /// A `processed` payment for `order_amount` with every other field defaulted.
    ///
    /// Customer and order numbers get fresh random tokens; shop identity and
    /// redirect URLs come from `defaults`.
    pub fn new(order_amount: Decimal, defaults: &PaymentDefaults) -> Self {
        Self {
            user_id: None,
            shop_id: defaults.shop_id,
            scid: defaults.scid,
            customer_number: generate_token(),
            order_amount,
            article_id: None,
            payment_type: PaymentType::default(),
            order_number: generate_token(),
            cps_email: None,
            cps_phone: None,
            success_url: defaults.success_url.to_string(),
            fail_url: defaults.fail_url.to_string(),
            status: PaymentStatus::default(),
            invoice_id: None,
            shop_amount: None,
            order_currency: Currency::default(),
            shop_currency: Some(Currency::default()),
            performed_datetime: None,
        }
    }

    pub fn validate(&self) -> Result<(), PaymentError> {
        Fields {
            shop_id: self.shop_id,
            scid: self.scid,
            article_id: self.article_id,
            invoice_id: self.invoice_id,
            customer_number: &self.customer_number,
            order_number: &self.order_number,
            order_amount: self.order_amount,
            shop_amount: self.shop_amount,
            cps_email: self.cps_email.as_deref(),
            cps_phone: self.cps_phone.as_deref(),
            success_url: &self.success_url,
            fail_url: &self.fail_url,
        }
        .check()
    }

    /// Materialize the stored record.
    pub(crate) fn into_payment(self, id: i64, pub_date: PrimitiveDateTime) -> Payment {
        Payment {
            id,
            user_id: self.user_id,
            pub_date,
            shop_id: self.shop_id,
            scid: self.scid,
            customer_number: self.customer_number,
            order_amount: self.order_amount,
            article_id: self.article_id,
            payment_type: self.payment_type,
            order_number: self.order_number,
            cps_email: self.cps_email,
            cps_phone: self.cps_phone,
            success_url: self.success_url,
            fail_url: self.fail_url,
            status: self.status,
            invoice_id: self.invoice_id,
            shop_amount: self.shop_amount,
            order_currency: self.order_currency,
            shop_currency: self.shop_currency,
            performed_datetime: self.performed_datetime,
        }
    }
}

/// A random 32-character lowercase hex token (a dashless UUID v4).
pub fn generate_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Current UTC time without offset, matching the `TIMESTAMP` columns.
pub fn now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Borrowed view of the validated columns, shared by `Payment` and `NewPayment`.
#[derive(Validate)]
struct Fields<'a> {
    #[validate(range(min = 0, message = "must be non-negative"))]
    shop_id: i64,
    #[validate(range(min = 0, message = "must be non-negative"))]
    scid: i64,
    #[validate(range(min = 0, message = "must be non-negative"))]
    article_id: Option<i64>,
    #[validate(range(min = 0, message = "must be non-negative"))]
    invoice_id: Option<i64>,
    #[validate(length(min = 1, max = MAX_TOKEN_LEN, message = "must be 1 to 64 characters"))]
    customer_number: &'a str,
    #[validate(length(min = 1, max = MAX_TOKEN_LEN, message = "must be 1 to 64 characters"))]
    order_number: &'a str,
    #[validate(custom(function = "validate_amount"))]
    order_amount: Decimal,
    #[validate(custom(function = "validate_amount"))]
    shop_amount: Option<Decimal>,
    #[validate(
        email(message = "not a valid email address"),
        length(max = MAX_EMAIL_LEN, message = "longer than 100 characters")
    )]
    cps_email: Option<&'a str>,
    #[validate(length(max = MAX_PHONE_LEN, message = "longer than 15 characters"))]
    cps_phone: Option<&'a str>,
    #[validate(
        url(message = "not a valid URL"),
        length(max = MAX_URL_LEN, message = "longer than 200 characters")
    )]
    success_url: &'a str,
    #[validate(
        url(message = "not a valid URL"),
        length(max = MAX_URL_LEN, message = "longer than 200 characters")
    )]
    fail_url: &'a str,
}

/// Report order for the first failing column.
const FIELD_ORDER: [&str; 12] = [
    "shop_id",
    "scid",
    "article_id",
    "invoice_id",
    "customer_number",
    "order_number",
    "order_amount",
    "shop_amount",
    "cps_email",
    "cps_phone",
    "success_url",
    "fail_url",
];

impl Fields<'_> {
    fn check(self) -> Result<(), PaymentError> {
        let errors = match Validate::validate(&self) {
            Ok(()) => return Ok(()),
            Err(errors) => errors,
        };
        let failed = errors.field_errors();
        for field in FIELD_ORDER {
            if let Some(first) = failed.get(field).and_then(|errs| errs.first()) {
                return Err(PaymentError::validation(field, describe(first)));
            }
        }
        Err(PaymentError::validation("payment", errors.to_string()))
    }
}

fn describe(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => error.code.to_string(),
    }
}

/// Whether `email` would be accepted as `cps_email`.
pub fn is_valid_email(email: &str) -> bool {
    email.chars().count() <= MAX_EMAIL_LEN as usize && email.validate_email()
}

/// Whether `phone` would be accepted as `cps_phone`.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().count() <= MAX_PHONE_LEN as usize
}

fn validate_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("amount").with_message("must be non-negative".into()));
    }
    if value.normalize().scale() > AMOUNT_DECIMAL_PLACES {
        return Err(ValidationError::new("amount")
            .with_message(format!("more than {AMOUNT_DECIMAL_PLACES} decimal places").into()));
    }
    if value.trunc() >= Decimal::from(MAX_AMOUNT_INTEGER) {
        return Err(ValidationError::new("amount").with_message("more than 15 digits".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::PaymentSignals;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::{Arc, Mutex};
    use url::Url;

    fn defaults() -> PaymentDefaults {
        PaymentDefaults::new(
            13,
            5678,
            Url::parse("https://shop.example.com/success/").unwrap(),
            Url::parse("https://shop.example.com/fail/").unwrap(),
        )
    }

    fn payment(status: PaymentStatus) -> Payment {
        let mut new = NewPayment::new(Decimal::from_str("100.50").unwrap(), &defaults());
        new.status = status;
        new.into_payment(7, now_utc())
    }

    #[test]
    fn test_new_payment_defaults() {
        let new = NewPayment::new(Decimal::from(10), &defaults());
        assert_eq!(new.shop_id, 13);
        assert_eq!(new.scid, 5678);
        assert_eq!(new.status, PaymentStatus::Processed);
        assert_eq!(new.payment_type, PaymentType::Pc);
        assert_eq!(new.order_currency, Currency::Rub);
        assert_eq!(new.success_url, "https://shop.example.com/success/");
        assert_eq!(new.fail_url, "https://shop.example.com/fail/");
        for token in [&new.customer_number, &new.order_number] {
            assert_eq!(token.len(), 32);
            assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
        }
        assert_ne!(new.customer_number, new.order_number);
        assert!(new.validate().is_ok());
    }

    #[test]
    fn test_is_payed() {
        assert!(!payment(PaymentStatus::Processed).is_payed());
        assert!(payment(PaymentStatus::Success).is_payed());
        assert!(!payment(PaymentStatus::Fail).is_payed());
    }

    #[test]
    fn test_display() {
        let mut p = payment(PaymentStatus::Success);
        p.order_number = "A-1".to_string();
        p.payment_type = PaymentType::Ac;
        assert_eq!(
            p.to_string(),
            "[Payment id=7, order_number=A-1, payment_type=AC, status=success]"
        );
    }

    #[test]
    fn test_validation_rejects_bad_fields() {
        let base = NewPayment::new(Decimal::from(1), &defaults());

        let mut p = base.clone();
        p.order_amount = Decimal::from_str("1.005").unwrap();
        assert!(matches!(
            p.validate(),
            Err(PaymentError::Validation { field: "order_amount", .. })
        ));

        let mut p = base.clone();
        p.order_amount = Decimal::from_str("10000000000000.00").unwrap();
        assert!(p.validate().is_err());

        let mut p = base.clone();
        p.order_amount = Decimal::from_str("9999999999999.99").unwrap();
        assert!(p.validate().is_ok());

        let mut p = base.clone();
        p.cps_email = Some("not-an-email".to_string());
        assert!(matches!(
            p.validate(),
            Err(PaymentError::Validation { field: "cps_email", .. })
        ));

        let mut p = base.clone();
        p.cps_email = Some("payer@example.com".to_string());
        assert!(p.validate().is_ok());

        let mut p = base.clone();
        p.cps_phone = Some("1234567890123456".to_string());
        assert!(p.validate().is_err());

        let mut p = base.clone();
        p.success_url = "/relative/path".to_string();
        assert!(matches!(
            p.validate(),
            Err(PaymentError::Validation { field: "success_url", .. })
        ));

        let mut p = base.clone();
        p.order_number = "x".repeat(65);
        assert!(p.validate().is_err());

        let mut p = base;
        p.shop_id = -1;
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_validation_accepts_single_label_email_domain() {
        let mut p = NewPayment::new(Decimal::from(1), &defaults());
        p.cps_email = Some("payer@localhost".to_string());
        assert!(p.validate().is_ok());
        assert!(is_valid_email("payer@localhost"));
        assert!(!is_valid_email("payer@"));
    }

    #[test]
    fn test_validation_limits_url_length() {
        let long_url = format!("https://shop.example.com/{}", "a".repeat(250));
        let mut p = NewPayment::new(Decimal::from(1), &defaults());
        p.fail_url = long_url;
        let err = p.validate().unwrap_err();
        assert!(matches!(
            err,
            PaymentError::Validation { field: "fail_url", ref reason } if reason == "longer than 200 characters"
        ));

        let mut p = NewPayment::new(Decimal::from(1), &defaults());
        p.success_url = format!("https://a.example.com/{}", "b".repeat(178));
        assert_eq!(p.success_url.len(), 200);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn test_phone_length_helper() {
        assert!(is_valid_phone("79110000000"));
        assert!(!is_valid_phone("+7 (911) 000-00-00"));
    }

    fn recording_signals() -> (PaymentSignals, Arc<Mutex<Vec<&'static str>>>) {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let mut signals = PaymentSignals::default();
        let process_log = fired.clone();
        signals.payment_process.connect_fn(move |_: &Payment| {
            process_log.lock().unwrap().push("process");
            Ok(())
        });
        let completed_log = fired.clone();
        signals.payment_completed.connect_fn(move |_: &Payment| {
            completed_log.lock().unwrap().push("completed");
            Ok(())
        });
        (signals, fired)
    }

    #[test]
    fn test_send_signals_processed_fires_process_only() {
        let (signals, fired) = recording_signals();
        payment(PaymentStatus::Processed)
            .send_signals(&signals)
            .unwrap();
        assert_eq!(*fired.lock().unwrap(), vec!["process"]);
    }

    #[test]
    fn test_send_signals_success_fires_completed_only() {
        let (signals, fired) = recording_signals();
        payment(PaymentStatus::Success).send_signals(&signals).unwrap();
        assert_eq!(*fired.lock().unwrap(), vec!["completed"]);
    }

    #[test]
    fn test_send_signals_fail_fires_nothing() {
        let (signals, fired) = recording_signals();
        payment(PaymentStatus::Fail).send_signals(&signals).unwrap();
        assert!(fired.lock().unwrap().is_empty());
    }
}
