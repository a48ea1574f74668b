pub mod payment;

pub use payment::{NewPayment, Payment, generate_token};

use yamoney_sdk::objects::{
    Currency as SdkCurrency, PaymentStatus as SdkPaymentStatus, PaymentType as SdkPaymentType,
};

/// Payment method for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `yamoney_sdk::objects::PaymentType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE", type_name = "yandex_money_payment_type")]
pub enum PaymentType {
    #[default]
    Pc,
    Ac,
    Gp,
    Mc,
    Wm,
    Sb,
    Ab,
    Ma,
    Pb,
    Qw,
    Qp,
}

impl From<PaymentType> for SdkPaymentType {
    fn from(value: PaymentType) -> Self {
        match value {
            PaymentType::Pc => SdkPaymentType::Pc,
            PaymentType::Ac => SdkPaymentType::Ac,
            PaymentType::Gp => SdkPaymentType::Gp,
            PaymentType::Mc => SdkPaymentType::Mc,
            PaymentType::Wm => SdkPaymentType::Wm,
            PaymentType::Sb => SdkPaymentType::Sb,
            PaymentType::Ab => SdkPaymentType::Ab,
            PaymentType::Ma => SdkPaymentType::Ma,
            PaymentType::Pb => SdkPaymentType::Pb,
            PaymentType::Qw => SdkPaymentType::Qw,
            PaymentType::Qp => SdkPaymentType::Qp,
        }
    }
}

impl From<SdkPaymentType> for PaymentType {
    fn from(value: SdkPaymentType) -> Self {
        match value {
            SdkPaymentType::Pc => PaymentType::Pc,
            SdkPaymentType::Ac => PaymentType::Ac,
            SdkPaymentType::Gp => PaymentType::Gp,
            SdkPaymentType::Mc => PaymentType::Mc,
            SdkPaymentType::Wm => PaymentType::Wm,
            SdkPaymentType::Sb => PaymentType::Sb,
            SdkPaymentType::Ab => PaymentType::Ab,
            SdkPaymentType::Ma => PaymentType::Ma,
            SdkPaymentType::Pb => PaymentType::Pb,
            SdkPaymentType::Qw => PaymentType::Qw,
            SdkPaymentType::Qp => PaymentType::Qp,
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(SdkPaymentType::from(*self).code())
    }
}

/// Currency for database operations, stored as its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
#[repr(i32)]
pub enum Currency {
    #[default]
    Rub = 643,
    Test = 10643,
}

impl From<Currency> for SdkCurrency {
    fn from(value: Currency) -> Self {
        match value {
            Currency::Rub => SdkCurrency::Rub,
            Currency::Test => SdkCurrency::Test,
        }
    }
}

impl From<SdkCurrency> for Currency {
    fn from(value: SdkCurrency) -> Self {
        match value {
            SdkCurrency::Rub => Currency::Rub,
            SdkCurrency::Test => Currency::Test,
        }
    }
}

/// Payment status for database operations.
///
/// This is the sqlx::Type version. For API/DTO use, see `yamoney_sdk::objects::PaymentStatus`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, sqlx::Type)]
#[sqlx(rename_all = "lowercase", type_name = "yandex_money_payment_status")]
pub enum PaymentStatus {
    #[default]
    Processed,
    Success,
    Fail,
}

impl PaymentStatus {
    /// Whether moving from `self` to `next` is a transition the provider flow allows.
    ///
    /// Only `processed -> success` and `processed -> fail` are valid; staying in
    /// the same state is always allowed. The record itself does not enforce this.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        self == next || self == PaymentStatus::Processed
    }

    pub fn is_terminal(self) -> bool {
        SdkPaymentStatus::from(self).is_terminal()
    }
}

impl From<PaymentStatus> for SdkPaymentStatus {
    fn from(value: PaymentStatus) -> Self {
        match value {
            PaymentStatus::Processed => SdkPaymentStatus::Processed,
            PaymentStatus::Success => SdkPaymentStatus::Success,
            PaymentStatus::Fail => SdkPaymentStatus::Fail,
        }
    }
}

impl From<SdkPaymentStatus> for PaymentStatus {
    fn from(value: SdkPaymentStatus) -> Self {
        match value {
            SdkPaymentStatus::Processed => PaymentStatus::Processed,
            SdkPaymentStatus::Success => PaymentStatus::Success,
            SdkPaymentStatus::Fail => PaymentStatus::Fail,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&SdkPaymentStatus::from(*self), f)
    }
}
