//! Notification payloads posted by the provider to the `check/` and `aviso/` endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::choices::{Currency, PaymentType};

/// Which callback the provider is performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeAction {
    /// Pre-payment order validation.
    CheckOrder,
    /// Asynchronous payment confirmation.
    PaymentAviso,
}

impl NoticeAction {
    /// Root element name of the XML answer for this action.
    pub fn response_tag(self) -> &'static str {
        match self {
            NoticeAction::CheckOrder => "checkOrderResponse",
            NoticeAction::PaymentAviso => "paymentAvisoResponse",
        }
    }
}

impl std::fmt::Display for NoticeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoticeAction::CheckOrder => write!(f, "checkOrder"),
            NoticeAction::PaymentAviso => write!(f, "paymentAviso"),
        }
    }
}

/// Form fields of a `checkOrder` / `paymentAviso` request.
///
/// Both callbacks carry the same field set; `action` tells them apart.
/// The `md5` field is carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticePayload {
    pub request_datetime: Option<String>,
    pub action: NoticeAction,
    pub md5: Option<String>,
    pub shop_id: i64,
    pub shop_article_id: Option<i64>,
    pub invoice_id: Option<i64>,
    pub order_number: Option<String>,
    pub customer_number: Option<String>,
    pub order_created_datetime: Option<String>,
    pub order_sum_amount: Decimal,
    pub order_sum_currency_paycash: Option<Currency>,
    pub order_sum_bank_paycash: Option<i64>,
    pub shop_sum_amount: Option<Decimal>,
    pub shop_sum_currency_paycash: Option<Currency>,
    pub shop_sum_bank_paycash: Option<i64>,
    pub payment_payer_code: Option<String>,
    pub payment_type: Option<PaymentType>,
    #[serde(rename = "cps_email")]
    pub cps_email: Option<String>,
    #[serde(rename = "cps_phone")]
    pub cps_phone: Option<String>,
}

impl NoticePayload {
    /// Payer email, ignoring the empty value the provider sends for "not given".
    pub fn email(&self) -> Option<&str> {
        non_empty(self.cps_email.as_deref())
    }

    pub fn phone(&self) -> Option<&str> {
        non_empty(self.cps_phone.as_deref())
    }

    pub fn order_number(&self) -> Option<&str> {
        non_empty(self.order_number.as_deref())
    }

    pub fn customer_number(&self) -> Option<&str> {
        non_empty(self.customer_number.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn test_payload_from_json_field_names() {
        let json = r#"{
            "requestDatetime": "2011-05-04T20:38:00.000+04:00",
            "action": "paymentAviso",
            "md5": "45125C95A20A7F25B63D58EA304AFED2",
            "shopId": 13,
            "invoiceId": 55,
            "orderNumber": "ord-1",
            "customerNumber": "8123294469",
            "orderSumAmount": "87.10",
            "orderSumCurrencyPaycash": "643",
            "paymentType": "AC",
            "cps_email": "",
            "cps_phone": "79110000000"
        }"#;
        let payload: NoticePayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.action, NoticeAction::PaymentAviso);
        assert_eq!(payload.shop_id, 13);
        assert_eq!(payload.order_sum_amount, Decimal::from_str("87.10").unwrap());
        assert_eq!(payload.order_sum_currency_paycash, Some(Currency::Rub));
        assert_eq!(payload.payment_type, Some(PaymentType::Ac));
        assert_eq!(payload.email(), None);
        assert_eq!(payload.phone(), Some("79110000000"));
        assert_eq!(payload.order_number(), Some("ord-1"));
    }

    #[test]
    fn test_response_tags() {
        assert_eq!(NoticeAction::CheckOrder.response_tag(), "checkOrderResponse");
        assert_eq!(
            NoticeAction::PaymentAviso.response_tag(),
            "paymentAvisoResponse"
        );
    }
}
