//! XML answers returned to the provider.

use time::OffsetDateTime;
use time::macros::format_description;

use super::notice::NoticeAction;

/// Result codes understood by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// The order is accepted / the notification is processed.
    Success = 0,
    /// Request signature mismatch.
    AuthorizationError = 1,
    /// The shop refuses the order.
    Refused = 100,
    /// The request could not be parsed or processed.
    BadRequest = 200,
}

impl ResultCode {
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Body of a `checkOrderResponse` / `paymentAvisoResponse` document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeResponse {
    pub action: NoticeAction,
    pub performed_datetime: OffsetDateTime,
    pub code: ResultCode,
    pub invoice_id: Option<i64>,
    pub shop_id: i64,
    pub message: Option<String>,
}

impl NoticeResponse {
    pub fn new(action: NoticeAction, code: ResultCode, shop_id: i64, invoice_id: Option<i64>) -> Self {
        Self {
            action,
            performed_datetime: OffsetDateTime::now_utc(),
            code,
            invoice_id,
            shop_id,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Render the single-element XML document the provider expects.
    pub fn to_xml(&self) -> Result<String, time::error::Format> {
        let performed = self.performed_datetime.format(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory]:[offset_minute]"
        ))?;
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><{} performedDatetime="{}" code="{}""#,
            self.action.response_tag(),
            performed,
            self.code.code(),
        );
        if let Some(invoice_id) = self.invoice_id {
            xml.push_str(&format!(r#" invoiceId="{invoice_id}""#));
        }
        xml.push_str(&format!(r#" shopId="{}""#, self.shop_id));
        if let Some(message) = &self.message {
            xml.push_str(&format!(r#" message="{}""#, escape_attr(message)));
        }
        xml.push_str("/>");
        Ok(xml)
    }
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_check_order_xml() {
        let response = NoticeResponse {
            action: NoticeAction::CheckOrder,
            performed_datetime: datetime!(2011-05-04 20:38:01.000 +04:00),
            code: ResultCode::Success,
            invoice_id: Some(1234567),
            shop_id: 13,
            message: None,
        };
        assert_eq!(
            response.to_xml().unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><checkOrderResponse performedDatetime="2011-05-04T20:38:01.000+04:00" code="0" invoiceId="1234567" shopId="13"/>"#
        );
    }

    #[test]
    fn test_result_code_values() {
        assert_eq!(ResultCode::Success.code(), 0);
        assert_eq!(ResultCode::AuthorizationError.code(), 1);
        assert_eq!(ResultCode::Refused.code(), 100);
        assert_eq!(ResultCode::BadRequest.code(), 200);
    }

    #[test]
    fn test_message_is_escaped() {
        let response = NoticeResponse::new(NoticeAction::PaymentAviso, ResultCode::Refused, 1, None)
            .with_message("amount <> \"expected\"");
        let xml = response.to_xml().unwrap();
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?><paymentAvisoResponse "#));
        assert!(xml.contains(r#"code="100""#));
        assert!(!xml.contains("invoiceId"));
        assert!(xml.contains(r#"message="amount &lt;&gt; &quot;expected&quot;""#));
    }
}
