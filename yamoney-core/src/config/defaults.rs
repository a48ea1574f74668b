//! Provider-wide defaults applied to new payments.

use url::Url;

/// Shop identity and redirect targets configured for the Yandex.Money account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDefaults {
    /// The shop identifier issued by the provider.
    pub shop_id: i64,
    /// The storefront (shop window) number.
    pub scid: i64,
    /// Where the payer lands after a successful payment.
    pub success_url: Url,
    /// Where the payer lands after a failed payment.
    pub fail_url: Url,
}

impl PaymentDefaults {
    pub fn new(shop_id: i64, scid: i64, success_url: Url, fail_url: Url) -> Self {
        Self {
            shop_id,
            scid,
            success_url,
            fail_url,
        }
    }
}
