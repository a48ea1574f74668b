//! Choice enumerations defined by the Yandex.Money protocol.
//!
//! These are the API/DTO versions without sqlx::Type.
//! For database operations, use the versions in `yamoney-core::entities`.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A value that is not one of the protocol's known choices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownChoice {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
/// Payment methods offered by the provider.
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentType {
    /// Yandex.Money wallet
    #[default]
    Pc,
    /// Bank card
    Ac,
    /// Cash through terminals
    Gp,
    /// Mobile phone balance
    Mc,
    /// WebMoney wallet
    Wm,
    /// Sberbank SMS or Sberbank Online
    Sb,
    /// Alfa-Click
    Ab,
    /// MasterPass
    Ma,
    /// Promsvyazbank internet bank
    Pb,
    /// QIWI Wallet
    Qw,
    /// Trust payment (Kuppi.ru)
    Qp,
}

impl PaymentType {
    pub const ALL: [PaymentType; 11] = [
        PaymentType::Pc,
        PaymentType::Ac,
        PaymentType::Gp,
        PaymentType::Mc,
        PaymentType::Wm,
        PaymentType::Sb,
        PaymentType::Ab,
        PaymentType::Ma,
        PaymentType::Pb,
        PaymentType::Qw,
        PaymentType::Qp,
    ];

    /// The two-letter code used on the wire.
    pub fn code(self) -> &'static str {
        match self {
            PaymentType::Pc => "PC",
            PaymentType::Ac => "AC",
            PaymentType::Gp => "GP",
            PaymentType::Mc => "MC",
            PaymentType::Wm => "WM",
            PaymentType::Sb => "SB",
            PaymentType::Ab => "AB",
            PaymentType::Ma => "MA",
            PaymentType::Pb => "PB",
            PaymentType::Qw => "QW",
            PaymentType::Qp => "QP",
        }
    }

    /// Human-readable label shown to payers.
    pub fn label(self) -> &'static str {
        match self {
            PaymentType::Pc => "Кошелек Яндекс.Деньги",
            PaymentType::Ac => "Банковская карта",
            PaymentType::Gp => "Наличными через кассы и терминалы",
            PaymentType::Mc => "Счет мобильного телефона",
            PaymentType::Wm => "Кошелек WebMoney",
            PaymentType::Sb => "Сбербанк: оплата по SMS или Сбербанк Онлайн",
            PaymentType::Ab => "Альфа-Клик",
            PaymentType::Ma => "MasterPass",
            PaymentType::Pb => "Интернет-банк Промсвязьбанка",
            PaymentType::Qw => "QIWI Wallet",
            PaymentType::Qp => "Доверительный платеж (Куппи.ру)",
        }
    }
}

impl std::fmt::Display for PaymentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PaymentType {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentType::ALL
            .into_iter()
            .find(|t| t.code() == s)
            .ok_or_else(|| UnknownChoice {
                kind: "payment type",
                value: s.to_owned(),
            })
    }
}

/// Currency codes accepted by the provider.
///
/// Serialized as the numeric code (`"643"`), the way the provider sends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Currency {
    #[default]
    Rub = 643,
    Test = 10643,
}

impl Currency {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn label(self) -> &'static str {
        match self {
            Currency::Rub => "Рубли",
            Currency::Test => "Тестовая валюта",
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            643 => Some(Currency::Rub),
            10643 => Some(Currency::Test),
            _ => None,
        }
    }
}

impl FromStr for Currency {
    type Err = UnknownChoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .ok()
            .and_then(Currency::from_code)
            .ok_or_else(|| UnknownChoice {
                kind: "currency",
                value: s.to_owned(),
            })
    }
}

impl Serialize for Currency {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.code().to_string())
    }
}

impl<'de> Deserialize<'de> for Currency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Payment status for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Processed,
    Success,
    Fail,
}

impl PaymentStatus {
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Processed => "Processed",
            PaymentStatus::Success => "Success",
            PaymentStatus::Fail => "Fail",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PaymentStatus::Success | PaymentStatus::Fail)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Processed => write!(f, "processed"),
            PaymentStatus::Success => write!(f, "success"),
            PaymentStatus::Fail => write!(f, "fail"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_type_codes() {
        assert_eq!(PaymentType::ALL.len(), 11);
        for t in PaymentType::ALL {
            assert_eq!(t.code().parse::<PaymentType>().unwrap(), t);
        }
        assert!("XX".parse::<PaymentType>().is_err());
        assert_eq!(PaymentType::default(), PaymentType::Pc);
    }

    #[test]
    fn test_currency_wire_format() {
        assert_eq!(serde_json::to_string(&Currency::Test).unwrap(), "\"10643\"");
        let rub: Currency = serde_json::from_str("\"643\"").unwrap();
        assert_eq!(rub, Currency::Rub);
        assert!(serde_json::from_str::<Currency>("\"840\"").is_err());
    }

    #[test]
    fn test_choice_labels() {
        assert_eq!(PaymentType::Ac.label(), "Банковская карта");
        assert_eq!(PaymentType::Qw.label(), "QIWI Wallet");
        let labels: std::collections::HashSet<_> =
            PaymentType::ALL.into_iter().map(PaymentType::label).collect();
        assert_eq!(labels.len(), PaymentType::ALL.len());

        assert_eq!(Currency::Rub.label(), "Рубли");
        assert_eq!(Currency::Test.label(), "Тестовая валюта");

        assert_eq!(PaymentStatus::Processed.label(), "Processed");
        assert_eq!(PaymentStatus::Fail.label(), "Fail");
    }

    #[test]
    fn test_status_terminal() {
        assert!(!PaymentStatus::Processed.is_terminal());
        assert!(PaymentStatus::Success.is_terminal());
        assert!(PaymentStatus::Fail.is_terminal());
        assert_eq!(PaymentStatus::Success.to_string(), "success");
    }
}
