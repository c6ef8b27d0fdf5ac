//! Money on the wire.
//!
//! Amounts leave the API as decimal strings with two fractional digits and
//! are accepted either as strings or as JSON numbers.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use serde::de::{self, Deserializer};
use serde::Deserialize;

/// Render an amount as `"195.00"`.
pub fn format_money(amount: &BigDecimal) -> String {
    amount.with_scale(2).to_plain_string()
}

/// Price supplied by a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyInput(pub BigDecimal);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMoney {
    Text(String),
    Number(serde_json::Number),
}

impl<'de> Deserialize<'de> for MoneyInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match RawMoney::deserialize(deserializer)? {
            RawMoney::Text(text) => text,
            RawMoney::Number(number) => number.to_string(),
        };
        BigDecimal::from_str(raw.trim())
            .map(Self)
            .map_err(|_| de::Error::custom(format!("invalid amount {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("65", "65.00")]
    #[case("195.00", "195.00")]
    #[case("0.5", "0.50")]
    fn formats_two_fraction_digits(#[case] raw: &str, #[case] expected: &str) {
        let amount = BigDecimal::from_str(raw).expect("decimal");
        assert_eq!(format_money(&amount), expected);
    }

    #[rstest]
    #[case(r#""45.00""#, "45.00")]
    #[case("35.5", "35.5")]
    #[case("12", "12")]
    fn accepts_strings_and_numbers(#[case] json: &str, #[case] expected: &str) {
        let parsed: MoneyInput = serde_json::from_str(json).expect("amount");
        assert_eq!(parsed.0, BigDecimal::from_str(expected).expect("decimal"));
    }

    #[test]
    fn rejects_non_numeric_text() {
        assert!(serde_json::from_str::<MoneyInput>(r#""abc""#).is_err());
    }
}
