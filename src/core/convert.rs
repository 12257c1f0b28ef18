//! Currency conversion on top of a [`RateProvider`]

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::rates::{FetchError, RateProvider};

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("amount, from_currency and to_currency are required")]
    MissingParameters,

    #[error("amount is not a finite number")]
    InvalidAmount,

    #[error("rates for the source currency are unavailable: {0}")]
    RatesUnavailable(#[source] FetchError),

    #[error("no rate to {0} in the source table")]
    UnknownCurrency(String),

    #[error("converted amount is out of range")]
    OutOfRange,
}

/// A validated conversion request with uppercased currency codes.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionResult {
    pub original_amount: f64,
    pub from_currency: String,
    pub converted_amount: f64,
    pub to_currency: String,
}

impl ConversionRequest {
    /// Validates a JSON body of the shape `{amount, from_currency, to_currency}`.
    ///
    /// Presence is checked for all three fields before the amount is parsed, so a body
    /// with a bad amount and a missing currency reports the missing parameter.
    pub fn from_json(body: &Value) -> Result<Self, ConversionError> {
        let amount = body.get("amount").filter(|v| !is_blank(v));
        let from = currency_field(body, "from_currency");
        let to = currency_field(body, "to_currency");

        let (Some(amount), Some(from), Some(to)) = (amount, from, to) else {
            return Err(ConversionError::MissingParameters);
        };

        Ok(Self {
            amount: parse_amount(amount)?,
            from_currency: from,
            to_currency: to,
        })
    }

    pub fn new(amount: f64, from_currency: &str, to_currency: &str) -> Result<Self, ConversionError> {
        let from_currency = from_currency.trim().to_uppercase();
        let to_currency = to_currency.trim().to_uppercase();
        if from_currency.is_empty() || to_currency.is_empty() {
            return Err(ConversionError::MissingParameters);
        }
        if !amount.is_finite() {
            return Err(ConversionError::InvalidAmount);
        }
        Ok(Self {
            amount,
            from_currency,
            to_currency,
        })
    }

    /// Runs the conversion against `provider` and rounds the result to cents.
    pub async fn execute(
        &self,
        provider: &dyn RateProvider,
    ) -> Result<ConversionResult, ConversionError> {
        let converted = convert(
            provider,
            self.amount,
            &self.from_currency,
            &self.to_currency,
        )
        .await?;

        Ok(ConversionResult {
            original_amount: self.amount,
            from_currency: self.from_currency.clone(),
            converted_amount: round_to_cents(converted),
            to_currency: self.to_currency.clone(),
        })
    }
}

/// Converts `amount` of `from` into `to` using a freshly fetched `from` table.
pub async fn convert(
    provider: &dyn RateProvider,
    amount: f64,
    from: &str,
    to: &str,
) -> Result<f64, ConversionError> {
    let rates = provider
        .fetch_rates(from)
        .await
        .map_err(ConversionError::RatesUnavailable)?;

    let rate = rates
        .get(to)
        .copied()
        .ok_or_else(|| ConversionError::UnknownCurrency(to.to_string()))?;
    debug!(from, to, rate, "Converting");

    let converted = amount * rate;
    if !converted.is_finite() {
        return Err(ConversionError::OutOfRange);
    }
    Ok(converted)
}

/// Rounds the exact decimal value of `value` to two places, ties to even.
pub fn round_to_cents(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn currency_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
}

fn parse_amount(value: &Value) -> Result<f64, ConversionError> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount
        .filter(|a| a.is_finite())
        .ok_or(ConversionError::InvalidAmount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::RateTable;
    use async_trait::async_trait;
    use serde_json::json;

    struct FixedProvider(Option<RateTable>);

    #[async_trait]
    impl RateProvider for FixedProvider {
        async fn fetch_rates(&self, _base: &str) -> Result<RateTable, FetchError> {
            self.0.clone().ok_or(FetchError::EmptyTable)
        }
    }

    fn usd_table() -> RateTable {
        RateTable::from([("EUR".to_string(), 0.9215), ("GBP".to_string(), 0.7912)])
    }

    #[test]
    fn test_from_json_uppercases_codes() {
        let body = json!({"amount": 100, "from_currency": "usd", "to_currency": " eur "});
        let req = ConversionRequest::from_json(&body).unwrap();
        assert_eq!(req.amount, 100.0);
        assert_eq!(req.from_currency, "USD");
        assert_eq!(req.to_currency, "EUR");
    }

    #[test]
    fn test_from_json_accepts_numeric_strings() {
        let body = json!({"amount": " 12.5 ", "from_currency": "USD", "to_currency": "EUR"});
        let req = ConversionRequest::from_json(&body).unwrap();
        assert_eq!(req.amount, 12.5);
    }

    #[test]
    fn test_from_json_accepts_zero_amount() {
        let body = json!({"amount": 0, "from_currency": "USD", "to_currency": "EUR"});
        let req = ConversionRequest::from_json(&body).unwrap();
        assert_eq!(req.amount, 0.0);
    }

    #[test]
    fn test_from_json_missing_fields() {
        for body in [
            json!({"from_currency": "USD", "to_currency": "EUR"}),
            json!({"amount": null, "from_currency": "USD", "to_currency": "EUR"}),
            json!({"amount": "", "from_currency": "USD", "to_currency": "EUR"}),
            json!({"amount": 10, "from_currency": "", "to_currency": "EUR"}),
            json!({"amount": 10, "from_currency": "USD"}),
            json!({"amount": "abc", "to_currency": "EUR"}),
            json!([]),
        ] {
            let result = ConversionRequest::from_json(&body);
            assert!(
                matches!(result, Err(ConversionError::MissingParameters)),
                "expected missing parameters for {body}"
            );
        }
    }

    #[test]
    fn test_from_json_invalid_amount() {
        for amount in [json!("abc"), json!("1e999"), json!("NaN"), json!(true), json!([1])] {
            let body = json!({"amount": amount, "from_currency": "USD", "to_currency": "EUR"});
            let result = ConversionRequest::from_json(&body);
            assert!(
                matches!(result, Err(ConversionError::InvalidAmount)),
                "expected invalid amount for {body}"
            );
        }
    }

    #[test]
    fn test_round_to_cents() {
        assert_eq!(round_to_cents(92.15), 92.15);
        assert_eq!(round_to_cents(1.234), 1.23);
        assert_eq!(round_to_cents(1.235_000_1), 1.24);
        assert_eq!(round_to_cents(-3.456), -3.46);
        assert_eq!(round_to_cents(0.0), 0.0);
    }

    #[test]
    fn test_round_to_cents_ties_go_to_even() {
        assert_eq!(round_to_cents(1.125), 1.12);
        assert_eq!(round_to_cents(0.125), 0.12);
        assert_eq!(round_to_cents(0.375), 0.38);
        // 2.675 is stored just below the tie
        assert_eq!(round_to_cents(2.675), 2.67);
    }

    #[test]
    fn test_round_to_cents_keeps_large_values_finite() {
        assert_eq!(round_to_cents(9.2e306), 9.2e306);
        assert_eq!(round_to_cents(f64::MAX), f64::MAX);
    }

    #[tokio::test]
    async fn test_convert_multiplies_by_rate() {
        let provider = FixedProvider(Some(usd_table()));
        let result = convert(&provider, 100.0, "USD", "EUR").await.unwrap();
        assert!((result - 92.15).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_convert_unknown_target() {
        let provider = FixedProvider(Some(usd_table()));
        let result = convert(&provider, 100.0, "USD", "XYZ").await;
        assert!(matches!(result, Err(ConversionError::UnknownCurrency(code)) if code == "XYZ"));
    }

    #[tokio::test]
    async fn test_convert_overflow_is_an_error() {
        let provider = FixedProvider(Some(usd_table()));
        let result = convert(&provider, 1e308, "USD", "EUR").await;
        assert!(result.is_ok());

        let provider = FixedProvider(Some(RateTable::from([("JPY".to_string(), 149.5)])));
        let result = convert(&provider, 1e308, "USD", "JPY").await;
        assert!(matches!(result, Err(ConversionError::OutOfRange)));
    }

    #[tokio::test]
    async fn test_execute_large_result_stays_finite() {
        let provider = FixedProvider(Some(RateTable::from([("EUR".to_string(), 0.92)])));
        let req = ConversionRequest::new(1e307, "USD", "EUR").unwrap();
        let result = req.execute(&provider).await.unwrap();
        assert!(result.converted_amount.is_finite());
        assert!((result.converted_amount - 9.2e306).abs() <= 9.2e306 * 1e-15);
    }

    #[tokio::test]
    async fn test_convert_without_rates() {
        let provider = FixedProvider(None);
        let result = convert(&provider, 100.0, "USD", "EUR").await;
        assert!(matches!(result, Err(ConversionError::RatesUnavailable(_))));
    }

    #[tokio::test]
    async fn test_execute_rounds_result() {
        let provider = FixedProvider(Some(usd_table()));
        let req = ConversionRequest::new(33.0, "usd", "gbp").unwrap();
        let result = req.execute(&provider).await.unwrap();
        assert_eq!(
            result,
            ConversionResult {
                original_amount: 33.0,
                from_currency: "USD".to_string(),
                converted_amount: 26.11,
                to_currency: "GBP".to_string(),
            }
        );
    }
}
