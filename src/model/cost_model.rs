//! Cost model attached to a layer or substack.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Billing period of a cost model.
///
/// Serialized as its editor string (`"month"`, `"per-gb"`, ...). Unknown
/// periods are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Period {
    #[default]
    Month,
    Year,
    PerRequest,
    PerGb,
    PerHour,
    Other(String),
}

impl Period {
    pub fn as_str(&self) -> &str {
        match self {
            Period::Month => "month",
            Period::Year => "year",
            Period::PerRequest => "per-request",
            Period::PerGb => "per-gb",
            Period::PerHour => "per-hour",
            Period::Other(s) => s,
        }
    }
}

impl From<String> for Period {
    fn from(s: String) -> Self {
        match s.as_str() {
            "month" => Period::Month,
            "year" => Period::Year,
            "per-request" => Period::PerRequest,
            "per-gb" => Period::PerGb,
            "per-hour" => Period::PerHour,
            _ => Period::Other(s),
        }
    }
}

impl From<&str> for Period {
    fn from(s: &str) -> Self {
        Period::from(s.to_string())
    }
}

impl From<Period> for String {
    fn from(p: Period) -> Self {
        p.as_str().to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Currency code of a cost model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Jpy,
    Aud,
    Cad,
    Other(String),
}

impl Currency {
    pub fn code(&self) -> &str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
            Currency::Other(s) => s,
        }
    }
}

impl From<String> for Currency {
    fn from(s: String) -> Self {
        match s.as_str() {
            "USD" => Currency::Usd,
            "EUR" => Currency::Eur,
            "GBP" => Currency::Gbp,
            "JPY" => Currency::Jpy,
            "AUD" => Currency::Aud,
            "CAD" => Currency::Cad,
            _ => Currency::Other(s),
        }
    }
}

impl From<&str> for Currency {
    fn from(s: &str) -> Self {
        Currency::from(s.to_string())
    }
}

impl From<Currency> for String {
    fn from(c: Currency) -> Self {
        c.code().to_string()
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Fixed and variable charges for one layer.
///
/// A missing cost model means the layer is free.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CostModel {
    pub currency: Currency,
    pub period: Period,
    pub fixed_cost: f64,
    pub variable_cost: f64,
    pub variable_unit: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub notes: String,
}

impl CostModel {
    /// Monthly fixed cost with a default currency.
    pub fn monthly(fixed_cost: f64) -> Self {
        Self {
            fixed_cost,
            ..Self::default()
        }
    }

    pub fn with_period(mut self, period: impl Into<Period>) -> Self {
        self.period = period.into();
        self
    }

    pub fn with_currency(mut self, currency: impl Into<Currency>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn with_variable(mut self, amount: f64, unit: &str) -> Self {
        self.variable_cost = amount;
        self.variable_unit = unit.to_string();
        self
    }

    /// True if neither charge is positive.
    pub fn is_free(&self) -> bool {
        self.fixed_cost <= 0.0 && self.variable_cost <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_round_trips_unknown_values() {
        let period: Period = serde_json::from_str("\"per-seat\"").unwrap();
        assert_eq!(period, Period::Other("per-seat".to_string()));
        assert_eq!(serde_json::to_string(&period).unwrap(), "\"per-seat\"");
    }

    #[test]
    fn test_cost_model_defaults() {
        let model: CostModel = serde_json::from_str(r#"{"fixedCost": 12.5}"#).unwrap();
        assert_eq!(model.fixed_cost, 12.5);
        assert_eq!(model.currency, Currency::Usd);
        assert_eq!(model.period, Period::Month);
        assert!(model.variable_unit.is_empty());
    }

    #[test]
    fn test_is_free() {
        assert!(CostModel::default().is_free());
        assert!(!CostModel::monthly(1.0).is_free());
        assert!(!CostModel::default().with_variable(0.01, "per GB").is_free());
    }
}
