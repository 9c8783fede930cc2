//! Growth scenarios: fixed cost stays put, variable cost scales with usage.

use serde::Serialize;

use super::bucket::CostTotals;

/// A named usage multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scenario {
    pub label: &'static str,
    pub multiplier: f64,
}

/// Scenarios shown by the forecast view.
pub const SCENARIOS: [Scenario; 5] = [
    Scenario { label: "Current", multiplier: 1.0 },
    Scenario { label: "2x Growth", multiplier: 2.0 },
    Scenario { label: "5x Growth", multiplier: 5.0 },
    Scenario { label: "10x Growth", multiplier: 10.0 },
    Scenario { label: "50% Reduction", multiplier: 0.5 },
];

/// Projected totals for one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ForecastRow {
    pub scenario: Scenario,
    pub fixed: f64,
    pub variable: f64,
    pub total: f64,
}

/// Project the stack totals under each scenario.
pub fn forecast(totals: &CostTotals, scenarios: &[Scenario]) -> Vec<ForecastRow> {
    scenarios
        .iter()
        .map(|&scenario| {
            let variable = totals.variable * scenario.multiplier;
            ForecastRow {
                scenario,
                fixed: totals.fixed,
                variable,
                total: totals.fixed + variable,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forecast_scales_only_variable() {
        let totals = CostTotals {
            fixed: 1000.0,
            variable: 40.0,
        };
        let rows = forecast(&totals, &SCENARIOS);

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].total, 1040.0);
        assert_eq!(rows[3].scenario.label, "10x Growth");
        assert_eq!(rows[3].variable, 400.0);
        assert_eq!(rows[3].fixed, 1000.0);
        assert_eq!(rows[4].total, 1020.0);
    }
}
