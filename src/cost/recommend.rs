//! Optimization hints derived from layer and action costs.

use serde::Serialize;

use super::action::{calculate_action_cost, variable_share};
use super::format::format_amount;
use crate::config::CostConfig;
use crate::model::{all_layers, Currency, Layer, UsePath};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    SingleLayer,
    Underutilized,
    Variable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
}

/// Flag expensive single-layer actions, underused expensive layers and
/// actions dominated by variable cost. High severity first.
pub fn generate_recommendations(
    layers: &[Layer],
    use_paths: &[UsePath],
    config: &CostConfig,
) -> Vec<Recommendation> {
    let mut out = Vec::new();
    let usd = Currency::Usd;

    for path in use_paths.iter().filter(|p| p.layers_involved.len() == 1) {
        let cost = calculate_action_cost(path, layers, config);
        if cost.cost_per_use.variable > config.high_variable_per_use {
            out.push(Recommendation {
                severity: Severity::High,
                kind: RecommendationKind::SingleLayer,
                title: format!("High Variable Cost Action: {}", path.name),
                description: format!(
                    "This action has {}/use variable cost. Consider optimization.",
                    format_amount(cost.cost_per_use.variable, &usd)
                ),
            });
        }
    }

    for layer in all_layers(layers) {
        let fixed = layer.cost_model.as_ref().map_or(0.0, |m| m.fixed_cost);
        if fixed <= config.underutilized_fixed_threshold {
            continue;
        }
        let usage = use_paths.iter().filter(|p| p.involves(&layer.id)).count();
        if usage < config.underutilized_min_actions {
            out.push(Recommendation {
                severity: Severity::Medium,
                kind: RecommendationKind::Underutilized,
                title: format!("Underutilized Expensive Layer: {}", layer.name),
                description: format!(
                    "This layer costs {}/month fixed but is only used in {} action(s).",
                    format_amount(fixed, &usd),
                    usage
                ),
            });
        }
    }

    for path in use_paths {
        let cost = calculate_action_cost(path, layers, config);
        let Some(share) = variable_share(&cost) else {
            continue;
        };
        if share > config.variable_share_percent
            && cost.cost_per_use.variable > config.min_variable_per_use
        {
            out.push(Recommendation {
                severity: Severity::Low,
                kind: RecommendationKind::Variable,
                title: format!("High Variable Cost Proportion: {}", path.name),
                description: format!(
                    "{share:.0}% of this action's cost is variable. Consider caching."
                ),
            });
        }
    }

    out.sort_by_key(|r| r.severity);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CostModel, UsageAssumptions};

    #[test]
    fn test_recommendations() {
        let layers = vec![
            Layer::new("1", "LLM Proxy")
                .with_cost(CostModel::default().with_variable(0.02, "per API call")),
            Layer::new("2", "Warehouse").with_cost(CostModel::monthly(900.0)),
        ];
        let paths = vec![UsePath::new("ask", "Ask", vec!["1".into()]).with_usage(
            UsageAssumptions {
                estimated_calls_per_month: 5000.0,
                estimated_users_per_month: 100.0,
                calls_per_user: 50.0,
            },
        )];

        let recs = generate_recommendations(&layers, &paths, &CostConfig::default());
        let kinds: Vec<RecommendationKind> = recs.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::SingleLayer,
                RecommendationKind::Underutilized,
                RecommendationKind::Variable,
            ]
        );
        assert_eq!(recs[1].title, "Underutilized Expensive Layer: Warehouse");
        assert_eq!(
            recs[1].description,
            "This layer costs $900/month fixed but is only used in 0 action(s)."
        );
        assert_eq!(
            recs[2].description,
            "100% of this action's cost is variable. Consider caching."
        );
    }

    #[test]
    fn test_no_recommendations_for_cheap_stack() {
        let layers = vec![Layer::new("1", "Static").with_cost(CostModel::monthly(5.0))];
        let paths = vec![UsePath::new("v", "View", vec!["1".into()])];
        assert!(generate_recommendations(&layers, &paths, &CostConfig::default()).is_empty());
    }
}
