//! Cost of use paths ("actions").
//!
//! A use path touches a list of layers; its variable cost per use is the sum
//! of each layer's variable cost times the calls made into it.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;

use crate::config::CostConfig;
use crate::error::StackwiseError;
use crate::model::{find_layer, Layer, Period, UsePath};

/// Fixed/variable split of a cost figure.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct CostSplit {
    pub fixed: f64,
    pub variable: f64,
    pub total: f64,
}

impl CostSplit {
    fn new(fixed: f64, variable: f64) -> Self {
        Self {
            fixed,
            variable,
            total: fixed + variable,
        }
    }
}

/// Cost figures for one use path.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ActionCost {
    pub cost_per_use: CostSplit,
    pub monthly_cost: CostSplit,
    pub cost_per_user: CostSplit,
}

/// Fixed cost normalized to a month; non-calendar periods contribute nothing.
fn monthly_fixed(layer: &Layer) -> f64 {
    match &layer.cost_model {
        Some(model) => match model.period {
            Period::Month => model.fixed_cost,
            Period::Year => model.fixed_cost / 12.0,
            _ => 0.0,
        },
        None => 0.0,
    }
}

/// Compute per-use, monthly and per-user cost of a use path.
///
/// Ids that do not resolve to a layer or substack are skipped.
pub fn calculate_action_cost(
    use_path: &UsePath,
    layers: &[Layer],
    config: &CostConfig,
) -> ActionCost {
    let usage = use_path.usage_assumptions.unwrap_or(config.default_usage);

    let mut fixed_monthly = 0.0;
    let mut variable_per_use = 0.0;
    for id in &use_path.layers_involved {
        let Some(layer) = find_layer(layers, id) else {
            log::debug!("use path '{}' references unknown layer {}", use_path.name, id);
            continue;
        };
        fixed_monthly += monthly_fixed(layer);
        if let Some(model) = &layer.cost_model {
            variable_per_use += model.variable_cost * use_path.calls_for(id);
        }
    }

    let calls = usage.estimated_calls_per_month;
    let fixed_per_use = if calls > 0.0 { fixed_monthly / calls } else { 0.0 };
    let monthly_cost = CostSplit::new(fixed_monthly, variable_per_use * calls);

    let users = usage.estimated_users_per_month;
    let cost_per_user = if users > 0.0 {
        CostSplit::new(monthly_cost.fixed / users, monthly_cost.variable / users)
    } else {
        CostSplit::default()
    };

    ActionCost {
        cost_per_use: CostSplit::new(fixed_per_use, variable_per_use),
        monthly_cost,
        cost_per_user,
    }
}

/// Ordering of the action comparison table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionSort {
    #[default]
    VariableDesc,
    VariableAsc,
    MonthlyDesc,
    MonthlyAsc,
    StepsDesc,
    NameAsc,
}

impl FromStr for ActionSort {
    type Err = StackwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "variable-desc" => Ok(ActionSort::VariableDesc),
            "variable-asc" => Ok(ActionSort::VariableAsc),
            "monthly-desc" => Ok(ActionSort::MonthlyDesc),
            "monthly-asc" => Ok(ActionSort::MonthlyAsc),
            "layers-desc" | "steps-desc" => Ok(ActionSort::StepsDesc),
            "name-asc" => Ok(ActionSort::NameAsc),
            other => Err(StackwiseError::InvalidConfig {
                reason: format!("unknown action sort '{other}'"),
            }),
        }
    }
}

/// One row of the action comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRow {
    pub id: String,
    pub name: String,
    pub steps: usize,
    pub cost: ActionCost,
}

fn variable_key(row: &ActionRow) -> f64 {
    row.cost.cost_per_use.variable
}

fn monthly_key(row: &ActionRow) -> f64 {
    row.cost.monthly_cost.total
}

fn by(key: fn(&ActionRow) -> f64, a: &ActionRow, b: &ActionRow) -> Ordering {
    key(a).total_cmp(&key(b))
}

/// Cost rows for every use path that touches at least one layer.
pub fn compare_actions(
    use_paths: &[UsePath],
    layers: &[Layer],
    sort: ActionSort,
    config: &CostConfig,
) -> Vec<ActionRow> {
    let mut rows: Vec<ActionRow> = use_paths
        .iter()
        .filter(|p| !p.layers_involved.is_empty())
        .map(|p| ActionRow {
            id: p.id.clone(),
            name: p.name.clone(),
            steps: p.layers_involved.len(),
            cost: calculate_action_cost(p, layers, config),
        })
        .collect();

    match sort {
        ActionSort::VariableDesc => rows.sort_by(|a, b| by(variable_key, b, a)),
        ActionSort::VariableAsc => rows.sort_by(|a, b| by(variable_key, a, b)),
        ActionSort::MonthlyDesc => rows.sort_by(|a, b| by(monthly_key, b, a)),
        ActionSort::MonthlyAsc => rows.sort_by(|a, b| by(monthly_key, a, b)),
        ActionSort::StepsDesc => rows.sort_by(|a, b| b.steps.cmp(&a.steps)),
        ActionSort::NameAsc => rows.sort_by(|a, b| {
            a.name
                .to_lowercase()
                .cmp(&b.name.to_lowercase())
                .then_with(|| a.name.cmp(&b.name))
        }),
    }
    rows
}

/// The `limit` actions with the highest variable cost per use.
pub fn most_expensive_actions(
    use_paths: &[UsePath],
    layers: &[Layer],
    limit: usize,
    config: &CostConfig,
) -> Vec<ActionRow> {
    let mut rows = compare_actions(use_paths, layers, ActionSort::VariableDesc, config);
    rows.truncate(limit);
    rows
}

/// Share of an action's monthly cost that is variable, in percent.
pub fn variable_share(cost: &ActionCost) -> Option<f64> {
    let monthly = cost.monthly_cost;
    (monthly.total > 0.0).then(|| monthly.variable / monthly.total * 100.0)
}
