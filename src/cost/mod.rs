//! Cost Pipeline
//!
//! extract → group → consolidate → format, plus per-action costing,
//! forecasting and recommendations built on the same primitives.

pub mod action;
pub mod bucket;
pub mod extract;
pub mod forecast;
pub mod format;
pub mod group;
pub mod recommend;

pub use action::{
    calculate_action_cost, compare_actions, most_expensive_actions, ActionCost, ActionRow,
    ActionSort,
};
pub use bucket::{consolidate, Bucket, BucketEntry, ConsolidatedEntry, CostTotals};
pub use extract::{
    calculate_total_layer_cost, extract_all, extract_components, extract_own_components,
    CostComponent, CostKind,
};
pub use forecast::{forecast, ForecastRow, Scenario, SCENARIOS};
pub use format::{
    balance_columns, bucket_tooltip, currency_symbol, format_banner, format_cost_badge,
    layer_breakdown, period_label, stack_tooltip, BadgeLevel, Banner, Segment,
    TooltipLine,
};
pub use group::{aggregate, group_by_period, AggregatedCostEntry};
pub use recommend::{generate_recommendations, Recommendation, Severity};

use crate::model::Layer;

/// Aggregated and consolidated costs of a whole stack.
pub fn summarize(layers: &[Layer]) -> Vec<ConsolidatedEntry> {
    consolidate(&aggregate(layers))
}
