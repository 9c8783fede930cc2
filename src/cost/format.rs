//! Cost text formatting.
//!
//! Formatting functions return structured [`Segment`]s and plain lines; a
//! renderer decides how to style them. `Display` impls give the flat text
//! form used by the CLI.

use std::fmt;

use serde::Serialize;

use super::bucket::{BucketEntry, ConsolidatedEntry};
use super::extract::{
    calculate_total_layer_cost, extract_components, extract_own_components, CostComponent,
    CostKind,
};
use super::group::{group_by_period, AggregatedCostEntry};
use crate::config::CostConfig;
use crate::model::{Currency, Layer, Period};

/// Display symbol for a currency; unknown codes are used as-is.
pub fn currency_symbol(currency: &Currency) -> &str {
    match currency {
        Currency::Usd => "$",
        Currency::Eur => "€",
        Currency::Gbp => "£",
        other => other.code(),
    }
}

/// Suffix appended to fixed amounts, e.g. `/mo`.
pub fn period_label(period: &Period) -> String {
    match period {
        Period::Month => "/mo".to_string(),
        Period::Year => "/yr".to_string(),
        Period::PerRequest => "/req".to_string(),
        Period::PerGb => "/GB".to_string(),
        Period::PerHour => "/hr".to_string(),
        Period::Other(p) => format!("/{p}"),
    }
}

/// `<symbol><amount>`, with the amount in shortest round-trip form.
pub fn format_amount(amount: f64, currency: &Currency) -> String {
    format!("{}{}", currency_symbol(currency), amount)
}

/// One piece of a cost banner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "segment", rename_all = "snake_case")]
pub enum Segment {
    /// Leading `Total` label.
    Heading,
    /// Shown instead of any section when nothing has a cost.
    Free,
    /// Section label such as `Fixed` or `Variable`.
    Section { label: &'static str },
    /// Fixed amount with its period suffix.
    FixedAmount {
        symbol: String,
        amount: f64,
        period_suffix: String,
    },
    /// Consolidated variable bucket; `index` counts variable buckets only.
    BucketAmount {
        index: usize,
        symbol: String,
        amount: f64,
        bucket: String,
    },
    /// Joiner between amounts (`+`) or sections (`||`).
    Separator { text: &'static str },
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Heading => f.write_str("Total: "),
            Segment::Free => f.write_str("Free"),
            Segment::Section { label } => write!(f, "{label}: "),
            Segment::FixedAmount {
                symbol,
                amount,
                period_suffix,
            } => write!(f, "{symbol}{amount}{period_suffix}"),
            Segment::BucketAmount {
                symbol,
                amount,
                bucket,
                ..
            } => write!(f, "{symbol}{amount} {bucket}"),
            Segment::Separator { text } => write!(f, " {text} "),
        }
    }
}

/// Summary banner for the whole stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Banner {
    pub segments: Vec<Segment>,
}

impl Banner {
    pub fn is_free(&self) -> bool {
        self.segments.contains(&Segment::Free)
    }
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Build the stack banner from consolidated entries.
///
/// `Total: Fixed: … || Variable: …`, dropping an empty half, or
/// `Total: Free` when there is nothing to show.
pub fn format_banner(consolidated: &[ConsolidatedEntry]) -> Banner {
    let mut fixed = Vec::new();
    let mut variable = Vec::new();

    for entry in consolidated {
        match entry {
            ConsolidatedEntry::Fixed(e) => fixed.push(Segment::FixedAmount {
                symbol: currency_symbol(&e.currency).to_string(),
                amount: e.amount,
                period_suffix: period_label(&e.period),
            }),
            ConsolidatedEntry::Variable(b) => variable.push(Segment::BucketAmount {
                index: variable.len(),
                symbol: currency_symbol(&b.currency).to_string(),
                amount: b.amount,
                bucket: b.bucket.title().to_string(),
            }),
        }
    }

    let mut segments = vec![Segment::Heading];
    if fixed.is_empty() && variable.is_empty() {
        segments.push(Segment::Free);
        return Banner { segments };
    }

    for (label, amounts) in [("Fixed", fixed), ("Variable", variable)] {
        if amounts.is_empty() {
            continue;
        }
        if segments.len() > 1 {
            segments.push(Segment::Separator { text: "||" });
        }
        segments.push(Segment::Section { label });
        for (i, amount) in amounts.into_iter().enumerate() {
            if i > 0 {
                segments.push(Segment::Separator { text: "+" });
            }
            segments.push(amount);
        }
    }

    Banner { segments }
}

/// Short form of a grouped entry: `$80/mo` or `$0.1 per GB`.
pub fn format_cost_entry(entry: &AggregatedCostEntry) -> String {
    match entry.kind {
        CostKind::Fixed => format!(
            "{}{}",
            format_amount(entry.amount, &entry.currency),
            period_label(&entry.period)
        ),
        CostKind::Variable => format!(
            "{} {}",
            format_amount(entry.amount, &entry.currency),
            entry.unit.as_deref().unwrap_or_default()
        )
        .trim_end()
        .to_string(),
    }
}

/// Badge text for one layer: grouped costs joined by ` | `, or `Free`.
///
/// With `include_substacks` false only the layer's own cost model counts,
/// as when the editor is browsing inside a substack.
pub fn format_cost_badge(layer: &Layer, include_substacks: bool) -> String {
    let components = if include_substacks {
        extract_components(layer)
    } else {
        extract_own_components(layer)
    };
    if components.is_empty() {
        return "Free".to_string();
    }
    group_by_period(&components)
        .iter()
        .map(format_cost_entry)
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Colour band of a layer badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeLevel {
    Low,
    Medium,
    High,
}

impl BadgeLevel {
    pub fn for_layer(layer: &Layer, config: &CostConfig) -> Self {
        let total = calculate_total_layer_cost(layer);
        if total > config.badge_high_threshold {
            BadgeLevel::High
        } else if total > config.badge_medium_threshold {
            BadgeLevel::Medium
        } else {
            BadgeLevel::Low
        }
    }
}

/// One line of a tooltip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipLine {
    pub text: String,
    /// Indented detail under a heading line.
    pub indent: bool,
}

impl TooltipLine {
    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            indent: false,
        }
    }

    fn detail(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            indent: true,
        }
    }
}

impl fmt::Display for TooltipLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.indent {
            f.write_str("  ")?;
        }
        f.write_str(&self.text)
    }
}

fn push_model_lines(lines: &mut Vec<TooltipLine>, layer: &Layer) {
    let Some(model) = &layer.cost_model else {
        return;
    };
    if model.is_free() {
        return;
    }
    lines.push(TooltipLine::heading(layer.name.clone()));
    if model.fixed_cost > 0.0 {
        lines.push(TooltipLine::detail(format!(
            "Fixed: {}{}",
            format_amount(model.fixed_cost, &model.currency),
            period_label(&model.period)
        )));
    }
    if model.variable_cost > 0.0 {
        lines.push(TooltipLine::detail(format!(
            "Variable: {} {}",
            format_amount(model.variable_cost, &model.currency),
            model.variable_unit
        )));
    }
}

/// Per-layer cost breakdown: the layer, then each costed substack.
pub fn layer_breakdown(layer: &Layer) -> Vec<TooltipLine> {
    let mut lines = vec![TooltipLine::heading("Cost Breakdown:")];
    push_model_lines(&mut lines, layer);
    for substack in &layer.substacks {
        push_model_lines(&mut lines, substack);
    }
    lines
}

/// Tooltip for the stack total: every costed layer and substack in stack
/// order, under one heading, split into balanced columns.
pub fn stack_tooltip(layers: &[Layer], max_per_column: usize) -> Vec<Vec<TooltipLine>> {
    let mut lines = vec![TooltipLine::heading("Cost Breakdown:")];
    for layer in layers {
        lines.extend(layer_breakdown(layer).into_iter().skip(1));
    }
    if lines.len() == 1 {
        lines.push(TooltipLine::detail("No costs defined"));
    }
    balance_columns(&lines, max_per_column)
}

fn contributor_line(contributor: &CostComponent) -> TooltipLine {
    let unit = contributor.unit.as_deref().unwrap_or_default();
    TooltipLine::detail(
        format!(
            "• {}: {} {}",
            contributor.source,
            format_amount(contributor.amount, &contributor.currency),
            unit
        )
        .trim_end()
        .to_string(),
    )
}

/// Tooltip for a variable bucket: contributors by descending amount.
pub fn bucket_tooltip(bucket: &BucketEntry) -> Vec<TooltipLine> {
    let mut contributors: Vec<&CostComponent> = bucket.contributors.iter().collect();
    contributors.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    let mut lines = vec![TooltipLine::heading(format!("{} Costs:", bucket.bucket.title()))];
    lines.extend(contributors.into_iter().map(contributor_line));
    lines
}

/// Split lines into columns of at most `max_per_column`, balanced in length.
///
/// Line order is preserved reading column by column.
pub fn balance_columns<T: Clone>(lines: &[T], max_per_column: usize) -> Vec<Vec<T>> {
    if lines.is_empty() {
        return Vec::new();
    }
    let max_per_column = max_per_column.max(1);
    let columns = lines.len().div_ceil(max_per_column);
    let per_column = lines.len().div_ceil(columns);
    lines.chunks(per_column).map(|c| c.to_vec()).collect()
}
