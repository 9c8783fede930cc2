//! Grouping of cost components by period, kind and unit.

use serde::{Deserialize, Serialize};

use super::extract::{extract_all, CostComponent, CostKind};
use crate::model::{Currency, Layer, Period};

/// Sum of all components sharing a `(period, kind[, unit])` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedCostEntry {
    pub kind: CostKind,
    pub amount: f64,
    pub period: Period,
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Every component that fed this entry, in input order.
    pub contributors: Vec<CostComponent>,
}

impl AggregatedCostEntry {
    fn matches(&self, component: &CostComponent) -> bool {
        if self.kind != component.kind || self.period != component.period {
            return false;
        }
        match self.kind {
            CostKind::Fixed => true,
            CostKind::Variable => self.unit == component.unit,
        }
    }
}

/// Group components by period and kind; variable costs are also split by unit.
///
/// The first component seen for a key fixes the entry's period, currency and
/// unit. Fixed entries come first, then variable; within a kind entries are
/// ordered by period string, first-seen order breaking ties.
pub fn group_by_period(components: &[CostComponent]) -> Vec<AggregatedCostEntry> {
    let mut groups: Vec<AggregatedCostEntry> = Vec::new();

    for component in components {
        match groups.iter_mut().find(|g| g.matches(component)) {
            Some(group) => {
                group.amount += component.amount;
                group.contributors.push(component.clone());
            }
            None => groups.push(AggregatedCostEntry {
                kind: component.kind,
                amount: component.amount,
                period: component.period.clone(),
                currency: component.currency.clone(),
                unit: component.unit.clone(),
                contributors: vec![component.clone()],
            }),
        }
    }

    groups.sort_by(|a, b| {
        a.kind
            .cmp(&b.kind)
            .then_with(|| a.period.as_str().cmp(b.period.as_str()))
    });
    groups
}

/// Group the costs of a whole stack, substacks included.
pub fn aggregate(layers: &[Layer]) -> Vec<AggregatedCostEntry> {
    group_by_period(&extract_all(layers))
}
