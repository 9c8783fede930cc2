//! Cost component extraction.
//!
//! Turns a layer's cost model (and its substacks' cost models) into a flat
//! list of positive fixed/variable charges, each tagged with its source.

use serde::{Deserialize, Serialize};

use crate::model::{Currency, Layer, Period};

/// Whether a charge is flat or usage-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostKind {
    Fixed,
    Variable,
}

/// One fixed or variable charge extracted from a cost model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostComponent {
    pub kind: CostKind,
    pub amount: f64,
    pub period: Period,
    pub currency: Currency,
    /// Free-text unit of a variable charge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Name of the layer or substack the charge came from.
    pub source: String,
}

/// Components of the layer's own cost model, ignoring substacks.
pub fn extract_own_components(layer: &Layer) -> Vec<CostComponent> {
    let Some(model) = &layer.cost_model else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(2);
    if model.fixed_cost > 0.0 {
        out.push(CostComponent {
            kind: CostKind::Fixed,
            amount: model.fixed_cost,
            period: model.period.clone(),
            currency: model.currency.clone(),
            unit: None,
            source: layer.name.clone(),
        });
    }
    if model.variable_cost > 0.0 {
        out.push(CostComponent {
            kind: CostKind::Variable,
            amount: model.variable_cost,
            period: model.period.clone(),
            currency: model.currency.clone(),
            unit: Some(model.variable_unit.clone()),
            source: layer.name.clone(),
        });
    }
    out
}

/// Components of the layer and of each of its direct substacks.
///
/// Substacks of substacks are not visited.
pub fn extract_components(layer: &Layer) -> Vec<CostComponent> {
    let mut out = extract_own_components(layer);
    for substack in &layer.substacks {
        out.extend(extract_own_components(substack));
    }
    out
}

/// Components of every layer in the stack, substacks included.
pub fn extract_all(layers: &[Layer]) -> Vec<CostComponent> {
    layers.iter().flat_map(extract_components).collect()
}

/// Sum of every extracted amount for a layer and its substacks.
///
/// Amounts are added regardless of period or currency, as the editor's
/// badge colouring does.
pub fn calculate_total_layer_cost(layer: &Layer) -> f64 {
    extract_components(layer).iter().map(|c| c.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CostModel;

    #[test]
    fn test_free_layer_has_no_components() {
        let layer = Layer::new("1", "Static Site");
        assert!(extract_components(&layer).is_empty());

        let zeroed = Layer::new("2", "Zeroed").with_cost(CostModel::default());
        assert!(extract_components(&zeroed).is_empty());
    }

    #[test]
    fn test_fixed_and_variable_components() {
        let layer = Layer::new("1", "REST API").with_cost(
            CostModel::monthly(400.0).with_variable(0.00002, "per 1M requests"),
        );
        let components = extract_components(&layer);

        assert_eq!(components.len(), 2);
        assert_eq!(components[0].kind, CostKind::Fixed);
        assert_eq!(components[0].amount, 400.0);
        assert_eq!(components[0].unit, None);
        assert_eq!(components[1].kind, CostKind::Variable);
        assert_eq!(components[1].unit.as_deref(), Some("per 1M requests"));
        assert_eq!(components[1].source, "REST API");
    }

    #[test]
    fn test_substack_components_are_tagged_with_substack_name() {
        let layer = Layer::new("1", "L1")
            .with_cost(CostModel::monthly(80.0))
            .with_substack(Layer::new("1_1", "S1").with_cost(CostModel::monthly(20.0)));

        let components = extract_components(&layer);
        assert_eq!(components.len(), 2);
        assert!(components.iter().all(|c| c.kind == CostKind::Fixed));
        assert_eq!(components[0].source, "L1");
        assert_eq!(components[1].source, "S1");
        assert_eq!(calculate_total_layer_cost(&layer), 100.0);

        assert_eq!(extract_own_components(&layer).len(), 1);
    }

    #[test]
    fn test_nested_substacks_are_not_visited() {
        let deep = Layer::new("1_1_1", "Deep").with_cost(CostModel::monthly(5.0));
        let layer = Layer::new("1", "Top")
            .with_substack(Layer::new("1_1", "Mid").with_substack(deep));
        assert!(extract_components(&layer).is_empty());
    }
}
