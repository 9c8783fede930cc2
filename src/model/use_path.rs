//! Use paths ("actions"): named user journeys through the stack.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layer::LayerId;

/// Expected traffic for a use path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageAssumptions {
    pub estimated_calls_per_month: f64,
    pub estimated_users_per_month: f64,
    pub calls_per_user: f64,
}

impl Default for UsageAssumptions {
    fn default() -> Self {
        Self {
            estimated_calls_per_month: 10_000.0,
            estimated_users_per_month: 1_000.0,
            calls_per_user: 10.0,
        }
    }
}

/// A named flow touching an ordered list of layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsePath {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub layers_involved: Vec<LayerId>,
    /// Average calls into each layer per use, keyed by layer id.
    #[serde(default)]
    pub avg_calls_per_layer: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_assumptions: Option<UsageAssumptions>,
}

impl UsePath {
    pub fn new(id: &str, name: &str, layers_involved: Vec<LayerId>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            layers_involved,
            avg_calls_per_layer: BTreeMap::new(),
            usage_assumptions: None,
        }
    }

    pub fn with_calls(mut self, layer: &LayerId, calls: f64) -> Self {
        self.avg_calls_per_layer
            .insert(layer.as_str().to_string(), calls);
        self
    }

    pub fn with_usage(mut self, usage: UsageAssumptions) -> Self {
        self.usage_assumptions = Some(usage);
        self
    }

    /// Calls per use into `layer`; one when not specified.
    pub fn calls_for(&self, layer: &LayerId) -> f64 {
        self.avg_calls_per_layer
            .get(layer.as_str())
            .copied()
            .unwrap_or(1.0)
    }

    pub fn involves(&self, layer: &LayerId) -> bool {
        self.layers_involved.contains(layer)
    }
}
