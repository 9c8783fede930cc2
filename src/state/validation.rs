//! Referential integrity and cost-data checks for a project.

use std::collections::HashSet;

use log::warn;
use serde::Serialize;

use crate::model::{Currency, Layer, LayerId, Period, UsePath};
use crate::state::project::Project;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    OrphanedReference,
    InvalidCostModel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Critical,
    Warning,
}

/// One problem found in a project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    /// Where the problem is, e.g. `Layer 0: UI > Substack 1: Cache`.
    pub context: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn critical_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Critical)
            .count()
    }

    pub fn merge(mut self, other: ValidationReport) -> Self {
        self.issues.extend(other.issues);
        self
    }

    fn push(&mut self, kind: IssueKind, severity: IssueSeverity, context: &str, message: String) {
        warn!("{}: {}", context, message);
        self.issues.push(ValidationIssue {
            kind,
            severity,
            context: context.to_string(),
            message,
        });
    }
}

/// A connection pointing at a given layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionRef {
    pub context: String,
    pub index: usize,
    pub connection_type: String,
}

/// A use path involving a given layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsePathRef {
    pub id: String,
    pub name: String,
    pub index: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LayerReferences {
    pub connections: Vec<ConnectionRef>,
    pub use_paths: Vec<UsePathRef>,
}

impl LayerReferences {
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty() && self.use_paths.is_empty()
    }
}

/// Every layer and substack with a human-readable location.
fn located_layers(project: &Project) -> Vec<(&Layer, String)> {
    let mut out = Vec::new();
    for (i, layer) in project.layers.iter().enumerate() {
        let parent = format!("Layer {}: {}", i, layer.name);
        out.push((layer, parent.clone()));
        for (j, sub) in layer.substacks.iter().enumerate() {
            out.push((sub, format!("{} > Substack {}: {}", parent, j, sub.name)));
        }
    }
    out
}

fn use_path_context(index: usize, use_path: &UsePath) -> String {
    format!("Use Path {}: {}", index, use_path.name)
}

fn non_negative(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectValidator;

impl ProjectValidator {
    pub fn new() -> Self {
        Self
    }

    /// All checks combined.
    pub fn validate(&self, project: &Project) -> ValidationReport {
        self.validate_layer_references(project)
            .merge(self.validate_cost_models(project))
            .merge(self.validate_action_cost_data(project))
    }

    /// Ids of all layers and substacks.
    pub fn layer_ids(&self, project: &Project) -> HashSet<LayerId> {
        located_layers(project)
            .into_iter()
            .map(|(l, _)| l.id.clone())
            .collect()
    }

    /// Connections and use-path steps must name an existing layer or substack.
    pub fn validate_layer_references(&self, project: &Project) -> ValidationReport {
        let ids = self.layer_ids(project);
        let mut report = ValidationReport::default();

        for (layer, context) in located_layers(project) {
            for conn in layer.connections.iter().filter(|c| !ids.contains(&c.target_id)) {
                report.push(
                    IssueKind::OrphanedReference,
                    IssueSeverity::Critical,
                    &context,
                    format!("Connection references non-existent layer ID: {}", conn.target_id),
                );
            }
        }

        for (i, use_path) in project.use_paths.iter().enumerate() {
            let context = use_path_context(i, use_path);
            for id in use_path.layers_involved.iter().filter(|id| !ids.contains(id)) {
                report.push(
                    IssueKind::OrphanedReference,
                    IssueSeverity::Critical,
                    &context,
                    format!("Use path references non-existent layer ID: {}", id),
                );
            }
        }

        report
    }

    pub fn validate_cost_models(&self, project: &Project) -> ValidationReport {
        let mut report = ValidationReport::default();

        for (layer, context) in located_layers(project) {
            let Some(cm) = &layer.cost_model else {
                continue;
            };
            let mut problem = |message: String| {
                report.push(
                    IssueKind::InvalidCostModel,
                    IssueSeverity::Warning,
                    &context,
                    message,
                )
            };

            if let Currency::Other(code) = &cm.currency {
                problem(format!("Unknown currency: {}", code));
            }
            if let Period::Other(period) = &cm.period {
                problem(format!("Unknown period: {}", period));
            }
            if !non_negative(cm.fixed_cost) {
                problem("Fixed cost must be a non-negative number".to_string());
            }
            if !non_negative(cm.variable_cost) {
                problem("Variable cost must be a non-negative number".to_string());
            }
            if cm.variable_cost > 0.0 && cm.variable_unit.trim().is_empty() {
                problem("Variable cost specified but no unit defined".to_string());
            }
        }

        report
    }

    /// Per-layer call counts and usage assumptions of every use path.
    pub fn validate_action_cost_data(&self, project: &Project) -> ValidationReport {
        let ids = self.layer_ids(project);
        let mut report = ValidationReport::default();

        for (i, use_path) in project.use_paths.iter().enumerate() {
            let context = use_path_context(i, use_path);

            for (key, calls) in &use_path.avg_calls_per_layer {
                if !ids.contains(&LayerId::from(key.as_str())) {
                    report.push(
                        IssueKind::OrphanedReference,
                        IssueSeverity::Warning,
                        &context,
                        format!("Call count references non-existent layer: {}", key),
                    );
                }
                if !non_negative(*calls) {
                    report.push(
                        IssueKind::InvalidCostModel,
                        IssueSeverity::Warning,
                        &context,
                        format!("Invalid call count for layer {}", key),
                    );
                }
            }

            if let Some(ua) = &use_path.usage_assumptions {
                for (name, value) in [
                    ("estimatedCallsPerMonth", ua.estimated_calls_per_month),
                    ("estimatedUsersPerMonth", ua.estimated_users_per_month),
                    ("callsPerUser", ua.calls_per_user),
                ] {
                    if !non_negative(value) {
                        report.push(
                            IssueKind::InvalidCostModel,
                            IssueSeverity::Warning,
                            &context,
                            format!("Invalid {}", name),
                        );
                    }
                }
            }
        }

        report
    }

    /// Everything that points at `id`.
    pub fn layer_references(&self, project: &Project, id: &LayerId) -> LayerReferences {
        let mut refs = LayerReferences::default();

        for (layer, context) in located_layers(project) {
            for (index, conn) in layer.connections.iter().enumerate() {
                if &conn.target_id == id {
                    refs.connections.push(ConnectionRef {
                        context: context.clone(),
                        index,
                        connection_type: conn.connection_type.as_str().to_string(),
                    });
                }
            }
        }

        for (index, use_path) in project.use_paths.iter().enumerate() {
            if use_path.involves(id) {
                refs.use_paths.push(UsePathRef {
                    id: use_path.id.clone(),
                    name: use_path.name.clone(),
                    index,
                });
            }
        }

        refs
    }

    /// True when nothing references `id`.
    pub fn can_delete_layer(&self, project: &Project, id: &LayerId) -> bool {
        self.layer_references(project, id).is_empty()
    }

    /// Strip connections and use-path steps pointing at `id`. Returns how
    /// many references were removed.
    pub fn remove_orphaned_references(&self, project: &mut Project, id: &LayerId) -> usize {
        let mut removed = 0;

        for layer in project.layers.iter_mut() {
            removed += strip_connections(layer, id);
            for sub in layer.substacks.iter_mut() {
                removed += strip_connections(sub, id);
            }
        }

        for use_path in project.use_paths.iter_mut() {
            let before = use_path.layers_involved.len();
            use_path.layers_involved.retain(|l| l != id);
            use_path.avg_calls_per_layer.remove(id.as_str());
            removed += before - use_path.layers_involved.len();
        }

        removed
    }

    /// Drop steps and call counts that name unknown layers. Returns true if
    /// anything changed.
    pub fn repair_use_path(&self, use_path: &mut UsePath, valid_ids: &HashSet<LayerId>) -> bool {
        let before = (use_path.layers_involved.len(), use_path.avg_calls_per_layer.len());

        use_path.layers_involved.retain(|id| valid_ids.contains(id));
        let kept: HashSet<&str> = use_path
            .layers_involved
            .iter()
            .map(LayerId::as_str)
            .collect();
        use_path
            .avg_calls_per_layer
            .retain(|key, _| kept.contains(key.as_str()));

        before != (use_path.layers_involved.len(), use_path.avg_calls_per_layer.len())
    }

    /// Remove every dangling connection and use-path step. Returns the
    /// number of connections dropped plus use paths changed.
    pub fn repair(&self, project: &mut Project) -> usize {
        let ids = self.layer_ids(project);
        let mut fixed = 0;

        for layer in project.layers.iter_mut() {
            fixed += retain_known(layer, &ids);
            for sub in layer.substacks.iter_mut() {
                fixed += retain_known(sub, &ids);
            }
        }

        for use_path in project.use_paths.iter_mut() {
            if self.repair_use_path(use_path, &ids) {
                fixed += 1;
            }
        }

        fixed
    }
}

fn strip_connections(layer: &mut Layer, id: &LayerId) -> usize {
    let before = layer.connections.len();
    layer.connections.retain(|c| &c.target_id != id);
    before - layer.connections.len()
}

fn retain_known(layer: &mut Layer, ids: &HashSet<LayerId>) -> usize {
    let before = layer.connections.len();
    layer.connections.retain(|c| ids.contains(&c.target_id));
    before - layer.connections.len()
}
