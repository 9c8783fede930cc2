//! Runtime configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StackwiseError};
use crate::model::UsageAssumptions;

/// Diagram geometry, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub base_x: f64,
    pub base_y: f64,
    /// Horizontal distance between dependency levels.
    pub level_spacing: f64,
    /// Layers per row within one level.
    pub max_per_level: usize,
    /// Slot height of a layer without substacks.
    pub node_height: f64,
    /// Vertical distance between fanned-out substacks.
    pub substack_spacing: f64,
    /// Horizontal offset of substacks from their parent.
    pub substack_offset_x: f64,
    /// Gap between consecutive rows of a level.
    pub row_spacing: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_x: 200.0,
            base_y: 200.0,
            level_spacing: 700.0,
            max_per_level: 2,
            node_height: 120.0,
            substack_spacing: 180.0,
            substack_offset_x: 400.0,
            row_spacing: 200.0,
        }
    }
}

/// Thresholds for badges, tooltips and recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub badge_medium_threshold: f64,
    pub badge_high_threshold: f64,
    pub tooltip_lines_per_column: usize,
    pub high_variable_per_use: f64,
    pub underutilized_fixed_threshold: f64,
    pub underutilized_min_actions: usize,
    pub variable_share_percent: f64,
    pub min_variable_per_use: f64,
    /// Traffic assumed for use paths that do not declare their own.
    pub default_usage: UsageAssumptions,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            badge_medium_threshold: 200.0,
            badge_high_threshold: 500.0,
            tooltip_lines_per_column: 20,
            high_variable_per_use: 0.001,
            underutilized_fixed_threshold: 500.0,
            underutilized_min_actions: 2,
            variable_share_percent: 80.0,
            min_variable_per_use: 0.0001,
            default_usage: UsageAssumptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub layout: LayoutConfig,
    pub costs: CostConfig,
}

impl Config {
    /// Load a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| StackwiseError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.layout.max_per_level == 0 {
            return Err(StackwiseError::InvalidConfig {
                reason: "layout.max_per_level must be at least 1".to_string(),
            });
        }
        if self.costs.tooltip_lines_per_column == 0 {
            return Err(StackwiseError::InvalidConfig {
                reason: "costs.tooltip_lines_per_column must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stackwise.json");
        fs::write(&path, r#"{"layout": {"level_spacing": 500}}"#).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.layout.level_spacing, 500.0);
        assert_eq!(config.layout.max_per_level, 2);
        assert_eq!(config.costs, CostConfig::default());
    }

    #[test]
    fn test_zero_row_capacity_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, r#"{"layout": {"max_per_level": 0}}"#).unwrap();

        let err = Config::load(&path).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = Config::load(Path::new("/nonexistent/stackwise.json")).unwrap_err();
        assert!(matches!(err, StackwiseError::FileReadError { .. }));
    }
}
