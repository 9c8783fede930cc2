//! Project State Schema
//!
//! A project is a single JSON document holding the layer stack and its use
//! paths. Files are migrated to the current schema on load.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StackwiseError};
use crate::model::{Layer, LayerStatus, UsePath};
use crate::state::migration::{migrate_project, CURRENT_SCHEMA_VERSION};
use crate::state::templates::Template;

/// Suffix of the undo history file written beside a project.
pub const HISTORY_SUFFIX: &str = "history.json";

/// Main project state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,

    #[serde(default = "default_name")]
    pub name: String,

    /// Main layers in stack order, topmost first.
    #[serde(default)]
    pub layers: Vec<Layer>,

    #[serde(default)]
    pub use_paths: Vec<UsePath>,

    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    #[serde(default = "Utc::now")]
    pub modified_at: DateTime<Utc>,

    /// File this project was loaded from (not serialized).
    #[serde(skip)]
    pub path: PathBuf,
}

fn default_schema_version() -> String {
    CURRENT_SCHEMA_VERSION.to_string()
}

fn default_name() -> String {
    "New Project".to_string()
}

impl Default for Project {
    fn default() -> Self {
        Self::new(default_name(), Vec::new())
    }
}

impl Project {
    pub fn new(name: impl Into<String>, layers: Vec<Layer>) -> Self {
        let now = Utc::now();
        Self {
            schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            name: name.into(),
            layers,
            use_paths: Vec::new(),
            created_at: now,
            modified_at: now,
            path: PathBuf::new(),
        }
    }

    /// The four-layer demo stack shown on first launch.
    pub fn sample() -> Self {
        Template::Sample.build()
    }

    /// Write a new project file seeded from `template`.
    pub fn create(path: &Path, template: Template) -> Result<Self> {
        if path.exists() {
            return Err(StackwiseError::ProjectAlreadyExists {
                path: path.to_path_buf(),
            });
        }

        let mut project = template.build();
        project.path = path.to_path_buf();
        project.save()?;

        info!(
            "Created project '{}' from template '{}' at {}",
            project.name,
            template.name(),
            path.display()
        );
        Ok(project)
    }

    /// Load a project file, migrating older schemas.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(StackwiseError::ProjectNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| StackwiseError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut project = Self::from_json(&content)?;
        project.path = path.to_path_buf();
        Ok(project)
    }

    /// Parse a project document, migrating it first.
    pub fn from_json(content: &str) -> Result<Self> {
        let data: serde_json::Value = serde_json::from_str(content)?;
        let data = migrate_project(data)?;
        Ok(serde_json::from_value(data)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save the project to the file it was loaded from.
    pub fn save(&mut self) -> Result<()> {
        self.modified_at = Utc::now();
        self.schema_version = CURRENT_SCHEMA_VERSION.to_string();

        let content = self.to_json()?;
        fs::write(&self.path, content).map_err(|e| StackwiseError::FileWriteError {
            path: self.path.clone(),
            source: e,
        })?;

        Ok(())
    }

    /// `<stem>.history.json` next to the project file.
    pub fn history_path(&self) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string());
        self.path.with_file_name(format!("{}.{}", stem, HISTORY_SUFFIX))
    }

    /// Serializable snapshot used by the undo history.
    pub fn snapshot(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Replace the content with a snapshot, keeping the file path.
    pub fn restore(&mut self, snapshot: &serde_json::Value) -> Result<()> {
        let restored: Project = serde_json::from_value(snapshot.clone())?;
        let path = std::mem::take(&mut self.path);
        *self = restored;
        self.path = path;
        Ok(())
    }

    pub fn active_count(&self) -> usize {
        self.layers
            .iter()
            .filter(|l| l.status == LayerStatus::Active)
            .count()
    }

    pub fn substack_count(&self) -> usize {
        self.layers.iter().map(|l| l.substacks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConnectionType, LayerId};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_create_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stack.json");

        let created = Project::create(&path, Template::Sample).unwrap();
        let loaded = Project::load(&path).unwrap();

        assert_eq!(loaded.name, created.name);
        assert_eq!(loaded.layers, created.layers);
        assert_eq!(loaded.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(loaded.path, path);
    }

    #[test]
    fn test_create_existing_fails() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stack.json");
        Project::create(&path, Template::Blank).unwrap();

        let err = Project::create(&path, Template::Blank).unwrap_err();
        assert!(matches!(err, StackwiseError::ProjectAlreadyExists { .. }));
    }

    #[test]
    fn test_load_missing_project() {
        let temp_dir = TempDir::new().unwrap();
        let err = Project::load(&temp_dir.path().join("nope.json")).unwrap_err();
        assert_eq!(err.error_code(), "PROJECT_NOT_FOUND");
    }

    #[test]
    fn test_legacy_document_parses() {
        let legacy = r#"{
            "name": "Legacy",
            "layers": [
                { "id": 1, "name": "UI", "connections": [2] },
                { "id": 2, "name": "API", "type": "API" }
            ]
        }"#;

        let project = Project::from_json(legacy).unwrap();
        assert_eq!(project.schema_version, CURRENT_SCHEMA_VERSION);
        assert_eq!(project.layers[0].connections[0].target_id, LayerId::from(2u64));
        assert_eq!(
            project.layers[0].connections[0].connection_type,
            ConnectionType::Http
        );
        assert!(project.use_paths.is_empty());
    }

    #[test]
    fn test_history_path_beside_project() {
        let mut project = Project::default();
        project.path = PathBuf::from("/tmp/shop.json");
        assert_eq!(project.history_path(), PathBuf::from("/tmp/shop.history.json"));
    }

    #[test]
    fn test_restore_keeps_path() {
        let mut project = Project::new("A", vec![Layer::new("1", "One")]);
        project.path = PathBuf::from("/tmp/a.json");
        let snapshot = Project::new("B", Vec::new()).snapshot().unwrap();

        project.restore(&snapshot).unwrap();
        assert_eq!(project.name, "B");
        assert!(project.layers.is_empty());
        assert_eq!(project.path, PathBuf::from("/tmp/a.json"));
    }
}
