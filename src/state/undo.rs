//! Undo/Redo System
//!
//! Every edit is recorded with full project snapshots taken before and after
//! it, so restoring is a plain deserialize rather than an inverse operation.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, StackwiseError};
use crate::state::project::Project;

/// Default maximum number of undo levels to keep.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 50;

/// Kinds of editor actions that can be undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    AddLayer,
    AddSubstack,
    DeleteLayer,
    EditLayer,
    MoveLayer,
    SortLayers,
    Connect,
    Disconnect,
    AddUsePath,
    LoadTemplate,
    Repair,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActionType::AddLayer => "Add Layer",
            ActionType::AddSubstack => "Add Substack",
            ActionType::DeleteLayer => "Delete Layer",
            ActionType::EditLayer => "Edit Layer",
            ActionType::MoveLayer => "Move Layer",
            ActionType::SortLayers => "Sort Layers",
            ActionType::Connect => "Connect",
            ActionType::Disconnect => "Disconnect",
            ActionType::AddUsePath => "Add Use Path",
            ActionType::LoadTemplate => "Load Template",
            ActionType::Repair => "Repair",
        };
        f.write_str(label)
    }
}

/// A single undoable action with complete state snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoAction {
    pub id: String,
    pub action_type: ActionType,
    pub description: String,
    pub timestamp: DateTime<Utc>,
    /// Project as it was before the action.
    pub state_before: serde_json::Value,
    /// Project as it was after the action.
    pub state_after: serde_json::Value,
}

impl UndoAction {
    pub fn new(
        action_type: ActionType,
        description: impl Into<String>,
        state_before: serde_json::Value,
        state_after: serde_json::Value,
    ) -> Self {
        Self::with_id(
            Uuid::new_v4().to_string(),
            action_type,
            description,
            state_before,
            state_after,
        )
    }

    /// Create an action with a fixed id (tests, imports).
    pub fn with_id(
        id: impl Into<String>,
        action_type: ActionType,
        description: impl Into<String>,
        state_before: serde_json::Value,
        state_after: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            action_type,
            description: description.into(),
            timestamp: Utc::now(),
            state_before,
            state_after,
        }
    }
}

/// On-disk form of the history, one JSON file per project.
#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    #[serde(default)]
    undo_stack: Vec<UndoAction>,
    #[serde(default)]
    redo_stack: Vec<UndoAction>,
    #[serde(default)]
    action_log: Vec<UndoAction>,
}

/// Undo and redo stacks plus a log of recent actions.
///
/// The undo stack and the log are both capped at `max_undo_levels`. Undo
/// entries that fall off have their ids remembered in `discarded_action_ids`.
#[derive(Debug, Clone)]
pub struct UndoManager {
    undo_stack: Vec<UndoAction>,
    redo_stack: Vec<UndoAction>,
    max_undo_levels: usize,
    action_log: Vec<UndoAction>,
    discarded_action_ids: Vec<String>,
}

impl Default for UndoManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_LEVELS)
    }
}

impl UndoManager {
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_levels: max_levels,
            action_log: Vec::new(),
            discarded_action_ids: Vec::new(),
        }
    }

    /// Load history from `path`; a missing file means an empty history.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| StackwiseError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: HistoryFile = serde_json::from_str(&content)?;

        let mut manager = Self {
            undo_stack: file.undo_stack,
            redo_stack: file.redo_stack,
            action_log: file.action_log,
            ..Self::default()
        };
        manager.trim_history();
        Ok(manager)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = HistoryFile {
            undo_stack: self.undo_stack.clone(),
            redo_stack: self.redo_stack.clone(),
            action_log: self.action_log.clone(),
        };
        let content = serde_json::to_string_pretty(&file)?;
        fs::write(path, content).map_err(|e| StackwiseError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Record a new action. History has diverged, so the redo stack is dropped.
    pub fn push(&mut self, action: UndoAction) {
        self.redo_stack.clear();
        self.action_log.push(action.clone());
        self.undo_stack.push(action);
        self.trim_history();
    }

    /// Restore `project` to the state before the most recent action.
    pub fn undo(&mut self, project: &mut Project) -> Result<UndoAction> {
        let action = self.undo_stack.pop().ok_or(StackwiseError::NothingToUndo)?;

        if let Err(e) = project.restore(&action.state_before) {
            self.undo_stack.push(action);
            return Err(e);
        }

        self.redo_stack.push(action.clone());
        Ok(action)
    }

    /// Re-apply the most recently undone action.
    pub fn redo(&mut self, project: &mut Project) -> Result<UndoAction> {
        let action = self.redo_stack.pop().ok_or(StackwiseError::NothingToRedo)?;

        if let Err(e) = project.restore(&action.state_after) {
            self.redo_stack.push(action);
            return Err(e);
        }

        self.undo_stack.push(action.clone());
        Ok(action)
    }

    pub fn get_history(&self) -> &[UndoAction] {
        &self.action_log
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn trim_history(&mut self) {
        if self.undo_stack.len() > self.max_undo_levels {
            let excess = self.undo_stack.len() - self.max_undo_levels;
            self.discarded_action_ids
                .extend(self.undo_stack.drain(..excess).map(|a| a.id));
        }
        if self.action_log.len() > self.max_undo_levels {
            let excess = self.action_log.len() - self.max_undo_levels;
            self.action_log.drain(..excess);
        }
    }

    pub fn max_undo_levels(&self) -> usize {
        self.max_undo_levels
    }

    pub fn set_max_undo_levels(&mut self, max_levels: usize) {
        self.max_undo_levels = max_levels;
        self.trim_history();
    }

    pub fn discarded_action_ids(&self) -> &[String] {
        &self.discarded_action_ids
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn peek_undo(&self) -> Option<&UndoAction> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&UndoAction> {
        self.redo_stack.last()
    }

    /// Forget both stacks. Used when a template replaces the whole project.
    pub fn clear(&mut self) {
        self.discarded_action_ids.extend(
            self.undo_stack
                .drain(..)
                .chain(self.redo_stack.drain(..))
                .map(|a| a.id),
        );
    }

    /// (id, type, description) of undoable actions, most recent first.
    pub fn undo_stack_summary(&self) -> Vec<(String, ActionType, String)> {
        self.undo_stack
            .iter()
            .rev()
            .map(|a| (a.id.clone(), a.action_type, a.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Layer;
    use tempfile::TempDir;

    fn state(name: &str, layers: usize) -> serde_json::Value {
        let layers = (0..layers)
            .map(|i| Layer::new(i as u64, &format!("Layer {}", i)))
            .collect();
        Project::new(name, layers).snapshot().unwrap()
    }

    fn push_n(manager: &mut UndoManager, n: usize) {
        for i in 0..n {
            manager.push(UndoAction::new(
                ActionType::EditLayer,
                format!("Action {}", i),
                state("before", i),
                state("after", i + 1),
            ));
        }
    }

    #[test]
    fn test_new_undo_manager() {
        let manager = UndoManager::new(10);
        assert_eq!(manager.max_undo_levels(), 10);
        assert_eq!(manager.undo_count(), 0);
        assert!(!manager.can_undo());
        assert!(!manager.can_redo());
    }

    #[test]
    fn test_undo_and_redo_restore_snapshots() {
        let mut manager = UndoManager::new(10);
        let mut project = Project::new("after", vec![Layer::new("1", "A"), Layer::new("2", "B")]);
        manager.push(UndoAction::new(
            ActionType::AddLayer,
            "Add B",
            state("before", 1),
            project.snapshot().unwrap(),
        ));

        let undone = manager.undo(&mut project).unwrap();
        assert_eq!(undone.action_type, ActionType::AddLayer);
        assert_eq!(project.name, "before");
        assert_eq!(project.layers.len(), 1);
        assert!(manager.can_redo());
        assert_eq!(manager.peek_redo().unwrap().description, "Add B");

        manager.redo(&mut project).unwrap();
        assert_eq!(project.name, "after");
        assert_eq!(project.layers.len(), 2);
    }

    #[test]
    fn test_empty_stacks_error() {
        let mut manager = UndoManager::default();
        let mut project = Project::default();
        assert!(matches!(
            manager.undo(&mut project),
            Err(StackwiseError::NothingToUndo)
        ));
        assert!(matches!(
            manager.redo(&mut project),
            Err(StackwiseError::NothingToRedo)
        ));
    }

    #[test]
    fn test_trim_history() {
        let mut manager = UndoManager::new(3);
        push_n(&mut manager, 5);

        assert_eq!(manager.undo_count(), 3);
        assert_eq!(manager.discarded_action_ids().len(), 2);

        let log: Vec<&str> = manager
            .get_history()
            .iter()
            .map(|a| a.description.as_str())
            .collect();
        assert_eq!(log, vec!["Action 2", "Action 3", "Action 4"]);
    }

    #[test]
    fn test_oversized_log_is_trimmed_on_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stack.history.json");

        let mut manager = UndoManager::new(200);
        push_n(&mut manager, DEFAULT_MAX_UNDO_LEVELS + 5);
        manager.save(&path).unwrap();

        let loaded = UndoManager::load(&path).unwrap();
        assert_eq!(loaded.get_history().len(), DEFAULT_MAX_UNDO_LEVELS);
        assert_eq!(loaded.undo_count(), DEFAULT_MAX_UNDO_LEVELS);
        assert_eq!(loaded.get_history()[0].description, "Action 5");
    }

    #[test]
    fn test_push_clears_redo_stack() {
        let mut manager = UndoManager::new(10);
        let mut project = Project::default();
        push_n(&mut manager, 3);
        manager.undo(&mut project).unwrap();
        assert_eq!(manager.redo_count(), 1);

        push_n(&mut manager, 1);
        assert_eq!(manager.redo_count(), 0);
    }

    #[test]
    fn test_save_and_load_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("stack.history.json");

        let mut manager = UndoManager::new(10);
        manager.push(UndoAction::with_id(
            "a-1",
            ActionType::Connect,
            "Connect UI -> API",
            state("before", 2),
            state("after", 2),
        ));
        manager.save(&path).unwrap();

        let loaded = UndoManager::load(&path).unwrap();
        assert_eq!(loaded.undo_count(), 1);
        assert_eq!(loaded.peek_undo().unwrap().id, "a-1");
        assert_eq!(loaded.get_history().len(), 1);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let loaded = UndoManager::load(&temp_dir.path().join("none.json")).unwrap();
        assert!(!loaded.can_undo());
    }

    #[test]
    fn test_clear_and_summary() {
        let mut manager = UndoManager::new(10);
        push_n(&mut manager, 2);

        let summary = manager.undo_stack_summary();
        assert_eq!(summary[0].2, "Action 1");
        assert_eq!(summary[1].2, "Action 0");

        manager.set_max_undo_levels(1);
        assert_eq!(manager.undo_count(), 1);

        manager.clear();
        assert_eq!(manager.undo_count(), 0);
        assert_eq!(manager.discarded_action_ids().len(), 2);
    }

    #[test]
    fn test_action_type_display() {
        assert_eq!(ActionType::AddLayer.to_string(), "Add Layer");
        assert_eq!(ActionType::LoadTemplate.to_string(), "Load Template");
    }
}
