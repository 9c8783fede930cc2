//! State Management Module
//!
//! Project persistence, schema migrations, templates, validation, undo/redo
//! and the editor controller that ties them together.

pub mod editor;
pub mod migration;
pub mod project;
pub mod templates;
pub mod undo;
pub mod validation;

pub use editor::{Editor, Selection, SortBy};
pub use migration::{migrate_project, CURRENT_SCHEMA_VERSION};
pub use project::Project;
pub use templates::Template;
pub use undo::{ActionType, UndoAction, UndoManager};
pub use validation::{
    IssueKind, IssueSeverity, LayerReferences, ProjectValidator, ValidationIssue,
    ValidationReport,
};
