//! Editor controller.
//!
//! Owns the open project, the current selection and the undo history. Every
//! mutating operation goes through [`Editor::apply`], which snapshots the
//! project around the edit and records the pair for undo.

use std::cmp::Ordering;
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};
use uuid::Uuid;

use crate::error::{Result, StackwiseError};
use crate::model::{find_layer, Connection, ConnectionType, CostModel, Layer, LayerId, UsePath};
use crate::state::project::Project;
use crate::state::templates::Template;
use crate::state::undo::{ActionType, UndoAction, UndoManager};
use crate::state::validation::ProjectValidator;

/// Selected layer, optionally drilled into one of its substacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub layer: usize,
    pub substack: Option<usize>,
}

impl Selection {
    pub fn in_substack(&self) -> bool {
        self.substack.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Name,
    Type,
    Status,
    Manual,
}

impl FromStr for SortBy {
    type Err = StackwiseError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(SortBy::Name),
            "type" => Ok(SortBy::Type),
            "status" => Ok(SortBy::Status),
            "manual" => Ok(SortBy::Manual),
            other => Err(StackwiseError::InvalidSelection {
                reason: format!("unknown sort order '{}'", other),
            }),
        }
    }
}

fn compare(sort: SortBy, a: &Layer, b: &Layer) -> Ordering {
    match sort {
        SortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        SortBy::Type => a.layer_type.to_lowercase().cmp(&b.layer_type.to_lowercase()),
        SortBy::Status => a.status.rank().cmp(&b.status.rank()),
        SortBy::Manual => Ordering::Equal,
    }
}

/// The list the selection currently points into.
fn current_list<'a>(
    project: &'a mut Project,
    selection: &Selection,
) -> Result<&'a mut Vec<Layer>> {
    if selection.in_substack() {
        let parent = project.layers.get_mut(selection.layer).ok_or_else(|| {
            StackwiseError::InvalidSelection {
                reason: format!("no layer at index {}", selection.layer),
            }
        })?;
        Ok(&mut parent.substacks)
    } else {
        Ok(&mut project.layers)
    }
}

fn current_index(selection: &Selection) -> usize {
    selection.substack.unwrap_or(selection.layer)
}

fn set_current_index(selection: &mut Selection, index: usize) {
    match selection.substack.as_mut() {
        Some(sub) => *sub = index,
        None => selection.layer = index,
    }
}

fn selected_mut<'a>(project: &'a mut Project, selection: &Selection) -> Result<&'a mut Layer> {
    let index = current_index(selection);
    current_list(project, selection)?
        .get_mut(index)
        .ok_or_else(|| StackwiseError::InvalidSelection {
            reason: format!("no layer at index {}", index),
        })
}

/// Next free integer id across layers and substacks.
fn next_numeric_id(project: &Project) -> LayerId {
    let max = project
        .layers
        .iter()
        .flat_map(|l| std::iter::once(l).chain(l.substacks.iter()))
        .filter_map(|l| l.id.as_str().parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    LayerId::from(max + 1)
}

#[derive(Debug)]
pub struct Editor {
    pub project: Project,
    pub selection: Selection,
    pub history: UndoManager,
}

impl Editor {
    pub fn new(project: Project) -> Self {
        Self {
            project,
            selection: Selection::default(),
            history: UndoManager::default(),
        }
    }

    /// Open a project file together with its saved history.
    pub fn open(path: &Path) -> Result<Self> {
        let project = Project::load(path)?;
        let history = UndoManager::load(&project.history_path())?;
        Ok(Self {
            project,
            selection: Selection::default(),
            history,
        })
    }

    /// Save the project and its history.
    pub fn save(&mut self) -> Result<()> {
        self.project.save()?;
        self.history.save(&self.project.history_path())
    }

    /// Run `edit` and record it for undo. A failed edit leaves the project
    /// untouched; an edit that changes nothing is not recorded.
    fn apply<T>(
        &mut self,
        action_type: ActionType,
        description: impl Into<String>,
        edit: impl FnOnce(&mut Project, &mut Selection) -> Result<T>,
    ) -> Result<T> {
        let before = self.project.snapshot()?;
        let selection = self.selection;

        let value = match edit(&mut self.project, &mut self.selection) {
            Ok(value) => value,
            Err(e) => {
                self.project.restore(&before)?;
                self.selection = selection;
                return Err(e);
            }
        };

        let after = self.project.snapshot()?;
        let description = description.into();
        if before == after {
            debug!("{} changed nothing, not recorded", description);
        } else {
            info!("{}: {}", action_type, description);
            self.history
                .push(UndoAction::new(action_type, description, before, after));
        }
        Ok(value)
    }

    pub fn selected_layer(&self) -> Result<&Layer> {
        let parent = self.project.layers.get(self.selection.layer);
        let layer = match self.selection.substack {
            Some(sub) => parent.and_then(|p| p.substacks.get(sub)),
            None => parent,
        };
        layer.ok_or_else(|| StackwiseError::InvalidSelection {
            reason: "selection is out of range".to_string(),
        })
    }

    /// Select by index within the current list (main layers or substacks).
    pub fn select(&mut self, index: usize) -> Result<()> {
        let len = current_list(&mut self.project, &self.selection)?.len();
        if index >= len {
            return Err(StackwiseError::InvalidSelection {
                reason: format!("index {} out of range for {} layers", index, len),
            });
        }
        set_current_index(&mut self.selection, index);
        Ok(())
    }

    /// Select a layer or substack by id.
    pub fn select_id(&mut self, id: &LayerId) -> Result<()> {
        for (i, layer) in self.project.layers.iter().enumerate() {
            if &layer.id == id {
                self.selection = Selection {
                    layer: i,
                    substack: None,
                };
                return Ok(());
            }
            if let Some(j) = layer.substacks.iter().position(|s| &s.id == id) {
                self.selection = Selection {
                    layer: i,
                    substack: Some(j),
                };
                return Ok(());
            }
        }
        Err(StackwiseError::LayerNotFound { id: id.to_string() })
    }

    pub fn enter_substack(&mut self) -> Result<()> {
        if self.selection.in_substack() {
            return Ok(());
        }
        let layer = self.selected_layer()?;
        if !layer.has_substacks() {
            return Err(StackwiseError::InvalidSelection {
                reason: format!("layer '{}' has no substacks", layer.name),
            });
        }
        self.selection.substack = Some(0);
        Ok(())
    }

    pub fn exit_substack(&mut self) {
        self.selection.substack = None;
    }

    /// Insert a new main layer at the top of the stack and select it.
    pub fn add_layer(&mut self, name: &str) -> Result<LayerId> {
        let id = next_numeric_id(&self.project);
        let layer = Layer::new(id.clone(), name);
        self.apply(
            ActionType::AddLayer,
            format!("Add layer '{}'", name),
            |project, selection| {
                project.layers.insert(0, layer);
                *selection = Selection::default();
                Ok(())
            },
        )?;
        Ok(id)
    }

    /// Append a substack to the selected main layer.
    pub fn add_substack(&mut self, name: &str) -> Result<LayerId> {
        let parent_index = self.selection.layer;
        let parent = self.project.layers.get(parent_index).ok_or_else(|| {
            StackwiseError::InvalidSelection {
                reason: format!("no layer at index {}", parent_index),
            }
        })?;

        let ids = ProjectValidator::new().layer_ids(&self.project);
        let id = (parent.substacks.len() + 1..)
            .map(|n| LayerId::from(format!("{}_{}", parent.id, n)))
            .find(|candidate| !ids.contains(candidate))
            .unwrap_or_else(|| LayerId::from(Uuid::new_v4().to_string()));
        let substack = Layer::new(id.clone(), name).with_type(&parent.layer_type);

        self.apply(
            ActionType::AddSubstack,
            format!("Add substack '{}'", name),
            |project, _| {
                project.layers[parent_index].substacks.push(substack);
                Ok(())
            },
        )?;
        Ok(id)
    }

    /// Delete the selected layer or substack and every reference to it.
    pub fn delete_selected(&mut self) -> Result<LayerId> {
        let doomed = self.selected_layer()?;
        let id = doomed.id.clone();
        let description = format!("Delete layer '{}'", doomed.name);

        self.apply(ActionType::DeleteLayer, description, |project, selection| {
            let index = current_index(selection);
            let list = current_list(project, selection)?;
            if list.len() <= 1 {
                return Err(StackwiseError::CannotDeleteLastLayer);
            }
            let removed = list.remove(index);

            let validator = ProjectValidator::new();
            for gone in std::iter::once(&removed).chain(removed.substacks.iter()) {
                validator.remove_orphaned_references(project, &gone.id);
            }

            set_current_index(selection, index.saturating_sub(1));
            Ok(())
        })?;
        Ok(id)
    }

    /// Swap the selected layer with its neighbour. Returns false at the ends.
    pub fn move_selected(&mut self, offset: isize) -> Result<bool> {
        let index = current_index(&self.selection);
        let len = current_list(&mut self.project, &self.selection)?.len();
        let Some(target) = index.checked_add_signed(offset).filter(|&t| t < len) else {
            return Ok(false);
        };

        self.apply(
            ActionType::MoveLayer,
            format!("Move layer {} -> {}", index, target),
            |project, selection| {
                current_list(project, selection)?.swap(index, target);
                set_current_index(selection, target);
                Ok(true)
            },
        )
    }

    pub fn rename_selected(&mut self, name: &str) -> Result<()> {
        self.apply(
            ActionType::EditLayer,
            format!("Rename layer to '{}'", name),
            |project, selection| {
                selected_mut(project, selection)?.name = name.to_string();
                Ok(())
            },
        )
    }

    pub fn set_cost_model(&mut self, cost_model: Option<CostModel>) -> Result<()> {
        self.apply(ActionType::EditLayer, "Edit cost model", |project, selection| {
            selected_mut(project, selection)?.cost_model = cost_model;
            Ok(())
        })
    }

    /// Connect the selected layer to `target`, or disconnect it if already
    /// connected. Returns true when the connection now exists.
    pub fn toggle_connection(
        &mut self,
        target: &LayerId,
        connection_type: ConnectionType,
    ) -> Result<bool> {
        if find_layer(&self.project.layers, target).is_none() {
            return Err(StackwiseError::LayerNotFound {
                id: target.to_string(),
            });
        }
        let source = self.selected_layer()?;
        if &source.id == target {
            return Err(StackwiseError::InvalidSelection {
                reason: "a layer cannot connect to itself".to_string(),
            });
        }

        let connected = source.is_connected_to(target);
        let (action_type, description) = if connected {
            (
                ActionType::Disconnect,
                format!("Disconnect {} -> {}", source.id, target),
            )
        } else {
            (
                ActionType::Connect,
                format!(
                    "Connect {} -> {} ({})",
                    source.id,
                    target,
                    connection_type.as_str()
                ),
            )
        };

        self.apply(action_type, description, |project, selection| {
            let layer = selected_mut(project, selection)?;
            if connected {
                layer.connections.retain(|c| &c.target_id != target);
            } else {
                layer
                    .connections
                    .push(Connection::new(target.clone(), connection_type));
            }
            Ok(!connected)
        })
    }

    /// Reorder the current list; the selected layer stays selected.
    pub fn sort_layers(&mut self, sort: SortBy) -> Result<()> {
        if sort == SortBy::Manual {
            return Ok(());
        }
        let selected = self.selected_layer().ok().map(|l| l.id.clone());

        self.apply(
            ActionType::SortLayers,
            format!("Sort layers by {:?}", sort),
            |project, selection| {
                let list = current_list(project, selection)?;
                list.sort_by(|a, b| compare(sort, a, b));
                if let Some(index) = selected.and_then(|id| list.iter().position(|l| l.id == id)) {
                    set_current_index(selection, index);
                }
                Ok(())
            },
        )
    }

    /// Add a use path through existing layers. Returns its generated id.
    pub fn add_use_path(&mut self, name: &str, layers: Vec<LayerId>) -> Result<String> {
        if let Some(missing) = layers
            .iter()
            .find(|id| find_layer(&self.project.layers, id).is_none())
        {
            return Err(StackwiseError::LayerNotFound {
                id: missing.to_string(),
            });
        }

        let use_path = UsePath::new(&Uuid::new_v4().to_string(), name, layers);
        let id = use_path.id.clone();
        self.apply(
            ActionType::AddUsePath,
            format!("Add use path '{}'", name),
            |project, _| {
                project.use_paths.push(use_path);
                Ok(())
            },
        )?;
        Ok(id)
    }

    /// Replace the project content with a template. Undoable.
    pub fn load_template(&mut self, template: Template) -> Result<()> {
        let fresh = template.build();
        self.apply(
            ActionType::LoadTemplate,
            format!("Load template '{}'", template),
            |project, selection| {
                let path = std::mem::take(&mut project.path);
                *project = fresh;
                project.path = path;
                *selection = Selection::default();
                Ok(())
            },
        )
    }

    /// Drop dangling references. Returns the number of fixes.
    pub fn repair(&mut self) -> Result<usize> {
        self.apply(ActionType::Repair, "Repair references", |project, _| {
            Ok(ProjectValidator::new().repair(project))
        })
    }

    pub fn undo(&mut self) -> Result<UndoAction> {
        let action = self.history.undo(&mut self.project)?;
        self.clamp_selection();
        Ok(action)
    }

    pub fn redo(&mut self) -> Result<UndoAction> {
        let action = self.history.redo(&mut self.project)?;
        self.clamp_selection();
        Ok(action)
    }

    /// Keep the selection in range after the project changed under it.
    fn clamp_selection(&mut self) {
        let layers = &self.project.layers;
        if layers.is_empty() {
            self.selection = Selection::default();
            return;
        }
        self.selection.layer = self.selection.layer.min(layers.len() - 1);
        let subs = layers[self.selection.layer].substacks.len();
        self.selection.substack = match self.selection.substack {
            Some(_) if subs == 0 => None,
            Some(i) => Some(i.min(subs - 1)),
            None => None,
        };
    }
}
