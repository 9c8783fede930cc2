//! CLI Command Implementations
//!
//! Each command loads the project, runs one library operation and prints the
//! result. Editing commands save the project and its history afterwards.

use std::collections::BTreeMap;
use std::path::Path;

use log::{info, warn};

use crate::config::Config;
use crate::cost::format::format_amount;
use crate::cost::{
    balance_columns, bucket_tooltip, compare_actions, forecast, format_banner, format_cost_badge,
    generate_recommendations, layer_breakdown, stack_tooltip, summarize, ActionSort, BadgeLevel,
    ConsolidatedEntry, CostTotals, TooltipLine, SCENARIOS,
};
use crate::diagram::{calculate_levels, layout};
use crate::error::{Result, StackwiseError};
use crate::model::{all_layers, find_layer, ConnectionType, Currency, LayerId};
use crate::state::{Editor, Project, ProjectValidator, Template};

/// Create a new project file.
pub fn init(path: &Path, template: &str) -> Result<()> {
    info!("Creating new project at: {}", path.display());

    let template: Template = template.parse()?;
    let project = Project::create(path, template)?;

    println!("Project created: {}", path.display());
    println!("Template: {} ({} layers)", template, project.layers.len());

    Ok(())
}

/// Print stack counts and the consolidated cost banner.
pub fn summary(path: &Path, config: &Config) -> Result<()> {
    info!("Summarizing project: {}", path.display());

    let project = Project::load(path)?;
    let entries = summarize(&project.layers);
    let totals = CostTotals::from_entries(&entries);

    println!("Project: {}", project.name);
    println!("Schema version: {}", project.schema_version);
    println!("Last modified: {}", project.modified_at);
    println!(
        "Layers: {} ({} active, {} substacks) | Actions: {}",
        project.layers.len(),
        project.active_count(),
        project.substack_count(),
        project.use_paths.len()
    );
    println!("{:-<60}", "");
    println!("{}", format_banner(&entries));
    if !entries.is_empty() {
        println!(
            "Fixed: {}  Variable: {}  Total: {}",
            format_amount(totals.fixed, &Currency::Usd),
            format_amount(totals.variable, &Currency::Usd),
            format_amount(totals.total(), &Currency::Usd)
        );
        println!("{:-<60}", "");
        print_columns(&stack_tooltip(
            &project.layers,
            config.costs.tooltip_lines_per_column,
        ));
    }

    Ok(())
}

/// Print badges and breakdowns per layer, then the variable bucket tooltips.
pub fn costs(path: &Path, layer: Option<&str>, config: &Config) -> Result<()> {
    info!("Showing costs for: {}", path.display());

    let project = Project::load(path)?;

    let layers: Vec<_> = match layer {
        Some(id) => {
            let id = LayerId::from(id);
            let found = find_layer(&project.layers, &id)
                .ok_or_else(|| StackwiseError::LayerNotFound { id: id.to_string() })?;
            vec![found]
        }
        None => project.layers.iter().collect(),
    };

    for layer in layers {
        let badge = format_cost_badge(layer, true);
        let level = BadgeLevel::for_layer(layer, &config.costs);
        println!("[{}] {} {} ({:?})", layer.id, layer.name, badge, level);
        let breakdown = layer_breakdown(layer);
        if breakdown.len() > 1 {
            for line in breakdown.iter().skip(1) {
                println!("    {}", line);
            }
        }
    }

    let buckets = summarize(&project.layers)
        .into_iter()
        .filter_map(|entry| match entry {
            ConsolidatedEntry::Variable(bucket) => Some(bucket),
            ConsolidatedEntry::Fixed(_) => None,
        });
    for bucket in buckets {
        println!("{:-<60}", "");
        let lines = bucket_tooltip(&bucket);
        print_columns(&balance_columns(
            &lines,
            config.costs.tooltip_lines_per_column,
        ));
    }

    Ok(())
}

/// Print tooltip columns one after another, separated by a blank line.
fn print_columns(columns: &[Vec<TooltipLine>]) {
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            println!();
        }
        for line in column {
            println!("{}", line);
        }
    }
}

/// Print dependency levels, one column per level.
pub fn levels(path: &Path) -> Result<()> {
    info!("Calculating levels for: {}", path.display());

    let project = Project::load(path)?;
    let levels = calculate_levels(&project.layers);

    let mut by_level: Vec<(usize, Vec<&str>)> = Vec::new();
    for layer in &project.layers {
        let level = levels.get(&layer.id).copied().unwrap_or(0);
        match by_level.iter_mut().find(|(l, _)| *l == level) {
            Some((_, names)) => names.push(layer.name.as_str()),
            None => by_level.push((level, vec![layer.name.as_str()])),
        }
    }
    by_level.sort_by_key(|(level, _)| *level);

    for (level, names) in by_level {
        println!("Level {}: {}", level, names.join(", "));
    }

    Ok(())
}

/// Print diagram positions for every layer and substack.
pub fn layout_positions(path: &Path, json: bool, config: &Config) -> Result<()> {
    info!("Computing layout for: {}", path.display());

    let project = Project::load(path)?;
    let levels = calculate_levels(&project.layers);
    let positions = layout(&project.layers, &levels, &config.layout);

    if json {
        let keyed: BTreeMap<&str, _> = positions
            .iter()
            .map(|(id, p)| (id.as_str(), p))
            .collect();
        println!("{}", serde_json::to_string_pretty(&keyed)?);
        return Ok(());
    }

    for layer in all_layers(&project.layers) {
        if let Some(pos) = positions.get(&layer.id) {
            let place = match (pos.level, pos.row) {
                (Some(level), Some(row)) => format!("level {} row {}", level, row),
                _ => "substack".to_string(),
            };
            println!(
                "{:<28} ({:>7.1}, {:>7.1})  {}",
                layer.name, pos.x, pos.y, place
            );
        }
    }

    Ok(())
}

/// Validate references and cost data, optionally repairing references.
pub fn validate(path: &Path, repair: bool) -> Result<()> {
    info!("Validating project: {}", path.display());

    let validator = ProjectValidator::new();

    if repair {
        let mut editor = Editor::open(path)?;
        let fixed = editor.repair()?;
        editor.save()?;
        println!("Repaired {} reference(s)", fixed);
    }

    let project = Project::load(path)?;
    let report = validator.validate(&project);

    if report.is_valid() {
        println!("Project is valid.");
        return Ok(());
    }

    for issue in &report.issues {
        println!(
            "[{:?}] {}: {}",
            issue.severity, issue.context, issue.message
        );
    }
    println!("{:-<60}", "");
    println!(
        "{} issue(s), {} critical",
        report.issues.len(),
        report.critical_count()
    );
    if report.critical_count() > 0 && !repair {
        println!("Run with --repair to remove dangling references.");
    }

    Ok(())
}

/// Print the action comparison table.
pub fn actions(path: &Path, sort: &str, top: Option<usize>, config: &Config) -> Result<()> {
    info!("Comparing actions in: {}", path.display());

    let sort: ActionSort = sort.parse()?;
    let project = Project::load(path)?;
    let mut rows = compare_actions(&project.use_paths, &project.layers, sort, &config.costs);
    if let Some(n) = top {
        rows.truncate(n);
    }

    if rows.is_empty() {
        println!("No actions defined.");
        return Ok(());
    }

    let usd = Currency::Usd;
    println!(
        "{:<24} {:>5} {:>14} {:>14} {:>14}",
        "Action", "Steps", "Var/use", "Monthly", "Per user"
    );
    for row in rows {
        println!(
            "{:<24} {:>5} {:>14} {:>14} {:>14}",
            row.name,
            row.steps,
            format_amount(row.cost.cost_per_use.variable, &usd),
            format_amount(row.cost.monthly_cost.total, &usd),
            format_amount(row.cost.cost_per_user.total, &usd)
        );
    }

    Ok(())
}

/// Print growth scenarios for the stack totals.
pub fn forecast_costs(path: &Path) -> Result<()> {
    info!("Forecasting costs for: {}", path.display());

    let project = Project::load(path)?;
    let totals = CostTotals::from_entries(&summarize(&project.layers));
    let usd = Currency::Usd;

    println!("{:<16} {:>14} {:>14} {:>14}", "Scenario", "Fixed", "Variable", "Total");
    for row in forecast(&totals, &SCENARIOS) {
        println!(
            "{:<16} {:>14} {:>14} {:>14}",
            row.scenario.label,
            format_amount(row.fixed, &usd),
            format_amount(row.variable, &usd),
            format_amount(row.total, &usd)
        );
    }

    Ok(())
}

/// Print optimization recommendations.
pub fn recommend(path: &Path, config: &Config) -> Result<()> {
    info!("Generating recommendations for: {}", path.display());

    let project = Project::load(path)?;
    let recommendations =
        generate_recommendations(&project.layers, &project.use_paths, &config.costs);

    if recommendations.is_empty() {
        println!("No recommendations.");
        return Ok(());
    }

    for rec in recommendations {
        println!("[{:?}] {}", rec.severity, rec.title);
        println!("    {}", rec.description);
    }

    Ok(())
}

/// Add a layer, or a substack under `parent`.
pub fn add_layer(path: &Path, name: &str, parent: Option<&str>) -> Result<()> {
    info!("Adding layer '{}' to: {}", name, path.display());

    let mut editor = Editor::open(path)?;
    let id = match parent {
        Some(parent) => {
            editor.select_id(&LayerId::from(parent))?;
            if editor.selection.in_substack() {
                return Err(StackwiseError::InvalidSelection {
                    reason: format!("'{}' is a substack; substacks cannot nest", parent),
                });
            }
            editor.add_substack(name)?
        }
        None => editor.add_layer(name)?,
    };
    editor.save()?;

    println!("Added '{}' with id {}", name, id);

    Ok(())
}

/// Toggle a connection `from -> to`.
pub fn connect(path: &Path, from: &str, to: &str, connection_type: &str) -> Result<()> {
    info!("Toggling connection {} -> {} in: {}", from, to, path.display());

    let connection_type = ConnectionType::from(connection_type);
    if let ConnectionType::Other(name) = &connection_type {
        warn!("Unknown connection type '{}', keeping it as-is", name);
    }

    let mut editor = Editor::open(path)?;
    editor.select_id(&LayerId::from(from))?;
    let connected = editor.toggle_connection(&LayerId::from(to), connection_type)?;
    editor.save()?;

    if connected {
        println!("Connected {} -> {}", from, to);
    } else {
        println!("Disconnected {} -> {}", from, to);
    }

    Ok(())
}

/// Undo the last action.
pub fn undo(path: &Path) -> Result<()> {
    info!("Undoing last action in: {}", path.display());

    let mut editor = Editor::open(path)?;
    let action = editor.undo()?;
    editor.save()?;

    println!("Undone: {}", action.description);

    Ok(())
}

/// Redo the last undone action.
pub fn redo(path: &Path) -> Result<()> {
    info!("Redoing last undone action in: {}", path.display());

    let mut editor = Editor::open(path)?;
    let action = editor.redo()?;
    editor.save()?;

    println!("Redone: {}", action.description);

    Ok(())
}

/// Show action history.
pub fn show_history(path: &Path) -> Result<()> {
    info!("Showing history for: {}", path.display());

    let editor = Editor::open(path)?;
    let history = &editor.history;
    let log = history.get_history();

    if log.is_empty() {
        println!("No actions in history.");
        return Ok(());
    }

    let next_undo = history.peek_undo().map(|a| a.id.as_str());

    println!("Action History:");
    println!("{:-<60}", "");
    for action in log {
        let marker = if Some(action.id.as_str()) == next_undo {
            ">>> "
        } else {
            "    "
        };
        println!(
            "{}{} [{}] {} ({})",
            marker,
            action.id.chars().take(8).collect::<String>(),
            action.action_type,
            action.description,
            action.timestamp.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!("{:-<60}", "");
    println!(
        "Undo stack: {} | Redo stack: {}",
        history.undo_count(),
        history.redo_count()
    );

    Ok(())
}
