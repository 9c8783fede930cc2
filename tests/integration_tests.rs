//! Integration Tests
//!
//! End-to-end tests through the public API: cost pipeline, persistence,
//! editing with undo/redo, and the diagram.

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use stackwise::config::{Config, LayoutConfig};
use stackwise::cost::{
    extract_all, forecast, format_banner, summarize, ConsolidatedEntry, CostKind, CostTotals,
    SCENARIOS,
};
use stackwise::diagram::{calculate_levels, layout};
use stackwise::model::{find_layer, ConnectionType, CostModel, Layer, LayerId};
use stackwise::state::{Editor, Project, ProjectValidator, Template, CURRENT_SCHEMA_VERSION};
use stackwise::StackwiseError;

fn id(s: &str) -> LayerId {
    LayerId::from(s)
}

// === Cost Pipeline Tests ===

#[test]
fn test_layer_and_substack_fixed_costs_merge() {
    let layers = vec![Layer::new("1", "L1")
        .with_cost(CostModel::monthly(80.0))
        .with_substack(Layer::new("1_1", "S1").with_cost(CostModel::monthly(20.0)))];

    let components = extract_all(&layers);
    assert_eq!(components.len(), 2);
    assert!(components.iter().all(|c| c.kind == CostKind::Fixed));

    let entries = summarize(&layers);
    assert_eq!(entries.len(), 1);
    match &entries[0] {
        ConsolidatedEntry::Fixed(entry) => {
            assert_relative_eq!(entry.amount, 100.0);
            assert_eq!(entry.contributors.len(), 2);
        }
        other => panic!("expected a fixed entry, got {:?}", other),
    }

    assert_eq!(format_banner(&entries).to_string(), "Total: Fixed: $100/mo");
}

#[test]
fn test_consolidated_sum_matches_extracted_sum() {
    let project = Template::Microservices.build();

    let extracted: f64 = extract_all(&project.layers).iter().map(|c| c.amount).sum();
    let consolidated: f64 = summarize(&project.layers).iter().map(|e| e.amount()).sum();

    assert_relative_eq!(extracted, consolidated, epsilon = 1e-9);
}

#[test]
fn test_free_stack_banner() {
    let layers = vec![
        Layer::new("1", "Static Site"),
        Layer::new("2", "Zero").with_cost(CostModel::monthly(0.0)),
    ];

    let banner = format_banner(&summarize(&layers));
    assert!(banner.is_free());
    assert_eq!(banner.to_string(), "Total: Free");
}

#[test]
fn test_forecast_scales_only_variable_cost() {
    let project = Template::Sample.build();
    let totals = CostTotals::from_entries(&summarize(&project.layers));
    assert_relative_eq!(totals.fixed, 1000.0);

    let rows = forecast(&totals, &SCENARIOS);
    let doubled = rows
        .iter()
        .find(|r| r.scenario.label == "2x Growth")
        .expect("2x scenario");

    assert_relative_eq!(doubled.fixed, 1000.0);
    assert_relative_eq!(doubled.variable, totals.variable * 2.0, epsilon = 1e-12);
    assert_relative_eq!(doubled.total, 1000.0 + totals.variable * 2.0, epsilon = 1e-9);
}

// === Persistence Tests ===

#[test]
fn test_legacy_project_is_migrated_on_load_and_saved_current() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("legacy.json");
    let legacy = r#"{
        "schemaVersion": "1.0.0",
        "name": "Legacy",
        "layers": [
            {"id": "1", "name": "API", "connections": ["2"], "connectionTypes": {"2": "gRPC"}},
            {"id": "2", "name": "Worker", "connections": [3]},
            {"id": 3, "name": "Queue"}
        ]
    }"#;
    std::fs::write(&path, legacy).unwrap();

    let mut project = Project::load(&path).unwrap();
    assert_eq!(project.schema_version, CURRENT_SCHEMA_VERSION);

    let api = find_layer(&project.layers, &id("1")).unwrap();
    assert_eq!(api.connections.len(), 1);
    assert_eq!(api.connections[0].target_id, id("2"));
    assert_eq!(api.connections[0].connection_type, ConnectionType::Grpc);

    let worker = find_layer(&project.layers, &id("2")).unwrap();
    assert_eq!(worker.connections[0].target_id, id("3"));
    assert_eq!(worker.connections[0].connection_type, ConnectionType::Http);

    project.save().unwrap();
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(saved["schemaVersion"], CURRENT_SCHEMA_VERSION);
    assert!(saved["layers"][0].get("connectionTypes").is_none());

    let reloaded = Project::load(&path).unwrap();
    assert_eq!(reloaded.layers, project.layers);
}

#[test]
fn test_create_refuses_to_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.json");

    Project::create(&path, Template::Blank).unwrap();
    let err = Project::create(&path, Template::Sample).unwrap_err();
    assert!(matches!(err, StackwiseError::ProjectAlreadyExists { .. }));
}

// === Editor Tests ===

#[test]
fn test_editor_undo_redo_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stack.json");
    Project::create(&path, Template::Sample).unwrap();

    {
        let mut editor = Editor::open(&path).unwrap();
        let new_id = editor.add_layer("CDN").unwrap();
        assert_eq!(new_id, id("5"));
        assert_eq!(editor.project.layers[0].name, "CDN");
        editor.save().unwrap();
    }

    let mut editor = Editor::open(&path).unwrap();
    assert!(editor.history.can_undo());
    assert_eq!(editor.project.layers.len(), 5);

    editor.undo().unwrap();
    assert_eq!(editor.project.layers.len(), 4);
    assert!(find_layer(&editor.project.layers, &id("5")).is_none());

    editor.redo().unwrap();
    assert_eq!(editor.project.layers.len(), 5);
    assert_eq!(editor.project.path, path);
}

#[test]
fn test_deleting_layer_leaves_no_dangling_references() {
    let mut editor = Editor::new(Template::Sample.build());
    editor.select_id(&id("2")).unwrap();
    editor.delete_selected().unwrap();

    let report = ProjectValidator::new().validate(&editor.project);
    assert_eq!(report.critical_count(), 0);
    assert!(editor
        .project
        .use_paths
        .iter()
        .all(|p| !p.layers_involved.contains(&id("2"))));

    editor.undo().unwrap();
    assert!(find_layer(&editor.project.layers, &id("2")).is_some());
}

// === Diagram Tests ===

#[test]
fn test_sample_levels_and_layout() {
    let project = Template::Sample.build();
    let levels = calculate_levels(&project.layers);

    for (layer, expected) in ["1", "2", "3", "4"].iter().zip(0..) {
        assert_eq!(levels[&id(layer)], expected);
    }

    let config = LayoutConfig::default();
    let positions = layout(&project.layers, &levels, &config);

    // Two substacks widen the first slot to 360.
    let ui = positions[&id("1")];
    assert_relative_eq!(ui.x, 200.0);
    assert_relative_eq!(ui.y, 380.0);

    let api = positions[&id("2")];
    assert_relative_eq!(api.x, 900.0);
    assert_relative_eq!(api.y, 260.0);

    let first = positions[&id("1_1")];
    let second = positions[&id("1_2")];
    assert_relative_eq!(first.x, 600.0);
    assert_relative_eq!(first.y, 290.0);
    assert_relative_eq!(second.y, 470.0);
    assert_eq!(first.level, None);
}

#[test]
fn test_layout_is_deterministic() {
    let project = Template::ThreeTier.build();
    let config = Config::default();
    let levels = calculate_levels(&project.layers);

    let a = layout(&project.layers, &levels, &config.layout);
    let b = layout(&project.layers, &levels, &config.layout);
    assert_eq!(a, b);
}
