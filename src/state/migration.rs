//! Schema migration support for project files.
//!
//! Project files are upgraded in memory, as raw JSON, before the typed model
//! parses them. Migrations are applied sequentially so a file can jump
//! several versions at once.

use std::collections::HashMap;

use log::info;
use serde_json::{Map, Value};

use crate::error::{Result, StackwiseError};

/// Current schema version for project files.
pub const CURRENT_SCHEMA_VERSION: &str = "1.1.0";

/// Version assumed for files that carry no `schemaVersion`.
pub const LEGACY_SCHEMA_VERSION: &str = "1.0.0";

/// Key holding the schema version in a project document.
pub const SCHEMA_VERSION_KEY: &str = "schemaVersion";

type MigrationFn = fn(Value) -> Result<Value>;

/// Maps (from_version, to_version) to the function performing that step.
fn get_migration_registry() -> HashMap<(String, String), MigrationFn> {
    let mut registry: HashMap<(String, String), MigrationFn> = HashMap::new();

    registry.insert(
        ("1.0.0".to_string(), "1.1.0".to_string()),
        migrate_1_0_0_to_1_1_0,
    );

    registry
}

/// All known schema versions, oldest first.
fn get_version_order() -> Vec<&'static str> {
    vec!["1.0.0", "1.1.0"]
}

/// Upgrade a project document to [`CURRENT_SCHEMA_VERSION`].
///
/// # Errors
/// `InvalidSchemaVersion` for versions this build does not know about,
/// `MigrationError` when a step fails or the file is newer than supported.
pub fn migrate_project(mut data: Value) -> Result<Value> {
    if !data.is_object() {
        return Err(StackwiseError::InvalidProjectStructure {
            reason: "project document must be a JSON object".to_string(),
        });
    }

    let current_version = data
        .get(SCHEMA_VERSION_KEY)
        .and_then(|v| v.as_str())
        .unwrap_or(LEGACY_SCHEMA_VERSION)
        .to_string();

    let target_version = CURRENT_SCHEMA_VERSION;

    if current_version == target_version {
        if let Some(obj) = data.as_object_mut() {
            obj.entry(SCHEMA_VERSION_KEY.to_string())
                .or_insert_with(|| Value::String(target_version.to_string()));
        }
        return Ok(data);
    }

    let path = find_migration_path(&current_version, target_version);

    if path.is_empty() {
        let known_versions = get_version_order();
        if !known_versions.contains(&current_version.as_str()) {
            return Err(StackwiseError::InvalidSchemaVersion {
                version: current_version,
            });
        }

        let current_idx = known_versions
            .iter()
            .position(|&v| v == current_version)
            .unwrap_or(0);
        let target_idx = known_versions
            .iter()
            .position(|&v| v == target_version)
            .unwrap_or(0);

        if current_idx > target_idx {
            return Err(StackwiseError::MigrationError {
                from: current_version,
                to: target_version.to_string(),
                reason: "Cannot downgrade project from newer schema version".to_string(),
            });
        }

        return Err(StackwiseError::MigrationError {
            from: current_version,
            to: target_version.to_string(),
            reason: "No migration path found".to_string(),
        });
    }

    let registry = get_migration_registry();

    for (from, to) in path {
        let migration_fn = registry.get(&(from.clone(), to.clone())).ok_or_else(|| {
            StackwiseError::MigrationError {
                from: from.clone(),
                to: to.clone(),
                reason: "Migration function not found in registry".to_string(),
            }
        })?;

        data = migration_fn(data).map_err(|e| StackwiseError::MigrationError {
            from: from.clone(),
            to: to.clone(),
            reason: format!("Migration failed: {}", e),
        })?;

        if let Some(obj) = data.as_object_mut() {
            obj.insert(SCHEMA_VERSION_KEY.to_string(), Value::String(to.clone()));
        }
        info!("Migrated project schema {} -> {}", from, to);
    }

    Ok(data)
}

/// Sequence of registered steps leading from `from` to `to`.
///
/// Empty when the versions are equal, unknown, or `to` is older.
pub fn find_migration_path(from: &str, to: &str) -> Vec<(String, String)> {
    if from == to {
        return Vec::new();
    }

    let versions = get_version_order();
    let registry = get_migration_registry();

    let Some(from_idx) = versions.iter().position(|&v| v == from) else {
        return Vec::new();
    };
    let Some(to_idx) = versions.iter().position(|&v| v == to) else {
        return Vec::new();
    };

    if from_idx >= to_idx {
        return Vec::new();
    }

    let mut path = Vec::new();
    let mut current_idx = from_idx;

    while current_idx < to_idx {
        let current = versions[current_idx].to_string();

        let next = ((current_idx + 1)..=to_idx).find(|&next_idx| {
            registry.contains_key(&(current.clone(), versions[next_idx].to_string()))
        });

        match next {
            Some(next_idx) => {
                path.push((current, versions[next_idx].to_string()));
                current_idx = next_idx;
            }
            None => return Vec::new(),
        }
    }

    path
}

/// 1.0.0 stored connections as bare target ids, with protocol types in a
/// side map `connectionTypes` keyed by target id. 1.1.0 stores
/// `{targetId, type}` objects and always carries the collection fields.
fn migrate_1_0_0_to_1_1_0(mut data: Value) -> Result<Value> {
    let obj = data
        .as_object_mut()
        .ok_or_else(|| StackwiseError::InvalidProjectStructure {
            reason: "project document must be a JSON object".to_string(),
        })?;

    let layers = obj
        .entry("layers")
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Some(layers) = layers.as_array_mut() {
        for layer in layers.iter_mut().filter_map(Value::as_object_mut) {
            normalize_layer(layer);
            let substacks = layer
                .entry("substacks")
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Some(substacks) = substacks.as_array_mut() {
                for sub in substacks.iter_mut().filter_map(Value::as_object_mut) {
                    normalize_layer(sub);
                }
            }
        }
    }

    obj.entry("usePaths")
        .or_insert_with(|| Value::Array(Vec::new()));

    Ok(data)
}

fn normalize_layer(layer: &mut Map<String, Value>) {
    let types = match layer.remove("connectionTypes") {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let connections = match layer.remove("connections") {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let normalized = connections
        .into_iter()
        .filter_map(|conn| match conn {
            Value::Object(mut map) if map.contains_key("targetId") => {
                map.entry("type")
                    .or_insert_with(|| Value::String("HTTP".to_string()));
                Some(Value::Object(map))
            }
            Value::Number(_) | Value::String(_) => {
                let key = match &conn {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                let conn_type = types
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| Value::String("HTTP".to_string()));
                let mut map = Map::new();
                map.insert("targetId".to_string(), conn);
                map.insert("type".to_string(), conn_type);
                Some(Value::Object(map))
            }
            _ => None,
        })
        .collect();

    layer.insert("connections".to_string(), Value::Array(normalized));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_migrate_current_version_unchanged() {
        let data = json!({
            "schemaVersion": CURRENT_SCHEMA_VERSION,
            "name": "Demo",
            "layers": []
        });

        let result = migrate_project(data.clone()).unwrap();
        assert_eq!(result, data);
    }

    #[test]
    fn test_missing_version_is_legacy() {
        let data = json!({ "name": "Old", "layers": [] });

        let result = migrate_project(data).unwrap();
        assert_eq!(
            result.get(SCHEMA_VERSION_KEY).and_then(|v| v.as_str()),
            Some(CURRENT_SCHEMA_VERSION)
        );
        assert_eq!(result["usePaths"], json!([]));
    }

    #[test]
    fn test_bare_connections_become_objects() {
        let data = json!({
            "layers": [
                {
                    "id": 1,
                    "name": "UI",
                    "connections": [2, 3],
                    "connectionTypes": { "3": "gRPC" },
                    "substacks": [{ "id": "1_1", "name": "Components", "connections": ["1_2"] }]
                },
                { "id": 2, "name": "API" }
            ]
        });

        let result = migrate_project(data).unwrap();
        let ui = &result["layers"][0];
        assert_eq!(
            ui["connections"],
            json!([
                { "targetId": 2, "type": "HTTP" },
                { "targetId": 3, "type": "gRPC" }
            ])
        );
        assert!(ui.get("connectionTypes").is_none());
        assert_eq!(
            ui["substacks"][0]["connections"],
            json!([{ "targetId": "1_2", "type": "HTTP" }])
        );
        assert_eq!(result["layers"][1]["connections"], json!([]));
        assert_eq!(result["layers"][1]["substacks"], json!([]));
    }

    #[test]
    fn test_object_connections_kept() {
        let data = json!({
            "schemaVersion": "1.0.0",
            "layers": [{ "id": 1, "name": "UI", "connections": [{ "targetId": 2, "type": "Event" }, { "targetId": 3 }] }]
        });

        let result = migrate_project(data).unwrap();
        assert_eq!(
            result["layers"][0]["connections"],
            json!([
                { "targetId": 2, "type": "Event" },
                { "targetId": 3, "type": "HTTP" }
            ])
        );
    }

    #[test]
    fn test_find_migration_path_same_version() {
        assert!(find_migration_path("1.1.0", "1.1.0").is_empty());
    }

    #[test]
    fn test_find_migration_path_sequential() {
        let path = find_migration_path("1.0.0", "1.1.0");
        assert_eq!(path, vec![("1.0.0".to_string(), "1.1.0".to_string())]);
    }

    #[test]
    fn test_find_migration_path_downgrade_not_supported() {
        assert!(find_migration_path("1.1.0", "1.0.0").is_empty());
    }

    #[test]
    fn test_unknown_version_rejected() {
        let data = json!({ "schemaVersion": "9.0.0", "layers": [] });

        match migrate_project(data) {
            Err(StackwiseError::InvalidSchemaVersion { version }) => assert_eq!(version, "9.0.0"),
            other => panic!("Expected InvalidSchemaVersion error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_object_rejected() {
        let err = migrate_project(json!([1, 2])).unwrap_err();
        assert!(matches!(err, StackwiseError::InvalidProjectStructure { .. }));
    }
}
