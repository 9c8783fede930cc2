//! Deterministic rank/row layout for the dependency diagram.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::Serialize;

use crate::config::LayoutConfig;
use crate::model::{Layer, LayerId};

/// Center of a diagram node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    /// Dependency level; `None` for substacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<usize>,
    /// Row within the level; `None` for substacks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

/// Height a layer needs so its fanned-out substacks do not overlap neighbours.
fn slot_height(layer: &Layer, config: &LayoutConfig) -> f64 {
    if layer.has_substacks() {
        layer.substacks.len() as f64 * config.substack_spacing
    } else {
        config.node_height
    }
}

/// Position every main layer and substack.
///
/// Main layers sit in the column of their level, rows of at most
/// `max_per_level` layers stacked top to bottom. Substacks are placed to the
/// right of their parent, centered on it. Layers missing from `levels` are
/// treated as level 0.
pub fn layout(
    layers: &[Layer],
    levels: &HashMap<LayerId, usize>,
    config: &LayoutConfig,
) -> HashMap<LayerId, Position> {
    let mut positions = HashMap::new();

    let mut by_level: BTreeMap<usize, Vec<&Layer>> = BTreeMap::new();
    for layer in layers {
        let level = levels.get(&layer.id).copied().unwrap_or(0);
        by_level.entry(level).or_default().push(layer);
    }

    let per_row = config.max_per_level.max(1);
    for (&level, members) in &by_level {
        let x = config.base_x + level as f64 * config.level_spacing;
        let mut row_top = config.base_y;

        for (row, chunk) in members.chunks(per_row).enumerate() {
            let slot = chunk
                .iter()
                .map(|l| slot_height(l, config))
                .fold(config.node_height, f64::max);

            for (k, layer) in chunk.iter().enumerate() {
                let y = row_top + k as f64 * slot + slot / 2.0;
                debug!(
                    "layer '{}' level {} row {} substacks {} -> ({}, {})",
                    layer.name,
                    level,
                    row,
                    layer.substacks.len(),
                    x,
                    y
                );
                positions.insert(
                    layer.id.clone(),
                    Position {
                        x,
                        y,
                        level: Some(level),
                        row: Some(row),
                    },
                );
            }

            row_top += chunk.len() as f64 * slot + config.row_spacing;
        }
    }

    for layer in layers.iter().filter(|l| l.has_substacks()) {
        let Some(parent) = positions.get(&layer.id).copied() else {
            continue;
        };
        let count = layer.substacks.len() as f64;
        for (i, sub) in layer.substacks.iter().enumerate() {
            let y = parent.y + i as f64 * config.substack_spacing
                - (count - 1.0) * config.substack_spacing / 2.0;
            positions.insert(
                sub.id.clone(),
                Position {
                    x: parent.x + config.substack_offset_x,
                    y,
                    level: None,
                    row: None,
                },
            );
        }
    }

    positions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::levels::calculate_levels;

    fn pos(positions: &HashMap<LayerId, Position>, id: &str) -> Position {
        positions[&LayerId::from(id)]
    }

    #[test]
    fn test_levels_map_to_columns() {
        let layers = vec![
            Layer::new("A", "A").connect_to("B"),
            Layer::new("B", "B"),
        ];
        let config = LayoutConfig::default();
        let positions = layout(&layers, &calculate_levels(&layers), &config);

        assert_eq!(pos(&positions, "A").x, 200.0);
        assert_eq!(pos(&positions, "B").x, 900.0);
        assert_eq!(pos(&positions, "A").y, 260.0);
        assert_eq!(pos(&positions, "B").level, Some(1));
    }

    #[test]
    fn test_third_layer_starts_new_row() {
        let layers = vec![
            Layer::new("A", "A"),
            Layer::new("B", "B"),
            Layer::new("C", "C"),
        ];
        let config = LayoutConfig::default();
        let positions = layout(&layers, &calculate_levels(&layers), &config);

        let (a, b, c) = (pos(&positions, "A"), pos(&positions, "B"), pos(&positions, "C"));
        assert_eq!(a.x, b.x);
        assert_eq!(a.x, c.x);
        assert_ne!(a.y, b.y);
        assert_eq!((a.row, b.row, c.row), (Some(0), Some(0), Some(1)));
        assert!(c.y - b.y >= config.row_spacing);
        assert!(c.y - a.y >= config.row_spacing);
    }

    #[test]
    fn test_substacks_reserve_row_height() {
        let parent = Layer::new("P", "Parent")
            .with_substack(Layer::new("P_1", "one"))
            .with_substack(Layer::new("P_2", "two"))
            .with_substack(Layer::new("P_3", "three"));
        let layers = vec![parent, Layer::new("Q", "Q")];
        let config = LayoutConfig::default();
        let positions = layout(&layers, &calculate_levels(&layers), &config);

        // Row slot is 3 * 180 for both members of the row.
        assert_eq!(pos(&positions, "P").y, 200.0 + 270.0);
        assert_eq!(pos(&positions, "Q").y, 200.0 + 540.0 + 270.0);

        let subs: Vec<Position> = ["P_1", "P_2", "P_3"].iter().map(|id| pos(&positions, id)).collect();
        assert!(subs.iter().all(|s| s.x == 600.0 && s.level.is_none()));
        assert_eq!(subs[0].y, 470.0 - 180.0);
        assert_eq!(subs[1].y, 470.0);
        assert_eq!(subs[2].y, 470.0 + 180.0);
        assert!(subs[2].y < pos(&positions, "Q").y);
    }

    #[test]
    fn test_missing_level_defaults_to_zero() {
        let layers = vec![Layer::new("X", "X")];
        let positions = layout(&layers, &HashMap::new(), &LayoutConfig::default());
        assert_eq!(pos(&positions, "X").level, Some(0));
    }
}
