//! Dependency levels for the left-to-right diagram flow.
//!
//! A level is the length of the longest connection path from a root (a main
//! layer nothing points at). A back edge to a node still on the DFS stack
//! raises that node one past its source but does not walk it again, which is
//! where cycles end.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::model::{Layer, LayerId};

struct LevelWalker<'a> {
    graph: HashMap<&'a LayerId, Vec<&'a LayerId>>,
    levels: HashMap<&'a LayerId, usize>,
    on_stack: HashSet<&'a LayerId>,
}

impl<'a> LevelWalker<'a> {
    fn new(layers: &'a [Layer]) -> Self {
        let ids: HashSet<&LayerId> = layers.iter().map(|l| &l.id).collect();
        let graph = layers
            .iter()
            .map(|layer| {
                // Substack, dangling and self targets are not part of the main graph.
                let targets = layer
                    .connections
                    .iter()
                    .map(|c| &c.target_id)
                    .filter(|t| ids.contains(t) && *t != &layer.id)
                    .collect();
                (&layer.id, targets)
            })
            .collect();

        Self {
            graph,
            levels: HashMap::new(),
            on_stack: HashSet::new(),
        }
    }

    fn visit(&mut self, id: &'a LayerId, level: usize) {
        self.on_stack.insert(id);

        let targets = self.graph.get(id).cloned().unwrap_or_default();
        for target in targets {
            let next = level + 1;
            if self.on_stack.contains(target) {
                // Raised but not walked again, so the cycle ends here.
                let raised = self.levels.get(target).map_or(next, |&l| l.max(next));
                debug!("cycle edge {} -> {} raises target to {}", id, target, raised);
                self.levels.insert(target, raised);
                continue;
            }
            if self.levels.get(target).is_some_and(|&l| l >= next) {
                continue;
            }
            self.levels.insert(target, next);
            self.visit(target, next);
        }

        self.on_stack.remove(id);
    }
}

/// Compute a level per main layer.
///
/// Roots are visited in array order. A target reached again by a longer path
/// is raised and re-walked, so every node ends at its longest path from a
/// root. Layers not reachable from any root get level 0.
pub fn calculate_levels(layers: &[Layer]) -> HashMap<LayerId, usize> {
    let mut walker = LevelWalker::new(layers);

    let has_incoming: HashSet<&LayerId> = walker
        .graph
        .values()
        .flat_map(|targets| targets.iter().copied())
        .collect();

    for layer in layers {
        if has_incoming.contains(&layer.id) || walker.levels.contains_key(&layer.id) {
            continue;
        }
        walker.levels.insert(&layer.id, 0);
        walker.visit(&layer.id, 0);
    }

    let levels: HashMap<LayerId, usize> = layers
        .iter()
        .map(|l| (l.id.clone(), walker.levels.get(&l.id).copied().unwrap_or(0)))
        .collect();
    debug!("layer levels: {:?}", levels);
    levels
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(levels: &HashMap<LayerId, usize>, id: &str) -> usize {
        levels[&LayerId::from(id)]
    }

    #[test]
    fn test_linear_chain() {
        let layers = vec![
            Layer::new("A", "A").connect_to("B"),
            Layer::new("B", "B").connect_to("C"),
            Layer::new("C", "C"),
        ];
        let levels = calculate_levels(&layers);
        assert_eq!(level(&levels, "A"), 0);
        assert_eq!(level(&levels, "B"), 1);
        assert_eq!(level(&levels, "C"), 2);
    }

    #[test]
    fn test_diamond_takes_longest_path() {
        let layers = vec![
            Layer::new("A", "A").connect_to("B").connect_to("C"),
            Layer::new("B", "B").connect_to("D"),
            Layer::new("C", "C").connect_to("D"),
            Layer::new("D", "D"),
        ];
        let levels = calculate_levels(&layers);
        assert_eq!(level(&levels, "D"), 2);
    }

    #[test]
    fn test_shortcut_edge_seen_first_is_raised() {
        let layers = vec![
            Layer::new("A", "A").connect_to("D").connect_to("B"),
            Layer::new("B", "B").connect_to("C"),
            Layer::new("C", "C").connect_to("D"),
            Layer::new("D", "D").connect_to("E"),
            Layer::new("E", "E"),
        ];
        let levels = calculate_levels(&layers);
        assert_eq!(level(&levels, "D"), 3);
        assert_eq!(level(&levels, "E"), 4);
    }

    #[test]
    fn test_cycle_terminates() {
        let layers = vec![
            Layer::new("A", "A").connect_to("B"),
            Layer::new("B", "B").connect_to("A"),
        ];
        let levels = calculate_levels(&layers);
        assert_eq!(levels.len(), 2);
        assert_eq!(level(&levels, "A"), 0);
        assert_eq!(level(&levels, "B"), 0);
    }

    #[test]
    fn test_back_edge_raises_target_without_rewalking() {
        let layers = vec![
            Layer::new("R", "R").connect_to("A"),
            Layer::new("A", "A").connect_to("B"),
            Layer::new("B", "B").connect_to("A"),
        ];
        let levels = calculate_levels(&layers);
        assert_eq!(level(&levels, "R"), 0);
        assert_eq!(level(&levels, "A"), 3);
        assert_eq!(level(&levels, "B"), 2);
    }

    #[test]
    fn test_longer_cycle_raises_entry_once() {
        let layers = vec![
            Layer::new("R", "R").connect_to("A"),
            Layer::new("A", "A").connect_to("B"),
            Layer::new("B", "B").connect_to("C"),
            Layer::new("C", "C").connect_to("A"),
        ];
        let levels = calculate_levels(&layers);
        assert_eq!(level(&levels, "A"), 4);
        assert_eq!(level(&levels, "B"), 2);
        assert_eq!(level(&levels, "C"), 3);
    }

    #[test]
    fn test_disconnected_and_dangling() {
        let layers = vec![
            Layer::new("1", "UI")
                .connect_to("1_1")
                .connect_to("404")
                .with_substack(Layer::new("1_1", "Components")),
            Layer::new("2", "Lonely"),
        ];
        let levels = calculate_levels(&layers);
        assert_eq!(levels.len(), 2);
        assert_eq!(level(&levels, "1"), 0);
        assert_eq!(level(&levels, "2"), 0);
        assert!(!levels.contains_key(&LayerId::from("1_1")));
    }

    #[test]
    fn test_self_loop_is_still_a_root() {
        let layers = vec![
            Layer::new("A", "A").connect_to("A").connect_to("B"),
            Layer::new("B", "B"),
        ];
        let levels = calculate_levels(&layers);
        assert_eq!(level(&levels, "A"), 0);
        assert_eq!(level(&levels, "B"), 1);
    }
}
