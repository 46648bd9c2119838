use std::collections::BTreeSet;

use serde::Deserialize;

use super::palette::{CategoricalPalette, CommunityValue};
use super::types::{EdgeIdx, GraphData, NodeIdx};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeMode {
	/// Every edge is always in the render graph.
	All,
	/// Only the neighborhood of the current selection is.
	#[default]
	None,
}

/// Decides which edges belong in the live render graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EdgePolicy {
	pub mode: EdgeMode,
	pub dynamic: bool,
}

impl Default for EdgePolicy {
	fn default() -> Self {
		Self {
			mode: EdgeMode::None,
			dynamic: true,
		}
	}
}

impl EdgePolicy {
	/// Full recomputation of the materialized set, ascending by edge index.
	///
	/// A selected node overrides group emphasis. Group emphasis only applies
	/// when `groups` is given, i.e. when the active coloring is categorical.
	pub fn materialize(
		&self,
		graph: &GraphData,
		selected: Option<NodeIdx>,
		highlighted: &BTreeSet<CommunityValue>,
		groups: Option<&CategoricalPalette>,
	) -> Vec<EdgeIdx> {
		match (self.mode, self.dynamic) {
			(EdgeMode::All, _) => (0..graph.edges().len()).collect(),
			(EdgeMode::None, false) => Vec::new(),
			(EdgeMode::None, true) => {
				if let Some(node) = selected {
					let mut touching = graph.edges_touching(node).to_vec();
					touching.sort_unstable();
					return touching;
				}
				let Some(groups) = groups.filter(|_| !highlighted.is_empty()) else {
					return Vec::new();
				};
				let emphasized = |idx: NodeIdx| {
					groups
						.node_value(idx)
						.is_some_and(|v| highlighted.contains(v))
				};
				graph
					.edges()
					.iter()
					.enumerate()
					.filter(|(_, e)| emphasized(e.source) || emphasized(e.target))
					.map(|(i, _)| i)
					.collect()
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::components::network::color::{HueWheel, Rgb};
	use crate::components::network::palette::build_categorical;
	use crate::components::network::types::{EdgeRow, MetadataRow};

	// a - b - c - d, plus a - c; teams: a,b = red, c = blue, d = none
	fn fixture() -> (GraphData, CategoricalPalette) {
		let nodes = [
			MetadataRow::new("a").with_attribute("team", "red"),
			MetadataRow::new("b").with_attribute("team", "red"),
			MetadataRow::new("c").with_attribute("team", "blue"),
			MetadataRow::new("d"),
		];
		let edges = [
			EdgeRow::new("a", "b"),
			EdgeRow::new("b", "c"),
			EdgeRow::new("c", "d"),
			EdgeRow::new("a", "c"),
		];
		let graph = GraphData::from_rows(&edges, &nodes, "cluster", &mut StdRng::seed_from_u64(0));
		let palette = build_categorical(
			&graph,
			"team",
			Rgb::new(0, 0, 0),
			&HueWheel::default(),
			&mut StdRng::seed_from_u64(0),
		);
		(graph, palette)
	}

	fn set(values: &[&str]) -> BTreeSet<CommunityValue> {
		values.iter().map(|v| CommunityValue::Value(v.to_string())).collect()
	}

	#[test]
	fn all_mode_ignores_selection() {
		let (graph, palette) = fixture();
		let policy = EdgePolicy {
			mode: EdgeMode::All,
			dynamic: false,
		};
		let picked = policy.materialize(&graph, Some(0), &set(&["blue"]), Some(&palette));
		assert_eq!(picked, vec![0, 1, 2, 3]);
	}

	#[test]
	fn disabled_dynamic_edges_materialize_nothing() {
		let (graph, palette) = fixture();
		let policy = EdgePolicy {
			mode: EdgeMode::None,
			dynamic: false,
		};
		assert!(policy.materialize(&graph, Some(0), &set(&["red"]), Some(&palette)).is_empty());
	}

	#[test]
	fn idle_neighborhood_mode_is_empty() {
		let (graph, palette) = fixture();
		let picked =
			EdgePolicy::default().materialize(&graph, None, &BTreeSet::new(), Some(&palette));
		assert!(picked.is_empty());
	}

	#[test]
	fn selection_overrides_highlight() {
		let (graph, palette) = fixture();
		let policy = EdgePolicy::default();
		let picked = policy.materialize(&graph, Some(0), &set(&["blue"]), Some(&palette));
		assert_eq!(picked, vec![0, 3]);
		assert_eq!(policy.materialize(&graph, Some(3), &BTreeSet::new(), Some(&palette)), vec![2]);
	}

	#[test]
	fn highlighted_groups_pull_in_touching_edges() {
		let (graph, palette) = fixture();
		let policy = EdgePolicy::default();
		let picked = policy.materialize(&graph, None, &set(&["blue"]), Some(&palette));
		assert_eq!(picked, vec![1, 2, 3]);
		let missing: BTreeSet<_> = [CommunityValue::Missing].into_iter().collect();
		assert_eq!(policy.materialize(&graph, None, &missing, Some(&palette)), vec![2]);
	}

	#[test]
	fn highlight_is_inert_without_categorical_groups() {
		let (graph, _) = fixture();
		assert!(EdgePolicy::default().materialize(&graph, None, &set(&["red"]), None).is_empty());
	}
}
