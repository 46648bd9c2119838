use std::collections::BTreeSet;

use attribute_graph_canvas::components::network::adapter::{Projector, RenderAdapter};
use attribute_graph_canvas::components::network::classify::AttributeClass;
use attribute_graph_canvas::components::network::edges::EdgeMode;
use attribute_graph_canvas::components::network::engine::{Emphasis, NetworkEngine};
use attribute_graph_canvas::components::network::palette::{CommunityValue, Legend, Palette};
use attribute_graph_canvas::components::network::scale::ScaleType;
use attribute_graph_canvas::components::network::types::{
	EdgeIdx, EdgeRecord, EdgeRow, MetadataRow, NodeRecord,
};
use attribute_graph_canvas::components::network::EngineConfig;

/// Mirrors the live render graph the way a canvas would hold it.
#[derive(Default)]
struct Recorder {
	nodes: usize,
	live: BTreeSet<EdgeIdx>,
	clears: usize,
	ready: usize,
	focus: Option<(f64, f64)>,
}

impl Projector for Recorder {
	fn graph_to_viewport(&self, x: f64, y: f64) -> (f64, f64) {
		(x * 10.0, y * 10.0)
	}
}

impl RenderAdapter for Recorder {
	fn reset_graph(&mut self, nodes: &[NodeRecord]) {
		self.nodes = nodes.len();
		self.live.clear();
	}

	fn clear_edges(&mut self) {
		self.clears += 1;
		self.live.clear();
	}

	fn add_edge(&mut self, idx: EdgeIdx, _edge: &EdgeRecord) {
		self.live.insert(idx);
	}

	fn focus_camera(&mut self, x: f64, y: f64) {
		self.focus = Some((x, y));
	}

	fn network_ready(&mut self) {
		self.ready += 1;
	}
}

fn metadata() -> Vec<MetadataRow> {
	vec![
		MetadataRow::new("n1")
			.with_attribute("score", "1")
			.with_attribute("team", "red")
			.with_position("0", "0")
			.with_cluster("west"),
		MetadataRow::new("n2")
			.with_attribute("score", "5")
			.with_attribute("team", "blue")
			.with_position("4", "2")
			.with_cluster("west"),
		MetadataRow::new("n3")
			.with_attribute("score", "10")
			.with_attribute("team", "red")
			.with_position("8", "8")
			.with_cluster("east"),
		MetadataRow::new("n4").with_attribute("score", "7").with_position("9", "1"),
	]
}

// n1-n2, n2-n3, n1-n3, n3-n4, plus a duplicate and a dangling edge
fn edge_rows() -> Vec<EdgeRow> {
	vec![
		EdgeRow::new("n1", "n2"),
		EdgeRow::new("n2", "n3"),
		EdgeRow::new("n1", "n3"),
		EdgeRow::new("n3", "n4"),
		EdgeRow::new("n2", "n1"),
		EdgeRow::new("n4", "nowhere"),
	]
}

fn loaded(config: EngineConfig) -> NetworkEngine<Recorder> {
	let mut engine = NetworkEngine::new(Recorder::default(), config);
	engine.load(&edge_rows(), &metadata());
	engine
}

fn touching(engine: &NetworkEngine<Recorder>, id: &str) -> BTreeSet<EdgeIdx> {
	let idx = engine.graph().node_index(id).unwrap();
	engine.graph().edges_touching(idx).iter().copied().collect()
}

fn team(v: &str) -> CommunityValue {
	CommunityValue::Value(v.to_string())
}

#[test]
fn every_node_has_a_color_after_load() {
	let engine = loaded(EngineConfig::default());
	assert_eq!(engine.renderer().nodes, 4);
	assert_eq!(engine.graph().edges().len(), 4);
	for idx in 0..4 {
		assert!(engine.node_display(idx).is_some());
	}
	assert!(engine.node_display(4).is_none());
}

#[test]
fn score_scenario_is_numeric_end_to_end() {
	let mut engine = loaded(EngineConfig::default());
	engine.set_color_key("score");
	assert_eq!(engine.class(), Some(AttributeClass::Numeric));

	let Some(Legend::Gradient { stops, min, max, .. }) = engine.legend() else {
		panic!("numeric key should publish a gradient legend");
	};
	assert_eq!((min, max), (1.0, 10.0));
	assert_eq!(engine.node_display(0).unwrap().color, stops[0]);
	assert_eq!(engine.node_display(2).unwrap().color, stops[stops.len() - 1]);

	let Some(Palette::Numeric(p)) = engine.palette() else {
		panic!("expected numeric palette");
	};
	let order = [0, 1, 3, 2].map(|idx| p.stop_of(idx).unwrap());
	assert!(order.windows(2).all(|w| w[0] < w[1]), "{order:?}");
}

#[test]
fn a_single_non_numeric_value_forces_categorical() {
	let mut rows = metadata();
	rows[3].attributes.insert("score".into(), "n/a".into());
	let mut engine = NetworkEngine::new(Recorder::default(), EngineConfig::default());
	engine.load(&edge_rows(), &rows);
	engine.set_color_key("score");
	assert_eq!(engine.class(), Some(AttributeClass::Categorical));
}

#[test]
fn click_selection_replaces_edges_on_the_next_turn() {
	let mut engine = loaded(EngineConfig::default());
	assert!(engine.renderer().live.is_empty());

	engine.click_node(engine.graph().node_index("n1"));
	assert!(engine.renderer().live.is_empty(), "edges must wait for the next turn");
	assert_eq!(engine.run_deferred(), 1);
	assert_eq!(engine.renderer().live, touching(&engine, "n1"));

	engine.click_node(engine.graph().node_index("n2"));
	engine.run_deferred();
	assert_eq!(engine.renderer().live, touching(&engine, "n2"));
	assert_eq!(engine.materialized_edges().len(), engine.renderer().live.len());

	engine.click_node(None);
	engine.run_deferred();
	assert!(engine.renderer().live.is_empty());
}

#[test]
fn all_mode_materializes_everything_regardless_of_selection() {
	let mut engine = loaded(EngineConfig::default());
	engine.set_edge_mode(EdgeMode::All);
	let everything: BTreeSet<EdgeIdx> = (0..engine.graph().edges().len()).collect();
	assert_eq!(engine.renderer().live, everything);

	assert!(engine.select_node(Some("n4")));
	assert_eq!(engine.renderer().live, everything);
	engine.click_node(Some(0));
	assert_eq!(engine.pending(), 0);
	assert_eq!(engine.renderer().live, everything);
}

#[test]
fn disabling_dynamic_edges_clears_the_neighborhood() {
	let mut engine = loaded(EngineConfig::default());
	engine.select_node(Some("n3"));
	assert_eq!(engine.renderer().live, touching(&engine, "n3"));
	engine.set_dynamic_edges(false);
	assert!(engine.renderer().live.is_empty());
}

#[test]
fn group_highlight_drops_selection_and_pulls_group_edges() {
	let mut engine = loaded(EngineConfig::default());
	engine.set_color_key("team");
	engine.select_node(Some("n4"));
	engine.hover_node(Some(1));

	assert!(engine.toggle_highlight(&team("blue")));
	assert_eq!(engine.highlight().selected(), None);
	assert_eq!(engine.highlight().hovered(), Some(1));
	assert_eq!(engine.renderer().live, touching(&engine, "n2"));

	engine.hover_node(None);
	assert_eq!(engine.node_display(1).unwrap().emphasis, Emphasis::Group);
	assert_eq!(engine.node_display(0).unwrap().emphasis, Emphasis::Dimmed);
}

#[test]
fn network_ready_fires_once_per_load() {
	let mut engine = loaded(EngineConfig::default());
	assert_eq!(engine.renderer().ready, 1);
	for key in ["score", "team", "cluster", "score"] {
		engine.set_color_key(key);
	}
	engine.set_scale(ScaleType::Log);
	assert_eq!(engine.renderer().ready, 1);

	engine.load(&edge_rows(), &metadata());
	assert_eq!(engine.renderer().ready, 2);
}

#[test]
fn visibility_toggles_and_numeric_mode() {
	let mut engine = loaded(EngineConfig::default());
	engine.set_color_key("team");
	let red = team("red");

	engine.toggle_visibility(&red);
	assert!(engine.node_display(0).unwrap().hidden);
	assert!(!engine.node_display(1).unwrap().hidden);
	engine.toggle_visibility(&red);
	assert!(!engine.node_display(0).unwrap().hidden);

	engine.toggle_visibility(&red);
	engine.toggle_all_visibility();
	assert!((0..4).all(|i| !engine.node_display(i).unwrap().hidden));
	engine.toggle_all_visibility();
	assert!((0..4).all(|i| engine.node_display(i).unwrap().hidden));

	engine.set_color_key("score");
	assert!((0..4).all(|i| !engine.node_display(i).unwrap().hidden));
	engine.set_color_key("team");
	assert!(
		(0..4).all(|i| !engine.node_display(i).unwrap().hidden),
		"categorical rebuild resets visibility"
	);
}

#[test]
fn categorical_legend_orders_values_and_is_reproducible() {
	let mut engine = loaded(EngineConfig::default());
	engine.set_color_key("team");
	let Some(Legend::Categorical(entries)) = engine.legend() else {
		panic!("expected categorical legend");
	};
	let values: Vec<_> = entries.iter().map(|e| e.value.clone()).collect();
	assert_eq!(values, vec![team("blue"), team("red"), CommunityValue::Missing]);
	assert_eq!(entries[1].count, 2);
	assert_eq!(entries[2].color, engine.config().neutral());

	let mut other = loaded(EngineConfig::default());
	other.set_color_key("team");
	assert_eq!(other.legend(), engine.legend());
}

#[test]
fn cluster_palette_survives_color_key_switches() {
	let mut engine = loaded(EngineConfig {
		cluster_labels: true,
		..Default::default()
	});
	let clusters = engine.cluster_palette().cloned();

	engine.set_color_key("score");
	engine.set_color_key("team");
	assert_eq!(engine.cluster_palette().cloned(), clusters);

	let labels = engine.cluster_labels();
	assert_eq!(labels.len(), 2);
	let west = labels.iter().find(|l| l.label.name == "west").unwrap();
	assert_eq!((west.x, west.y), (20.0, 10.0));
	assert_eq!(west.label.members, 2);

	engine.set_color_key("cluster");
	assert_eq!(engine.class(), Some(AttributeClass::ClusterLabel));
	assert_eq!(engine.palette().and_then(|p| p.as_categorical()).cloned(), clusters);
}

#[test]
fn focus_emphasis_and_zoom() {
	let mut engine = loaded(EngineConfig::default());
	engine.hover_node(engine.graph().node_index("n4"));
	let n3 = engine.graph().node_index("n3").unwrap();
	assert_eq!(engine.node_display(3).unwrap().emphasis, Emphasis::Focus);
	assert!(engine.node_display(3).unwrap().force_label);
	assert_eq!(engine.node_display(n3).unwrap().emphasis, Emphasis::Neighbor);
	assert_eq!(engine.node_display(0).unwrap().emphasis, Emphasis::Dimmed);

	assert!(engine.zoom_to("n3"));
	assert_eq!(engine.renderer().focus, Some((8.0, 8.0)));
	assert!(!engine.zoom_to("missing"));
}

#[test]
fn every_transition_clears_before_adding() {
	let mut engine = loaded(EngineConfig::default());
	let before = engine.renderer().clears;
	engine.select_node(Some("n1"));
	engine.select_node(Some("n2"));
	engine.set_edge_mode(EdgeMode::All);
	assert_eq!(engine.renderer().clears, before + 3);
}

#[test]
fn reversing_the_gradient_swaps_the_extremes() {
	let mut engine = loaded(EngineConfig::default());
	engine.set_color_key("score");
	let color = |engine: &NetworkEngine<Recorder>, idx| engine.node_display(idx).unwrap().color;
	let (low, high) = (color(&engine, 0), color(&engine, 2));
	assert_ne!(low, high);

	engine.set_reversed(true);
	assert_eq!(color(&engine, 0), high);
	assert_eq!(color(&engine, 2), low);
	assert!(matches!(engine.legend(), Some(Legend::Gradient { reversed: true, .. })));

	engine.set_scale(ScaleType::Sqrt);
	assert_eq!(color(&engine, 0), high);
	assert!(matches!(engine.legend(), Some(Legend::Gradient { scale: ScaleType::Sqrt, .. })));
}

#[test]
fn unknown_gradient_paints_every_node_neutral() {
	let mut engine = loaded(EngineConfig::default());
	engine.set_color_key("score");
	engine.set_gradient("no-such-gradient");
	let neutral = engine.config().neutral();
	assert!((0..4).all(|i| engine.node_display(i).unwrap().color == neutral));

	engine.set_gradient("magma");
	assert_ne!(engine.node_display(0).unwrap().color, neutral);
}

#[test]
fn option_changes_rebuild_categorical_visibility() {
	let mut engine = loaded(EngineConfig::default());
	engine.set_color_key("team");
	engine.toggle_visibility(&team("red"));
	engine.toggle_highlight(&team("blue"));
	assert!(engine.node_display(0).unwrap().hidden);

	engine.set_reversed(true);
	assert!(!engine.node_display(0).unwrap().hidden);
	assert!(!engine.highlight().has_highlight());
	let Some(Legend::Categorical(entries)) = engine.legend() else {
		panic!("expected categorical legend");
	};
	assert!(entries.iter().all(|e| e.visible && !e.highlighted));
}

#[test]
fn reseeding_recolors_clusters_without_reordering() {
	let mut engine = loaded(EngineConfig::default());
	let before = engine.cluster_palette().cloned().unwrap();
	let order = before.communities().to_vec();

	let recolored = (1..32).find_map(|seed| {
		engine.reseed(seed);
		let after = engine.cluster_palette().cloned().unwrap();
		assert_eq!(after.communities(), order.as_slice());
		let changed = order.iter().any(|v| after.color_of(v) != before.color_of(v));
		changed.then_some(after)
	});
	let recolored = recolored.expect("some seed should recolor the clusters");

	assert_eq!(engine.class(), Some(AttributeClass::ClusterLabel));
	assert_eq!(engine.palette().and_then(|p| p.as_categorical()), Some(&recolored));
	assert_eq!(recolored.color_of(&CommunityValue::Missing), engine.config().neutral());
}

#[test]
fn external_selection_and_dynamic_toggle() {
	let mut engine = loaded(EngineConfig::default());
	assert!(engine.edge_policy().dynamic);
	assert!(!engine.select_node(Some("ghost")));
	assert!(engine.renderer().live.is_empty());

	engine.set_dynamic_edges(false);
	assert!(!engine.edge_policy().dynamic);
	assert!(engine.select_node(Some("n2")));
	assert!(engine.renderer().live.is_empty());

	engine.set_dynamic_edges(true);
	assert_eq!(engine.renderer().live, touching(&engine, "n2"));
	assert!(engine.select_node(None));
	assert!(engine.renderer().live.is_empty());
}
