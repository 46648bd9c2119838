use std::collections::VecDeque;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::adapter::RenderAdapter;
use super::classify::{AttributeClass, classify};
use super::color::{BuiltinGradients, DistinctColors, GradientSource, HueWheel, Rgb};
use super::config::EngineConfig;
use super::edges::{EdgeMode, EdgePolicy};
use super::highlight::HighlightState;
use super::overlay::{ClusterOverlay, ProjectedLabel};
use super::palette::{
	CategoricalPalette, CommunityValue, Legend, LegendEntry, NumericOptions, Palette,
	build_categorical, build_numeric,
};
use super::scale::ScaleType;
use super::types::{EdgeIdx, EdgeRow, GraphData, MetadataRow, NodeIdx};

/// Re-entrancy guard around palette recomputation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PipelineState {
	#[default]
	Idle,
	Running,
}

/// Work postponed to the next scheduling turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
	RecomputeEdges,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Emphasis {
	/// The selected node, or the hovered one when nothing is selected.
	Focus,
	/// Adjacent to the focus node.
	Neighbor,
	/// Member of an emphasized group.
	Group,
	Normal,
	/// Something else has the user's attention.
	Dimmed,
}

/// Per-frame display decision for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeDisplay<'a> {
	pub color: Rgb,
	pub label: &'a str,
	pub force_label: bool,
	pub hidden: bool,
	pub emphasis: Emphasis,
	pub size: f64,
}

/// Legend interactions, as sent by a legend widget.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupAction {
	ToggleVisible(CommunityValue),
	ToggleAllVisible,
	ToggleHighlight(CommunityValue),
}

#[derive(Clone, Debug)]
struct Publication {
	key: String,
	class: AttributeClass,
	palette: Palette,
}

/// Owns the graph, the published palette and the interaction state, and
/// pushes edge mutations into the injected renderer.
pub struct NetworkEngine<R> {
	renderer: R,
	config: EngineConfig,
	neutral: Rgb,
	distinct: Box<dyn DistinctColors>,
	gradients: Box<dyn GradientSource>,
	rng: StdRng,
	graph: GraphData,
	color_key: String,
	numeric: NumericOptions,
	published: Option<Publication>,
	cluster_palette: Option<CategoricalPalette>,
	overlay: ClusterOverlay,
	highlight: HighlightState,
	policy: EdgePolicy,
	materialized: Vec<EdgeIdx>,
	deferred: VecDeque<Deferred>,
	pipeline: PipelineState,
	ready_pending: bool,
}

impl<R: RenderAdapter> NetworkEngine<R> {
	pub fn new(renderer: R, config: EngineConfig) -> Self {
		Self::with_sources(
			renderer,
			config,
			Box::new(HueWheel::default()),
			Box::new(BuiltinGradients),
		)
	}

	pub fn with_sources(
		renderer: R,
		config: EngineConfig,
		distinct: Box<dyn DistinctColors>,
		gradients: Box<dyn GradientSource>,
	) -> Self {
		let numeric = NumericOptions {
			gradient: config.gradient.clone(),
			reversed: config.reversed,
			scale: config.scale,
			params: config.scale_params(),
			steps: config.gradient_steps,
		};
		let mut overlay = ClusterOverlay::default();
		overlay.set_enabled(config.cluster_labels);

		Self {
			renderer,
			neutral: config.neutral(),
			distinct,
			gradients,
			rng: StdRng::seed_from_u64(config.seed),
			graph: GraphData::default(),
			color_key: config.initial_color_key().to_string(),
			numeric,
			published: None,
			cluster_palette: None,
			overlay,
			highlight: HighlightState::default(),
			policy: EdgePolicy {
				mode: config.edge_mode,
				dynamic: config.dynamic_edges,
			},
			materialized: Vec::new(),
			deferred: VecDeque::new(),
			pipeline: PipelineState::Idle,
			ready_pending: false,
			config,
		}
	}

	/// Replaces the graph with freshly built rows and publishes a palette for
	/// the current color key. The renderer's `network_ready` fires once this
	/// first publication lands.
	pub fn load(&mut self, edge_rows: &[EdgeRow], metadata_rows: &[MetadataRow]) {
		self.graph = GraphData::from_rows(
			edge_rows,
			metadata_rows,
			&self.config.cluster_attribute,
			&mut self.rng,
		);
		info!(
			"loaded {} nodes and {} edges ({} edge rows)",
			self.graph.node_count(),
			self.graph.edges().len(),
			edge_rows.len()
		);

		self.renderer.reset_graph(self.graph.nodes());
		self.materialized.clear();
		self.deferred.clear();
		self.highlight.clear_nodes();
		self.published = None;
		self.rebuild_clusters();
		self.ready_pending = true;
		self.recompute_palette();
	}

	fn shuffle_rng(&self) -> StdRng {
		StdRng::seed_from_u64(self.config.seed)
	}

	fn rebuild_clusters(&mut self) {
		let clusters = build_categorical(
			&self.graph,
			&self.config.cluster_attribute,
			self.neutral,
			self.distinct.as_ref(),
			&mut self.shuffle_rng(),
		);
		self.overlay.rebuild(&self.graph, &clusters);
		self.cluster_palette = Some(clusters);
	}

	/// Classifies the color key, builds its palette and publishes both in
	/// one step. Returns `false` when a recomputation is already running.
	pub fn recompute_palette(&mut self) -> bool {
		if self.pipeline == PipelineState::Running {
			debug!("palette recomputation already running; ignoring nested request");
			return false;
		}
		self.pipeline = PipelineState::Running;
		self.publish();
		self.pipeline = PipelineState::Idle;
		true
	}

	/// Body of [`NetworkEngine::recompute_palette`]; runs under the guard,
	/// renderer notifications included.
	fn publish(&mut self) {
		let key = self.color_key.clone();
		let class = classify(&self.graph, &key, &self.config.cluster_attribute);
		let palette = match class {
			AttributeClass::ClusterLabel => match &self.cluster_palette {
				Some(clusters) => Palette::Categorical(clusters.clone()),
				None => Palette::Categorical(build_categorical(
					&self.graph,
					&key,
					self.neutral,
					self.distinct.as_ref(),
					&mut self.shuffle_rng(),
				)),
			},
			AttributeClass::Categorical => Palette::Categorical(build_categorical(
				&self.graph,
				&key,
				self.neutral,
				self.distinct.as_ref(),
				&mut self.shuffle_rng(),
			)),
			AttributeClass::Numeric => Palette::Numeric(build_numeric(
				&self.graph,
				&key,
				&self.numeric,
				self.neutral,
				self.gradients.as_ref(),
			)),
		};

		if let Palette::Categorical(p) = &palette {
			self.highlight.reset_groups(p.communities());
		}
		self.published = Some(Publication { key, class, palette });
		debug!("published {:?} palette for `{}`", class, self.color_key);

		self.apply_edges();
		if self.ready_pending {
			self.ready_pending = false;
			info!("network ready");
			self.renderer.network_ready();
		}
		self.renderer.refresh();
	}

	/// Recomputes the materialized edge set from scratch and hands it to the
	/// renderer.
	fn apply_edges(&mut self) {
		let groups = self
			.published
			.as_ref()
			.and_then(|p| p.palette.as_categorical());
		let next = self.policy.materialize(
			&self.graph,
			self.highlight.selected(),
			self.highlight.highlighted(),
			groups,
		);

		self.renderer.clear_edges();
		for &idx in &next {
			self.renderer.add_edge(idx, &self.graph.edges()[idx]);
		}
		debug!("materialized {} of {} edges", next.len(), self.graph.edges().len());
		self.materialized = next;
	}

	pub fn set_color_key(&mut self, key: &str) {
		if self.color_key == key && self.published.is_some() {
			return;
		}
		self.color_key = key.to_string();
		self.recompute_palette();
	}

	/// Numeric gradient by name. Unknown names color every node neutral.
	pub fn set_gradient(&mut self, name: &str) {
		if self.numeric.gradient == name {
			return;
		}
		self.numeric.gradient = name.to_string();
		self.recompute_palette();
	}

	pub fn set_reversed(&mut self, reversed: bool) {
		if self.numeric.reversed == reversed {
			return;
		}
		self.numeric.reversed = reversed;
		self.recompute_palette();
	}

	pub fn set_scale(&mut self, scale: ScaleType) {
		if self.numeric.scale == scale {
			return;
		}
		self.numeric.scale = scale;
		self.recompute_palette();
	}

	/// Changes the categorical shuffle seed and recolors, cluster labels
	/// included.
	pub fn reseed(&mut self, seed: u64) {
		if self.config.seed == seed {
			return;
		}
		self.config.seed = seed;
		self.rebuild_clusters();
		self.recompute_palette();
	}

	pub fn set_edge_mode(&mut self, mode: EdgeMode) {
		if self.policy.mode == mode {
			return;
		}
		self.policy.mode = mode;
		self.apply_edges();
		self.renderer.refresh();
	}

	pub fn set_dynamic_edges(&mut self, enabled: bool) {
		if self.policy.dynamic == enabled {
			return;
		}
		self.policy.dynamic = enabled;
		self.apply_edges();
		self.renderer.refresh();
	}

	/// Node click from the renderer's event dispatch. The selection changes
	/// now; the edge set follows on the next [`NetworkEngine::run_deferred`].
	pub fn click_node(&mut self, node: Option<NodeIdx>) {
		let node = node.filter(|&idx| idx < self.graph.node_count());
		self.highlight.select(node);
		if self.policy.mode == EdgeMode::None
			&& self.policy.dynamic
			&& !self.deferred.contains(&Deferred::RecomputeEdges)
		{
			self.deferred.push_back(Deferred::RecomputeEdges);
		}
		self.renderer.refresh();
	}

	/// Selection set from outside the renderer; applied immediately.
	pub fn select_node(&mut self, id: Option<&str>) -> bool {
		let node = id.and_then(|id| self.graph.node_index(id));
		let found = id.is_none() || node.is_some();
		if found {
			self.highlight.select(node);
			self.apply_edges();
			self.renderer.refresh();
		}
		found
	}

	/// Runs everything queued before this call. Work queued while draining
	/// waits for the next turn.
	pub fn run_deferred(&mut self) -> usize {
		let tasks: Vec<Deferred> = self.deferred.drain(..).collect();
		for task in &tasks {
			match task {
				Deferred::RecomputeEdges => self.apply_edges(),
			}
		}
		tasks.len()
	}

	pub fn hover_node(&mut self, node: Option<NodeIdx>) {
		let node = node.filter(|&idx| idx < self.graph.node_count());
		if self.highlight.hovered() != node {
			self.highlight.hover(node);
			self.renderer.refresh();
		}
	}

	pub fn toggle_visibility(&mut self, value: &CommunityValue) -> bool {
		let visible = self.highlight.toggle_visible(value);
		self.renderer.refresh();
		visible
	}

	pub fn toggle_all_visibility(&mut self) {
		self.highlight.toggle_all_visible();
		self.renderer.refresh();
	}

	/// Flips a group's emphasis. Drops the node selection.
	pub fn toggle_highlight(&mut self, value: &CommunityValue) -> bool {
		let highlighted = self.highlight.toggle_highlight(value);
		self.apply_edges();
		self.renderer.refresh();
		highlighted
	}

	pub fn apply_group_action(&mut self, action: &GroupAction) {
		match action {
			GroupAction::ToggleVisible(value) => {
				self.toggle_visibility(value);
			}
			GroupAction::ToggleAllVisible => self.toggle_all_visibility(),
			GroupAction::ToggleHighlight(value) => {
				self.toggle_highlight(value);
			}
		}
	}

	/// Centers the camera on a node. Unknown ids are ignored.
	pub fn zoom_to(&mut self, id: &str) -> bool {
		let Some(node) = self.graph.node_index(id).and_then(|idx| self.graph.node(idx)) else {
			debug!("zoom target {id:?} not in graph");
			return false;
		};
		self.renderer.focus_camera(node.x, node.y);
		true
	}

	pub fn set_cluster_labels(&mut self, enabled: bool) {
		if self.overlay.is_enabled() != enabled {
			self.overlay.set_enabled(enabled);
			self.renderer.refresh();
		}
	}

	pub fn cluster_labels_enabled(&self) -> bool {
		self.overlay.is_enabled()
	}

	/// Color, label and emphasis for one node. `None` for unknown indices.
	pub fn node_display(&self, idx: NodeIdx) -> Option<NodeDisplay<'_>> {
		let node = self.graph.node(idx)?;
		let (color, groups) = match &self.published {
			Some(p) => (p.palette.node_color(idx), p.palette.as_categorical()),
			None => (self.neutral, None),
		};
		let value = groups.and_then(|g| g.node_value(idx));
		let hidden = value.is_some_and(|v| !self.highlight.is_visible(v));

		let emphasis = match self.highlight.focus() {
			Some(focus) if focus == idx => Emphasis::Focus,
			Some(focus) if self.graph.are_adjacent(focus, idx) => Emphasis::Neighbor,
			Some(_) => Emphasis::Dimmed,
			None if groups.is_some() && self.highlight.has_highlight() => {
				if value.is_some_and(|v| self.highlight.is_highlighted(v)) {
					Emphasis::Group
				} else {
					Emphasis::Dimmed
				}
			}
			None => Emphasis::Normal,
		};

		Some(NodeDisplay {
			color,
			label: &node.label,
			force_label: matches!(emphasis, Emphasis::Focus | Emphasis::Neighbor),
			hidden,
			emphasis,
			size: node.size,
		})
	}

	pub fn legend(&self) -> Option<Legend> {
		let published = self.published.as_ref()?;
		Some(match &published.palette {
			Palette::Categorical(p) => Legend::Categorical(
				p.communities()
					.iter()
					.map(|value| LegendEntry {
						value: value.clone(),
						color: p.color_of(value),
						count: p.count_of(value),
						visible: self.highlight.is_visible(value),
						highlighted: self.highlight.is_highlighted(value),
					})
					.collect(),
			),
			Palette::Numeric(p) => Legend::Gradient {
				stops: p.stops().to_vec(),
				min: p.min,
				max: p.max,
				scale: p.scale,
				reversed: p.reversed,
			},
		})
	}

	/// Cluster labels at their viewport positions for the current frame.
	pub fn cluster_labels(&self) -> Vec<ProjectedLabel<'_>> {
		self.overlay.project(&self.renderer)
	}

	pub fn graph(&self) -> &GraphData {
		&self.graph
	}

	pub fn renderer(&self) -> &R {
		&self.renderer
	}

	pub fn renderer_mut(&mut self) -> &mut R {
		&mut self.renderer
	}

	pub fn config(&self) -> &EngineConfig {
		&self.config
	}

	pub fn color_key(&self) -> &str {
		&self.color_key
	}

	/// Class of the published color key, if anything is published yet.
	pub fn class(&self) -> Option<AttributeClass> {
		self.published.as_ref().map(|p| p.class)
	}

	pub fn published_key(&self) -> Option<&str> {
		self.published.as_ref().map(|p| p.key.as_str())
	}

	pub fn palette(&self) -> Option<&Palette> {
		self.published.as_ref().map(|p| &p.palette)
	}

	pub fn cluster_palette(&self) -> Option<&CategoricalPalette> {
		self.cluster_palette.as_ref()
	}

	pub fn highlight(&self) -> &HighlightState {
		&self.highlight
	}

	pub fn edge_policy(&self) -> EdgePolicy {
		self.policy
	}

	pub fn materialized_edges(&self) -> &[EdgeIdx] {
		&self.materialized
	}

	pub fn pending(&self) -> usize {
		self.deferred.len()
	}

	pub fn pipeline_state(&self) -> PipelineState {
		self.pipeline
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network::adapter::Projector;
	use crate::components::network::types::{EdgeRecord, NodeRecord};

	#[derive(Default)]
	struct Null {
		refreshes: usize,
		clears: usize,
		ready: usize,
	}

	impl Projector for Null {
		fn graph_to_viewport(&self, x: f64, y: f64) -> (f64, f64) {
			(x, y)
		}
	}

	impl RenderAdapter for Null {
		fn reset_graph(&mut self, _nodes: &[NodeRecord]) {}
		fn clear_edges(&mut self) {
			self.clears += 1;
		}
		fn add_edge(&mut self, _idx: EdgeIdx, _edge: &EdgeRecord) {}
		fn network_ready(&mut self) {
			self.ready += 1;
		}
		fn refresh(&mut self) {
			self.refreshes += 1;
		}
	}

	fn engine() -> NetworkEngine<Null> {
		let mut engine = NetworkEngine::new(Null::default(), EngineConfig::default());
		let rows = [
			MetadataRow::new("a").with_attribute("kind", "x"),
			MetadataRow::new("b").with_attribute("kind", "y"),
		];
		engine.load(&[EdgeRow::new("a", "b")], &rows);
		engine
	}

	#[test]
	fn nested_recompute_is_a_no_op() {
		let mut engine = engine();
		assert_eq!(engine.published_key(), Some("cluster"));

		engine.pipeline = PipelineState::Running;
		engine.set_color_key("kind");
		assert_eq!(engine.published_key(), Some("cluster"));
		assert_eq!(engine.pending(), 0);

		engine.pipeline = PipelineState::Idle;
		assert!(engine.recompute_palette());
		assert_eq!(engine.published_key(), Some("kind"));
		assert_eq!(engine.class(), Some(AttributeClass::Categorical));
		assert_eq!(engine.pipeline_state(), PipelineState::Idle);
	}

	#[test]
	fn guard_covers_renderer_notifications() {
		let mut engine = NetworkEngine::new(Null::default(), EngineConfig::default());
		engine.pipeline = PipelineState::Running;
		engine.load(&[EdgeRow::new("a", "b")], &[MetadataRow::new("a"), MetadataRow::new("b")]);
		let renderer = engine.renderer();
		assert_eq!((renderer.clears, renderer.ready, renderer.refreshes), (0, 0, 0));
		assert!(engine.palette().is_none());

		engine.pipeline = PipelineState::Idle;
		assert!(engine.recompute_palette());
		let renderer = engine.renderer();
		assert_eq!((renderer.clears, renderer.ready, renderer.refreshes), (1, 1, 1));
		assert_eq!(engine.pipeline_state(), PipelineState::Idle);
	}

	#[test]
	fn cluster_label_toggle_refreshes_only_on_change() {
		let mut engine = engine();
		assert!(!engine.cluster_labels_enabled());
		let before = engine.renderer().refreshes;
		engine.set_cluster_labels(false);
		assert_eq!(engine.renderer().refreshes, before);
		engine.set_cluster_labels(true);
		assert!(engine.cluster_labels_enabled());
		assert_eq!(engine.renderer().refreshes, before + 1);
	}

	#[test]
	fn unchanged_color_key_does_not_republish() {
		let mut engine = engine();
		let before = engine.renderer().refreshes;
		engine.set_color_key("cluster");
		assert_eq!(engine.renderer().refreshes, before);
	}

	#[test]
	fn clicks_collapse_into_one_pending_recompute() {
		let mut engine = engine();
		engine.click_node(Some(0));
		engine.click_node(Some(1));
		assert_eq!(engine.pending(), 1);
		assert_eq!(engine.run_deferred(), 1);
		assert_eq!(engine.run_deferred(), 0);
	}
}
