use log::info;

use super::adapter::{Projector, RenderAdapter};
use super::types::{EdgeIdx, EdgeRecord, NodeIdx, NodeRecord};

pub const HIT_RADIUS: f64 = 12.0;
const FIT_PADDING: f64 = 40.0;
const CAMERA_SPEED: f64 = 6.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NodePoint {
	pub x: f64,
	pub y: f64,
	pub size: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Canvas-side copy of the live render graph plus the camera.
pub struct CanvasState {
	pub nodes: Vec<NodePoint>,
	pub edges: Vec<(EdgeIdx, NodeIdx, NodeIdx, f64)>,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub ready: bool,
	pub dirty: bool,
	camera_target: Option<(f64, f64)>,
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			nodes: Vec::new(),
			edges: Vec::new(),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			pan: PanState::default(),
			width,
			height,
			ready: false,
			dirty: true,
			camera_target: None,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under the cursor; `skip` filters out nodes that are not
	/// drawn.
	pub fn node_at_position(
		&self,
		sx: f64,
		sy: f64,
		skip: impl Fn(NodeIdx) -> bool,
	) -> Option<NodeIdx> {
		self.nodes
			.iter()
			.enumerate()
			.rev()
			.filter(|(idx, _)| !skip(*idx))
			.find(|(_, node)| {
				let (px, py) = self.graph_to_viewport(node.x, node.y);
				let (dx, dy) = (px - sx, py - sy);
				(dx * dx + dy * dy).sqrt() < HIT_RADIUS.max(node.size)
			})
			.map(|(idx, _)| idx)
	}

	/// Scales and centers the layout bounds into the viewport.
	pub fn fit_to_view(&mut self) {
		let Some(first) = self.nodes.first() else {
			return;
		};
		let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
		for node in &self.nodes {
			min_x = min_x.min(node.x);
			min_y = min_y.min(node.y);
			max_x = max_x.max(node.x);
			max_y = max_y.max(node.y);
		}
		let (span_x, span_y) = ((max_x - min_x).max(1e-9), (max_y - min_y).max(1e-9));
		let k = ((self.width - 2.0 * FIT_PADDING) / span_x)
			.min((self.height - 2.0 * FIT_PADDING) / span_y)
			.clamp(1e-3, 1e4);
		self.transform = ViewTransform {
			x: self.width / 2.0 - (min_x + max_x) / 2.0 * k,
			y: self.height / 2.0 - (min_y + max_y) / 2.0 * k,
			k,
		};
		self.camera_target = None;
	}

	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) {
		let new_k = (self.transform.k * factor).clamp(1e-3, 1e5);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
		self.camera_target = None;
		self.dirty = true;
	}

	/// Eases the camera toward a pending focus target.
	pub fn tick(&mut self, dt: f64) {
		let Some((gx, gy)) = self.camera_target else {
			return;
		};
		let (tx, ty) = (
			self.width / 2.0 - gx * self.transform.k,
			self.height / 2.0 - gy * self.transform.k,
		);
		let step = (CAMERA_SPEED * dt).min(1.0);
		self.transform.x += (tx - self.transform.x) * step;
		self.transform.y += (ty - self.transform.y) * step;
		if (tx - self.transform.x).abs() < 0.5 && (ty - self.transform.y).abs() < 0.5 {
			self.transform.x = tx;
			self.transform.y = ty;
			self.camera_target = None;
		}
		self.dirty = true;
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.dirty = true;
	}
}

impl Projector for CanvasState {
	fn graph_to_viewport(&self, x: f64, y: f64) -> (f64, f64) {
		(
			x * self.transform.k + self.transform.x,
			y * self.transform.k + self.transform.y,
		)
	}
}

impl RenderAdapter for CanvasState {
	fn reset_graph(&mut self, nodes: &[NodeRecord]) {
		self.nodes = nodes
			.iter()
			.map(|n| NodePoint {
				x: n.x,
				y: n.y,
				size: n.size,
			})
			.collect();
		self.edges.clear();
		self.ready = false;
		self.fit_to_view();
		self.dirty = true;
	}

	fn clear_edges(&mut self) {
		self.edges.clear();
	}

	fn add_edge(&mut self, idx: EdgeIdx, edge: &EdgeRecord) {
		self.edges.push((idx, edge.source, edge.target, edge.weight));
	}

	fn focus_camera(&mut self, x: f64, y: f64) {
		self.camera_target = Some((x, y));
	}

	fn network_ready(&mut self) {
		info!("network ready: {} nodes on canvas", self.nodes.len());
		self.ready = true;
	}

	fn refresh(&mut self) {
		self.dirty = true;
	}
}
