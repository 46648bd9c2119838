use super::types::{EdgeIdx, EdgeRecord, NodeRecord};

/// Converts layout coordinates into viewport coordinates for the current
/// camera.
pub trait Projector {
	fn graph_to_viewport(&self, x: f64, y: f64) -> (f64, f64);
}

/// The live render graph, as seen by the engine.
///
/// The engine is the only writer. Edge mutations always arrive as a clear
/// followed by the complete new set.
pub trait RenderAdapter: Projector {
	/// Replaces the node set after a data load. Drops every live edge.
	fn reset_graph(&mut self, nodes: &[NodeRecord]);

	fn clear_edges(&mut self);

	fn add_edge(&mut self, idx: EdgeIdx, edge: &EdgeRecord);

	/// Moves the camera so that the layout point `(x, y)` is centered.
	fn focus_camera(&mut self, _x: f64, _y: f64) {}

	/// First palette publication after a fresh data load.
	fn network_ready(&mut self) {}

	/// Display decisions changed; redraw on the next frame.
	fn refresh(&mut self) {}
}
