use std::collections::BTreeMap;

use super::adapter::Projector;
use super::color::Rgb;
use super::palette::{CategoricalPalette, CommunityValue};
use super::types::GraphData;

/// A cluster's label anchored at its centroid in layout coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct ClusterLabel {
	pub name: String,
	pub color: Rgb,
	pub members: usize,
	pub centroid: (f64, f64),
}

/// A label positioned for the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectedLabel<'a> {
	pub label: &'a ClusterLabel,
	pub x: f64,
	pub y: f64,
}

/// Cluster labels drawn over the graph. Centroids only change on
/// [`ClusterOverlay::rebuild`]; [`ClusterOverlay::project`] is cheap enough
/// to run every frame.
#[derive(Clone, Debug, Default)]
pub struct ClusterOverlay {
	labels: Vec<ClusterLabel>,
	enabled: bool,
}

impl ClusterOverlay {
	pub fn rebuild(&mut self, graph: &GraphData, clusters: &CategoricalPalette) {
		let mut sums: BTreeMap<&CommunityValue, (f64, f64, usize)> = BTreeMap::new();
		for (idx, node) in graph.nodes().iter().enumerate() {
			let Some(value) = clusters.node_value(idx).filter(|v| !v.is_missing()) else {
				continue;
			};
			let entry = sums.entry(value).or_insert((0.0, 0.0, 0));
			entry.0 += node.x;
			entry.1 += node.y;
			entry.2 += 1;
		}
		self.labels = sums
			.into_iter()
			.map(|(value, (sx, sy, n))| ClusterLabel {
				name: value.to_string(),
				color: clusters.color_of(value),
				members: n,
				centroid: (sx / n as f64, sy / n as f64),
			})
			.collect();
	}

	pub fn labels(&self) -> &[ClusterLabel] {
		&self.labels
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled
	}

	pub fn set_enabled(&mut self, enabled: bool) {
		self.enabled = enabled;
	}

	pub fn project<'a>(&'a self, projector: &dyn Projector) -> Vec<ProjectedLabel<'a>> {
		if !self.enabled {
			return Vec::new();
		}
		self.labels
			.iter()
			.map(|label| {
				let (x, y) = projector.graph_to_viewport(label.centroid.0, label.centroid.1);
				ProjectedLabel { label, x, y }
			})
			.collect()
	}
}
