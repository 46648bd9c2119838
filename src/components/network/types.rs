use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;
use rand::Rng;
use serde::Deserialize;

/// Fallback layout coordinates are drawn from `[0, COORD_FALLBACK_RANGE)`.
pub const COORD_FALLBACK_RANGE: f64 = 10.0;
/// Node size used when the metadata row carries none (or an unparsable one).
pub const DEFAULT_NODE_SIZE: f64 = 4.0;

/// Position of a node in [`GraphData::nodes`].
pub type NodeIdx = usize;
/// Position of an edge in [`GraphData::edges`].
pub type EdgeIdx = usize;

/// Raw edge row as handed over by the row source.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeRow {
	pub source: String,
	pub target: String,
	#[serde(default)]
	pub weight: Option<f64>,
}

impl EdgeRow {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
			weight: None,
		}
	}
}

/// Raw node metadata row. Coordinates stay textual until the graph build so
/// that unparsable values can fall back instead of failing deserialization.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct MetadataRow {
	pub id: String,
	#[serde(default)]
	pub attributes: BTreeMap<String, String>,
	#[serde(default)]
	pub x: Option<String>,
	#[serde(default)]
	pub y: Option<String>,
	#[serde(default)]
	pub size: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub cluster: Option<String>,
}

impl MetadataRow {
	pub fn new(id: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			..Default::default()
		}
	}

	pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.insert(key.into(), value.into());
		self
	}

	pub fn with_position(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
		self.x = Some(x.into());
		self.y = Some(y.into());
		self
	}

	pub fn with_cluster(mut self, cluster: impl Into<String>) -> Self {
		self.cluster = Some(cluster.into());
		self
	}
}

/// A node as the engine knows it (the GraphRecord).
#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
	pub id: String,
	pub label: String,
	pub x: f64,
	pub y: f64,
	pub size: f64,
	attributes: BTreeMap<String, String>,
}

impl NodeRecord {
	/// Attribute value, with blank strings treated as absent.
	pub fn attribute(&self, key: &str) -> Option<&str> {
		self.attributes
			.get(key)
			.map(|v| v.trim())
			.filter(|v| !v.is_empty())
	}

	pub fn attributes(&self) -> &BTreeMap<String, String> {
		&self.attributes
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRecord {
	pub source: NodeIdx,
	pub target: NodeIdx,
	pub weight: f64,
}

impl EdgeRecord {
	pub fn touches(&self, idx: NodeIdx) -> bool {
		self.source == idx || self.target == idx
	}

	/// The endpoint opposite to `idx`, if the edge touches it.
	pub fn other(&self, idx: NodeIdx) -> Option<NodeIdx> {
		if self.source == idx {
			Some(self.target)
		} else if self.target == idx {
			Some(self.source)
		} else {
			None
		}
	}
}

/// Node and edge tables plus the lookup indexes built alongside them.
#[derive(Clone, Debug, Default)]
pub struct GraphData {
	nodes: Vec<NodeRecord>,
	edges: Vec<EdgeRecord>,
	index: HashMap<String, NodeIdx>,
	incident: Vec<Vec<EdgeIdx>>,
}

impl GraphData {
	/// Builds the graph from raw rows.
	///
	/// Duplicate node ids keep their first row. Edges naming an unknown node
	/// are skipped, and at most one edge is kept per unordered node pair. The
	/// row's `cluster` column is stored under `cluster_attribute`.
	pub fn from_rows<R: Rng + ?Sized>(
		edge_rows: &[EdgeRow],
		metadata_rows: &[MetadataRow],
		cluster_attribute: &str,
		rng: &mut R,
	) -> Self {
		let mut graph = GraphData::default();

		for row in metadata_rows {
			if graph.index.contains_key(&row.id) {
				debug!("duplicate node id {:?} ignored", row.id);
				continue;
			}
			let mut attributes = row.attributes.clone();
			if let Some(cluster) = &row.cluster {
				attributes.insert(cluster_attribute.to_string(), cluster.clone());
			}
			let label = row
				.label
				.clone()
				.filter(|l| !l.trim().is_empty())
				.unwrap_or_else(|| row.id.clone());
			let size = row
				.size
				.as_deref()
				.and_then(|s| s.trim().parse::<f64>().ok())
				.filter(|s| s.is_finite() && *s > 0.0)
				.unwrap_or(DEFAULT_NODE_SIZE);

			let idx = graph.nodes.len();
			graph.nodes.push(NodeRecord {
				id: row.id.clone(),
				label,
				x: parse_coordinate(row.x.as_deref(), rng),
				y: parse_coordinate(row.y.as_deref(), rng),
				size,
				attributes,
			});
			graph.index.insert(row.id.clone(), idx);
		}

		graph.incident = vec![Vec::new(); graph.nodes.len()];
		let mut seen_pairs = HashSet::new();
		for row in edge_rows {
			let (Some(&src), Some(&tgt)) =
				(graph.index.get(&row.source), graph.index.get(&row.target))
			else {
				debug!("edge {} -> {} references an unknown node", row.source, row.target);
				continue;
			};
			if !seen_pairs.insert((src.min(tgt), src.max(tgt))) {
				continue;
			}
			let idx = graph.edges.len();
			graph.edges.push(EdgeRecord {
				source: src,
				target: tgt,
				weight: row.weight.filter(|w| w.is_finite()).unwrap_or(1.0),
			});
			graph.incident[src].push(idx);
			if tgt != src {
				graph.incident[tgt].push(idx);
			}
		}

		graph
	}

	pub fn nodes(&self) -> &[NodeRecord] {
		&self.nodes
	}

	pub fn edges(&self) -> &[EdgeRecord] {
		&self.edges
	}

	pub fn node(&self, idx: NodeIdx) -> Option<&NodeRecord> {
		self.nodes.get(idx)
	}

	pub fn edge(&self, idx: EdgeIdx) -> Option<&EdgeRecord> {
		self.edges.get(idx)
	}

	pub fn node_index(&self, id: &str) -> Option<NodeIdx> {
		self.index.get(id).copied()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Indices of every edge with `idx` as source or target.
	pub fn edges_touching(&self, idx: NodeIdx) -> &[EdgeIdx] {
		self.incident.get(idx).map(Vec::as_slice).unwrap_or(&[])
	}

	pub fn neighbors(&self, idx: NodeIdx) -> impl Iterator<Item = NodeIdx> + '_ {
		self.edges_touching(idx)
			.iter()
			.filter_map(move |&e| self.edges[e].other(idx))
	}

	pub fn are_adjacent(&self, a: NodeIdx, b: NodeIdx) -> bool {
		self.neighbors(a).any(|n| n == b)
	}
}

fn parse_coordinate<R: Rng + ?Sized>(raw: Option<&str>, rng: &mut R) -> f64 {
	raw.and_then(|s| s.trim().parse::<f64>().ok())
		.filter(|v| v.is_finite())
		.unwrap_or_else(|| rng.gen_range(0.0..COORD_FALLBACK_RANGE))
}
