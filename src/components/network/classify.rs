use super::types::GraphData;

/// How the active color key is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AttributeClass {
	/// Every node carries a finite number: gradient coloring.
	Numeric,
	/// Distinct values get distinct colors.
	Categorical,
	/// The reserved cluster attribute. Colored categorically from a palette
	/// cached per data load.
	ClusterLabel,
}

impl AttributeClass {
	pub fn is_categorical(self) -> bool {
		!matches!(self, AttributeClass::Numeric)
	}
}

/// Parses an attribute value as a finite number.
pub fn parse_numeric(raw: &str) -> Option<f64> {
	raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Classifies `key` over the whole graph. A single absent or non-numeric
/// value forces [`AttributeClass::Categorical`]; an empty graph is
/// categorical as well.
pub fn classify(graph: &GraphData, key: &str, cluster_attribute: &str) -> AttributeClass {
	if key == cluster_attribute {
		return AttributeClass::ClusterLabel;
	}
	if graph.is_empty() {
		return AttributeClass::Categorical;
	}
	let all_numeric = graph
		.nodes()
		.iter()
		.all(|node| node.attribute(key).and_then(parse_numeric).is_some());
	if all_numeric {
		AttributeClass::Numeric
	} else {
		AttributeClass::Categorical
	}
}
